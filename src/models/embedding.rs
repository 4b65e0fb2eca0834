use serde::{Deserialize, Serialize};

use crate::error::{OpenAIError, Result};
use crate::models::{Model, Usage};

const EMBEDDING_MODEL_MARKER: &str = "text-embedding";

/// Request body for `POST /embeddings`.
///
/// Inputs are validated once at construction and cannot be changed
/// afterwards. Each input must not exceed 8192 tokens; the service enforces
/// that limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingsRequest {
    input: Vec<String>,
    model: Model,
    user: Option<String>,
}

impl EmbeddingsRequest {
    /// Embeddings request for a single string.
    pub fn new(
        input: impl Into<String>,
        model: Option<Model>,
        user: Option<String>,
    ) -> Result<Self> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(OpenAIError::argument("input must not be empty"));
        }
        Self::from_inputs([input], model, user)
    }

    /// Embeddings request for several strings, sent in order.
    pub fn from_inputs<I, S>(input: I, model: Option<Model>, user: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let input: Vec<String> = input.into_iter().map(Into::into).collect();
        if input.is_empty() {
            return Err(OpenAIError::argument("Missing required input parameter"));
        }

        let model = model.unwrap_or_else(Model::embedding_ada_002);
        if !model.contains(EMBEDDING_MODEL_MARKER) {
            return Err(OpenAIError::argument(format!(
                "{} is not supported for embedding",
                model
            )));
        }

        Ok(Self { input, model, user })
    }

    pub fn builder<I, S>(input: I) -> EmbeddingsRequestBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        EmbeddingsRequestBuilder {
            input: input.into_iter().map(Into::into).collect(),
            model: None,
            user: None,
        }
    }

    pub fn input(&self) -> &[String] {
        &self.input
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmbeddingsRequestBuilder {
    input: Vec<String>,
    model: Option<Model>,
    user: Option<String>,
}

impl EmbeddingsRequestBuilder {
    pub fn model(mut self, model: impl Into<Model>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Same rules as [`EmbeddingsRequest::from_inputs`].
    pub fn build(self) -> Result<EmbeddingsRequest> {
        EmbeddingsRequest::from_inputs(self.input, self.model, self.user)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsResponse {
    #[serde(default)]
    pub object: String,
    pub data: Vec<Datum>,
    pub model: String,
    #[serde(default)]
    pub usage: Usage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Datum {
    #[serde(default)]
    pub object: String,
    pub embedding: Vec<f64>,
    pub index: usize,
}

impl EmbeddingsResponse {
    /// Vectors ordered by their input index.
    pub fn embeddings(&self) -> impl Iterator<Item = &[f64]> {
        let mut data: Vec<&Datum> = self.data.iter().collect();
        data.sort_by_key(|d| d.index);
        data.into_iter().map(|d| d.embedding.as_slice())
    }
}
