use std::fmt;

use serde::{Deserialize, Serialize};

/// A model identifier as understood by the OpenAI API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    pub const EMBEDDING_ADA_002: &'static str = "text-embedding-ada-002";
    pub const GPT3_5_TURBO: &'static str = "gpt-3.5-turbo";
    pub const DALL_E_2: &'static str = "dall-e-2";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn embedding_ada_002() -> Self {
        Self::new(Self::EMBEDDING_ADA_002)
    }

    pub fn gpt3_5_turbo() -> Self {
        Self::new(Self::GPT3_5_TURBO)
    }

    pub fn id(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::gpt3_5_turbo()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Model {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Model {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: Option<u32>,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsList {
    #[serde(default)]
    pub object: String,
    pub data: Vec<ModelInfo>,
}
