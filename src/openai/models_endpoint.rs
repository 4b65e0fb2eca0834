use std::sync::Arc;

use crate::{
    error::{OpenAIError, Result},
    logger,
    models::{ModelInfo, ModelsList},
    openai::ClientContext,
};

/// `/models`
#[derive(Clone)]
pub struct ModelsEndPoint {
    pub(super) context: Arc<ClientContext>,
}

impl ModelsEndPoint {
    pub(crate) fn new(context: Arc<ClientContext>) -> Self {
        Self { context }
    }

    pub async fn get_models(&self) -> Result<Vec<ModelInfo>> {
        let mut timer = logger::timer("models");
        let list: ModelsList = self.context.get("models").await?;
        timer.stop();
        Ok(list.data)
    }

    /// The id is sent as a single path segment, so `/` and spaces are escaped.
    pub async fn get_model_details(&self, id: &str) -> Result<ModelInfo> {
        if id.trim().is_empty() {
            return Err(OpenAIError::argument("model id must not be empty"));
        }
        let id = id.trim();
        let url = self.context.url_with_segment("models", id)?;

        let mut timer = logger::timer("models/retrieve");
        let info: ModelInfo = self
            .context
            .get_url(&format!("models/{}", id), url)
            .await?;
        timer.stop();
        Ok(info)
    }
}
