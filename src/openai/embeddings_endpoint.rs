use std::sync::Arc;

use crate::{
    error::Result,
    logger,
    models::{EmbeddingsRequest, EmbeddingsResponse},
    openai::ClientContext,
};

/// `/embeddings`
#[derive(Clone)]
pub struct EmbeddingsEndPoint {
    pub(super) context: Arc<ClientContext>,
}

impl EmbeddingsEndPoint {
    pub(crate) fn new(context: Arc<ClientContext>) -> Self {
        Self { context }
    }

    /// Embeds a single string with the default embedding model.
    pub async fn create_embedding(&self, input: &str) -> Result<EmbeddingsResponse> {
        self.create_embedding_with(EmbeddingsRequest::new(input, None, None)?)
            .await
    }

    pub async fn create_embedding_with(
        &self,
        request: EmbeddingsRequest,
    ) -> Result<EmbeddingsResponse> {
        log::info!(
            "Creating {} embedding(s) with model: {}",
            request.input().len(),
            request.model()
        );

        let mut timer = logger::timer("embeddings");
        let response: EmbeddingsResponse = self.context.post_json("embeddings", &request).await?;
        timer.stop();

        if response.data.is_empty() {
            log::warn!("Request succeeded but returned no embeddings");
        }

        Ok(response)
    }
}
