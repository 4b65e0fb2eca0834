use std::sync::Arc;

use crate::{
    error::Result,
    logger,
    models::{ChatRequest, ChatResponse},
    openai::ClientContext,
};

/// `/chat/completions`, non-streaming.
#[derive(Clone)]
pub struct ChatEndPoint {
    pub(super) context: Arc<ClientContext>,
}

impl ChatEndPoint {
    pub(crate) fn new(context: Arc<ClientContext>) -> Self {
        Self { context }
    }

    pub async fn get_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        log::info!(
            "Requesting chat completion from model: {} ({} message(s))",
            request.model(),
            request.messages().len()
        );

        let mut timer = logger::timer("chat/completions");
        let response: ChatResponse = self
            .context
            .post_json("chat/completions", &request)
            .await?;
        timer.stop();

        if let Some(usage) = &response.usage {
            log::debug!(
                "Chat usage: prompt={} total={}",
                usage.prompt_tokens,
                usage.total_tokens
            );
        }

        Ok(response)
    }
}
