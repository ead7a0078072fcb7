use async_trait::async_trait;

use crate::error::CompletionResult;

/// A text-completion model endpoint. Given a system instruction and a
/// user prompt, returns the model's raw text response.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        instruction: &str,
        prompt: &str,
        temperature: f32,
    ) -> CompletionResult<String>;
}
