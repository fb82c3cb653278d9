//! Model access behind an enum-dispatch client, same pattern as the
//! repository layer. Production talks to Anthropic; tests script responses.

pub mod anthropic;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod scripted;

use crate::errors::LlmError;
use types::{MessagesRequest, MessagesResponse};

#[derive(Debug)]
pub enum LlmClient {
    Anthropic(anthropic::AnthropicClient),
    #[cfg(any(test, feature = "mock"))]
    Scripted(scripted::ScriptedClient),
}

impl LlmClient {
    pub async fn create_message(
        &self,
        request: &MessagesRequest<'_>,
    ) -> Result<MessagesResponse, LlmError> {
        match self {
            Self::Anthropic(c) => c.create_message(request).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Scripted(s) => s.create_message(request),
        }
    }
}
