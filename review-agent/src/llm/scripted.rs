//! Scripted model double for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::LlmError;
use crate::llm::types::{MessagesRequest, MessagesResponse};

/// Replays a fixed sequence of responses, one per `create_message` call.
/// Running past the end of the script fails the test loudly instead of
/// looping forever.
#[derive(Debug)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<MessagesResponse>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<MessagesResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    pub fn create_message(
        &self,
        _request: &MessagesRequest<'_>,
    ) -> Result<MessagesResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::ScriptExhausted)
    }
}
