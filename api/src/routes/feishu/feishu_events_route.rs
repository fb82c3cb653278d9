//! Feishu event subscription webhook.
//!
//! Handles the `url_verification` handshake and `im.message.receive_v1`
//! events. Reviews run in a background task so the webhook can acknowledge
//! within Feishu's delivery deadline.

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::core::app_state::AppState;

pub async fn feishu_events(
    State(state): State<Arc<AppState>>,
    Json(event): Json<Value>,
) -> (StatusCode, Json<Value>) {
    // Subscription handshake: echo the challenge back.
    if event["type"] == "url_verification" {
        return (
            StatusCode::OK,
            Json(json!({ "challenge": event["challenge"] })),
        );
    }

    let Some(bot) = state.bot.clone() else {
        warn!("feishu event received but the bot is not configured");
        return (StatusCode::OK, Json(json!({})));
    };

    if event["header"]["event_type"] == "im.message.receive_v1" {
        let message = &event["event"]["message"];
        let message_id = message["message_id"].as_str().unwrap_or_default().to_string();
        let message_type = message["message_type"].as_str().unwrap_or_default();

        if message_id.is_empty() {
            warn!("message event without message_id, ignoring");
            return (StatusCode::OK, Json(json!({})));
        }

        if message_type != "text" {
            debug!(message_type, "non-text message, replying with help");
            tokio::spawn(async move {
                bot.handle_text_message(message_id, String::new()).await;
            });
            return (StatusCode::OK, Json(json!({})));
        }

        // Message content is a JSON string like {"text": "..."}.
        let raw_text = message["content"]
            .as_str()
            .and_then(|c| serde_json::from_str::<Value>(c).ok())
            .and_then(|c| c["text"].as_str().map(str::to_string))
            .unwrap_or_default();

        tokio::spawn(async move {
            bot.handle_text_message(message_id, raw_text).await;
        });
    }

    (StatusCode::OK, Json(json!({})))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use review_agent::llm::LlmClient;
    use review_agent::llm::scripted::ScriptedClient;
    use review_agent::repo::mock::MockRepo;
    use review_agent::{AgentConfig, CodeReviewAgent, RepoClient, ReviewService};

    fn state_without_bot() -> Arc<AppState> {
        let repo = Arc::new(RepoClient::Mock(MockRepo::new()));
        let agent = Arc::new(CodeReviewAgent::new(
            LlmClient::Scripted(ScriptedClient::new(vec![])),
            AgentConfig {
                model: "test-model".into(),
                max_tokens: 1024,
                max_turns: 1,
            },
        ));
        Arc::new(AppState {
            service: Arc::new(ReviewService::new(agent, repo.clone())),
            repo,
            bot: None,
        })
    }

    #[tokio::test]
    async fn echoes_url_verification_challenge() {
        let event = json!({
            "type": "url_verification",
            "challenge": "c4f8...",
            "token": "t"
        });
        let (status, Json(body)) = feishu_events(State(state_without_bot()), Json(event)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["challenge"], "c4f8...");
    }

    #[tokio::test]
    async fn message_event_without_bot_is_acknowledged() {
        let event = json!({
            "header": { "event_type": "im.message.receive_v1" },
            "event": { "message": {
                "message_id": "om_1",
                "message_type": "text",
                "content": "{\"text\":\"group/repo\\nfeature/x\\nmain\"}"
            }}
        });
        let (status, _) = feishu_events(State(state_without_bot()), Json(event)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
