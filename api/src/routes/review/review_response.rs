use serde::Serialize;

use review_agent::Verdict;

/// Body of a `POST /api/v1/review` response.
///
/// On failure `review_result` and `mr_url` are absent and `message` carries
/// the reason.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_result: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mr_url: Option<String>,
}

impl ReviewResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            review_result: None,
            mr_url: None,
        }
    }
}
