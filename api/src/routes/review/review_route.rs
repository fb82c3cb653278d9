use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use tracing::{error, info, instrument};

use review_agent::{Error, validate_review_target};

use crate::core::app_state::AppState;
use crate::routes::review::{review_request::ReviewRequest, review_response::ReviewResponse};

/// HTTP endpoint for running a code review.
///
/// Validates that the project and both branches exist, then runs the agent
/// review and publishes the result to the merge request. The call is
/// synchronous; the response carries the verdict and the MR link.
#[instrument(
    name = "review_route",
    skip(state, body),
    fields(project = %body.project)
)]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReviewRequest>,
) -> (StatusCode, Json<ReviewResponse>) {
    if let Err(e) = validate_review_target(
        &state.repo,
        &body.project,
        &body.source_branch,
        &body.target_branch,
    )
    .await
    {
        let (status, message) = match e {
            Error::Validation(m) => (StatusCode::BAD_REQUEST, m),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("validation check failed: {other}"),
            ),
        };
        return (status, Json(ReviewResponse::failure(message)));
    }

    info!(
        source = %body.source_branch,
        target = %body.target_branch,
        "review requested over http"
    );

    match state
        .service
        .execute_review(&body.project, &body.source_branch, &body.target_branch)
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(ReviewResponse {
                success: summary.success,
                message: summary.message,
                review_result: Some(summary.review_result),
                mr_url: Some(summary.mr_url),
            }),
        ),
        Err(e) => {
            error!(error = %e, "review failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ReviewResponse::failure(format!("Code review failed: {e}"))),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use review_agent::llm::scripted::ScriptedClient;
    use review_agent::llm::types::{ContentBlock, MessagesResponse, Usage};
    use review_agent::llm::LlmClient;
    use review_agent::repo::mock::MockRepo;
    use review_agent::{AgentConfig, CodeReviewAgent, RepoClient, ReviewService};

    fn approve_script() -> LlmClient {
        let review = json!({
            "mrDescription": "Adds request validation.",
            "issues": [],
            "reviewDecision": "approve"
        })
        .to_string();
        LlmClient::Scripted(ScriptedClient::new(vec![
            MessagesResponse {
                content: vec![ContentBlock::ToolUse {
                    id: "t1".into(),
                    name: "submit_review".into(),
                    input: json!({ "review_json": review }),
                }],
                stop_reason: Some("tool_use".into()),
                usage: Usage::default(),
            },
            MessagesResponse {
                content: vec![ContentBlock::text("Done.")],
                stop_reason: Some("end_turn".into()),
                usage: Usage::default(),
            },
        ]))
    }

    fn state(repo: MockRepo, llm: LlmClient) -> Arc<AppState> {
        let repo = Arc::new(RepoClient::Mock(repo));
        let agent = Arc::new(CodeReviewAgent::new(
            llm,
            AgentConfig {
                model: "test-model".into(),
                max_tokens: 1024,
                max_turns: 10,
            },
        ));
        Arc::new(AppState {
            service: Arc::new(ReviewService::new(agent, repo.clone())),
            repo,
            bot: None,
        })
    }

    fn request() -> ReviewRequest {
        ReviewRequest {
            project: "group/repo".into(),
            source_branch: "feature/x".into(),
            target_branch: "main".into(),
        }
    }

    #[tokio::test]
    async fn returns_verdict_and_mr_url() {
        let repo = MockRepo {
            projects: vec!["group/repo".into()],
            branches: vec!["feature/x".into(), "main".into()],
            ..MockRepo::new()
        };
        let (status, Json(resp)) =
            create_review(State(state(repo, approve_script())), Json(request())).await;

        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert!(resp.mr_url.unwrap().contains("/merge_requests/"));
        assert_eq!(
            resp.review_result.unwrap().decision,
            review_agent::ReviewDecision::Approve
        );
    }

    #[tokio::test]
    async fn unknown_project_is_bad_request() {
        let (status, Json(resp)) =
            create_review(State(state(MockRepo::new(), approve_script())), Json(request())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!resp.success);
        assert!(resp.message.contains("Project not found"));
        assert!(resp.review_result.is_none());
    }

    #[tokio::test]
    async fn missing_branch_is_bad_request() {
        let repo = MockRepo {
            projects: vec!["group/repo".into()],
            branches: vec!["main".into()],
            ..MockRepo::new()
        };
        let (status, Json(resp)) =
            create_review(State(state(repo, approve_script())), Json(request())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp.message.contains("feature/x"));
    }

    #[tokio::test]
    async fn agent_failure_is_internal_error() {
        let repo = MockRepo {
            projects: vec!["group/repo".into()],
            branches: vec!["feature/x".into(), "main".into()],
            ..MockRepo::new()
        };
        // Model ends the turn without submitting a verdict.
        let llm = LlmClient::Scripted(ScriptedClient::new(vec![MessagesResponse {
            content: vec![ContentBlock::text("Looks good.")],
            stop_reason: Some("end_turn".into()),
            usage: Usage::default(),
        }]));

        let (status, Json(resp)) = create_review(State(state(repo, llm)), Json(request())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.message.contains("Code review failed"));
    }
}
