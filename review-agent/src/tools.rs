//! Review tools exposed to the model.
//!
//! Three tools: `get_diff`, `get_file_content`, `submit_review`. Dispatch
//! never fails the conversation: every problem, from a malformed argument to
//! an upstream 502, comes back as an error-flagged tool outcome so the model
//! can react to it.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::llm::types::ToolDefinition;
use crate::session::SessionContext;
use crate::verdict::parse_verdict;

/// Result of one tool invocation as handed back to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub content: String,
    pub is_error: bool,
}

impl ToolOutcome {
    fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Tool table advertised to the model on every turn.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_diff",
            description: "Fetch the code diff between two branches. Call this \
                          first, before any analysis.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project": {"type": "string", "description": "Namespaced project path, e.g. group/repo"},
                    "source_branch": {"type": "string"},
                    "target_branch": {"type": "string"}
                },
                "required": ["project", "source_branch", "target_branch"]
            }),
        },
        ToolDefinition {
            name: "get_file_content",
            description: "Fetch the full content of one file at a branch. Use \
                          it when the diff alone does not give enough context.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project": {"type": "string"},
                    "file_path": {"type": "string", "description": "Repository-relative file path"},
                    "branch": {"type": "string"}
                },
                "required": ["project", "file_path", "branch"]
            }),
        },
        ToolDefinition {
            name: "submit_review",
            description: "Submit the structured review result. Must be called \
                          once the analysis is complete. review_json must be a \
                          single JSON document matching the review schema.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "review_json": {"type": "string", "description": "The review result as a JSON string"}
                },
                "required": ["review_json"]
            }),
        },
    ]
}

#[derive(Deserialize)]
struct GetDiffArgs {
    project: String,
    source_branch: String,
    target_branch: String,
}

#[derive(Deserialize)]
struct GetFileContentArgs {
    project: String,
    file_path: String,
    branch: String,
}

#[derive(Deserialize)]
struct SubmitReviewArgs {
    review_json: String,
}

/// Execute one tool call against the session.
pub async fn dispatch(session: &mut SessionContext, name: &str, input: &Value) -> ToolOutcome {
    match name {
        "get_diff" => get_diff(session, input).await,
        "get_file_content" => get_file_content(session, input).await,
        "submit_review" => submit_review(session, input),
        other => {
            warn!(tool = other, "model requested an unknown tool");
            ToolOutcome::error(format!("unknown tool: {other}"))
        }
    }
}

async fn get_diff(session: &SessionContext, input: &Value) -> ToolOutcome {
    let args: GetDiffArgs = match serde_json::from_value(input.clone()) {
        Ok(a) => a,
        Err(e) => return ToolOutcome::error(format!("invalid get_diff arguments: {e}")),
    };
    let repo = match session.repo() {
        Ok(r) => r,
        Err(_) => return ToolOutcome::error("review session is not open"),
    };

    match repo
        .get_diff(&args.project, &args.source_branch, &args.target_branch)
        .await
    {
        Ok(diff) if diff.trim().is_empty() => {
            ToolOutcome::ok("There are no code differences between the two branches.")
        }
        Ok(diff) => {
            debug!(bytes = diff.len(), "diff fetched for review");
            ToolOutcome::ok(diff)
        }
        Err(e) => {
            warn!(error = %e, "get_diff failed");
            ToolOutcome::error(format!("failed to fetch diff: {e}"))
        }
    }
}

async fn get_file_content(session: &SessionContext, input: &Value) -> ToolOutcome {
    let args: GetFileContentArgs = match serde_json::from_value(input.clone()) {
        Ok(a) => a,
        Err(e) => return ToolOutcome::error(format!("invalid get_file_content arguments: {e}")),
    };
    let repo = match session.repo() {
        Ok(r) => r,
        Err(_) => return ToolOutcome::error("review session is not open"),
    };

    match repo
        .get_file_content(&args.project, &args.file_path, &args.branch)
        .await
    {
        Ok(content) => {
            debug!(file = %args.file_path, branch = %args.branch, "file content fetched");
            ToolOutcome::ok(content)
        }
        Err(e) => {
            warn!(file = %args.file_path, error = %e, "get_file_content failed");
            ToolOutcome::error(format!("failed to fetch file content: {e}"))
        }
    }
}

fn submit_review(session: &mut SessionContext, input: &Value) -> ToolOutcome {
    let args: SubmitReviewArgs = match serde_json::from_value(input.clone()) {
        Ok(a) => a,
        Err(e) => return ToolOutcome::error(format!("invalid submit_review arguments: {e}")),
    };

    let verdict = match parse_verdict(&args.review_json) {
        Ok(v) => v,
        // Validation failures are feedback to the model, not process errors.
        Err(message) => return ToolOutcome::error(message),
    };

    let decision = verdict.decision;
    let issues = verdict.issues.len();
    if session.record_verdict(verdict).is_err() {
        return ToolOutcome::error("review session is not open");
    }
    debug!(decision = decision.as_str(), issues, "review verdict recorded");
    ToolOutcome::ok("Review result submitted successfully.")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repo::RepoClient;
    use crate::repo::mock::MockRepo;
    use crate::verdict::ReviewDecision;

    fn open_session(repo: MockRepo) -> SessionContext {
        let mut session = SessionContext::new();
        session
            .open(
                Arc::new(RepoClient::Mock(repo)),
                "group/repo",
                "feature/x",
                "main",
            )
            .unwrap();
        session
    }

    fn diff_args() -> Value {
        json!({
            "project": "group/repo",
            "source_branch": "feature/x",
            "target_branch": "main"
        })
    }

    #[tokio::test]
    async fn get_diff_returns_diff_text() {
        let repo = MockRepo {
            diff_text: "--- a/x.rs\n+++ b/x.rs\n+fn new()".into(),
            ..MockRepo::new()
        };
        let mut session = open_session(repo);
        let out = dispatch(&mut session, "get_diff", &diff_args()).await;
        assert!(!out.is_error);
        assert!(out.content.contains("+fn new()"));
    }

    #[tokio::test]
    async fn empty_diff_is_a_notice_not_an_error() {
        let mut session = open_session(MockRepo::new());
        let out = dispatch(&mut session, "get_diff", &diff_args()).await;
        assert!(!out.is_error);
        assert!(out.content.contains("no code differences"));
    }

    #[tokio::test]
    async fn upstream_failure_becomes_error_outcome() {
        let repo = MockRepo {
            fail_get_diff: true,
            ..MockRepo::new()
        };
        let mut session = open_session(repo);
        let out = dispatch(&mut session, "get_diff", &diff_args()).await;
        assert!(out.is_error);
        assert!(out.content.contains("failed to fetch diff"));
    }

    #[tokio::test]
    async fn tools_report_closed_session() {
        let mut session = SessionContext::new();
        let out = dispatch(&mut session, "get_diff", &diff_args()).await;
        assert!(out.is_error);
        assert!(out.content.contains("not open"));
    }

    #[tokio::test]
    async fn get_file_content_round_trips_and_misses() {
        let mut repo = MockRepo::new();
        repo.files.insert(
            ("src/lib.rs".into(), "feature/x".into()),
            "pub fn f() {}".into(),
        );
        let mut session = open_session(repo);

        let hit = dispatch(
            &mut session,
            "get_file_content",
            &json!({"project": "group/repo", "file_path": "src/lib.rs", "branch": "feature/x"}),
        )
        .await;
        assert!(!hit.is_error);
        assert_eq!(hit.content, "pub fn f() {}");

        let miss = dispatch(
            &mut session,
            "get_file_content",
            &json!({"project": "group/repo", "file_path": "src/gone.rs", "branch": "feature/x"}),
        )
        .await;
        assert!(miss.is_error);
    }

    #[tokio::test]
    async fn submit_review_records_verdict() {
        let mut session = open_session(MockRepo::new());
        let review = json!({
            "mrDescription": "Refactors the session layer.",
            "issues": [],
            "reviewDecision": "approve"
        })
        .to_string();
        let out = dispatch(
            &mut session,
            "submit_review",
            &json!({"review_json": review}),
        )
        .await;
        assert!(!out.is_error);
        assert!(out.content.contains("submitted successfully"));
        assert_eq!(
            session.current_verdict().unwrap().decision,
            ReviewDecision::Approve
        );
    }

    #[tokio::test]
    async fn invalid_submission_is_feedback_and_records_nothing() {
        let mut session = open_session(MockRepo::new());
        let out = dispatch(
            &mut session,
            "submit_review",
            &json!({"review_json": "{broken"}),
        )
        .await;
        assert!(out.is_error);
        assert!(out.content.contains("invalid JSON"));
        assert!(session.current_verdict().is_none());

        // A corrected resubmission then succeeds.
        let review = json!({
            "mrDescription": "Fixes a null check.",
            "issues": [],
            "reviewDecision": "approve"
        })
        .to_string();
        let out = dispatch(
            &mut session,
            "submit_review",
            &json!({"review_json": review}),
        )
        .await;
        assert!(!out.is_error);
        assert!(session.current_verdict().is_some());
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_outcome() {
        let mut session = open_session(MockRepo::new());
        let out = dispatch(&mut session, "approve_mr", &json!({})).await;
        assert!(out.is_error);
        assert!(out.content.contains("unknown tool"));
    }
}
