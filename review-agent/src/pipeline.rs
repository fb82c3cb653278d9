//! End-to-end review pipeline: run the agent, then publish the verdict to
//! the merge request.
//!
//! Publishing is best-effort per issue. The verdict is already final when
//! publishing starts, so a comment that fails to post degrades the output
//! instead of failing the review. Only the agent run itself and the
//! description update are fatal.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::agent::CodeReviewAgent;
use crate::errors::{Error, RepoError, ReviewResult};
use crate::repo::{MergeRequestHandle, RepoClient};
use crate::verdict::{Issue, Verdict};

pub struct ReviewService {
    agent: Arc<CodeReviewAgent>,
    repo: Arc<RepoClient>,
}

/// Final result of one pipeline run, as reported to callers.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewSummary {
    pub success: bool,
    pub message: String,
    pub review_result: Verdict,
    pub mr_url: String,
}

impl ReviewService {
    pub fn new(agent: Arc<CodeReviewAgent>, repo: Arc<RepoClient>) -> Self {
        Self { agent, repo }
    }

    /// Run the whole pipeline: agent review, find-or-create the merge
    /// request, overwrite its description, post per-issue comments.
    pub async fn execute_review(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> ReviewResult<ReviewSummary> {
        let verdict = self
            .agent
            .review(self.repo.clone(), project, source_branch, target_branch)
            .await?;

        let mr = self
            .repo
            .find_or_create_merge_request(project, source_branch, target_branch, None)
            .await
            .map_err(Error::Repo)?;
        debug!(project, iid = mr.iid, url = %mr.web_url, "merge request resolved");

        self.repo
            .update_description(project, mr.iid, &verdict.description)
            .await
            .map_err(Error::Repo)?;

        let posted = self.post_issue_comments(project, &mr, &verdict).await;

        info!(
            project,
            iid = mr.iid,
            decision = verdict.decision.as_str(),
            issues = verdict.issues.len(),
            comments = posted,
            "review published"
        );

        Ok(ReviewSummary {
            success: true,
            message: format!(
                "Review completed: {} ({} issues found)",
                verdict.decision.as_str(),
                verdict.issues.len()
            ),
            mr_url: mr.web_url.clone(),
            review_result: verdict,
        })
    }

    /// Post one comment per medium/high/critical issue. Line-anchored when a
    /// line is given, with fallback to a general note when the anchor is
    /// rejected. Failures are logged and do not stop the remaining issues.
    async fn post_issue_comments(
        &self,
        project: &str,
        mr: &MergeRequestHandle,
        verdict: &Verdict,
    ) -> usize {
        let mut posted = 0;
        for issue in &verdict.issues {
            if !issue.severity.warrants_comment() {
                continue;
            }
            let body = format_issue_comment(issue);
            let result = match issue.line {
                Some(line) => {
                    match self
                        .repo
                        .add_line_comment(project, mr.iid, &issue.file, line, &body)
                        .await
                    {
                        Ok(()) => Ok(()),
                        Err(e) => {
                            warn!(
                                file = %issue.file,
                                line,
                                error = %e,
                                "line comment rejected, falling back to general note"
                            );
                            self.repo
                                .add_general_comment(project, mr.iid, Some(&issue.file), &body)
                                .await
                        }
                    }
                }
                None => {
                    self.repo
                        .add_general_comment(project, mr.iid, Some(&issue.file), &body)
                        .await
                }
            };

            match result {
                Ok(()) => posted += 1,
                Err(e) => {
                    warn!(file = %issue.file, error = %e, "failed to post issue comment");
                }
            }
        }
        posted
    }
}

/// Markdown body of one issue comment.
pub fn format_issue_comment(issue: &Issue) -> String {
    let mut body = format!(
        "**[{}] {}**\n\n{}\n\n**Suggestion**: {}",
        issue.severity.as_str().to_uppercase(),
        issue.category.as_str(),
        issue.description,
        issue.suggestion,
    );
    if let Some(evidence) = &issue.evidence {
        body.push_str("\n\n```\n");
        body.push_str(evidence);
        body.push_str("\n```");
    }
    body
}

/// Pre-flight check used by the request handlers: the project must exist and
/// both branches must be present before a review is started.
pub async fn validate_review_target(
    repo: &RepoClient,
    project: &str,
    source_branch: &str,
    target_branch: &str,
) -> ReviewResult<()> {
    match repo.get_project(project).await {
        Ok(_) => {}
        Err(RepoError::NotFound) => {
            return Err(Error::Validation(format!(
                "Project not found or inaccessible: {project}"
            )));
        }
        Err(e) => return Err(Error::Repo(e)),
    }

    for branch in [source_branch, target_branch] {
        if !repo.branch_exists(project, branch).await.map_err(Error::Repo)? {
            return Err(Error::Validation(format!(
                "Branch not found in {project}: {branch}"
            )));
        }
    }
    Ok(())
}
