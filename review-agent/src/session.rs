//! Per-review session state shared between the orchestrator and its tools.
//!
//! One `SessionContext` is created for each review invocation and threaded
//! explicitly into tool dispatch. Nothing here is process-global: two
//! concurrent reviews (HTTP trigger and chat trigger) each own their own
//! context and cannot overwrite each other's in-flight state.

use std::sync::Arc;

use crate::errors::{Error, ReviewResult};
use crate::repo::RepoClient;
use crate::verdict::Verdict;

/// Mutable state of one in-flight review.
#[derive(Debug)]
pub struct SessionContext {
    state: Option<SessionState>,
}

#[derive(Debug)]
struct SessionState {
    repo: Arc<RepoClient>,
    project: String,
    source_branch: String,
    target_branch: String,
    verdict: Option<Verdict>,
}

impl SessionContext {
    /// A closed context; tools invoked against it report "not open".
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Bind the context to a review target.
    ///
    /// Fails with [`Error::ContextAlreadyOpen`] if a session is still active;
    /// silently overwriting in-flight state is exactly the hazard this type
    /// exists to rule out.
    pub fn open(
        &mut self,
        repo: Arc<RepoClient>,
        project: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> ReviewResult<()> {
        if self.state.is_some() {
            return Err(Error::ContextAlreadyOpen);
        }
        self.state = Some(SessionState {
            repo,
            project: project.to_string(),
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
            verdict: None,
        });
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    /// Repository handle for tool bodies; `ContextNotOpen` when closed.
    pub fn repo(&self) -> ReviewResult<&Arc<RepoClient>> {
        self.state
            .as_ref()
            .map(|s| &s.repo)
            .ok_or(Error::ContextNotOpen)
    }

    /// Review target identity as (project, source, target).
    pub fn target(&self) -> ReviewResult<(&str, &str, &str)> {
        self.state
            .as_ref()
            .map(|s| {
                (
                    s.project.as_str(),
                    s.source_branch.as_str(),
                    s.target_branch.as_str(),
                )
            })
            .ok_or(Error::ContextNotOpen)
    }

    /// Store a verdict. The model may resubmit after a validation failure,
    /// so overwriting is allowed: last write wins.
    pub fn record_verdict(&mut self, verdict: Verdict) -> ReviewResult<()> {
        let state = self.state.as_mut().ok_or(Error::ContextNotOpen)?;
        state.verdict = Some(verdict);
        Ok(())
    }

    /// Non-destructive read of the current verdict, if any.
    pub fn current_verdict(&self) -> Option<&Verdict> {
        self.state.as_ref().and_then(|s| s.verdict.as_ref())
    }

    /// Clear all session state. Called unconditionally when the orchestrator
    /// leaves its turn loop, on every exit path, so nothing leaks into the
    /// next review.
    pub fn close(&mut self) {
        self.state = None;
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::mock::MockRepo;
    use crate::verdict::{ReviewDecision, Verdict};

    fn repo() -> Arc<RepoClient> {
        Arc::new(RepoClient::Mock(MockRepo::new()))
    }

    fn verdict(description: &str) -> Verdict {
        Verdict {
            description: description.to_string(),
            issues: Vec::new(),
            decision: ReviewDecision::Approve,
        }
    }

    #[test]
    fn open_twice_is_an_error() {
        let mut ctx = SessionContext::new();
        ctx.open(repo(), "group/repo", "feature/x", "main").unwrap();
        let err = ctx.open(repo(), "group/other", "a", "b").unwrap_err();
        assert!(matches!(err, Error::ContextAlreadyOpen));
        // The first session's identity is untouched.
        assert_eq!(ctx.target().unwrap().0, "group/repo");
    }

    #[test]
    fn verdict_is_last_write_wins() {
        let mut ctx = SessionContext::new();
        ctx.open(repo(), "group/repo", "feature/x", "main").unwrap();
        ctx.record_verdict(verdict("first")).unwrap();
        ctx.record_verdict(verdict("second")).unwrap();
        assert_eq!(ctx.current_verdict().unwrap().description, "second");
    }

    #[test]
    fn close_clears_everything_and_allows_reopen() {
        let mut ctx = SessionContext::new();
        ctx.open(repo(), "group/repo", "feature/x", "main").unwrap();
        ctx.record_verdict(verdict("v")).unwrap();
        ctx.close();

        assert!(!ctx.is_open());
        assert!(ctx.current_verdict().is_none());
        assert!(matches!(ctx.repo().unwrap_err(), Error::ContextNotOpen));

        // A fresh review can reuse the value after close.
        ctx.open(repo(), "group/repo", "feature/y", "main").unwrap();
        assert!(ctx.current_verdict().is_none());
    }

    #[test]
    fn accessors_fail_when_closed() {
        let ctx = SessionContext::new();
        assert!(matches!(ctx.target().unwrap_err(), Error::ContextNotOpen));
        assert!(ctx.current_verdict().is_none());
    }
}
