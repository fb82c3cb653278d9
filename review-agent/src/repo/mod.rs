//! Repository-access facade w/o async-trait or dynamic trait objects.
//!
//! We expose an enum `RepoClient` with concrete implementations. This keeps
//! async fns simple and avoids boxing futures. The `Mock` variant exists for
//! tests only (cfg `test` or the `mock` feature).

pub mod gitlab;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

use crate::errors::RepoError;

/// Minimal project identity returned by a lookup.
#[derive(Debug, Clone)]
pub struct ProjectHandle {
    pub id: u64,
    /// Namespaced path, e.g. "group/repo".
    pub path: String,
    pub web_url: String,
}

/// Minimal merge-request identity used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestHandle {
    /// Project-scoped merge request id.
    pub iid: u64,
    pub web_url: String,
}

/// Concrete repository-access client (enum-dispatch).
#[derive(Debug)]
pub enum RepoClient {
    GitLab(gitlab::GitLabClient),
    #[cfg(any(test, feature = "mock"))]
    Mock(mock::MockRepo),
}

impl RepoClient {
    /// Look up a project by namespaced path; `NotFound` if absent or hidden.
    pub async fn get_project(&self, project: &str) -> Result<ProjectHandle, RepoError> {
        match self {
            Self::GitLab(c) => c.get_project(project).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.get_project(project),
        }
    }

    /// Whether the named branch exists in the project.
    pub async fn branch_exists(&self, project: &str, branch: &str) -> Result<bool, RepoError> {
        match self {
            Self::GitLab(c) => c.branch_exists(project, branch).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.branch_exists(project, branch),
        }
    }

    /// Unified-diff-like text between two branches; empty when identical.
    pub async fn get_diff(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<String, RepoError> {
        match self {
            Self::GitLab(c) => c.get_diff(project, source_branch, target_branch).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.get_diff(project, source_branch, target_branch),
        }
    }

    /// Full decoded text of one file at one branch revision.
    pub async fn get_file_content(
        &self,
        project: &str,
        file_path: &str,
        branch: &str,
    ) -> Result<String, RepoError> {
        match self {
            Self::GitLab(c) => c.get_file_content(project, file_path, branch).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.get_file_content(project, file_path, branch),
        }
    }

    /// Find the most recent open merge request for the branch pair, or create
    /// one with the given (or a default) title.
    pub async fn find_or_create_merge_request(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
        title: Option<&str>,
    ) -> Result<MergeRequestHandle, RepoError> {
        match self {
            Self::GitLab(c) => {
                c.find_or_create_merge_request(project, source_branch, target_branch, title)
                    .await
            }
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => {
                m.find_or_create_merge_request(project, source_branch, target_branch, title)
            }
        }
    }

    /// Overwrite the merge request description.
    pub async fn update_description(
        &self,
        project: &str,
        iid: u64,
        description: &str,
    ) -> Result<(), RepoError> {
        match self {
            Self::GitLab(c) => c.update_description(project, iid, description).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.update_description(project, iid, description),
        }
    }

    /// Post a line-anchored comment on the merge request diff.
    pub async fn add_line_comment(
        &self,
        project: &str,
        iid: u64,
        file_path: &str,
        line: u64,
        body: &str,
    ) -> Result<(), RepoError> {
        match self {
            Self::GitLab(c) => c.add_line_comment(project, iid, file_path, line, body).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.add_line_comment(project, iid, file_path, line, body),
        }
    }

    /// Post a plain note on the merge request, optionally addressed to a file.
    pub async fn add_general_comment(
        &self,
        project: &str,
        iid: u64,
        file_path: Option<&str>,
        body: &str,
    ) -> Result<(), RepoError> {
        match self {
            Self::GitLab(c) => c.add_general_comment(project, iid, file_path, body).await,
            #[cfg(any(test, feature = "mock"))]
            Self::Mock(m) => m.add_general_comment(project, iid, file_path, body),
        }
    }
}
