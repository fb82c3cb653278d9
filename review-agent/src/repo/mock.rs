//! In-memory repository double for unit tests.
//!
//! Behavior is configured up front (diff text, file map, failure switches);
//! every mutation is appended to a call log the test can inspect afterwards.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::RepoError;
use crate::repo::{MergeRequestHandle, ProjectHandle};

/// One recorded mutation against the mock repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoCall {
    CreateMergeRequest {
        source_branch: String,
        target_branch: String,
        title: String,
    },
    UpdateDescription {
        iid: u64,
        description: String,
    },
    LineComment {
        iid: u64,
        file_path: String,
        line: u64,
        body: String,
    },
    GeneralComment {
        iid: u64,
        file_path: Option<String>,
        body: String,
    },
}

#[derive(Debug, Default)]
pub struct MockRepo {
    /// Projects known to the mock; lookups elsewhere return `NotFound`.
    pub projects: Vec<String>,
    pub branches: Vec<String>,
    /// Diff returned by `get_diff`; empty string means "no differences".
    pub diff_text: String,
    /// (file_path, branch) -> content.
    pub files: HashMap<(String, String), String>,
    /// Pre-existing open merge requests, first one wins.
    pub open_mrs: Vec<MergeRequestHandle>,
    pub fail_get_diff: bool,
    pub fail_line_comments: bool,
    pub fail_update_description: bool,
    pub calls: Mutex<Vec<RepoCall>>,
    pub next_iid: Mutex<u64>,
}

impl MockRepo {
    pub fn new() -> Self {
        Self {
            next_iid: Mutex::new(1),
            ..Default::default()
        }
    }

    /// Snapshot of all mutations recorded so far, in call order.
    pub fn calls(&self) -> Vec<RepoCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: RepoCall) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn get_project(&self, project: &str) -> Result<ProjectHandle, RepoError> {
        if !self.projects.iter().any(|p| p == project) {
            return Err(RepoError::NotFound);
        }
        Ok(ProjectHandle {
            id: 1,
            path: project.to_string(),
            web_url: format!("https://gitlab.example.com/{project}"),
        })
    }

    pub fn branch_exists(&self, _project: &str, branch: &str) -> Result<bool, RepoError> {
        Ok(self.branches.iter().any(|b| b == branch))
    }

    pub fn get_diff(
        &self,
        _project: &str,
        _source_branch: &str,
        _target_branch: &str,
    ) -> Result<String, RepoError> {
        if self.fail_get_diff {
            return Err(RepoError::Server(502));
        }
        Ok(self.diff_text.clone())
    }

    pub fn get_file_content(
        &self,
        _project: &str,
        file_path: &str,
        branch: &str,
    ) -> Result<String, RepoError> {
        self.files
            .get(&(file_path.to_string(), branch.to_string()))
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    pub fn find_or_create_merge_request(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
        title: Option<&str>,
    ) -> Result<MergeRequestHandle, RepoError> {
        if let Some(mr) = self.open_mrs.first() {
            return Ok(mr.clone());
        }
        let mut next = self.next_iid.lock().unwrap();
        let iid = *next;
        *next += 1;
        let default_title = format!("Merge {source_branch} into {target_branch}");
        self.record(RepoCall::CreateMergeRequest {
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
            title: title.unwrap_or(&default_title).to_string(),
        });
        Ok(MergeRequestHandle {
            iid,
            web_url: format!("https://gitlab.example.com/{project}/-/merge_requests/{iid}"),
        })
    }

    pub fn update_description(
        &self,
        _project: &str,
        iid: u64,
        description: &str,
    ) -> Result<(), RepoError> {
        if self.fail_update_description {
            return Err(RepoError::Server(500));
        }
        self.record(RepoCall::UpdateDescription {
            iid,
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn add_line_comment(
        &self,
        _project: &str,
        iid: u64,
        file_path: &str,
        line: u64,
        body: &str,
    ) -> Result<(), RepoError> {
        if self.fail_line_comments {
            return Err(RepoError::InvalidResponse(
                "position could not be resolved".into(),
            ));
        }
        self.record(RepoCall::LineComment {
            iid,
            file_path: file_path.to_string(),
            line,
            body: body.to_string(),
        });
        Ok(())
    }

    pub fn add_general_comment(
        &self,
        _project: &str,
        iid: u64,
        file_path: Option<&str>,
        body: &str,
    ) -> Result<(), RepoError> {
        self.record(RepoCall::GeneralComment {
            iid,
            file_path: file_path.map(|s| s.to_string()),
            body: body.to_string(),
        });
        Ok(())
    }
}
