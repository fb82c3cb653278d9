//! GitLab repository access (REST v4).
//!
//! Endpoints used:
//! - GET  /projects/:id
//! - GET  /projects/:id/repository/branches/:branch
//! - GET  /projects/:id/repository/compare?from=:target&to=:source
//! - GET  /projects/:id/repository/files/:path/raw?ref=:branch
//! - GET  /projects/:id/merge_requests?source_branch&target_branch&state=opened
//! - POST /projects/:id/merge_requests
//! - PUT  /projects/:id/merge_requests/:iid
//! - GET  /projects/:id/merge_requests/:iid/versions   (SHAs for positions)
//! - POST /projects/:id/merge_requests/:iid/discussions (inline)
//! - POST /projects/:id/merge_requests/:iid/notes       (general)

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::GitLabConfig;
use crate::errors::RepoError;
use crate::repo::{MergeRequestHandle, ProjectHandle};

#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // "PRIVATE-TOKEN"
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared reqwest instance and auth token.
    pub fn new(http: Client, cfg: GitLabConfig) -> Self {
        Self {
            http,
            base_api: cfg.base_api.trim_end_matches('/').to_string(),
            token: cfg.token,
        }
    }

    fn project_url(&self, project: &str) -> String {
        format!(
            "{}/projects/{}",
            self.base_api,
            urlencoding::encode(project)
        )
    }

    /// Fetches project identity; 404 maps to `RepoError::NotFound`.
    pub async fn get_project(&self, project: &str) -> Result<ProjectHandle, RepoError> {
        let resp: GitLabProject = self
            .http
            .get(self.project_url(project))
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(ProjectHandle {
            id: resp.id,
            path: resp.path_with_namespace,
            web_url: resp.web_url,
        })
    }

    /// Checks branch existence; a 404 is a negative answer, not an error.
    pub async fn branch_exists(&self, project: &str, branch: &str) -> Result<bool, RepoError> {
        let url = format!(
            "{}/repository/branches/{}",
            self.project_url(project),
            urlencoding::encode(branch)
        );
        let resp = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Ok(false);
        }
        resp.error_for_status()?;
        Ok(true)
    }

    /// Compares target..source and assembles the per-file diffs into one
    /// unified text block. Empty string when the branches are identical.
    pub async fn get_diff(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> Result<String, RepoError> {
        let url = format!("{}/repository/compare", self.project_url(project));
        let resp: GitLabCompare = self
            .http
            .get(url)
            .query(&[("from", target_branch), ("to", source_branch)])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(
            project,
            source_branch,
            target_branch,
            files = resp.diffs.len(),
            "compare fetched"
        );

        Ok(assemble_unified_diff(&resp.diffs))
    }

    /// Fetches the raw file at a branch ref and decodes it as UTF-8 text.
    /// Binary or otherwise undecodable content is an explicit error.
    pub async fn get_file_content(
        &self,
        project: &str,
        file_path: &str,
        branch: &str,
    ) -> Result<String, RepoError> {
        let url = format!(
            "{}/repository/files/{}/raw",
            self.project_url(project),
            urlencoding::encode(file_path)
        );
        let bytes = self
            .http
            .get(url)
            .query(&[("ref", branch)])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        String::from_utf8(bytes.to_vec()).map_err(|_| {
            RepoError::InvalidResponse(format!(
                "file {file_path} at {branch} is not valid UTF-8 text (binary content?)"
            ))
        })
    }

    /// Finds the first open MR for the branch pair or creates a new one.
    ///
    /// When several open MRs match, the first element of the list is used
    /// (deliberate pick-any; GitLab returns most-recently-created first).
    pub async fn find_or_create_merge_request(
        &self,
        project: &str,
        source_branch: &str,
        target_branch: &str,
        title: Option<&str>,
    ) -> Result<MergeRequestHandle, RepoError> {
        let list_url = format!("{}/merge_requests", self.project_url(project));
        let open: Vec<GitLabMr> = self
            .http
            .get(&list_url)
            .query(&[
                ("source_branch", source_branch),
                ("target_branch", target_branch),
                ("state", "opened"),
            ])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(mr) = open.into_iter().next() {
            debug!(project, iid = mr.iid, "reusing open merge request");
            return Ok(MergeRequestHandle {
                iid: mr.iid,
                web_url: mr.web_url,
            });
        }

        #[derive(serde::Serialize)]
        struct CreateReq<'a> {
            source_branch: &'a str,
            target_branch: &'a str,
            title: &'a str,
        }

        let default_title = format!("Merge {source_branch} into {target_branch}");
        let created: GitLabMr = self
            .http
            .post(&list_url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&CreateReq {
                source_branch,
                target_branch,
                title: title.unwrap_or(&default_title),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(project, iid = created.iid, "created merge request");
        Ok(MergeRequestHandle {
            iid: created.iid,
            web_url: created.web_url,
        })
    }

    /// Overwrites the MR description (idempotent; no history kept here).
    pub async fn update_description(
        &self,
        project: &str,
        iid: u64,
        description: &str,
    ) -> Result<(), RepoError> {
        #[derive(serde::Serialize)]
        struct UpdateReq<'a> {
            description: &'a str,
        }

        let url = format!("{}/merge_requests/{}", self.project_url(project), iid);
        self.http
            .put(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&UpdateReq { description })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Posts an inline discussion anchored to a new-file line.
    ///
    /// GitLab "text" positions need the head/base/start SHAs of the latest
    /// diff version, so this performs one extra GET before the POST.
    pub async fn add_line_comment(
        &self,
        project: &str,
        iid: u64,
        file_path: &str,
        line: u64,
        body: &str,
    ) -> Result<(), RepoError> {
        let versions_url = format!(
            "{}/merge_requests/{}/versions",
            self.project_url(project),
            iid
        );
        let versions: Vec<GitLabDiffVersion> = self
            .http
            .get(versions_url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // Versions come newest-first.
        let latest = versions.into_iter().next().ok_or_else(|| {
            RepoError::InvalidResponse("merge request has no diff versions".into())
        })?;

        #[derive(serde::Serialize)]
        struct Position<'a> {
            position_type: &'a str,
            new_path: &'a str,
            new_line: u64,
            head_sha: &'a str,
            base_sha: &'a str,
            start_sha: &'a str,
        }
        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
            position: Position<'a>,
        }

        let url = format!(
            "{}/merge_requests/{}/discussions",
            self.project_url(project),
            iid
        );
        self.http
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&Req {
                body,
                position: Position {
                    position_type: "text",
                    new_path: file_path,
                    new_line: line,
                    head_sha: &latest.head_commit_sha,
                    base_sha: &latest.base_commit_sha,
                    start_sha: &latest.start_commit_sha,
                },
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Posts a plain MR note; with a file path the note is prefixed so a
    /// reader can still tell which file it addresses.
    pub async fn add_general_comment(
        &self,
        project: &str,
        iid: u64,
        file_path: Option<&str>,
        body: &str,
    ) -> Result<(), RepoError> {
        #[derive(serde::Serialize)]
        struct Req<'a> {
            body: &'a str,
        }

        let text = match file_path {
            Some(path) => format!("**{path}**\n\n{body}"),
            None => body.to_string(),
        };

        let url = format!("{}/merge_requests/{}/notes", self.project_url(project), iid);
        self.http
            .post(url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&Req { body: &text })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Stitch per-file compare diffs into one unified text block with the
/// conventional `--- a/` / `+++ b/` headers.
fn assemble_unified_diff(diffs: &[GitLabCompareDiff]) -> String {
    let mut out = Vec::with_capacity(diffs.len() * 3);
    for d in diffs {
        out.push(format!("--- a/{}", d.old_path));
        out.push(format!("+++ b/{}", d.new_path));
        out.push(d.diff.clone().unwrap_or_default());
    }
    out.join("\n")
}

/// --- GitLab response shapes (subset of fields we actually use) ---

#[derive(Debug, Deserialize)]
struct GitLabProject {
    id: u64,
    path_with_namespace: String,
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct GitLabCompare {
    #[serde(default)]
    diffs: Vec<GitLabCompareDiff>,
}

#[derive(Debug, Deserialize)]
struct GitLabCompareDiff {
    old_path: String,
    new_path: String,
    #[serde(default)]
    diff: Option<String>, // None for binary content
}

#[derive(Debug, Deserialize)]
struct GitLabMr {
    iid: u64,
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct GitLabDiffVersion {
    head_commit_sha: String,
    base_commit_sha: String,
    start_commit_sha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_headers_per_file() {
        let diffs = vec![
            GitLabCompareDiff {
                old_path: "src/a.rs".into(),
                new_path: "src/a.rs".into(),
                diff: Some("@@ -1 +1 @@\n-old\n+new".into()),
            },
            GitLabCompareDiff {
                old_path: "src/b.rs".into(),
                new_path: "src/b.rs".into(),
                diff: None,
            },
        ];
        let text = assemble_unified_diff(&diffs);
        assert!(text.contains("--- a/src/a.rs"));
        assert!(text.contains("+++ b/src/a.rs"));
        assert!(text.contains("+new"));
        assert!(text.contains("--- a/src/b.rs"));
    }

    #[test]
    fn empty_compare_yields_empty_text() {
        assert_eq!(assemble_unified_diff(&[]), "");
    }
}
