use serde::Deserialize;

/// Body of `POST /api/v1/review`.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    /// Namespaced project path, e.g. "group/repo".
    pub project: String,
    pub source_branch: String,
    pub target_branch: String,
}
