//! Structured review verdict submitted by the agent.
//!
//! The model submits one JSON document through the `submit_review` tool.
//! Deserialization enforces the closed enumerations; [`Verdict::validate`]
//! enforces the non-empty-field constraints and produces messages the model
//! can act on when resubmitting.

use serde::{Deserialize, Serialize};

/// How serious a finding is. Drives whether a comment is posted:
/// medium/high/critical are commented, low is summarized only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether this severity warrants an individual merge-request comment.
    pub fn warrants_comment(self) -> bool {
        !matches!(self, Severity::Low)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Kind of finding. Informational; included in the comment body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Bug,
    Security,
    Performance,
    Stability,
    Maintainability,
    Style,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Bug => "bug",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Stability => "stability",
            Category::Maintainability => "maintainability",
            Category::Style => "style",
        }
    }
}

/// Overall review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewDecision {
    Approve,
    ApproveWithComments,
    RequestChanges,
}

impl ReviewDecision {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewDecision::Approve => "approve",
            ReviewDecision::ApproveWithComments => "approve-with-comments",
            ReviewDecision::RequestChanges => "request-changes",
        }
    }
}

/// A single finding inside a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: Category,
    /// Repository-relative path of the affected file.
    pub file: String,
    /// New-file line number; absent means a file-level comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
    pub description: String,
    pub suggestion: String,
    /// Diff excerpt backing the finding, when the model provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
}

/// Validated structured result of one review.
///
/// Constructed exactly once per successful `submit_review` call, immutable
/// thereafter. Issue order reflects model output order, not significance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Free-text synopsis written as the merge-request description.
    #[serde(rename = "mrDescription")]
    pub description: String,
    pub issues: Vec<Issue>,
    #[serde(rename = "reviewDecision")]
    pub decision: ReviewDecision,
}

impl Verdict {
    /// Check the non-empty-field constraints that serde cannot express.
    ///
    /// Returns the first violated constraint as a message addressed to the
    /// model, so it can correct the payload and resubmit.
    pub fn validate(&self) -> Result<(), String> {
        for (idx, issue) in self.issues.iter().enumerate() {
            if issue.file.trim().is_empty() {
                return Err(format!("issues[{idx}].file must be a non-empty path"));
            }
            if issue.description.trim().is_empty() {
                return Err(format!("issues[{idx}].description must be non-empty"));
            }
            if issue.suggestion.trim().is_empty() {
                return Err(format!("issues[{idx}].suggestion must be non-empty"));
            }
        }
        Ok(())
    }
}

/// Parse and validate a `submit_review` payload.
///
/// Three gates, each with its own message so the model knows what to fix:
/// 1. the payload must be valid JSON,
/// 2. it must match the verdict schema (closed enums, required fields),
/// 3. every issue must satisfy the non-empty-field constraints.
pub fn parse_verdict(payload: &str) -> Result<Verdict, String> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| format!("invalid JSON: {e}. Fix the syntax and resubmit."))?;

    let verdict: Verdict = serde_json::from_value(value).map_err(|e| {
        format!("payload does not match the review schema: {e}. Fix the field and resubmit.")
    })?;

    verdict.validate().map_err(|constraint| {
        format!("review validation failed: {constraint}. Fix the field and resubmit.")
    })?;

    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> String {
        serde_json::json!({
            "mrDescription": "Adds input validation to the upload endpoint.",
            "issues": [{
                "severity": "high",
                "category": "security",
                "file": "app/x.py",
                "line": 42,
                "description": "User input reaches the shell unescaped.",
                "suggestion": "Use subprocess with an argument list.",
                "evidence": "+ os.system(cmd)"
            }],
            "reviewDecision": "request-changes"
        })
        .to_string()
    }

    #[test]
    fn parses_valid_payload() {
        let v = parse_verdict(&valid_payload()).unwrap();
        assert_eq!(v.decision, ReviewDecision::RequestChanges);
        assert_eq!(v.issues.len(), 1);
        assert_eq!(v.issues[0].severity, Severity::High);
        assert_eq!(v.issues[0].line, Some(42));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_verdict("{not json").unwrap_err();
        assert!(err.contains("invalid JSON"), "got: {err}");
    }

    #[test]
    fn rejects_unknown_severity() {
        let payload = valid_payload().replace("\"high\"", "\"urgent\"");
        let err = parse_verdict(&payload).unwrap_err();
        assert!(err.contains("does not match the review schema"), "got: {err}");
        assert!(err.contains("urgent"), "got: {err}");
    }

    #[test]
    fn rejects_unknown_decision() {
        let payload = valid_payload().replace("request-changes", "merge-now");
        assert!(parse_verdict(&payload).is_err());
    }

    #[test]
    fn rejects_empty_suggestion() {
        let payload =
            valid_payload().replace("Use subprocess with an argument list.", "   ");
        let err = parse_verdict(&payload).unwrap_err();
        assert!(err.contains("issues[0].suggestion"), "got: {err}");
    }

    #[test]
    fn accepts_empty_issue_list_and_missing_optionals() {
        let payload = serde_json::json!({
            "mrDescription": "No changes of note.",
            "issues": [],
            "reviewDecision": "approve"
        })
        .to_string();
        let v = parse_verdict(&payload).unwrap();
        assert_eq!(v.decision, ReviewDecision::Approve);
        assert!(v.issues.is_empty());
    }

    #[test]
    fn line_is_optional() {
        let payload = valid_payload().replace("\"line\":42,", "");
        let v = parse_verdict(&payload).unwrap();
        assert_eq!(v.issues[0].line, None);
    }
}
