//! Chat command parsing.
//!
//! A review command is exactly three non-empty lines: project path, source
//! branch, target branch. Anything else gets the help text.

use regex::Regex;
use std::sync::OnceLock;

pub const HELP_TEXT: &str = "\
Send three lines of text to start a code review:\n\
line 1: GitLab project path (e.g. group/repo)\n\
line 2: source branch\n\
line 3: target branch";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewCommand {
    pub project: String,
    pub source_branch: String,
    pub target_branch: String,
}

/// Drop `@_user_N` mention placeholders Feishu injects into message text.
pub fn strip_mentions(text: &str) -> String {
    static MENTION_RE: OnceLock<Regex> = OnceLock::new();
    let re = MENTION_RE.get_or_init(|| Regex::new(r"@_user_\d+").unwrap());
    re.replace_all(text, "").trim().to_string()
}

/// Parse a review command; `None` when the text is not exactly three
/// non-empty lines.
pub fn parse_review_command(text: &str) -> Option<ReviewCommand> {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() != 3 {
        return None;
    }
    Some(ReviewCommand {
        project: lines[0].to_string(),
        source_branch: lines[1].to_string(),
        target_branch: lines[2].to_string(),
    })
}
