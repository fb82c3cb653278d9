//! Prompt assembly for the review agent.
//!
//! Pure functions over compiled-in templates: same inputs, same prompt.
//! The templates live next to the crate in `prompts/` and are embedded at
//! build time so deployment carries no loose files.

const REVIEW_TEMPLATE: &str = include_str!("../prompts/code_review.md");
const RESULT_SCHEMA: &str = include_str!("../prompts/code_review_schema.md");

const TOOL_USAGE_GUIDE: &str = "\
## Tool usage

You gather information and deliver the review exclusively through tools.

### Review flow

1. Call `get_diff` first to fetch the code changes between the branches.
2. When a change is unclear from the diff alone, call `get_file_content`
   to read the full file for context.
3. When the analysis is done, call `submit_review` with the structured
   result.

### Rules

- Always fetch the diff before analyzing anything.
- The review does not count until `submit_review` succeeds. Plain text
  output is not a review.
- If `submit_review` reports a validation error, fix the payload and call
  it again.";

/// Full system prompt: review instructions with the result schema inlined,
/// followed by the tool usage guide.
pub fn build_system_prompt() -> String {
    let mut prompt = REVIEW_TEMPLATE.replace("{json_schema}", RESULT_SCHEMA);
    prompt.push('\n');
    prompt.push_str(TOOL_USAGE_GUIDE);
    prompt
}

/// Opening user message naming the review target.
pub fn build_user_prompt(project: &str, source_branch: &str, target_branch: &str) -> String {
    format!(
        "Please review the following merge request:\n\
         - Project: {project}\n\
         - Source branch: {source_branch}\n\
         - Target branch: {target_branch}\n\n\
         Start by calling get_diff to fetch the changes, then analyze them \
         and submit the result through submit_review."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_inlines_schema_and_guide() {
        let prompt = build_system_prompt();
        assert!(!prompt.contains("{json_schema}"));
        assert!(prompt.contains("mrDescription"));
        assert!(prompt.contains("reviewDecision"));
        assert!(prompt.contains("submit_review"));
        assert!(prompt.contains("get_diff"));
    }

    #[test]
    fn system_prompt_is_deterministic() {
        assert_eq!(build_system_prompt(), build_system_prompt());
    }

    #[test]
    fn user_prompt_names_the_target() {
        let p = build_user_prompt("group/repo", "feature/login", "main");
        assert!(p.contains("group/repo"));
        assert!(p.contains("feature/login"));
        assert!(p.contains("main"));
    }
}
