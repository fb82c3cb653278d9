//! Multi-turn review agent.
//!
//! Drives the model through a bounded conversation loop: each turn either
//! requests tool calls (which we execute and feed back) or ends the
//! conversation. The review is complete only if `submit_review` recorded a
//! verdict before the loop exits.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::errors::{Error, ReviewResult};
use crate::llm::LlmClient;
use crate::llm::types::{ContentBlock, Message, MessagesRequest, ToolDefinition};
use crate::prompt;
use crate::repo::RepoClient;
use crate::session::SessionContext;
use crate::tools;
use crate::verdict::Verdict;

pub struct CodeReviewAgent {
    llm: LlmClient,
    cfg: AgentConfig,
}

impl CodeReviewAgent {
    pub fn new(llm: LlmClient, cfg: AgentConfig) -> Self {
        Self { llm, cfg }
    }

    /// Run one full review and return the verdict the agent submitted.
    ///
    /// The session is created here, threaded into every tool call, and
    /// closed on every exit path. [`Error::MissingVerdict`] means the model
    /// ended the conversation (or ran out of turns) without a successful
    /// `submit_review`.
    pub async fn review(
        &self,
        repo: Arc<RepoClient>,
        project: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> ReviewResult<Verdict> {
        let mut session = SessionContext::new();
        session.open(repo, project, source_branch, target_branch)?;

        info!(project, source_branch, target_branch, "starting agent review");

        let outcome = self.run_conversation(&mut session, project, source_branch, target_branch).await;
        let verdict = session.current_verdict().cloned();
        session.close();

        outcome?;
        let verdict = verdict.ok_or(Error::MissingVerdict)?;
        info!(
            decision = verdict.decision.as_str(),
            issues = verdict.issues.len(),
            "agent review finished"
        );
        Ok(verdict)
    }

    async fn run_conversation(
        &self,
        session: &mut SessionContext,
        project: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> ReviewResult<()> {
        let system = prompt::build_system_prompt();
        let tool_table: Vec<ToolDefinition> = tools::tool_definitions();
        let mut messages = vec![Message::user(vec![ContentBlock::text(
            prompt::build_user_prompt(project, source_branch, target_branch),
        )])];

        for turn in 0..self.cfg.max_turns {
            let request = MessagesRequest {
                model: &self.cfg.model,
                max_tokens: self.cfg.max_tokens,
                system: &system,
                messages: &messages,
                tools: &tool_table,
            };
            let response = self.llm.create_message(&request).await?;

            for block in &response.content {
                if let ContentBlock::Text { text } = block {
                    debug!(turn, "agent: {}", truncate(text, 200));
                }
            }

            let wants_tools = response.wants_tools();
            let content = response.content;

            if !wants_tools {
                debug!(turn, "model ended the conversation");
                messages.push(Message::assistant(content));
                return Ok(());
            }

            // Tool calls run sequentially; submit_review mutates the session
            // and later calls in the same turn must see that state.
            let mut results = Vec::new();
            for block in &content {
                if let ContentBlock::ToolUse { id, name, input } = block {
                    debug!(turn, tool = %name, "executing tool call");
                    let outcome = tools::dispatch(session, name, input).await;
                    if outcome.is_error {
                        warn!(turn, tool = %name, "tool returned an error: {}", truncate(&outcome.content, 200));
                    }
                    results.push(ContentBlock::tool_result(id, outcome.content, outcome.is_error));
                }
            }
            // A tool_use stop with no tool calls would produce an empty
            // tool_result message, which the API rejects. Treat it as the
            // model concluding.
            if results.is_empty() {
                debug!(turn, "tool_use stop carried no tool calls, ending conversation");
                messages.push(Message::assistant(content));
                return Ok(());
            }

            messages.push(Message::assistant(content));
            messages.push(Message::user(results));
        }

        warn!(max_turns = self.cfg.max_turns, "turn budget exhausted");
        Ok(())
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
