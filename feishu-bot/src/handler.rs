//! Message handling: turn an incoming chat message into a review run and
//! reply with the outcome.

use std::sync::Arc;

use tracing::{error, info, warn};

use review_agent::{Error, RepoClient, ReviewService, validate_review_target};

use crate::client::FeishuClient;
use crate::command::{HELP_TEXT, parse_review_command, strip_mentions};

/// Everything the bot needs to serve one chat message.
pub struct BotContext {
    pub feishu: Arc<FeishuClient>,
    pub service: Arc<ReviewService>,
    pub repo: Arc<RepoClient>,
}

impl BotContext {
    /// Handle one text message. Replies are best-effort; a failed reply is
    /// logged and the handler moves on.
    pub async fn handle_text_message(self: Arc<Self>, message_id: String, raw_text: String) {
        let text = strip_mentions(&raw_text);
        let Some(cmd) = parse_review_command(&text) else {
            self.reply(&message_id, HELP_TEXT).await;
            return;
        };

        info!(
            project = %cmd.project,
            source = %cmd.source_branch,
            target = %cmd.target_branch,
            "review command received from chat"
        );

        self.reply(
            &message_id,
            &format!(
                "Received, review in progress...\n\
                 Project: {}\n\
                 Source branch: {}\n\
                 Target branch: {}",
                cmd.project, cmd.source_branch, cmd.target_branch
            ),
        )
        .await;

        if let Err(e) =
            validate_review_target(&self.repo, &cmd.project, &cmd.source_branch, &cmd.target_branch)
                .await
        {
            let msg = match e {
                Error::Validation(m) => m,
                other => format!("Code review failed: {other}"),
            };
            self.reply(&message_id, &msg).await;
            return;
        }

        match self
            .service
            .execute_review(&cmd.project, &cmd.source_branch, &cmd.target_branch)
            .await
        {
            Ok(summary) => {
                let reply = format!(
                    "Code review completed\n\
                     Decision: {}\n\
                     MR link: {}",
                    summary.review_result.decision.as_str(),
                    summary.mr_url
                );
                self.reply(&message_id, &reply).await;
            }
            Err(e) => {
                error!(project = %cmd.project, error = %e, "chat-triggered review failed");
                self.reply(&message_id, &format!("Code review failed: {e}"))
                    .await;
            }
        }
    }

    async fn reply(&self, message_id: &str, text: &str) {
        if let Err(e) = self.feishu.reply_text(message_id, text).await {
            warn!(message_id, error = %e, "failed to send chat reply");
        }
    }
}
