//! Feishu (Lark) chat bot for triggering code reviews.
//!
//! A user sends a three-line message (project, source branch, target
//! branch). The bot acknowledges, validates the target, runs the review
//! pipeline, and replies with the decision and merge request link.

pub mod client;
pub mod command;
pub mod handler;

use thiserror::Error;

pub use client::FeishuClient;
pub use command::{HELP_TEXT, ReviewCommand, parse_review_command, strip_mentions};
pub use handler::BotContext;

#[derive(Debug, Error)]
pub enum FeishuError {
    /// Feishu returned a non-zero business code.
    #[error("feishu api error {code}: {msg}")]
    Api { code: i64, msg: String },

    /// Transport or HTTP-level failure.
    #[error("feishu transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
