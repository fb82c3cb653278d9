//! Agent-driven merge request review.
//!
//! The crate runs one review as a pipeline of four stages:
//!
//! 1) **Session** — a per-review [`session::SessionContext`] is opened for
//!    the (project, source, target) triple. All tool calls read and write
//!    this session; there is no process-global review state.
//!
//! 2) **Agent loop** — [`agent::CodeReviewAgent`] drives the model through a
//!    bounded multi-turn conversation. Each turn the model either requests
//!    tool calls (`get_diff`, `get_file_content`, `submit_review`) or ends
//!    the conversation. Tool failures are fed back as error-flagged results,
//!    never raised.
//!
//! 3) **Verdict** — `submit_review` parses and validates the structured
//!    result ([`verdict::Verdict`]); invalid payloads become validation
//!    feedback so the model can correct and resubmit.
//!
//! 4) **Publishing** — [`pipeline::ReviewService`] finds or creates the
//!    merge request, overwrites its description with the verdict summary,
//!    and posts one comment per notable issue (line-anchored with a fallback
//!    to a general note).
//!
//! The crate uses `tracing` for debug logging and avoids `async-trait` and
//! heap trait objects (no `Box<dyn ...>`). It relies on plain `async fn` and
//! enum-dispatch over thin repository/LLM clients.

pub mod agent;
pub mod config;
pub mod errors;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod repo;
pub mod session;
pub mod tools;
pub mod verdict;

pub use agent::CodeReviewAgent;
pub use config::{AgentConfig, AnthropicConfig, GitLabConfig};
pub use errors::{Error, LlmError, RepoError, ReviewResult};
pub use pipeline::{ReviewService, ReviewSummary, validate_review_target};
pub use repo::RepoClient;
pub use verdict::{Issue, ReviewDecision, Severity, Verdict};
