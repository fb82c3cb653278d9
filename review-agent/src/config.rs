//! Environment-driven configuration for the agent, GitLab, and Anthropic.

/// Agent conversation knobs.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Anthropic model id, e.g. "claude-sonnet-4-20250514".
    pub model: String,
    /// Hard output ceiling per model call.
    pub max_tokens: u32,
    /// Turn budget: the conversation is terminated after this many model
    /// calls, with or without a verdict.
    pub max_turns: usize,
}

impl AgentConfig {
    /// Load agent settings from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            model: std::env::var("AGENT_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".into()),
            max_tokens: std::env::var("AGENT_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4096),
            max_turns: std::env::var("AGENT_MAX_TURNS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }
}

/// GitLab connection settings.
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    /// API base, e.g. "https://gitlab.com/api/v4".
    pub base_api: String,
    /// Access token sent as "PRIVATE-TOKEN".
    pub token: String,
}

impl GitLabConfig {
    /// Load GitLab settings from environment variables.
    ///
    /// `GITLAB_TOKEN` is required; the API base defaults to gitlab.com.
    pub fn from_env() -> Self {
        Self {
            base_api: std::env::var("GITLAB_API_BASE")
                .unwrap_or_else(|_| "https://gitlab.com/api/v4".into()),
            token: std::env::var("GITLAB_TOKEN").expect("GITLAB_TOKEN is required"),
        }
    }
}

/// Anthropic API connection settings.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API base, e.g. "https://api.anthropic.com".
    pub base_api: String,
    /// API key sent as "x-api-key".
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl AnthropicConfig {
    /// Load Anthropic settings from environment variables.
    ///
    /// `CLAUDE_API_KEY` is required; the API base defaults to the public
    /// endpoint and may be pointed at a proxy via `CLAUDE_BASE_URL`.
    pub fn from_env() -> Self {
        Self {
            base_api: std::env::var("CLAUDE_BASE_URL")
                .unwrap_or_else(|_| "https://api.anthropic.com".into()),
            api_key: std::env::var("CLAUDE_API_KEY").expect("CLAUDE_API_KEY is required"),
            timeout_secs: std::env::var("CLAUDE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(300),
        }
    }
}
