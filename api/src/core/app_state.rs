//! Shared state for all HTTP handlers.

use std::sync::Arc;

use tracing::{info, warn};

use feishu_bot::{BotContext, FeishuClient};
use review_agent::llm::LlmClient;
use review_agent::llm::anthropic::AnthropicClient;
use review_agent::repo::gitlab::GitLabClient;
use review_agent::{
    AgentConfig, AnthropicConfig, CodeReviewAgent, GitLabConfig, RepoClient, ReviewService,
};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<RepoClient>,
    pub service: Arc<ReviewService>,
    /// Present only when the Feishu bot is configured and enabled.
    pub bot: Option<Arc<BotContext>>,
}

impl AppState {
    /// Load shared state from environment variables.
    pub fn from_env() -> Self {
        let http = reqwest::Client::new();

        let repo = Arc::new(RepoClient::GitLab(GitLabClient::new(
            http.clone(),
            GitLabConfig::from_env(),
        )));
        let agent = Arc::new(CodeReviewAgent::new(
            LlmClient::Anthropic(AnthropicClient::new(
                http.clone(),
                AnthropicConfig::from_env(),
            )),
            AgentConfig::from_env(),
        ));
        let service = Arc::new(ReviewService::new(agent, repo.clone()));

        let bot = Self::bot_from_env(http, service.clone(), repo.clone());

        Self { repo, service, bot }
    }

    fn bot_from_env(
        http: reqwest::Client,
        service: Arc<ReviewService>,
        repo: Arc<RepoClient>,
    ) -> Option<Arc<BotContext>> {
        let enabled = std::env::var("FEISHU_ENABLED")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);
        if !enabled {
            info!("feishu bot disabled");
            return None;
        }

        let app_id = std::env::var("FEISHU_APP_ID").unwrap_or_default();
        let app_secret = std::env::var("FEISHU_APP_SECRET").unwrap_or_default();
        if app_id.is_empty() || app_secret.is_empty() {
            warn!("FEISHU_APP_ID or FEISHU_APP_SECRET not configured, bot not started");
            return None;
        }

        info!("feishu bot enabled");
        Some(Arc::new(BotContext {
            feishu: Arc::new(FeishuClient::new(http, app_id, app_secret)),
            service,
            repo,
        }))
    }
}
