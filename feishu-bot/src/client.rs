//! Feishu Open Platform messaging client.
//!
//! Endpoints used:
//! - POST /open-apis/auth/v3/tenant_access_token/internal
//! - POST /open-apis/im/v1/messages/:message_id/reply
//! - POST /open-apis/im/v1/messages?receive_id_type=chat_id

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

use crate::FeishuError;

const FEISHU_BASE: &str = "https://open.feishu.cn";

/// Refresh the token this long before Feishu's reported expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(120);

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct FeishuClient {
    http: Client,
    base_url: String,
    app_id: String,
    app_secret: String,
    token: Mutex<Option<CachedToken>>,
}

impl FeishuClient {
    pub fn new(http: Client, app_id: String, app_secret: String) -> Self {
        Self {
            http,
            base_url: FEISHU_BASE.to_string(),
            app_id,
            app_secret,
            token: Mutex::new(None),
        }
    }

    /// Tenant access token, cached until shortly before expiry.
    async fn tenant_access_token(&self) -> Result<String, FeishuError> {
        let mut guard = self.token.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        #[derive(Deserialize)]
        struct TokenResp {
            code: i64,
            msg: String,
            #[serde(default)]
            tenant_access_token: String,
            #[serde(default)]
            expire: u64,
        }

        let url = format!(
            "{}/open-apis/auth/v3/tenant_access_token/internal",
            self.base_url
        );
        let resp: TokenResp = self
            .http
            .post(url)
            .json(&json!({
                "app_id": self.app_id,
                "app_secret": self.app_secret,
            }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if resp.code != 0 {
            return Err(FeishuError::Api {
                code: resp.code,
                msg: resp.msg,
            });
        }

        debug!(expire_secs = resp.expire, "tenant access token refreshed");
        let expires_at = Instant::now() + Duration::from_secs(resp.expire)
            - TOKEN_REFRESH_MARGIN.min(Duration::from_secs(resp.expire));
        let token = resp.tenant_access_token;
        *guard = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });
        Ok(token)
    }

    /// Reply to a message in its thread.
    pub async fn reply_text(&self, message_id: &str, text: &str) -> Result<(), FeishuError> {
        let token = self.tenant_access_token().await?;
        let url = format!(
            "{}/open-apis/im/v1/messages/{}/reply",
            self.base_url, message_id
        );
        let body = json!({
            "content": json!({"text": text}).to_string(),
            "msg_type": "text",
        });
        self.check(
            self.http
                .post(url)
                .bearer_auth(token)
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    /// Send a new message to a chat.
    pub async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), FeishuError> {
        let token = self.tenant_access_token().await?;
        let url = format!("{}/open-apis/im/v1/messages", self.base_url);
        let body = json!({
            "receive_id": chat_id,
            "msg_type": "text",
            "content": json!({"text": text}).to_string(),
        });
        self.check(
            self.http
                .post(url)
                .query(&[("receive_id_type", "chat_id")])
                .bearer_auth(token)
                .json(&body)
                .send()
                .await?,
        )
        .await
    }

    async fn check(&self, resp: reqwest::Response) -> Result<(), FeishuError> {
        #[derive(Deserialize)]
        struct Envelope {
            code: i64,
            #[serde(default)]
            msg: String,
        }

        let env: Envelope = resp.error_for_status()?.json().await?;
        if env.code != 0 {
            return Err(FeishuError::Api {
                code: env.code,
                msg: env.msg,
            });
        }
        Ok(())
    }
}
