use super::config::Config;
use super::errors::{Result, WatchError};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Bound on the webhook call.
pub const TRIGGER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait BuildTrigger: Send + Sync {
    /// Delivers one build request. Any HTTP answer counts as delivered.
    async fn fire(&self) -> Result<TriggerResponse>;
}

pub struct WebhookTrigger {
    http: Client,
    url: String,
    timeout: Duration,
}

impl WebhookTrigger {
    pub fn new(http: Client, config: &Config) -> Self {
        WebhookTrigger {
            http,
            url: config.trigger_url.clone(),
            timeout: TRIGGER_TIMEOUT,
        }
    }
}

#[async_trait]
impl BuildTrigger for WebhookTrigger {
    async fn fire(&self) -> Result<TriggerResponse> {
        info!("Connecting to trigger URL {}", self.url);

        let response = self
            .http
            .post(&self.url)
            .json(&json!({ "message": "KickIT" }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WatchError::from_request(e, &self.url, self.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| WatchError::from_request(e, &self.url, self.timeout))?;
        Ok(TriggerResponse { status, body })
    }
}
