use super::config::Config;
use super::errors::{Result, WatchError};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on tag pages followed through `next` links.
const MAX_PAGES: usize = 10;

#[async_trait]
pub trait ImageRegistry: Send + Sync {
    async fn image_exists(&self, tag: &str) -> Result<bool>;
}

#[derive(Deserialize, Debug)]
struct TagPage {
    #[serde(default)]
    results: Vec<Tag>,
    #[serde(default)]
    next: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Tag {
    #[serde(default)]
    name: String,
}

/// Docker Hub style tag listing: `{"results": [{"name": ..}], "next": ..}`.
pub struct DockerHubRegistry {
    http: Client,
    url: String,
    timeout: Duration,
}

impl DockerHubRegistry {
    pub fn new(http: Client, config: &Config) -> Self {
        DockerHubRegistry {
            http,
            url: config.registry_url.clone(),
            timeout: config.request_timeout,
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<Option<TagPage>> {
        let response = self
            .http
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WatchError::from_request(e, url, self.timeout))?;

        if response.status() != StatusCode::OK {
            debug!("Tag listing {url} answered {}", response.status());
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| WatchError::from_request(e, url, self.timeout))?;
        Ok(Some(serde_json::from_str(&body)?))
    }
}

#[async_trait]
impl ImageRegistry for DockerHubRegistry {
    async fn image_exists(&self, tag: &str) -> Result<bool> {
        let mut url = self.url.clone();

        for _ in 0..MAX_PAGES {
            let Some(page) = self.fetch_page(&url).await? else {
                return Ok(false);
            };
            if page.results.iter().any(|t| t.name == tag) {
                return Ok(true);
            }
            match page.next {
                Some(next) if !next.is_empty() => url = next,
                _ => return Ok(false),
            }
        }

        warn!("Gave up looking for tag {tag} after {MAX_PAGES} pages of {}", self.url);
        Ok(false)
    }
}
