use super::commit::{Commit, CommitRecord};
use super::config::Config;
use super::errors::{Result, WatchError};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Where the watcher learns about the head of the branch.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Most recent commit, or `None` when there is nothing usable this cycle.
    async fn latest_commit(&self) -> Result<Option<Commit>>;
}

pub struct GitHubClient {
    http: Client,
    url: String,
    token: String,
    timeout: Duration,
}

impl GitHubClient {
    pub fn new(http: Client, config: &Config) -> Self {
        GitHubClient {
            http,
            url: config.api_url.clone(),
            token: config.token.clone(),
            timeout: config.request_timeout,
        }
    }
}

#[async_trait]
impl CommitSource for GitHubClient {
    async fn latest_commit(&self) -> Result<Option<Commit>> {
        debug!("Fetching latest commit from {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, "application/vnd.github+json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| WatchError::from_request(e, &self.url, self.timeout))?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| WatchError::from_request(e, &self.url, self.timeout))?;
                let commits: Vec<CommitRecord> = serde_json::from_str(&body)?;
                Ok(commits.into_iter().next().map(Commit::from))
            }
            StatusCode::UNAUTHORIZED => {
                error!("Unauthorized fetching commits, check the access token (url: {})", self.url);
                Ok(None)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                error!("Error fetching commits: {}, {}", status.as_u16(), body);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemon::config::FileConfig;
    use crate::daemon::test_server::TestServer;

    fn config(api_url: &str) -> Config {
        let file = FileConfig {
            repo: Some("acme/widgets".into()),
            branch: Some("main".into()),
            token: Some("ghp_secret".into()),
            api_url: Some(api_url.into()),
            request_timeout: Some(1),
            ..FileConfig::default()
        };
        Config::resolve(file, |_| None).unwrap()
    }

    const COMMITS: &str = r#"[
        {"sha": "3f9c2ab7d1e04c5a9b8f6e2d1c0b9a8f7e6d5c4b",
         "commit": {"message": "trigger: Build new image", "committer": {"date": "2024-05-01T12:00:00Z"}}},
        {"sha": "0000000aaaaaaaabbbbbbbbccccccccdddddddd",
         "commit": {"message": "older", "committer": {"date": "2024-04-30T12:00:00Z"}}}
    ]"#;

    #[tokio::test]
    async fn returns_first_commit_and_sends_token() {
        let server = TestServer::bind().await;
        let url = format!("{}/repos/acme/widgets/commits?sha=main", server.url);
        let requests = server.serve(vec![(200, COMMITS.to_string())]);

        let client = GitHubClient::new(Client::new(), &config(&url));
        let commit = client.latest_commit().await.unwrap().unwrap();

        assert_eq!(commit.short_id, "3f9c2ab");
        assert_eq!(commit.message, "trigger: Build new image");
        assert_eq!(commit.date, "2024-05-01T12:00:00Z");

        let requests = requests.await.unwrap();
        assert!(requests[0].starts_with("GET /repos/acme/widgets/commits?sha=main "));
        assert!(requests[0].to_lowercase().contains("authorization: token ghp_secret"));
    }

    #[tokio::test]
    async fn empty_listing_is_none() {
        let server = TestServer::bind().await;
        let url = server.url.clone();
        let _requests = server.serve(vec![(200, "[]".to_string())]);

        let client = GitHubClient::new(Client::new(), &config(&url));
        assert!(client.latest_commit().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unauthorized_is_none() {
        let server = TestServer::bind().await;
        let url = server.url.clone();
        let _requests = server.serve(vec![(401, r#"{"message":"Bad credentials"}"#.to_string())]);

        let client = GitHubClient::new(Client::new(), &config(&url));
        assert!(client.latest_commit().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_none() {
        let server = TestServer::bind().await;
        let url = server.url.clone();
        let _requests = server.serve(vec![(500, "boom".to_string())]);

        let client = GitHubClient::new(Client::new(), &config(&url));
        assert!(client.latest_commit().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_a_json_error() {
        let server = TestServer::bind().await;
        let url = server.url.clone();
        let _requests = server.serve(vec![(200, r#"{"not": "a list"}"#.to_string())]);

        let client = GitHubClient::new(Client::new(), &config(&url));
        let error = client.latest_commit().await.unwrap_err();
        assert!(matches!(error, WatchError::Json(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let server = TestServer::bind().await;
        let url = server.url.clone();
        let _hang = server.hang();

        let client = GitHubClient::new(Client::new(), &config(&url));
        let error = client.latest_commit().await.unwrap_err();
        assert!(matches!(error, WatchError::Timeout { .. }), "{error}");
    }
}
