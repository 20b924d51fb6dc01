use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("config error: could not load config file '{path}' - {source}")]
    Config { path: String, source: std::io::Error },
    #[error("config error: {name} is not set or is empty")]
    MissingSetting { name: &'static str },
    #[error("config error: invalid {name} value '{value}', must be a positive integer")]
    InvalidNumber { name: &'static str, value: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WatchError {
    /// Maps a reqwest failure, keeping timeouts distinct from other transport errors.
    pub fn from_request(error: reqwest::Error, url: &str, after: Duration) -> Self {
        if error.is_timeout() {
            WatchError::Timeout { url: url.to_string(), after }
        } else {
            WatchError::Http(error)
        }
    }
}
