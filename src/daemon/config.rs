use super::errors::{Result, WatchError};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const REPO_VAR: &str = "GITHUB_REPO_ENV";
pub const BRANCH_VAR: &str = "GITHUB_BRANCH_ENV";
pub const TOKEN_VAR: &str = "GITHUB_TOKEN_ENV";
pub const API_URL_VAR: &str = "GITHUB_API_URL_ENV";
pub const TRIGGER_URL_VAR: &str = "TRIGGER_URL_ENV";
pub const REGISTRY_URL_VAR: &str = "DOCKER_IMAGE_URL_ENV";
pub const INTERVAL_VAR: &str = "CHECK_INTERVAL_ENV";
pub const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT_ENV";

const DEFAULT_TRIGGER_URL: &str = "http://localhost:12001/github";
const DEFAULT_REGISTRY_URL: &str =
    "https://hub.docker.com/v2/repositories/gerundium/brand-voting-app/tags/";

fn default_interval() -> u64 { 60 /* seconds */ }
fn default_request_timeout() -> u64 { 30 }

fn default_api_url(repo: &str, branch: &str) -> String {
    format!("https://api.github.com/repos/{repo}/commits?sha={branch}")
}

/// Settings file layer. Environment variables take precedence over every key.
#[derive(Deserialize, Debug, Default)]
pub struct FileConfig {
    /// `owner/repo`
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    /// Commit listing URL (defaults to the GitHub commits endpoint for repo and branch)
    pub api_url: Option<String>,
    pub trigger_url: Option<String>,
    pub registry_url: Option<String>,
    /// Poll interval in seconds
    pub interval: Option<u64>,
    /// Timeout for commit and registry requests, in seconds
    pub request_timeout: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<FileConfig> {
        let file_text = std::fs::read_to_string(path).map_err(|source| WatchError::Config {
            path: path.display().to_string(),
            source,
        })?;
        let config: FileConfig = toml::from_str(&file_text)?;
        Ok(config)
    }
}

/// Process-wide settings, built once at startup.
#[derive(Clone)]
pub struct Config {
    pub repo: String,
    pub branch: String,
    pub token: String,
    pub api_url: String,
    pub trigger_url: String,
    pub registry_url: String,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads the optional settings file, then overlays the process environment.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Config::resolve(file, |name| std::env::var(name).ok())
    }

    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let repo = required(&env, REPO_VAR, file.repo)?;
        let branch = required(&env, BRANCH_VAR, file.branch)?;
        let token = required(&env, TOKEN_VAR, file.token)?;

        let api_url = setting(&env, API_URL_VAR, file.api_url)
            .unwrap_or_else(|| default_api_url(&repo, &branch));
        let trigger_url = setting(&env, TRIGGER_URL_VAR, file.trigger_url)
            .unwrap_or_else(|| DEFAULT_TRIGGER_URL.to_string());
        let registry_url = setting(&env, REGISTRY_URL_VAR, file.registry_url)
            .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string());

        let interval = seconds(&env, INTERVAL_VAR, file.interval, default_interval())?;
        let request_timeout = seconds(
            &env,
            REQUEST_TIMEOUT_VAR,
            file.request_timeout,
            default_request_timeout(),
        )?;

        Ok(Config {
            repo,
            branch,
            token,
            api_url,
            trigger_url,
            registry_url,
            interval: Duration::from_secs(interval),
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("trigger_url", &self.trigger_url)
            .field("registry_url", &self.registry_url)
            .field("interval", &self.interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Removes surrounding whitespace and single or double quotes.
pub fn strip_quotes(value: &str) -> &str {
    value.trim().trim_matches(|c| c == '"' || c == '\'')
}

fn setting<F>(env: &F, name: &str, from_file: Option<String>) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(name)
        .map(|value| strip_quotes(&value).to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| from_file.map(|value| value.trim().to_string()).filter(|value| !value.is_empty()))
}

fn required<F>(env: &F, name: &'static str, from_file: Option<String>) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    setting(env, name, from_file).ok_or(WatchError::MissingSetting { name })
}

fn seconds<F>(env: &F, name: &'static str, from_file: Option<u64>, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match env(name).map(|raw| strip_quotes(&raw).to_string()) {
        Some(raw) if !raw.is_empty() => raw
            .parse::<u64>()
            .map_err(|_| WatchError::InvalidNumber { name, value: raw.clone() })?,
        _ => from_file.unwrap_or(default),
    };
    if value == 0 {
        return Err(WatchError::InvalidNumber { name, value: value.to_string() });
    }
    Ok(value)
}
