pub mod commit;
pub mod config;
pub mod errors;
pub mod github;
pub mod registry;
pub mod trigger;
pub mod watcher;

#[cfg(test)]
mod test_server;

use errors::Result;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client shared by all outbound calls. Each call sets its own timeout.
pub fn http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
    Ok(client)
}
