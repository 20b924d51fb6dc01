mod daemon;

use clap::Parser;
use daemon::config::Config;
use daemon::errors::Result;
use daemon::github::GitHubClient;
use daemon::registry::DockerHubRegistry;
use daemon::trigger::WebhookTrigger;
use daemon::watcher::Watcher;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// Watches a branch for build trigger commits and kicks the image build webhook.
#[derive(Parser)]
struct Cli {
    /// Path to an optional settings TOML (environment variables take precedence)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    match run(config, args.once).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config, once: bool) -> Result<()> {
    info!(
        "Watching {} on branch {} every {}s",
        config.repo,
        config.branch,
        config.interval.as_secs()
    );

    let http = daemon::http_client()?;
    let mut watcher = Watcher::new(
        GitHubClient::new(http.clone(), &config),
        DockerHubRegistry::new(http.clone(), &config),
        WebhookTrigger::new(http, &config),
    );

    if once {
        watcher.poll_once().await;
        return Ok(());
    }

    tokio::select! {
        _ = watcher.run(config.interval) => {}
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
