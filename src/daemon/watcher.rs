use super::github::CommitSource;
use super::registry::ImageRegistry;
use super::trigger::BuildTrigger;
use log::{debug, error, info, warn};
use std::time::Duration;
use tokio::time;

/// What a single poll cycle ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    NoCommit,
    Unchanged,
    NotMarked,
    ImageExists,
    Triggered { status: u16 },
    TriggerFailed,
}

/// Polls the branch head and fires the build trigger for new marked commits.
///
/// `last_seen` lives only in memory; a restart re-evaluates the current head.
pub struct Watcher<S, R, T> {
    source: S,
    registry: R,
    trigger: T,
    last_seen: Option<String>,
}

impl<S, R, T> Watcher<S, R, T>
where
    S: CommitSource,
    R: ImageRegistry,
    T: BuildTrigger,
{
    pub fn new(source: S, registry: R, trigger: T) -> Self {
        Watcher { source, registry, trigger, last_seen: None }
    }

    /// Polls forever, sleeping `interval` after every cycle.
    pub async fn run(&mut self, interval: Duration) {
        loop {
            let outcome = self.poll_once().await;
            debug!("Cycle finished with {outcome:?}, sleeping {interval:?}");
            time::sleep(interval).await;
        }
    }

    pub async fn poll_once(&mut self) -> CycleOutcome {
        let commit = match self.source.latest_commit().await {
            Ok(Some(commit)) => commit,
            Ok(None) => return CycleOutcome::NoCommit,
            Err(error) => {
                error!("Error fetching commits: {error}");
                return CycleOutcome::NoCommit;
            }
        };

        if self.last_seen.as_deref() == Some(commit.short_id.as_str()) {
            info!("Nothing new. Going to sleep. Last checked commit: {}", commit.short_id);
            return CycleOutcome::Unchanged;
        }

        info!("Analyzing commit: {} {} {}", commit.date, commit.short_id, commit.message.trim());
        let previous = self.last_seen.replace(commit.short_id.clone());

        if !commit.is_trigger() {
            info!("Nothing to do. Going to sleep. Last checked commit: {}", commit.short_id);
            return CycleOutcome::NotMarked;
        }

        info!("Checking if image {} exists...", commit.short_id);
        let exists = match self.registry.image_exists(&commit.short_id).await {
            Ok(exists) => exists,
            Err(error) => {
                warn!("Registry check failed, treating image as missing: {error}");
                false
            }
        };
        if exists {
            info!("Image exists. Skipping trigger.");
            return CycleOutcome::ImageExists;
        }

        info!("Image does not exist. Triggering build...");
        match self.trigger.fire().await {
            Ok(response) => {
                info!("Trigger response: {}, {}", response.status, response.body);
                CycleOutcome::Triggered { status: response.status }
            }
            Err(error) => {
                // Re-evaluate this commit next cycle.
                error!("Trigger failed for {}: {error}", commit.short_id);
                self.last_seen = previous;
                CycleOutcome::TriggerFailed
            }
        }
    }
}
