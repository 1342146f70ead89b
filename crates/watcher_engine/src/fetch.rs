use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use watcher_core::{Account, FetchOutcome};

use crate::client::{Profile, ProfileClient};
use crate::{EngineEvent, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Attempts per account per cycle. Zero is treated as one.
    pub retry_attempts: u32,
    /// Hard limit on a single client call; `None` waits forever.
    pub attempt_timeout: Option<Duration>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            attempt_timeout: Some(Duration::from_secs(60)),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Renders progress events as log lines, with a running `done/total` count.
#[derive(Debug, Default)]
pub struct LogProgressSink {
    total: AtomicUsize,
    done: AtomicUsize,
}

impl LogProgressSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: EngineEvent) {
        match event {
            EngineEvent::CycleStarted { accounts, .. } => {
                self.total.store(accounts, Ordering::Relaxed);
                self.done.store(0, Ordering::Relaxed);
                engine_info!("Checking {} accounts for new items", accounts);
            }
            EngineEvent::AttemptStarted {
                handle,
                attempt,
                max_attempts,
            } => {
                engine_info!(
                    "{}/{} | Fetching {} (attempt {}/{})",
                    self.done.load(Ordering::Relaxed),
                    self.total.load(Ordering::Relaxed),
                    handle,
                    attempt,
                    max_attempts
                );
            }
            EngineEvent::AttemptFailed {
                handle,
                attempt,
                error,
            } => match error.kind {
                FailureKind::Api { .. } => {
                    engine_warn!("{} attempt {} rejected: {}", handle, attempt, error)
                }
                _ => engine_debug!("{} attempt {} failed: {}", handle, attempt, error),
            },
            EngineEvent::AccountExhausted { handle, attempts } => {
                engine_warn!("Failed to fetch {} after {} attempts", handle, attempts);
            }
            EngineEvent::AccountSearched { handle } => {
                engine_info!("Searching for new items from {}", handle);
            }
            EngineEvent::NewItem(notification) => {
                engine_info!("{}", notification.link);
            }
            EngineEvent::AccountCompleted { .. } => {
                self.done.fetch_add(1, Ordering::Relaxed);
            }
            EngineEvent::CycleFinished(report) => {
                engine_info!(
                    "Cycle finished: {} accounts, {} fetched, {} failed, {} new items",
                    report.accounts,
                    report.fetched,
                    report.failed,
                    report.new_items
                );
            }
        }
    }
}

/// Calls the profile client for one account with bounded retry.
///
/// Never fails: exhausted accounts come back as [`FetchOutcome::Failed`].
pub struct AccountFetcher {
    client: Arc<dyn ProfileClient>,
    settings: FetchSettings,
}

impl AccountFetcher {
    pub fn new(client: Arc<dyn ProfileClient>, settings: FetchSettings) -> Self {
        Self { client, settings }
    }

    pub async fn fetch(&self, account: Account, sink: &dyn ProgressSink) -> FetchOutcome {
        let max_attempts = self.settings.retry_attempts.max(1);
        for attempt in 1..=max_attempts {
            sink.emit(EngineEvent::AttemptStarted {
                handle: account.handle.clone(),
                attempt,
                max_attempts,
            });
            match self.attempt(&account.internal_id).await {
                Ok(profile) => {
                    engine_debug!(
                        "Fetched {} items for {}",
                        profile.items.len(),
                        account.handle
                    );
                    return FetchOutcome::Fetched {
                        account,
                        items: profile.items,
                    };
                }
                Err(error) => {
                    engine_debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        max_attempts,
                        account.handle,
                        error
                    );
                    sink.emit(EngineEvent::AttemptFailed {
                        handle: account.handle.clone(),
                        attempt,
                        error,
                    });
                }
            }
        }

        engine_warn!(
            "Giving up on {} for this cycle after {} attempts",
            account,
            max_attempts
        );
        sink.emit(EngineEvent::AccountExhausted {
            handle: account.handle.clone(),
            attempts: max_attempts,
        });
        FetchOutcome::Failed { account }
    }

    async fn attempt(&self, internal_id: &str) -> Result<Profile, FetchError> {
        let call = self.client.fetch_profile(internal_id);
        match self.settings.attempt_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                FetchError::new(
                    FailureKind::Timeout,
                    format!("no response within {limit:?}"),
                )
            })?,
            None => call.await,
        }
    }
}
