use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_error, engine_info};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;
use watcher_core::{Account, SeenStore};

use crate::fetch::{AccountFetcher, NullProgressSink, ProgressSink};
use crate::notify::Dispatcher;
use crate::persist::{PersistError, SeenStorePersistence};
use crate::pool::{diff_outcomes, fetch_all, AccountDiff};
use crate::{CycleReport, EngineEvent};

#[derive(Debug, Clone)]
pub struct WatchSettings {
    /// Fetches allowed in flight at once. Zero is treated as one.
    pub concurrency_limit: usize,
    /// Pause between the end of one cycle and the start of the next.
    pub cycle_interval: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: 1,
            cycle_interval: Duration::from_secs(3600),
        }
    }
}

/// Runs poll cycles over a fixed account list.
pub struct Watcher {
    fetcher: AccountFetcher,
    dispatcher: Dispatcher,
    persistence: Arc<dyn SeenStorePersistence>,
    sink: Arc<dyn ProgressSink>,
    settings: WatchSettings,
}

impl Watcher {
    pub fn new(
        fetcher: AccountFetcher,
        dispatcher: Dispatcher,
        persistence: Arc<dyn SeenStorePersistence>,
        settings: WatchSettings,
    ) -> Self {
        Self {
            fetcher,
            dispatcher,
            persistence,
            sink: Arc::new(NullProgressSink),
            settings,
        }
    }

    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Fetches, diffs and dispatches every account once. Does not persist.
    pub async fn run_cycle(&self, accounts: &[Account], store: &mut SeenStore) -> CycleReport {
        let sink = self.sink.as_ref();
        sink.emit(EngineEvent::CycleStarted {
            cycle: engine_logging::current_cycle(),
            accounts: accounts.len(),
        });

        let mut report = CycleReport {
            accounts: accounts.len(),
            ..CycleReport::default()
        };
        let outcomes = fetch_all(
            &self.fetcher,
            accounts,
            self.settings.concurrency_limit,
            sink,
        );
        let mut diffs = pin!(diff_outcomes(outcomes, store));
        while let Some(AccountDiff {
            account,
            new_items,
            failed,
        }) = diffs.next().await
        {
            if failed {
                report.failed += 1;
            } else {
                report.fetched += 1;
                sink.emit(EngineEvent::AccountSearched {
                    handle: account.handle.clone(),
                });
                report.new_items += self.dispatcher.dispatch(&account, &new_items, sink);
            }
            sink.emit(EngineEvent::AccountCompleted {
                handle: account.handle,
                new_items: new_items.len(),
                failed,
            });
        }

        sink.emit(EngineEvent::CycleFinished(report.clone()));
        report
    }

    /// One full cycle followed by a save of the store.
    ///
    /// On a save error the updated store stays in `store`; the caller keeps
    /// it and the next successful save catches up.
    pub async fn run_once(
        &self,
        accounts: &[Account],
        store: &mut SeenStore,
    ) -> Result<CycleReport, PersistError> {
        let cycle = engine_logging::begin_cycle();
        engine_info!("Starting cycle {} over {} accounts", cycle, accounts.len());
        let report = self.run_cycle(accounts, store).await;
        self.persistence.save(store)?;
        Ok(report)
    }

    /// Runs cycles back to back, sleeping `cycle_interval` in between, until
    /// `cancel` fires. A running cycle always completes and is saved first.
    /// Returns the final in-memory store.
    pub async fn run(
        &self,
        accounts: &[Account],
        mut store: SeenStore,
        cancel: CancellationToken,
    ) -> SeenStore {
        loop {
            match self.run_once(accounts, &mut store).await {
                Ok(report) => engine_info!(
                    "Cycle done: {} new items, {} of {} accounts failed",
                    report.new_items,
                    report.failed,
                    report.accounts
                ),
                Err(err) => engine_error!(
                    "Failed to save seen store ({} accounts kept in memory, retry next cycle): {}",
                    store.len(),
                    err
                ),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.cycle_interval) => {}
            }
        }
        engine_info!("Watcher stopped");
        store
    }
}
