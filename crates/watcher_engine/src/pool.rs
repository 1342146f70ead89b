use futures_util::stream::{self, Stream, StreamExt};
use watcher_core::{diff, Account, FetchOutcome, Item, SeenStore};

use crate::fetch::{AccountFetcher, ProgressSink};

/// New items found for one account in the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDiff {
    pub account: Account,
    pub new_items: Vec<Item>,
    pub failed: bool,
}

/// Fetches every account with at most `concurrency_limit` fetches in flight.
///
/// Accounts are admitted in list order as slots free up; outcomes are
/// yielded in completion order, so a slow account never holds back a fast one.
pub fn fetch_all<'a>(
    fetcher: &'a AccountFetcher,
    accounts: &'a [Account],
    concurrency_limit: usize,
    sink: &'a dyn ProgressSink,
) -> impl Stream<Item = FetchOutcome> + 'a {
    stream::iter(accounts.iter().cloned())
        .map(move |account| fetcher.fetch(account, sink))
        .buffer_unordered(concurrency_limit.max(1))
}

/// Diffs each outcome against `store` as soon as it arrives.
///
/// All store mutations happen here on the consuming side, one account at a
/// time, so the fetch tasks never touch the store.
pub fn diff_outcomes<'a, S>(
    outcomes: S,
    store: &'a mut SeenStore,
) -> impl Stream<Item = AccountDiff> + 'a
where
    S: Stream<Item = FetchOutcome> + 'a,
{
    outcomes.map(move |outcome| {
        let new_items = diff(&outcome, store);
        let failed = outcome.is_failed();
        AccountDiff {
            account: outcome.into_account(),
            new_items,
            failed,
        }
    })
}
