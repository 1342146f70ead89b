//! Watcher engine: fetch pipeline, notification dispatch and the poll loop.
mod client;
mod directory;
mod fetch;
mod http;
mod notify;
mod persist;
mod pool;
mod types;
mod watcher;

pub use client::{ClientSettings, HttpProfileClient, Profile, ProfileClient};
pub use directory::{AccountDirectory, DirectoryError, HttpAccountDirectory};
pub use fetch::{AccountFetcher, FetchSettings, LogProgressSink, NullProgressSink, ProgressSink};
pub use notify::{CommandNotifier, Dispatcher, Notifier, NotifyError};
pub use persist::{
    ensure_store_dir, AtomicFileWriter, PersistError, SeenStoreFile, SeenStorePersistence,
};
pub use pool::{diff_outcomes, fetch_all, AccountDiff};
pub use types::{CycleReport, EngineEvent, FailureKind, FetchError};
pub use watcher::{WatchSettings, Watcher};
