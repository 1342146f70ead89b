use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use engine_logging::engine_info;
use tokio_util::sync::CancellationToken;
use watcher_core::LinkTemplate;
use watcher_engine::{
    AccountDirectory, AccountFetcher, CommandNotifier, Dispatcher, HttpAccountDirectory,
    HttpProfileClient, LogProgressSink, NullProgressSink, ProgressSink, SeenStoreFile,
    SeenStorePersistence, Watcher,
};

use super::config::{WatchConfig, DEFAULT_CONFIG_PATH};
use super::credential;
use super::interrupt;
use super::logging;
use super::progress::ScheduleAnnouncer;

pub fn run_app() -> anyhow::Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = WatchConfig::load(&config_path)?;
    logging::initialize(&config.log_settings());
    engine_info!("Using configuration {:?}", config_path);

    let session_id = credential::resolve(&config.session_id_path)?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(watch(config, session_id))
}

async fn watch(config: WatchConfig, session_id: String) -> anyhow::Result<()> {
    let client_settings = config.client_settings(&session_id);
    let directory = HttpAccountDirectory::new(&client_settings)?;
    let accounts = directory
        .accounts()
        .await
        .context("failed to list followed accounts")?;
    engine_info!("Watching {} accounts", accounts.len());

    let persistence = Arc::new(SeenStoreFile::new(&config.seen_store_path));
    let store = persistence
        .load()
        .with_context(|| format!("failed to load seen store {:?}", persistence.path()))?;

    let client = HttpProfileClient::new(client_settings)?;
    let fetcher = AccountFetcher::new(Arc::new(client), config.fetch_settings());

    let mut dispatcher = Dispatcher::new(LinkTemplate::new(config.link_template.as_str())?);
    if config.show_notifications {
        let notifier = CommandNotifier::new(config.notify_command.clone())?;
        dispatcher = dispatcher.with_notifier(Arc::new(notifier));
    }

    let progress: Arc<dyn ProgressSink> = if config.print_progress {
        Arc::new(LogProgressSink::new())
    } else {
        Arc::new(NullProgressSink)
    };
    let settings = config.watch_settings();
    let sink = Arc::new(ScheduleAnnouncer::new(progress, settings.cycle_interval));
    let watcher = Watcher::new(fetcher, dispatcher, persistence, settings).with_progress_sink(sink);

    let cancel = CancellationToken::new();
    tokio::spawn(interrupt::listen(cancel.clone()));

    let store = watcher.run(&accounts, store, cancel).await;
    engine_info!(
        "Tracking {} items across {} accounts",
        store.item_count(),
        store.len()
    );
    Ok(())
}
