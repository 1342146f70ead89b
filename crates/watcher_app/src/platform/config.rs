use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use watcher_engine::{ClientSettings, FetchSettings, WatchSettings};

use super::logging::{LogDestination, LogSettings, DEFAULT_LOG_FILE};

pub const DEFAULT_CONFIG_PATH: &str = "watcher.ron";

/// Options read from the RON config file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub concurrency_limit: usize,
    pub retry_attempts: u32,
    /// Per-attempt limit; 0 disables it.
    pub attempt_timeout_secs: u64,
    pub show_notifications: bool,
    pub print_progress: bool,
    pub cycle_interval_secs: u64,
    pub seen_store_path: PathBuf,
    pub session_id_path: PathBuf,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub page_size: u32,
    pub link_template: String,
    pub notify_command: Vec<String>,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub verbose: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 1,
            retry_attempts: 3,
            attempt_timeout_secs: 60,
            show_notifications: false,
            print_progress: true,
            cycle_interval_secs: 3600,
            seen_store_path: PathBuf::from("known_items.ron"),
            session_id_path: PathBuf::from("sessionid"),
            api_base_url: "https://www.tiktok.com".to_string(),
            request_timeout_secs: 30,
            page_size: 30,
            link_template: "https://www.tiktok.com/@{handle}/video/{id}".to_string(),
            notify_command: vec![
                "notify-send".to_string(),
                "New post by {handle}".to_string(),
                "{link}".to_string(),
            ],
            log_destination: LogDestination::Both,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            verbose: false,
        }
    }
}

impl WatchConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {path:?}"))
            }
        };
        ron::from_str(&text).with_context(|| format!("failed to parse config {path:?}"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            retry_attempts: self.retry_attempts,
            attempt_timeout: (self.attempt_timeout_secs > 0)
                .then(|| Duration::from_secs(self.attempt_timeout_secs)),
        }
    }

    pub fn client_settings(&self, session_id: &str) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base_url.clone(),
            session_id: Some(session_id.to_string()),
            request_timeout: self.request_timeout(),
            page_size: self.page_size,
            ..ClientSettings::default()
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            destination: self.log_destination,
            verbose: self.verbose,
            file: self.log_file.clone(),
        }
    }

    pub fn watch_settings(&self) -> WatchSettings {
        WatchSettings {
            concurrency_limit: self.concurrency_limit,
            cycle_interval: Duration::from_secs(self.cycle_interval_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = WatchConfig::load(&temp.path().join("watcher.ron")).unwrap();
        assert_eq!(config, WatchConfig::default());
        assert_eq!(config.watch_settings().concurrency_limit, 1);
        assert_eq!(config.fetch_settings().retry_attempts, 3);
        assert!(config.print_progress);
        assert!(!config.show_notifications);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("watcher.ron");
        fs::write(
            &path,
            "(concurrency_limit: 4, show_notifications: true, log_destination: Terminal)",
        )
        .unwrap();

        let config = WatchConfig::load(&path).unwrap();
        assert_eq!(config.concurrency_limit, 4);
        assert!(config.show_notifications);
        assert_eq!(config.log_destination, LogDestination::Terminal);
        assert_eq!(config.cycle_interval_secs, 3600);
        assert_eq!(config.log_settings().file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn log_file_is_configurable() {
        let config: WatchConfig =
            ron::from_str("(log_file: \"logs/watch.log\", verbose: true)").unwrap();
        let settings = config.log_settings();
        assert_eq!(settings.file, PathBuf::from("logs/watch.log"));
        assert!(settings.verbose);
        assert_eq!(settings.destination, LogDestination::Both);
    }

    #[test]
    fn zero_attempt_timeout_disables_it() {
        let config = WatchConfig {
            attempt_timeout_secs: 0,
            ..WatchConfig::default()
        };
        assert_eq!(config.fetch_settings().attempt_timeout, None);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("watcher.ron");
        fs::write(&path, "(concurrency_limit: \"many\")").unwrap();
        assert!(WatchConfig::load(&path).is_err());
    }
}
