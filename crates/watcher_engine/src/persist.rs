use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use serde::Deserialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use watcher_core::SeenStore;

use crate::http::string_or_number;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("store directory missing or not writable: {0}")]
    StoreDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse seen store {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to serialize seen store: {0}")]
    Serialize(String),
}

/// Loads and saves the seen store. Called once at startup and once per cycle.
pub trait SeenStorePersistence: Send + Sync {
    /// Returns an empty store when nothing has been saved yet.
    fn load(&self) -> Result<SeenStore, PersistError>;
    fn save(&self, store: &SeenStore) -> Result<(), PersistError>;
}

/// Ensure the directory exists; create if missing.
pub fn ensure_store_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::StoreDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::StoreDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::StoreDir(e.to_string()))?;
    }
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_store_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Readers see the old file or the new one, never a partial write.
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// An ID in a JSON store; older stores wrote IDs as bare numbers.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct StoredId(#[serde(deserialize_with = "string_or_number")] String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreFormat {
    Ron,
    Json,
}

/// Seen store kept in a single human-readable file.
///
/// The format follows the extension: `.json` is JSON, anything else is RON.
/// Both hold a map of handle to item IDs in discovery order.
#[derive(Debug, Clone)]
pub struct SeenStoreFile {
    path: PathBuf,
}

impl SeenStoreFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format(&self) -> StoreFormat {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StoreFormat::Json,
            _ => StoreFormat::Ron,
        }
    }

    fn parse(&self, content: &str) -> Result<BTreeMap<String, Vec<String>>, PersistError> {
        let parsed: Result<BTreeMap<String, Vec<String>>, String> = match self.format() {
            StoreFormat::Ron => ron::from_str(content).map_err(|e| e.to_string()),
            StoreFormat::Json => serde_json::from_str::<BTreeMap<String, Vec<StoredId>>>(content)
                .map(|map| {
                    map.into_iter()
                        .map(|(handle, ids)| (handle, ids.into_iter().map(|id| id.0).collect()))
                        .collect()
                })
                .map_err(|e| e.to_string()),
        };
        parsed.map_err(|message| PersistError::Parse {
            path: self.path.clone(),
            message,
        })
    }

    fn render(&self, map: &BTreeMap<String, Vec<String>>) -> Result<String, PersistError> {
        match self.format() {
            StoreFormat::Ron => {
                let pretty = ron::ser::PrettyConfig::new();
                ron::ser::to_string_pretty(map, pretty)
                    .map_err(|e| PersistError::Serialize(e.to_string()))
            }
            StoreFormat::Json => serde_json::to_string_pretty(map)
                .map_err(|e| PersistError::Serialize(e.to_string())),
        }
    }
}

impl SeenStorePersistence for SeenStoreFile {
    fn load(&self) -> Result<SeenStore, PersistError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                engine_info!("No seen store at {:?}; starting empty", self.path);
                return Ok(SeenStore::new());
            }
            Err(err) => return Err(err.into()),
        };

        let store = SeenStore::from(self.parse(&content)?);
        engine_info!(
            "Loaded seen store from {:?}: {} accounts, {} items",
            self.path,
            store.len(),
            store.item_count()
        );
        Ok(store)
    }

    fn save(&self, store: &SeenStore) -> Result<(), PersistError> {
        let content = self.render(&store.to_map())?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let filename = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PersistError::StoreDir(format!("no file name in {:?}", self.path)))?;

        let written = AtomicFileWriter::new(dir).write(filename, &content)?;
        engine_debug!("Saved seen store to {:?}", written);
        Ok(())
    }
}
