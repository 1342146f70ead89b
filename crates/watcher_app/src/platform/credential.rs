use std::fs;
use std::io;
use std::path::Path;

use anyhow::{anyhow, Context};

pub const SESSION_ENV_VAR: &str = "WATCHER_SESSION_ID";

/// Session credential for the remote API: the file first, then the environment.
pub fn resolve(path: &Path) -> anyhow::Result<String> {
    resolve_from(path, std::env::var(SESSION_ENV_VAR).ok())
}

fn resolve_from(path: &Path, env_value: Option<String>) -> anyhow::Result<String> {
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => return Ok(text.trim().to_string()),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read session id from {path:?}"))
        }
    }

    env_value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| anyhow!("no session id: write it to {path:?} or set {SESSION_ENV_VAR}"))
}
