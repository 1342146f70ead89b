use std::fmt;

use thiserror::Error;
use watcher_core::Notification;

/// Progress and outcome events emitted while a cycle runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    CycleStarted {
        cycle: u64,
        accounts: usize,
    },
    AttemptStarted {
        handle: String,
        attempt: u32,
        max_attempts: u32,
    },
    AttemptFailed {
        handle: String,
        attempt: u32,
        error: FetchError,
    },
    /// Every attempt for the account failed.
    AccountExhausted {
        handle: String,
        attempts: u32,
    },
    AccountSearched {
        handle: String,
    },
    NewItem(Notification),
    AccountCompleted {
        handle: String,
        new_items: usize,
        failed: bool,
    },
    CycleFinished(CycleReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub accounts: usize,
    pub fetched: usize,
    pub failed: usize,
    pub new_items: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The remote API answered with an application-level error.
    Api { code: i64 },
    InvalidUrl,
    /// The session id contains bytes not allowed in a header.
    InvalidCredential,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Api { code } => write!(f, "api error {code}"),
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidCredential => write!(f, "invalid session id"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
