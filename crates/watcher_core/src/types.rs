use std::fmt;

/// A followed account, as supplied by the account directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    /// Identifier the fetch client understands.
    pub internal_id: String,
    /// Human-facing handle; keys the seen store.
    pub handle: String,
}

impl Account {
    pub fn new(internal_id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            internal_id: internal_id.into(),
            handle: handle.into(),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.handle, self.internal_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub id: String,
}

impl Item {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Result of fetching one account, after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Items in the order the client returned them (newest first).
    Fetched { account: Account, items: Vec<Item> },
    /// Every attempt failed.
    Failed { account: Account },
}

impl FetchOutcome {
    pub fn into_account(self) -> Account {
        match self {
            FetchOutcome::Fetched { account, .. } | FetchOutcome::Failed { account } => account,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed { .. })
    }
}

/// Message handed to the notification port for one newly surfaced item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub handle: String,
    pub item_id: String,
    pub link: String,
}
