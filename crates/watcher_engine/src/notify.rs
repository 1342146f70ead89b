use std::process::Stdio;
use std::sync::Arc;

use engine_logging::engine_warn;
use thiserror::Error;
use watcher_core::{Account, Item, LinkTemplate, Notification};

use crate::fetch::ProgressSink;
use crate::EngineEvent;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification command is empty")]
    EmptyCommand,
    #[error("failed to launch notification command {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Fire-and-forget delivery of one notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Launches an external command per notification without waiting for it.
///
/// `{handle}`, `{id}` and `{link}` in any argument are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(command: Vec<String>) -> Result<Self, NotifyError> {
        let mut parts = command.into_iter();
        let program = parts
            .next()
            .filter(|program| !program.trim().is_empty())
            .ok_or(NotifyError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args_for(&self, notification: &Notification) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{handle}", &notification.handle)
                    .replace("{id}", &notification.item_id)
                    .replace("{link}", &notification.link)
            })
            .collect()
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        // The child is left to run; tokio reaps it once it exits.
        tokio::process::Command::new(&self.program)
            .args(self.args_for(notification))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(drop)
            .map_err(|source| NotifyError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

/// Forwards newly found items, one notification per item.
pub struct Dispatcher {
    links: LinkTemplate,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Dispatcher {
    /// A dispatcher that only reports to the progress sink.
    pub fn new(links: LinkTemplate) -> Self {
        Self {
            links,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn notification_for(&self, account: &Account, item: &Item) -> Notification {
        let link = match self.links.format(&account.handle, &item.id) {
            Ok(url) => url.to_string(),
            Err(err) => {
                engine_warn!("Could not build link for {}: {}", item.id, err);
                item.id.clone()
            }
        };
        Notification {
            handle: account.handle.clone(),
            item_id: item.id.clone(),
            link,
        }
    }

    /// Dispatches `items` in order and returns how many were dispatched.
    /// Notifier failures are logged and otherwise ignored.
    pub fn dispatch(&self, account: &Account, items: &[Item], sink: &dyn ProgressSink) -> usize {
        for item in items {
            let notification = self.notification_for(account, item);
            if let Some(notifier) = &self.notifier {
                if let Err(err) = notifier.notify(&notification) {
                    engine_warn!("Notification for {} failed: {}", notification.link, err);
                }
            }
            sink.emit(EngineEvent::NewItem(notification));
        }
        items.len()
    }
}
