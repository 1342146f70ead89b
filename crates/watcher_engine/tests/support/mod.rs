#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use watcher_core::{Item, Notification, SeenStore};
use watcher_engine::{
    EngineEvent, FailureKind, FetchError, Notifier, NotifyError, PersistError, Profile,
    ProfileClient, ProgressSink, SeenStorePersistence,
};

/// One scripted reply of the fake profile client.
#[derive(Debug, Clone)]
pub enum Reply {
    Items(Vec<&'static str>),
    Fail(FailureKind),
    Hang,
}

/// Profile client answering from a per-account script.
///
/// Once an account's script runs out its last reply repeats.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    last: Mutex<HashMap<String, Reply>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, u32>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, internal_id: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(internal_id.to_string(), replies.into());
        self
    }

    pub fn delay(mut self, internal_id: &str, delay: Duration) -> Self {
        self.delays.insert(internal_id.to_string(), delay);
        self
    }

    /// Replaces an account's script between cycles.
    pub fn rescript(&self, internal_id: &str, replies: Vec<Reply>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(internal_id.to_string(), replies.into());
    }

    pub fn calls(&self, internal_id: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(internal_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, internal_id: &str) -> Reply {
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(internal_id)
            .and_then(VecDeque::pop_front);
        let mut last = self.last.lock().unwrap();
        match scripted {
            Some(reply) => {
                last.insert(internal_id.to_string(), reply.clone());
                reply
            }
            None => last
                .get(internal_id)
                .cloned()
                .unwrap_or(Reply::Fail(FailureKind::Api { code: 404 })),
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ProfileClient for ScriptedClient {
    async fn fetch_profile(&self, internal_id: &str) -> Result<Profile, FetchError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(internal_id.to_string())
            .or_default() += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if let Some(delay) = self.delays.get(internal_id) {
            tokio::time::sleep(*delay).await;
        }

        match self.next_reply(internal_id) {
            Reply::Items(ids) => Ok(Profile {
                items: ids.into_iter().map(Item::new).collect(),
            }),
            Reply::Fail(kind) => Err(FetchError::new(kind, "scripted failure")),
            Reply::Hang => std::future::pending().await,
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.item_id.clone())
            .collect()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(NotifyError::EmptyCommand);
        }
        Ok(())
    }
}

/// Keeps every saved snapshot in memory; can be told to fail saves.
#[derive(Default)]
pub struct MemoryPersistence {
    saved: Mutex<Vec<SeenStore>>,
    fail_saves: bool,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_saves: true,
        }
    }

    pub fn saves(&self) -> Vec<SeenStore> {
        self.saved.lock().unwrap().clone()
    }
}

impl SeenStorePersistence for MemoryPersistence {
    fn load(&self) -> Result<SeenStore, PersistError> {
        Ok(self.saved.lock().unwrap().last().cloned().unwrap_or_default())
    }

    fn save(&self, store: &SeenStore) -> Result<(), PersistError> {
        if self.fail_saves {
            return Err(PersistError::StoreDir("disk full".into()));
        }
        self.saved.lock().unwrap().push(store.clone());
        Ok(())
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
