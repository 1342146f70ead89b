use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use engine_logging::engine_info;
use watcher_engine::{EngineEvent, ProgressSink};

/// Forwards events and announces when the next cycle will start.
pub struct ScheduleAnnouncer {
    inner: Arc<dyn ProgressSink>,
    interval: Duration,
}

impl ScheduleAnnouncer {
    pub fn new(inner: Arc<dyn ProgressSink>, interval: Duration) -> Self {
        Self { inner, interval }
    }
}

impl ProgressSink for ScheduleAnnouncer {
    fn emit(&self, event: EngineEvent) {
        let finished = matches!(event, EngineEvent::CycleFinished(_));
        self.inner.emit(event);
        if !finished {
            return;
        }
        let next = chrono::Duration::from_std(self.interval)
            .ok()
            .and_then(|delta| Local::now().checked_add_signed(delta));
        if let Some(next) = next {
            engine_info!("Next cycle at {}", next.format("%Y-%m-%d %H:%M:%S"));
        }
    }
}
