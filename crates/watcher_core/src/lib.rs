//! Watcher core: pure data model, seen-state bookkeeping and the diff engine.
mod diff;
mod link;
mod seen;
mod types;

pub use diff::{diff, new_items};
pub use link::{LinkError, LinkTemplate};
pub use seen::{SeenEntry, SeenStore};
pub use types::{Account, FetchOutcome, Item, Notification};
