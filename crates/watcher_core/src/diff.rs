use crate::{FetchOutcome, Item, SeenStore};

/// Applies one fetch outcome to the seen store and returns the new items.
///
/// A failed outcome still creates the handle's entry so a permanently broken
/// account does not stay blank forever.
pub fn diff(outcome: &FetchOutcome, store: &mut SeenStore) -> Vec<Item> {
    match outcome {
        FetchOutcome::Failed { account } => {
            store.ensure_entry(&account.handle);
            Vec::new()
        }
        FetchOutcome::Fetched { account, items } => new_items(&account.handle, items, store),
    }
}

/// Walks a newest-first listing and yields items up to the first one
/// already seen for `handle`, recording each yielded ID.
///
/// Everything past that first seen ID is treated as already reported, even
/// if it is absent from the store.
pub fn new_items(handle: &str, items: &[Item], store: &mut SeenStore) -> Vec<Item> {
    let entry = store.ensure_entry(handle);
    let mut fresh = Vec::new();
    for item in items {
        if !entry.record(item.id.as_str()) {
            break;
        }
        fresh.push(item.clone());
    }
    fresh
}
