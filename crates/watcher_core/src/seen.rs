use std::collections::{BTreeMap, HashSet};

/// Item IDs already surfaced for one handle, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct SeenEntry {
    order: Vec<String>,
    index: HashSet<String>,
}

impl SeenEntry {
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Appends `id` unless already present. Returns whether it was added.
    pub fn record(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.order.push(id);
        true
    }

    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl PartialEq for SeenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for SeenEntry {}

impl FromIterator<String> for SeenEntry {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut entry = SeenEntry::default();
        for id in iter {
            entry.record(id);
        }
        entry
    }
}

/// Mapping of handle to the item IDs already surfaced for it.
///
/// Entries are created lazily and never removed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeenStore {
    entries: BTreeMap<String, SeenEntry>,
}

impl SeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `handle`, creating an empty one if absent.
    pub fn ensure_entry(&mut self, handle: &str) -> &mut SeenEntry {
        self.entries.entry(handle.to_string()).or_default()
    }

    pub fn entry(&self, handle: &str) -> Option<&SeenEntry> {
        self.entries.get(handle)
    }

    pub fn contains(&self, handle: &str, id: &str) -> bool {
        self.entries
            .get(handle)
            .is_some_and(|entry| entry.contains(id))
    }

    /// Handles in ascending order with their IDs in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(handle, entry)| (handle.as_str(), entry.ids()))
    }

    /// Number of handles with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.entries.values().map(SeenEntry::len).sum()
    }

    /// Plain mapping form, for serialization.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.iter()
            .map(|(handle, ids)| (handle.to_string(), ids.to_vec()))
            .collect()
    }
}

impl From<BTreeMap<String, Vec<String>>> for SeenStore {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        let entries = map
            .into_iter()
            .map(|(handle, ids)| (handle, ids.into_iter().collect()))
            .collect();
        Self { entries }
    }
}
