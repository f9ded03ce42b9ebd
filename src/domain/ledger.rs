use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::entry::{Entry, EntryId};

/// The full collection of expense entries for one identity.
///
/// Stored order carries no meaning; consumers impose their own ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub entries: Vec<Entry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger, keeping only the first entry seen for each id.
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        let mut ledger = Self { entries };
        ledger.dedup();
        ledger
    }

    /// Drops every entry whose id was already seen earlier in stored order.
    /// Returns how many entries were discarded.
    pub fn dedup(&mut self) -> usize {
        let before = self.entries.len();
        let mut seen = HashSet::with_capacity(before);
        self.entries.retain(|entry| seen.insert(entry.id.clone()));
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| &entry.id == id)
    }

    pub fn add_entry(&mut self, entry: Entry) -> EntryId {
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    pub fn remove_entry(&mut self, id: &EntryId) -> Option<Entry> {
        let index = self.entries.iter().position(|entry| &entry.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
