//! Persistence of one identity's ledger on top of a [`KeyValueStore`].

use std::fmt;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    core::services::TransferService,
    domain::{Entry, EntryDraft, EntryId, Ledger},
    errors::{LedgerError, Result},
};

use super::{json_backend::JsonFileStore, KeyValueStore};

/// Prefix of the storage key that namespaces each identity's ledger.
pub const DATA_KEY_PREFIX: &str = "ride_ledger_data_";

/// The account boundary a ledger belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidInput("identity must not be blank".into()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn storage_key(&self) -> String {
        format!("{}{}", DATA_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Notification emitted after a mutation has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerChange {
    Added(EntryId),
    Updated(EntryId),
    Removed(EntryId),
    Replaced { count: usize },
    Cleared,
}

pub type ChangeListener = Box<dyn Fn(&LedgerChange) + Send + Sync>;

/// Single source of truth for an identity's ledger.
///
/// Every operation reads the persisted value afresh; nothing is cached
/// between calls, so changes written by another process are observed on the
/// next load (and may be overwritten by the next save).
pub struct EntryStore<S: KeyValueStore> {
    backend: S,
    identity: Identity,
    listeners: Vec<ChangeListener>,
}

impl EntryStore<JsonFileStore> {
    /// Opens the file-backed store for the identity recorded in `config`.
    pub fn open(config: &Config) -> Result<Self> {
        let identity = config
            .identity
            .as_deref()
            .ok_or_else(|| LedgerError::InvalidInput("no active identity configured".into()))
            .and_then(Identity::new)?;
        let backend = JsonFileStore::new(config.resolve_data_dir())?;
        Ok(Self::new(backend, identity))
    }
}

impl<S: KeyValueStore> EntryStore<S> {
    pub fn new(backend: S, identity: Identity) -> Self {
        Self {
            backend,
            identity,
            listeners: Vec::new(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Registers a listener invoked after every persisted mutation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: Fn(&LedgerChange) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Reads the identity's ledger for display.
    ///
    /// Never fails: a missing value, a backend error or an unreadable
    /// container all yield an empty ledger. Duplicate ids are resolved in
    /// favour of the first occurrence.
    pub fn load(&self) -> Ledger {
        let key = self.identity.storage_key();
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(identity = %self.identity, "no stored ledger, starting empty");
                return Ledger::default();
            }
            Err(err) => {
                warn!(identity = %self.identity, error = %err, "failed to read ledger");
                return Ledger::default();
            }
        };
        self.decode(&raw).ledger
    }

    /// Reads the ledger ahead of a mutation.
    ///
    /// Unlike [`EntryStore::load`], a backend read failure is returned
    /// rather than treated as empty, so a mutation never overwrites data it
    /// could not see. Items that fail to decode are carried along and
    /// written back unchanged.
    fn load_for_write(&self) -> Result<StoredLedger> {
        match self.backend.get(&self.identity.storage_key())? {
            Some(raw) => Ok(self.decode(&raw)),
            None => Ok(StoredLedger::default()),
        }
    }

    fn decode(&self, raw: &str) -> StoredLedger {
        let Some(mut stored) = decode_stored(raw) else {
            warn!(identity = %self.identity, "stored ledger is malformed, starting empty");
            return StoredLedger::default();
        };
        let duplicates = stored.ledger.dedup();
        if duplicates > 0 {
            debug!(identity = %self.identity, duplicates, "discarded duplicate entry ids");
        }
        if !stored.undecodable.is_empty() {
            warn!(
                identity = %self.identity,
                kept = stored.undecodable.len(),
                "stored entries could not be decoded and are hidden from views"
            );
        }
        debug!(identity = %self.identity, entries = stored.ledger.len(), "loaded ledger");
        stored
    }

    /// Persists the full ledger in a single backend write.
    ///
    /// Replaces everything stored for the identity, including items that
    /// could not be decoded.
    pub fn save(&self, ledger: &Ledger) -> Result<()> {
        let json = serde_json::to_string(ledger)?;
        self.write(&json, ledger.len())
    }

    fn save_stored(&self, stored: &StoredLedger) -> Result<()> {
        if stored.undecodable.is_empty() {
            return self.save(&stored.ledger);
        }
        let mut items = stored
            .ledger
            .entries
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<Value>>>()?;
        items.extend(stored.undecodable.iter().cloned());
        let json = serde_json::to_string(&json!({ "entries": items }))?;
        self.write(&json, stored.ledger.len())
    }

    fn write(&self, json: &str, entries: usize) -> Result<()> {
        self.backend.set(&self.identity.storage_key(), json)?;
        debug!(identity = %self.identity, entries, "saved ledger");
        Ok(())
    }

    /// Validates `draft` and appends it as a new entry.
    pub fn add(&self, draft: &EntryDraft) -> Result<Entry> {
        let entry = draft.to_entry(EntryId::generate())?;
        let mut stored = self.load_for_write()?;
        stored.ledger.add_entry(entry.clone());
        self.save_stored(&stored)?;
        self.notify(LedgerChange::Added(entry.id.clone()));
        Ok(entry)
    }

    /// Replaces the entry `id` with the validated `draft`.
    ///
    /// Returns `Ok(None)` without writing anything when `id` is unknown.
    pub fn update(&self, id: &EntryId, draft: &EntryDraft) -> Result<Option<Entry>> {
        let updated = draft.to_entry(id.clone())?;
        let mut stored = self.load_for_write()?;
        let Some(slot) = stored.ledger.entry_mut(id) else {
            debug!(%id, "update skipped, entry not found");
            return Ok(None);
        };
        *slot = updated.clone();
        self.save_stored(&stored)?;
        self.notify(LedgerChange::Updated(id.clone()));
        Ok(Some(updated))
    }

    /// Deletes the entry `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &EntryId) -> Result<bool> {
        let mut stored = self.load_for_write()?;
        if stored.ledger.remove_entry(id).is_none() {
            debug!(%id, "remove skipped, entry not found");
            return Ok(false);
        }
        self.save_stored(&stored)?;
        self.notify(LedgerChange::Removed(id.clone()));
        Ok(true)
    }

    /// Overwrites the whole ledger. Not additive.
    pub fn replace_all(&self, mut ledger: Ledger) -> Result<usize> {
        ledger.dedup();
        self.save(&ledger)?;
        let count = ledger.len();
        info!(identity = %self.identity, count, "replaced ledger");
        self.notify(LedgerChange::Replaced { count });
        Ok(count)
    }

    /// Resets the identity's ledger to empty.
    pub fn clear(&self) -> Result<()> {
        self.save(&Ledger::default())?;
        info!(identity = %self.identity, "cleared ledger");
        self.notify(LedgerChange::Cleared);
        Ok(())
    }

    /// Serializes the current ledger as a backup document.
    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        TransferService::export(&self.load())
    }

    /// Replaces the ledger with a backup document.
    ///
    /// The payload is fully decoded before anything is written; a rejected
    /// import leaves the stored ledger untouched.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<usize> {
        let ledger = TransferService::import(bytes)?;
        self.replace_all(ledger)
    }

    fn notify(&self, change: LedgerChange) {
        for listener in &self.listeners {
            listener(&change);
        }
    }
}

/// Persisted ledger split into decoded entries and raw items that did not
/// decode.
#[derive(Debug, Default)]
struct StoredLedger {
    ledger: Ledger,
    undecodable: Vec<Value>,
}

/// Lenient decoding for persisted data: the container must be an object
/// with an `entries` array, but individual undecodable entries are set aside.
fn decode_stored(raw: &str) -> Option<StoredLedger> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let items = value.get("entries")?.as_array()?;
    let mut stored = StoredLedger::default();
    for (index, item) in items.iter().enumerate() {
        match Entry::deserialize(item) {
            Ok(entry) => stored.ledger.entries.push(entry),
            Err(err) => {
                warn!(index, error = %err, "stored entry could not be decoded");
                stored.undecodable.push(item.clone());
            }
        }
    }
    Some(stored)
}
