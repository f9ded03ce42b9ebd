//! Backup documents: whole-ledger export and strict import.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    domain::{Entry, Ledger},
    errors::{LedgerError, Result},
    utils::persistence::write_atomic,
};

/// File name offered when saving a backup.
pub const DEFAULT_BACKUP_FILE: &str = "ride_expense_backup.json";

pub struct TransferService;

impl TransferService {
    /// Pretty-printed document in the persisted format.
    pub fn export(ledger: &Ledger) -> Result<Vec<u8>> {
        let bytes = serde_json::to_vec_pretty(ledger)?;
        debug!(entries = ledger.len(), bytes = bytes.len(), "exported ledger");
        Ok(bytes)
    }

    /// Decodes a backup document.
    ///
    /// The payload must be an object holding an `entries` array and every
    /// item must decode as an entry; nothing is partially accepted. Duplicate
    /// ids keep their first occurrence.
    pub fn import(bytes: &[u8]) -> Result<Ledger> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|err| LedgerError::InvalidImport(format!("not a JSON document: {err}")))?;
        let items = value
            .get("entries")
            .and_then(Value::as_array)
            .ok_or_else(|| LedgerError::InvalidImport("missing `entries` array".into()))?;

        let entries = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Entry::deserialize(item).map_err(|err| {
                    LedgerError::InvalidImport(format!("entry {index} is invalid: {err}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let decoded = entries.len();
        let ledger = Ledger::from_entries(entries);
        info!(
            entries = ledger.len(),
            duplicates = decoded - ledger.len(),
            "decoded backup"
        );
        Ok(ledger)
    }

    pub fn export_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
        let bytes = Self::export(ledger)?;
        write_atomic(path, &bytes)?;
        info!(path = %path.display(), entries = ledger.len(), "wrote backup");
        Ok(())
    }

    pub fn import_from_path(path: &Path) -> Result<Ledger> {
        let bytes = fs::read(path)?;
        Self::import(&bytes)
    }
}
