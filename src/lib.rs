#![doc(test(attr(deny(warnings))))]

//! Ride Ledger records vehicle running costs and derives month summaries,
//! calendar grids and fuel-efficiency figures from them.
//!
//! Entries live in an [`storage::EntryStore`] keyed by identity; every query
//! in [`core::services`] is a pure function over the loaded entries.

pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::core::services::{
    CalendarService, FilterCriteria, FilterService, MileageService, SortKey, SummaryService,
    TransferService,
};
pub use domain::{Category, Entry, EntryDraft, EntryId, Ledger, YearMonth};
pub use errors::{LedgerError, Result};
pub use storage::{EntryStore, Identity, JsonFileStore, KeyValueStore, LedgerChange, MemoryStore};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Ride Ledger tracing initialized.");
    });
}
