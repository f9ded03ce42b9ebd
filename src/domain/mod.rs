pub mod common;
pub mod entry;
pub mod ledger;

pub use common::{total_amount, Amounted, YearMonth};
pub use entry::{parse_optional_number, Category, Entry, EntryDraft, EntryId, QuantityUnit};
pub use ledger::Ledger;
