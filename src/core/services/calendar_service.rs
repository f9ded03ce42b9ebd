//! Month grid model: a fixed Sunday-first 6x7 layout of daily spend.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{total_amount, Entry, YearMonth};

use super::summary_service::SummaryService;

/// Cells in the grid: six weeks of seven days.
pub const GRID_SLOTS: usize = 42;

/// Entries listed inside a day cell before the rest collapse into a count.
pub const DEFAULT_DISPLAY_CAP: usize = 3;

/// One slot of the grid. Padding slots have no `day` and no entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CalendarCell {
    pub day: Option<u32>,
    /// Highest amounts first, at most the display cap.
    pub entries: Vec<Entry>,
    /// Entries on this day that did not fit under the cap.
    pub overflow: usize,
    /// Spend across every entry on this day, listed or not.
    pub total: f64,
}

impl CalendarCell {
    fn padding() -> Self {
        Self::default()
    }

    pub fn is_padding(&self) -> bool {
        self.day.is_none()
    }

    /// Entries on this day, including the overflow.
    pub fn entry_count(&self) -> usize {
        self.entries.len() + self.overflow
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarMonth {
    pub month: YearMonth,
    pub cells: Vec<CalendarCell>,
    pub total: f64,
    pub entry_count: usize,
}

impl CalendarMonth {
    /// Cells that belong to the month, in day order.
    pub fn days(&self) -> impl Iterator<Item = &CalendarCell> {
        self.cells.iter().filter(|cell| !cell.is_padding())
    }

    pub fn cell_for(&self, day: u32) -> Option<&CalendarCell> {
        self.days().find(|cell| cell.day == Some(day))
    }
}

/// Everything recorded on a single date, highest amount first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
    pub total: f64,
}

pub struct CalendarService;

impl CalendarService {
    /// Lays `month` out as [`GRID_SLOTS`] cells starting on Sunday.
    ///
    /// Leading padding fills the columns before day 1, trailing padding the
    /// slots after the last day. Each day shows at most `display_cap`
    /// entries; a cap of zero lists none and reports them all as overflow.
    pub fn build(entries: &[Entry], month: YearMonth, display_cap: usize) -> CalendarMonth {
        let mut buckets: BTreeMap<u32, Vec<Entry>> = BTreeMap::new();
        for entry in SummaryService::month_entries(entries, month) {
            buckets
                .entry(entry.date.day())
                .or_default()
                .push(entry.clone());
        }

        let offset = month.weekday_offset() as usize;
        let mut cells = Vec::with_capacity(GRID_SLOTS);
        cells.resize_with(offset, CalendarCell::padding);

        let mut month_total = 0.0;
        let mut entry_count = 0;
        for day in 1..=month.days() {
            let mut day_entries = buckets.remove(&day).unwrap_or_default();
            sort_by_amount_desc(&mut day_entries);
            let total = total_amount(&day_entries);
            month_total += total;
            entry_count += day_entries.len();

            let overflow = day_entries.len().saturating_sub(display_cap);
            day_entries.truncate(display_cap);
            cells.push(CalendarCell {
                day: Some(day),
                entries: day_entries,
                overflow,
                total,
            });
        }
        cells.resize_with(GRID_SLOTS, CalendarCell::padding);

        CalendarMonth {
            month,
            cells,
            total: month_total,
            entry_count,
        }
    }

    /// Every entry on `date`, uncapped.
    pub fn day_detail(entries: &[Entry], date: NaiveDate) -> DayDetail {
        let mut day_entries: Vec<Entry> = entries
            .iter()
            .filter(|entry| entry.date == date)
            .cloned()
            .collect();
        sort_by_amount_desc(&mut day_entries);
        DayDetail {
            date,
            total: total_amount(&day_entries),
            entries: day_entries,
        }
    }
}

/// Stable, so equal amounts keep stored order.
fn sort_by_amount_desc(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.amount.total_cmp(&a.amount));
}
