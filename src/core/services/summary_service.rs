//! Month-scoped totals, category breakdowns and "latest entry" lookups.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{total_amount, Category, Entry, YearMonth};

/// Aggregates for one calendar month. Recomputed on demand, never cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthStats {
    pub month: YearMonth,
    /// Spend per category; every built-in category is always present.
    pub totals: BTreeMap<Category, f64>,
    pub total: f64,
    pub max_day: Option<DayTotal>,
    pub count: usize,
    /// In-scope entries in stored order.
    pub list: Vec<Entry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTotal {
    pub day: u32,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

/// Dashboard headline figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSummary {
    pub month: YearMonth,
    pub month_total: f64,
    pub month_count: usize,
    pub latest: Option<Entry>,
    /// Whole days between the latest entry and `today`; zero for future-dated entries.
    pub days_since_latest: Option<i64>,
    pub top_category: Option<CategoryTotal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ListSummary {
    pub total: f64,
    pub count: usize,
}

pub struct SummaryService;

impl SummaryService {
    /// Entries dated inside `month`, first and last day included.
    pub fn month_entries(entries: &[Entry], month: YearMonth) -> Vec<&Entry> {
        entries
            .iter()
            .filter(|entry| month.contains(entry.date))
            .collect()
    }

    pub fn month_stats(entries: &[Entry], month: YearMonth) -> MonthStats {
        let list: Vec<Entry> = Self::month_entries(entries, month)
            .into_iter()
            .cloned()
            .collect();
        let totals = Self::category_totals(&list);
        let max_day = Self::busiest_day(&Self::day_totals(&list, month));

        MonthStats {
            month,
            totals,
            total: total_amount(&list),
            max_day,
            count: list.len(),
            list,
        }
    }

    /// Spend per category, seeded with zero for every built-in category.
    pub fn category_totals(entries: &[Entry]) -> BTreeMap<Category, f64> {
        let mut totals: BTreeMap<Category, f64> =
            Category::KNOWN.iter().cloned().map(|c| (c, 0.0)).collect();
        for entry in entries {
            *totals.entry(entry.category.clone()).or_insert(0.0) += entry.amount;
        }
        totals
    }

    /// Summed spend per day-of-month for entries inside `month`.
    pub fn day_totals(entries: &[Entry], month: YearMonth) -> BTreeMap<u32, f64> {
        let mut totals = BTreeMap::new();
        for entry in Self::month_entries(entries, month) {
            *totals.entry(entry.date.day()).or_insert(0.0) += entry.amount;
        }
        totals
    }

    /// Highest-spend day; ties go to the earliest day.
    fn busiest_day(day_totals: &BTreeMap<u32, f64>) -> Option<DayTotal> {
        day_totals
            .iter()
            .fold(None, |best: Option<DayTotal>, (&day, &amount)| match best {
                Some(current) if current.amount >= amount => Some(current),
                _ => Some(DayTotal { day, amount }),
            })
    }

    /// Category with the highest strictly positive spend across `entries`.
    /// Ties go to the category listed first.
    pub fn top_category(entries: &[Entry]) -> Option<CategoryTotal> {
        Self::category_totals(entries)
            .into_iter()
            .filter(|(_, total)| *total > 0.0)
            .fold(None, |best: Option<CategoryTotal>, (category, total)| match best {
                Some(current) if current.total >= total => Some(current),
                _ => Some(CategoryTotal { category, total }),
            })
    }

    /// Most recently dated entry; among same-day entries the one stored last wins.
    pub fn latest_entry(entries: &[Entry]) -> Option<&Entry> {
        entries.iter().fold(None, |latest: Option<&Entry>, entry| match latest {
            Some(current) if current.date > entry.date => Some(current),
            _ => Some(entry),
        })
    }

    pub fn quick_summary(entries: &[Entry], today: NaiveDate) -> QuickSummary {
        let month = YearMonth::of(today);
        let in_month = Self::month_entries(entries, month);
        let latest = Self::latest_entry(entries).cloned();
        let days_since_latest = latest
            .as_ref()
            .map(|entry| (today - entry.date).num_days().max(0));

        QuickSummary {
            month,
            month_total: total_amount(in_month.iter().copied()),
            month_count: in_month.len(),
            latest,
            days_since_latest,
            top_category: Self::top_category(entries),
        }
    }

    /// Total and count for any displayed list of entries.
    pub fn list_summary(entries: &[Entry]) -> ListSummary {
        ListSummary {
            total: total_amount(entries),
            count: entries.len(),
        }
    }
}
