//! Category/month filtering and ordering of entry lists.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Category, Entry},
    errors::{LedgerError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    DateDesc,
    DateAsc,
    AmtDesc,
    AmtAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::AmtDesc,
        SortKey::AmtAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DateDesc => "date_desc",
            SortKey::DateAsc => "date_asc",
            SortKey::AmtDesc => "amt_desc",
            SortKey::AmtAsc => "amt_asc",
        }
    }

    fn sort(self, entries: &mut [Entry]) {
        match self {
            SortKey::DateDesc => entries.sort_by(|a, b| b.date.cmp(&a.date)),
            SortKey::DateAsc => entries.sort_by(|a, b| a.date.cmp(&b.date)),
            SortKey::AmtDesc => entries.sort_by(|a, b| b.amount.total_cmp(&a.amount)),
            SortKey::AmtAsc => entries.sort_by(|a, b| a.amount.total_cmp(&b.amount)),
        }
    }
}

impl FromStr for SortKey {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| LedgerError::InvalidInput(format!("unknown sort key `{value}`")))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the list view asks for. Absent fields do not constrain or reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    /// Matched against the start of the ISO date, e.g. `2024-03`.
    pub month_prefix: Option<String>,
    pub sort: Option<SortKey>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn month_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.month_prefix = Some(prefix.into());
        self
    }

    pub fn sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Builds criteria from raw form values.
    ///
    /// Blank fields mean "no constraint"; an unrecognised sort key leaves the
    /// list in stored order.
    pub fn from_form(category: &str, month: &str, sort: &str) -> Self {
        let non_blank = |raw: &str| Some(raw.trim()).filter(|v| !v.is_empty()).map(str::to_string);
        Self {
            category: non_blank(category).map(Category::from),
            month_prefix: non_blank(month),
            sort: sort.parse().ok(),
        }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        let category_ok = self
            .category
            .as_ref()
            .map_or(true, |category| &entry.category == category);
        let month_ok = self
            .month_prefix
            .as_deref()
            .map_or(true, |prefix| entry.date_key().starts_with(prefix));
        category_ok && month_ok
    }
}

pub struct FilterService;

impl FilterService {
    /// Returns a filtered, ordered copy; `entries` is left as is.
    /// Sorting is stable, so ties keep stored order.
    pub fn filter_and_sort(entries: &[Entry], criteria: &FilterCriteria) -> Vec<Entry> {
        let mut selected: Vec<Entry> = entries
            .iter()
            .filter(|entry| criteria.matches(entry))
            .cloned()
            .collect();
        if let Some(sort) = criteria.sort {
            sort.sort(&mut selected);
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: &str, (y, m, d): (i32, u32, u32), category: Category, amount: f64) -> Entry {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Entry::new(date, category, amount).with_id(id)
    }

    fn sample() -> Vec<Entry> {
        vec![
            entry("a", (2024, 3, 3), Category::Fuel, 400.0),
            entry("b", (2024, 3, 9), Category::Service, 1200.0),
            entry("c", (2024, 2, 27), Category::Fuel, 380.0),
            entry("d", (2024, 3, 15), Category::Fuel, 420.0),
            entry("e", (2024, 3, 15), Category::Other, 60.0),
            entry("f", (2023, 3, 20), Category::Fuel, 300.0),
            entry("g", (2024, 3, 28), Category::Fuel, 400.0),
            entry("h", (2024, 4, 1), Category::Modification, 2500.0),
            entry("i", (2024, 3, 31), Category::Cng, 150.0),
            entry("j", (2024, 3, 1), Category::Fuel, 410.0),
        ]
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn category_and_month_compose() {
        let criteria = FilterCriteria::new()
            .category(Category::Fuel)
            .month_prefix("2024-03")
            .sort(SortKey::AmtDesc);
        let result = FilterService::filter_and_sort(&sample(), &criteria);
        assert_eq!(ids(&result), ["d", "j", "a", "g"]);
        assert!(result.windows(2).all(|w| w[0].amount >= w[1].amount));
        assert!(result
            .iter()
            .all(|e| e.category == Category::Fuel && e.date_key().starts_with("2024-03")));
    }

    #[test]
    fn no_criteria_returns_everything_in_stored_order() {
        let entries = sample();
        let result = FilterService::filter_and_sort(&entries, &FilterCriteria::default());
        assert_eq!(result, entries);
    }

    #[test]
    fn date_sorts_are_stable() {
        let entries = sample();
        let asc = FilterService::filter_and_sort(
            &entries,
            &FilterCriteria::new().month_prefix("2024-03").sort(SortKey::DateAsc),
        );
        assert_eq!(ids(&asc), ["j", "a", "b", "d", "e", "g", "i"]);

        let desc = FilterService::filter_and_sort(
            &entries,
            &FilterCriteria::new().month_prefix("2024-03").sort(SortKey::DateDesc),
        );
        assert_eq!(ids(&desc), ["i", "g", "d", "e", "b", "a", "j"]);
    }

    #[test]
    fn amount_ascending_orders_whole_ledger() {
        let result =
            FilterService::filter_and_sort(&sample(), &FilterCriteria::new().sort(SortKey::AmtAsc));
        assert_eq!(result.first().map(|e| e.id.as_str()), Some("e"));
        assert_eq!(result.last().map(|e| e.id.as_str()), Some("h"));
        assert!(result.windows(2).all(|w| w[0].amount <= w[1].amount));
    }

    #[test]
    fn year_prefix_matches_whole_year() {
        let result = FilterService::filter_and_sort(
            &sample(),
            &FilterCriteria::new().month_prefix("2023"),
        );
        assert_eq!(ids(&result), ["f"]);
    }

    #[test]
    fn form_values_treat_blank_and_unknown_as_absent() {
        let criteria = FilterCriteria::from_form(" ", "", "newest");
        assert_eq!(criteria, FilterCriteria::default());

        let criteria = FilterCriteria::from_form("CNG", "2024-03", "amt_asc");
        assert_eq!(criteria.category, Some(Category::Cng));
        assert_eq!(criteria.month_prefix.as_deref(), Some("2024-03"));
        assert_eq!(criteria.sort, Some(SortKey::AmtAsc));
    }

    #[test]
    fn sort_keys_parse_and_display() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("amount".parse::<SortKey>().is_err());
    }
}
