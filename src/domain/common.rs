//! Shared traits and calendar-month helpers for ledger entries.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Serialize, Serializer};

use crate::errors::{LedgerError, Result};

/// Supplies a common contract for retrieving monetary amounts.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Sums the amounts of every item in `items`.
pub fn total_amount<'a, T, I>(items: I) -> f64
where
    T: Amounted + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().map(Amounted::amount).sum()
}

/// A validated calendar month used to scope queries.
///
/// Every month-scoped query takes one of these explicitly; nothing in the
/// engine remembers which month is "currently viewed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidInput(format!(
                "month {month} is outside 1-12"
            )));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            LedgerError::InvalidInput(format!("year {year} is outside the supported range"))
        })?;
        Ok(Self { first })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    pub fn year(self) -> i32 {
        self.first.year()
    }

    pub fn month(self) -> u32 {
        self.first.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.first
    }

    pub fn last_day(self) -> NaiveDate {
        self.first + Duration::days(i64::from(self.days()) - 1)
    }

    /// Number of days in the month.
    pub fn days(self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    /// Column of day 1 in a Sunday-first week (Sunday = 0).
    pub fn weekday_offset(self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// Inclusive on both the first and the last day.
    pub fn contains(self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    /// `YYYY-MM`, the prefix shared by every ISO date inside the month.
    pub fn key(self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }

    pub fn date(self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), day)
    }

    pub fn next(self) -> Option<Self> {
        match self.month() {
            12 => Self::new(self.year() + 1, 1).ok(),
            month => Self::new(self.year(), month + 1).ok(),
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self.month() {
            1 => Self::new(self.year() - 1, 12).ok(),
            month => Self::new(self.year(), month - 1).ok(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl FromStr for YearMonth {
    type Err = LedgerError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || LedgerError::InvalidInput(format!("`{value}` is not a YYYY-MM month"));
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
