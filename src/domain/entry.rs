//! Domain types representing recorded vehicle expenses.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    domain::common::Amounted,
    errors::{LedgerError, Result},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque identifier assigned to an entry when it is first recorded.
///
/// Identifiers coming from imported files are kept verbatim, so no format is
/// assumed beyond "a string".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(format!("id_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expense categories. `Fuel` and `CNG` carry quantity and odometer data.
///
/// Labels that are not one of the built-in categories are preserved as
/// `Custom` so older or hand-edited ledgers survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Fuel,
    Cng,
    Service,
    Modification,
    Other,
    Custom(String),
}

impl Category {
    /// Built-in categories in display order.
    pub const KNOWN: [Category; 5] = [
        Category::Fuel,
        Category::Cng,
        Category::Service,
        Category::Modification,
        Category::Other,
    ];

    pub const FUELS: [Category; 2] = [Category::Fuel, Category::Cng];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Fuel => "Fuel",
            Category::Cng => "CNG",
            Category::Service => "Service",
            Category::Modification => "Modification",
            Category::Other => "Other",
            Category::Custom(label) => label,
        }
    }

    pub fn is_fuel(&self) -> bool {
        self.quantity_unit().is_some()
    }

    /// Physical unit a refill of this category is measured in.
    pub fn quantity_unit(&self) -> Option<QuantityUnit> {
        match self {
            Category::Fuel => Some(QuantityUnit::Liters),
            Category::Cng => Some(QuantityUnit::Kilograms),
            _ => None,
        }
    }
}

/// Exact label match; labels are stored verbatim, so any trimming of user
/// input happens in [`EntryDraft::to_entry`].
impl From<&str> for Category {
    fn from(value: &str) -> Self {
        match value {
            "Fuel" => Category::Fuel,
            "CNG" => Category::Cng,
            "Service" => Category::Service,
            "Modification" => Category::Modification,
            "Other" => Category::Other,
            other => Category::Custom(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Category::from(value.as_str())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Custom(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityUnit {
    Liters,
    Kilograms,
}

impl QuantityUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            QuantityUnit::Liters => "L",
            QuantityUnit::Kilograms => "kg",
        }
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One recorded expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub category: Category,
    pub amount: f64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub liters: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub odo: Option<f64>,
}

impl Entry {
    pub fn new(date: NaiveDate, category: Category, amount: f64) -> Self {
        Self {
            id: EntryId::generate(),
            date,
            category,
            amount,
            notes: None,
            liters: None,
            odo: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<EntryId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_liters(mut self, liters: f64) -> Self {
        self.liters = Some(liters);
        self
    }

    pub fn with_odo(mut self, odo: f64) -> Self {
        self.odo = Some(odo);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Purchased quantity, present only for fuel categories with a finite,
    /// positive reading. Unknown is never reported as zero.
    pub fn quantity(&self) -> Option<f64> {
        if !self.category.is_fuel() {
            return None;
        }
        self.liters.filter(|value| value.is_finite() && *value > 0.0)
    }

    /// Odometer reading, present only for fuel categories. Zero is a valid reading.
    pub fn odometer(&self) -> Option<f64> {
        if !self.category.is_fuel() {
            return None;
        }
        self.odo.filter(|value| value.is_finite() && *value >= 0.0)
    }

    /// ISO `YYYY-MM-DD` form of the entry date.
    pub fn date_key(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

impl Amounted for Entry {
    fn amount(&self) -> f64 {
        self.amount
    }
}

/// Raw form input for a new or edited entry.
///
/// Every field is kept as the text the user typed; [`EntryDraft::to_entry`]
/// is the only path from form input to an [`Entry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: String,
    pub category: String,
    pub amount: String,
    #[serde(default)]
    pub liters: String,
    #[serde(default)]
    pub odo: String,
    #[serde(default)]
    pub notes: String,
}

impl EntryDraft {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    pub fn liters(mut self, liters: impl Into<String>) -> Self {
        self.liters = liters.into();
        self
    }

    pub fn odo(mut self, odo: impl Into<String>) -> Self {
        self.odo = odo.into();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Pre-fills a draft from a stored entry, as an edit form would.
    pub fn from_entry(entry: &Entry) -> Self {
        let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            date: entry.date_key(),
            category: entry.category.to_string(),
            amount: entry.amount.to_string(),
            liters: number(entry.liters),
            odo: number(entry.odo),
            notes: entry.notes.clone().unwrap_or_default(),
        }
    }

    /// Validates the draft and builds an entry carrying `id`.
    ///
    /// Quantity and odometer are dropped for non-fuel categories; blank or
    /// non-numeric values become "unknown", never zero.
    pub fn to_entry(&self, id: EntryId) -> Result<Entry> {
        let raw_date = self.date.trim();
        if raw_date.is_empty() {
            return Err(LedgerError::Validation("date is required".into()));
        }
        let date = NaiveDate::parse_from_str(raw_date, DATE_FORMAT).map_err(|_| {
            LedgerError::Validation(format!("date `{raw_date}` is not a YYYY-MM-DD date"))
        })?;

        let raw_category = self.category.trim();
        if raw_category.is_empty() {
            return Err(LedgerError::Validation("category is required".into()));
        }
        let category = Category::from(raw_category);

        let amount = parse_optional_number(&self.amount)
            .filter(|value| *value > 0.0)
            .ok_or_else(|| {
                LedgerError::Validation(format!(
                    "amount `{}` must be a number greater than zero",
                    self.amount.trim()
                ))
            })?;

        let (liters, odo) = if category.is_fuel() {
            (
                parse_optional_number(&self.liters).filter(|value| *value > 0.0),
                parse_optional_number(&self.odo).filter(|value| *value >= 0.0),
            )
        } else {
            (None, None)
        };

        let notes = Some(self.notes.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Ok(Entry {
            id,
            date,
            category,
            amount,
            notes,
            liters,
            odo,
        })
    }
}

/// Parses a user- or file-supplied number.
///
/// Blank, non-numeric and non-finite input yields `None` rather than zero.
pub fn parse_optional_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Accepts numbers, numeric strings and null for optional measurements.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number.as_f64().filter(|v| v.is_finite()),
        Some(Value::String(text)) => parse_optional_number(&text),
        _ => None,
    })
}
