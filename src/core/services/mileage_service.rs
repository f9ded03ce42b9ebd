//! Fuel-efficiency derivation from consecutive refills of one fuel category.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Category, Entry, QuantityUnit, YearMonth};

use super::summary_service::SummaryService;

/// Unit odometer readings are recorded in.
pub const DISTANCE_UNIT: &str = "km";

/// Efficiency over the interval between two consecutive refills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageRow {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub distance: f64,
    /// Quantity bought at `period_start`, consumed until the next refill.
    pub quantity_used: f64,
    pub unit: QuantityUnit,
    pub average: f64,
}

impl MileageRow {
    /// Average rounded to one decimal place, as displayed.
    pub fn rounded_average(&self) -> f64 {
        round_one_decimal(self.average)
    }

    /// `km/L` or `km/kg`.
    pub fn unit_label(&self) -> String {
        unit_label(self.unit)
    }

    /// Label using the caller's distance unit, e.g. `mi/L`.
    pub fn unit_label_with(&self, distance_unit: &str) -> String {
        unit_label_with(distance_unit, self.unit)
    }
}

/// Mileage series and overall average for one fuel category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MileageReport {
    pub category: Category,
    pub unit: QuantityUnit,
    pub rows: Vec<MileageRow>,
    pub overall_average: Option<f64>,
}

pub struct MileageService;

impl MileageService {
    /// Refills of `category`, oldest first. Same-day refills keep stored order.
    pub fn refills<'a>(entries: &'a [Entry], category: &Category) -> Vec<&'a Entry> {
        let mut refills: Vec<&Entry> = entries
            .iter()
            .filter(|entry| &entry.category == category)
            .collect();
        refills.sort_by_key(|entry| entry.date);
        refills
    }

    /// One row per consecutive refill pair with usable readings.
    ///
    /// An interval is skipped, not reported, when either odometer is unknown,
    /// the earlier refill has no positive quantity, or the odometer did not
    /// strictly increase. Non-fuel categories yield no rows.
    pub fn rows(entries: &[Entry], category: &Category) -> Vec<MileageRow> {
        let Some(unit) = category.quantity_unit() else {
            return Vec::new();
        };
        Self::refills(entries, category)
            .windows(2)
            .filter_map(|pair| Self::interval(pair[0], pair[1], unit))
            .collect()
    }

    fn interval(previous: &Entry, current: &Entry, unit: QuantityUnit) -> Option<MileageRow> {
        let start = previous.odometer()?;
        let end = current.odometer()?;
        let quantity = previous.quantity()?;
        if end <= start {
            return None;
        }
        let distance = end - start;
        Some(MileageRow {
            period_start: previous.date,
            period_end: current.date,
            distance,
            quantity_used: quantity,
            unit,
            average: distance / quantity,
        })
    }

    /// Efficiency across the whole span of `category` refills in `entries`.
    ///
    /// Distance runs from the first to the last refill; the quantity is every
    /// refill except the first (fuel bought at the first refill was consumed
    /// before the span began). `None` unless both are strictly positive.
    pub fn overall_average(entries: &[Entry], category: &Category) -> Option<f64> {
        category.quantity_unit()?;
        let refills = Self::refills(entries, category);
        let (first, rest) = refills.split_first()?;
        let last = rest.last()?;
        let distance = last.odometer()? - first.odometer()?;
        let used: f64 = rest.iter().filter_map(|entry| entry.quantity()).sum();
        (distance > 0.0 && used > 0.0).then(|| distance / used)
    }

    /// Per-fuel-category mileage for refills dated inside `month`.
    pub fn month_report(entries: &[Entry], month: YearMonth) -> Vec<MileageReport> {
        let scoped: Vec<Entry> = SummaryService::month_entries(entries, month)
            .into_iter()
            .cloned()
            .collect();
        Category::FUELS
            .iter()
            .filter_map(|category| {
                let unit = category.quantity_unit()?;
                Some(MileageReport {
                    category: category.clone(),
                    unit,
                    rows: Self::rows(&scoped, category),
                    overall_average: Self::overall_average(&scoped, category),
                })
            })
            .collect()
    }
}

pub fn unit_label(unit: QuantityUnit) -> String {
    unit_label_with(DISTANCE_UNIT, unit)
}

/// `<distance>/<quantity>`; a blank distance unit falls back to [`DISTANCE_UNIT`].
pub fn unit_label_with(distance_unit: &str, unit: QuantityUnit) -> String {
    let distance_unit = match distance_unit.trim() {
        "" => DISTANCE_UNIT,
        label => label,
    };
    format!("{}/{}", distance_unit, unit.symbol())
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn refill(day: u32, category: Category, odo: f64, quantity: f64) -> Entry {
        Entry::new(date(2024, 3, day), category, 500.0)
            .with_odo(odo)
            .with_liters(quantity)
    }

    #[test]
    fn decreasing_odometer_skips_interval() {
        let entries = vec![
            refill(1, Category::Fuel, 100.0, 5.0),
            refill(8, Category::Fuel, 140.0, 4.0),
            refill(15, Category::Fuel, 130.0, 3.0),
        ];
        let rows = MileageService::rows(&entries, &Category::Fuel);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.distance, 40.0);
        assert_eq!(row.quantity_used, 5.0);
        assert_eq!(row.rounded_average(), 8.0);
        assert_eq!(row.period_start, date(2024, 3, 1));
        assert_eq!(row.period_end, date(2024, 3, 8));
        assert_eq!(row.unit_label(), "km/L");
    }

    #[test]
    fn uses_quantity_from_start_of_interval() {
        let entries = vec![
            refill(10, Category::Fuel, 250.0, 2.0),
            refill(1, Category::Fuel, 100.0, 3.0),
        ];
        let rows = MileageService::rows(&entries, &Category::Fuel);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity_used, 3.0);
        assert_eq!(rows[0].average, 50.0);
    }

    #[test]
    fn missing_readings_drop_only_affected_intervals() {
        let mut no_odo = refill(5, Category::Fuel, 0.0, 4.0);
        no_odo.odo = None;
        let mut no_quantity = refill(9, Category::Fuel, 300.0, 0.0);
        no_quantity.liters = None;
        let entries = vec![
            refill(1, Category::Fuel, 100.0, 5.0),
            no_odo,
            no_quantity,
            refill(12, Category::Fuel, 360.0, 4.0),
        ];
        // 1->5 lacks end odo, 5->9 lacks start odo, 9->12 lacks start quantity.
        assert!(MileageService::rows(&entries, &Category::Fuel).is_empty());
    }

    #[test]
    fn categories_are_processed_independently() {
        let entries = vec![
            refill(1, Category::Fuel, 100.0, 5.0),
            refill(2, Category::Cng, 110.0, 2.0),
            refill(3, Category::Fuel, 150.0, 5.0),
            refill(4, Category::Cng, 170.0, 2.0),
        ];
        let fuel = MileageService::rows(&entries, &Category::Fuel);
        let cng = MileageService::rows(&entries, &Category::Cng);
        assert_eq!(fuel.len(), 1);
        assert_eq!(fuel[0].distance, 50.0);
        assert_eq!(cng.len(), 1);
        assert_eq!(cng[0].distance, 60.0);
        assert_eq!(cng[0].average, 30.0);
        assert_eq!(cng[0].unit_label(), "km/kg");
        assert!(MileageService::rows(&entries, &Category::Service).is_empty());
    }

    #[test]
    fn overall_average_excludes_first_refill_quantity() {
        let entries = vec![
            refill(1, Category::Fuel, 1000.0, 6.0),
            refill(10, Category::Fuel, 1180.0, 4.0),
            refill(20, Category::Fuel, 1400.0, 4.0),
        ];
        let average = MileageService::overall_average(&entries, &Category::Fuel).unwrap();
        assert_eq!(average, 50.0);
    }

    #[test]
    fn overall_average_requires_positive_distance_and_quantity() {
        let single = vec![refill(1, Category::Fuel, 1000.0, 6.0)];
        assert_eq!(MileageService::overall_average(&single, &Category::Fuel), None);

        let backwards = vec![
            refill(1, Category::Fuel, 1000.0, 6.0),
            refill(2, Category::Fuel, 900.0, 4.0),
        ];
        assert_eq!(
            MileageService::overall_average(&backwards, &Category::Fuel),
            None
        );

        let mut unknown_quantity = refill(2, Category::Fuel, 1100.0, 0.0);
        unknown_quantity.liters = None;
        let no_quantity = vec![refill(1, Category::Fuel, 1000.0, 6.0), unknown_quantity];
        assert_eq!(
            MileageService::overall_average(&no_quantity, &Category::Fuel),
            None
        );
    }

    #[test]
    fn month_report_covers_each_fuel_category() {
        let entries = vec![
            refill(1, Category::Fuel, 100.0, 5.0),
            refill(20, Category::Fuel, 300.0, 4.0),
            Entry::new(date(2024, 4, 2), Category::Fuel, 500.0)
                .with_odo(600.0)
                .with_liters(5.0),
        ];
        let reports = MileageService::month_report(&entries, YearMonth::new(2024, 3).unwrap());
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].category, Category::Fuel);
        assert_eq!(reports[0].rows.len(), 1);
        assert_eq!(reports[0].overall_average, Some(50.0));
        assert_eq!(reports[1].category, Category::Cng);
        assert!(reports[1].rows.is_empty());
        assert_eq!(reports[1].overall_average, None);
    }

    #[test]
    fn labels_follow_the_given_distance_unit() {
        assert_eq!(unit_label_with("mi", QuantityUnit::Liters), "mi/L");
        assert_eq!(unit_label_with(" ", QuantityUnit::Kilograms), "km/kg");

        let entries = vec![
            refill(1, Category::Cng, 100.0, 2.0),
            refill(5, Category::Cng, 160.0, 2.0),
        ];
        let row = &MileageService::rows(&entries, &Category::Cng)[0];
        assert_eq!(row.unit_label_with("mi"), "mi/kg");
    }

    #[test]
    fn rounding_keeps_one_decimal() {
        assert_eq!(round_one_decimal(42.857), 42.9);
        assert_eq!(round_one_decimal(8.04), 8.0);
    }
}
