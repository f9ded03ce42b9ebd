mod common;

use common::{date, entry, refill, setup_test_env};
use ride_ledger::{
    core::services::{
        CalendarService, FilterCriteria, FilterService, MileageService, SortKey, SummaryService,
        TransferService, GRID_SLOTS,
    },
    domain::{Category, EntryDraft, Ledger, YearMonth},
};

fn march() -> YearMonth {
    YearMonth::new(2024, 3).unwrap()
}

#[test]
fn stored_entries_feed_every_view_consistently() {
    let (store, config_manager) = setup_test_env("asha");
    let config = config_manager.load().unwrap();
    for draft in [
        EntryDraft::new("2024-03-01", "Fuel", "450").liters("4.5").odo("1000"),
        EntryDraft::new("2024-03-09", "Service", "1800"),
        EntryDraft::new("2024-03-09", "Other", "120"),
        EntryDraft::new("2024-03-14", "Fuel", "400").liters("4").odo("1210"),
        EntryDraft::new("2024-03-31", "Fuel", "420").liters("4.2").odo("1390"),
        EntryDraft::new("2024-04-01", "Modification", "3000"),
    ] {
        store.add(&draft).expect("valid draft");
    }
    let ledger = store.load();
    let entries = ledger.entries();

    let stats = SummaryService::month_stats(entries, march());
    assert_eq!(stats.count, 5);
    assert_eq!(stats.total, 3190.0);
    assert_eq!(stats.totals[&Category::Fuel], 1270.0);
    assert_eq!(stats.totals[&Category::Modification], 0.0);
    assert_eq!(stats.max_day.map(|d| d.day), Some(9));

    let grid = CalendarService::build(entries, march(), config.calendar_display_cap);
    assert_eq!(grid.cells.len(), GRID_SLOTS);
    assert_eq!(grid.total, stats.total);
    assert_eq!(grid.entry_count, stats.count);
    assert_eq!(
        grid.cells.iter().filter(|cell| cell.day.is_some()).count(),
        31
    );

    let rows = MileageService::rows(entries, &Category::Fuel);
    assert_eq!(rows[0].unit_label_with(&config.distance_unit), "km/L");
    assert_eq!(config.mileage_unit_label(rows[0].unit), "km/L");
    let averages: Vec<f64> = rows.iter().map(|row| row.rounded_average()).collect();
    assert_eq!(averages, [46.7, 45.0]);
    let overall = MileageService::overall_average(entries, &Category::Fuel).unwrap();
    assert!((overall - 390.0 / 8.2).abs() < 1e-9);

    let listed = FilterService::filter_and_sort(
        entries,
        &FilterCriteria::new()
            .month_prefix(march().key())
            .sort(SortKey::AmtDesc),
    );
    assert_eq!(listed.len(), stats.count);
    assert!(listed.windows(2).all(|w| w[0].amount >= w[1].amount));
    let summary = SummaryService::list_summary(&listed);
    assert_eq!(summary.total, stats.total);
}

#[test]
fn month_boundaries_are_inclusive() {
    let entries = vec![
        entry("feb", date(2024, 2, 29), Category::Other, 1.0),
        entry("first", date(2024, 3, 1), Category::Other, 2.0),
        entry("last", date(2024, 3, 31), Category::Other, 4.0),
        entry("apr", date(2024, 4, 1), Category::Other, 8.0),
    ];
    let stats = SummaryService::month_stats(&entries, march());
    let ids: Vec<&str> = stats.list.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["first", "last"]);
    assert_eq!(stats.total, 6.0);
}

#[test]
fn mileage_skips_odometer_rollback() {
    let entries = vec![
        refill("a", date(2024, 3, 1), Category::Fuel, 100.0, 5.0),
        refill("b", date(2024, 3, 8), Category::Fuel, 140.0, 4.0),
        refill("c", date(2024, 3, 15), Category::Fuel, 130.0, 3.0),
    ];
    let rows = MileageService::rows(&entries, &Category::Fuel);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].distance, 40.0);
    assert_eq!(rows[0].quantity_used, 5.0);
    assert_eq!(rows[0].rounded_average(), 8.0);
}

#[test]
fn quick_summary_reflects_the_current_month() {
    let entries = vec![
        entry("old", date(2024, 5, 20), Category::Modification, 4000.0),
        entry("new", date(2024, 6, 1), Category::Fuel, 500.0),
    ];
    let summary = SummaryService::quick_summary(&entries, date(2024, 6, 4));
    assert_eq!(summary.month_count, 1);
    assert_eq!(summary.month_total, 500.0);
    assert_eq!(summary.latest.map(|e| e.id.to_string()), Some("new".into()));
    assert_eq!(summary.days_since_latest, Some(3));
    assert_eq!(
        summary.top_category.map(|top| top.category),
        Some(Category::Modification)
    );

    let empty = SummaryService::quick_summary(&[], date(2024, 6, 4));
    assert!(empty.latest.is_none());
    assert!(empty.days_since_latest.is_none());
    assert!(empty.top_category.is_none());
}

#[test]
fn exported_backup_restores_every_view() {
    let ledger = Ledger::from_entries(vec![
        refill("a", date(2024, 3, 1), Category::Cng, 100.0, 2.0),
        refill("b", date(2024, 3, 6), Category::Cng, 160.0, 2.0),
        entry("c", date(2024, 3, 6), Category::Custom("Insurance".into()), 2100.0),
    ]);
    let bytes = TransferService::export(&ledger).unwrap();
    let restored = TransferService::import(&bytes).unwrap();
    assert_eq!(restored, ledger);

    let before = SummaryService::month_stats(ledger.entries(), march());
    let after = SummaryService::month_stats(restored.entries(), march());
    assert_eq!(before, after);
    assert_eq!(
        MileageService::rows(restored.entries(), &Category::Cng)[0].unit_label(),
        "km/kg"
    );
}
