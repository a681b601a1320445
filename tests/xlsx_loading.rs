use chrono::NaiveDate;
use phase_productivity::cache::DatasetCache;
use phase_productivity::loader::load_path;
use phase_productivity::phase::{Phase, PhaseGroup};
use phase_productivity::types::{columns, Column, Measures, QtyType};
use phase_productivity::{build_report, logging, DateRange, ReportError, UnknownPhasePolicy};
use std::path::PathBuf;

// Sheet "Orders" (first): padded headers, native date cells (one with a time
// of day), a `NULL` text cell and a `#N/A` error cell in the hour columns.
// Sheet "Archive": plain headers, one row dated as text.
fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/production_orders.xlsx")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn first_sheet_is_read_by_default() {
    logging::init_test();
    let ds = load_path(&fixture(), None).unwrap();
    assert_eq!(ds.report.total_rows, 2);
    assert_eq!(ds.report.loaded_rows, 2);
    assert_eq!(ds.report.parse_errors, 0);
    assert!(ds.records.missing_columns(&columns::ALL).is_empty());

    let first = &ds.records.records()[0];
    assert_eq!(first.order_id, "1001");
    assert_eq!(first.sku_code, "SKU-A");
    assert_eq!(first.phase(), Some(Phase::Cutting));
    assert_eq!(first.qty_type, Some(QtyType::Measure(Column::Actual)));
    assert_eq!(first.working_hours(), Some(2.0));
}

#[test]
fn native_date_cells_are_truncated_to_the_day() {
    let ds = load_path(&fixture(), None).unwrap();
    let dates: Vec<_> = ds.records.records().iter().map(|r| r.start_date).collect();
    assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 2)]);
    assert_eq!(
        ds.report.date_bounds,
        Some((date(2024, 5, 1), date(2024, 5, 2)))
    );
}

#[test]
fn null_and_error_cells_read_as_absent() {
    let ds = load_path(&fixture(), None).unwrap();
    let second = &ds.records.records()[1];
    assert_eq!(second.plan_qty, Some(20.0));
    assert_eq!(second.working_hours_plan_l3, None);
    assert_eq!(second.working_hours_plan_l4, None);
}

#[test]
fn named_sheet_is_selected() {
    let ds = load_path(&fixture(), Some("Archive")).unwrap();
    assert_eq!(ds.records.len(), 1);
    let r = &ds.records.records()[0];
    assert_eq!(r.order_id, "2001");
    assert_eq!(r.start_date, date(2023, 12, 31));
    assert_eq!(r.phase(), Some(Phase::Slaughtering));
}

#[test]
fn unknown_sheet_is_an_error() {
    match load_path(&fixture(), Some("Summary")) {
        Err(ReportError::SheetNotFound(name)) => assert_eq!(name, "Summary"),
        other => panic!("expected missing sheet, got {other:?}"),
    }
}

#[test]
fn workbook_report_keeps_rows_with_blank_hours() {
    let mut cache = DatasetCache::new();
    let data = cache.load(&fixture(), None).unwrap();
    let report = build_report(
        &data.records,
        DateRange::new(date(2024, 5, 1), date(2024, 5, 2)),
        UnknownPhasePolicy::Group,
    )
    .unwrap();

    let cutting = PhaseGroup::Named(Phase::Cutting);
    let deboning = PhaseGroup::Named(Phase::Deboning);
    assert_eq!(
        report.input.total.get(&deboning),
        Some(&Measures::new(20.0, 20.0, 20.0))
    );
    assert_eq!(
        report.output.total.get(&cutting),
        Some(&Measures::new(0.0, 0.0, 50.0))
    );
    assert_eq!(report.working_hours.total.get(&deboning), Some(&Measures::default()));
    // 2h over 50 units
    assert_eq!(report.total_output_productivity.get(&cutting).unwrap().actual, 144.0);
}
