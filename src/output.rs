use crate::error::ReportResult;
use crate::reports::{daily_rows, generate_summary, total_rows, ProductivityReport};
use crate::types::{DailySummary, TotalSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> ReportResult<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> ReportResult<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Files written for one report, in the order they are produced.
pub const DAILY_FILES: [&str; 5] = [
    "input_daily_summary.csv",
    "output_daily_summary.csv",
    "working_hours_daily_summary.csv",
    "input_daily_productivity.csv",
    "output_daily_productivity.csv",
];
pub const TOTAL_FILES: [&str; 5] = [
    "input_total_summary.csv",
    "output_total_summary.csv",
    "working_hours_total_summary.csv",
    "total_input_productivity.csv",
    "total_output_productivity.csv",
];
pub const TRENDS_FILE: &str = "productivity_trends.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Write every table plus the chart series and summary into `dir`.
pub fn write_report(
    report: &ProductivityReport,
    records_loaded: usize,
    dir: &Path,
) -> ReportResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let daily: [&DailySummary; 5] = [
        &report.input.daily,
        &report.output.daily,
        &report.working_hours.daily,
        &report.input_productivity,
        &report.output_productivity,
    ];
    for (name, table) in DAILY_FILES.iter().zip(daily) {
        let path = dir.join(name);
        write_csv(&path, &daily_rows(table))?;
        written.push(path);
    }

    let totals: [&TotalSummary; 5] = [
        &report.input.total,
        &report.output.total,
        &report.working_hours.total,
        &report.total_input_productivity,
        &report.total_output_productivity,
    ];
    for (name, table) in TOTAL_FILES.iter().zip(totals) {
        let path = dir.join(name);
        write_csv(&path, &total_rows(table))?;
        written.push(path);
    }

    let trends = dir.join(TRENDS_FILE);
    write_json(&trends, &[&report.input_trends, &report.output_trends])?;
    written.push(trends);

    let summary = dir.join(SUMMARY_FILE);
    write_json(&summary, &generate_summary(report, records_loaded))?;
    written.push(summary);

    debug!(dir = %dir.display(), files = written.len(), "report files written");
    Ok(written)
}
