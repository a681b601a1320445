use crate::aggregate::aggregate;
use crate::charts::{all_phase_trends, TrendChart};
use crate::error::{ReportError, ReportResult};
use crate::filter::{filter_by_date, DateRange};
use crate::phase::{PhaseGroup, UnknownPhasePolicy};
use crate::productivity::compute_productivity;
use crate::types::{
    columns, DailyKey, DailySummary, DailySummaryRow, MaterialView, Measures, PhaseProductivity,
    ProductivityTable, RecordSet, Summaries, SummaryStats, TotalSummary, TotalSummaryRow,
};
use crate::util::format_number;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Every table and chart produced for one date range.
#[derive(Debug, Clone)]
pub struct ProductivityReport {
    pub range: DateRange,
    pub records_in_range: usize,
    pub input: Summaries,
    pub output: Summaries,
    pub working_hours: Summaries,
    pub input_productivity: ProductivityTable<DailyKey>,
    pub output_productivity: ProductivityTable<DailyKey>,
    pub total_input_productivity: ProductivityTable<PhaseGroup>,
    pub total_output_productivity: ProductivityTable<PhaseGroup>,
    pub input_trends: TrendChart,
    pub output_trends: TrendChart,
}

/// Filter, aggregate all three views and derive productivity against working hours.
///
/// The header is checked up front so a schema problem names every missing
/// column at once and no partial report is produced.
pub fn build_report(
    records: &RecordSet,
    range: DateRange,
    policy: UnknownPhasePolicy,
) -> ReportResult<ProductivityReport> {
    let missing = records.missing_columns(&columns::ALL);
    if !missing.is_empty() {
        return Err(ReportError::Schema { missing });
    }

    let filtered = filter_by_date(records, range.start, range.end);
    let unknown = filtered.unknown_phase_rows();
    if unknown > 0 {
        warn!(rows = unknown, ?policy, "rows with unrecognized phase codes");
    }
    let input = aggregate(&filtered, MaterialView::Input, policy)?;
    let output = aggregate(&filtered, MaterialView::Output, policy)?;
    let working_hours = aggregate(&filtered, MaterialView::WorkingHours, policy)?;

    let input_productivity = compute_productivity(&input.daily, &working_hours.daily);
    let output_productivity = compute_productivity(&output.daily, &working_hours.daily);
    let total_input_productivity = compute_productivity(&input.total, &working_hours.total);
    let total_output_productivity = compute_productivity(&output.total, &working_hours.total);

    info!(
        start = %range.start,
        end = %range.end,
        records = filtered.len(),
        phases = total_input_productivity.len(),
        "report generated"
    );

    Ok(ProductivityReport {
        range,
        records_in_range: filtered.len(),
        input_trends: all_phase_trends(&input_productivity, "Input"),
        output_trends: all_phase_trends(&output_productivity, "Output"),
        input,
        output,
        working_hours,
        input_productivity,
        output_productivity,
        total_input_productivity,
        total_output_productivity,
    })
}

pub fn daily_rows(table: &DailySummary) -> Vec<DailySummaryRow> {
    table
        .iter()
        .map(|(key, m)| DailySummaryRow {
            date: key.date.format("%Y-%m-%d").to_string(),
            phase: key.phase.to_string(),
            plan: format_number(m.plan, 2),
            target: format_number(m.target, 2),
            actual: format_number(m.actual, 2),
        })
        .collect()
}

pub fn total_rows(table: &TotalSummary) -> Vec<TotalSummaryRow> {
    table
        .iter()
        .map(|(phase, m)| TotalSummaryRow {
            phase: phase.to_string(),
            plan: format_number(m.plan, 2),
            target: format_number(m.target, 2),
            actual: format_number(m.actual, 2),
        })
        .collect()
}

pub fn generate_summary(report: &ProductivityReport, records_loaded: usize) -> SummaryStats {
    let phases: BTreeSet<PhaseGroup> = report
        .total_input_productivity
        .keys()
        .chain(report.total_output_productivity.keys())
        .copied()
        .collect();
    let lookup = |table: &ProductivityTable<PhaseGroup>, phase: &PhaseGroup| {
        table.get(phase).copied().unwrap_or_else(Measures::default)
    };
    SummaryStats {
        records_loaded,
        records_in_range: report.records_in_range,
        start_date: report.range.start,
        end_date: report.range.end,
        phases: phases
            .iter()
            .map(|phase| PhaseProductivity {
                phase: *phase,
                input: lookup(&report.total_input_productivity, phase),
                output: lookup(&report.total_output_productivity, phase),
            })
            .collect(),
    }
}
