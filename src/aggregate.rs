// Per-view aggregation of the filtered records into daily and total tables.
//
// Input quantities arrive wide (one column per measure) and may repeat because
// of upstream joins, so they are deduplicated before summing. Output
// quantities and working hours arrive long (one `QTY_TYPE_NAME` per row) and
// are pivoted into the Plan/Target/Actual columns.
use crate::error::{ReportError, ReportResult};
use crate::phase::{PhaseGroup, UnknownPhasePolicy};
use crate::types::{
    Column, DailyKey, MaterialView, Measures, QtyType, Record, RecordSet, Summaries, Summary,
};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Build the daily and total summaries for one material view.
///
/// Fails with [`ReportError::Schema`] when the record set lacks a column the
/// view reads from.
pub fn aggregate(
    records: &RecordSet,
    view: MaterialView,
    policy: UnknownPhasePolicy,
) -> ReportResult<Summaries> {
    let missing = records.missing_columns(view.required_columns());
    if !missing.is_empty() {
        return Err(ReportError::Schema { missing });
    }

    let rows = classify_rows(records, policy);
    let summaries = match view {
        MaterialView::Input => aggregate_input(&rows),
        MaterialView::Output => pivot_long(&rows, |r| r.qty),
        MaterialView::WorkingHours => pivot_long(&rows, Record::working_hours),
    };

    debug!(
        view = view.label(),
        records = records.len(),
        daily_rows = summaries.daily.len(),
        total_rows = summaries.total.len(),
        "aggregated view"
    );
    Ok(summaries)
}

type ClassifiedRow<'a> = (Option<PhaseGroup>, &'a Record);

fn classify_rows(records: &RecordSet, policy: UnknownPhasePolicy) -> Vec<ClassifiedRow<'_>> {
    let mut unknown = 0usize;
    let rows: Vec<_> = records
        .records()
        .iter()
        .map(|r| {
            let group = policy.group(&r.phase_code);
            if !matches!(group, Some(PhaseGroup::Named(_))) {
                unknown += 1;
            }
            (group, r)
        })
        .collect();

    if unknown > 0 {
        debug!(rows = unknown, ?policy, "classified rows with unrecognized phase codes");
    }
    rows
}

// Daily rows count each (order, sku, date, phase) once; totals count each
// (order, sku) once across the whole range, keeping its first phase.
fn aggregate_input(rows: &[ClassifiedRow<'_>]) -> Summaries {
    let mut seen_daily = HashSet::new();
    let mut daily: BTreeMap<DailyKey, Measures> = BTreeMap::new();
    for (group, r) in rows {
        if !seen_daily.insert((r.order_id.as_str(), r.sku_code.as_str(), r.start_date, *group)) {
            continue;
        }
        let Some(phase) = group else { continue };
        let entry = daily.entry(DailyKey::new(r.start_date, *phase)).or_default();
        for column in Column::ALL {
            entry.accumulate(column, r.quantity(column));
        }
    }

    let mut seen_total = HashSet::new();
    let mut total: BTreeMap<PhaseGroup, Measures> = BTreeMap::new();
    for (group, r) in rows {
        if !seen_total.insert((r.order_id.as_str(), r.sku_code.as_str())) {
            continue;
        }
        let Some(phase) = group else { continue };
        let entry = total.entry(*phase).or_default();
        for column in Column::ALL {
            entry.accumulate(column, r.quantity(column));
        }
    }

    Summaries {
        daily: daily.into_iter().collect(),
        total: total.into_iter().collect(),
    }
}

fn pivot_long<F>(rows: &[ClassifiedRow<'_>], value: F) -> Summaries
where
    F: Fn(&Record) -> Option<f64>,
{
    let mut daily_keys = BTreeSet::new();
    let mut total_keys = BTreeSet::new();
    let mut daily_cells: HashMap<(DailyKey, Column), f64> = HashMap::new();
    let mut total_cells: HashMap<(PhaseGroup, Column), f64> = HashMap::new();
    let mut skipped = 0usize;

    for (group, r) in rows {
        let Some(phase) = group else { continue };
        let Some(kind) = r.qty_type else {
            skipped += 1;
            continue;
        };
        let key = DailyKey::new(r.start_date, *phase);
        daily_keys.insert(key);
        total_keys.insert(*phase);
        let QtyType::Measure(column) = kind else { continue };

        let v = value(*r).unwrap_or(0.0);
        *daily_cells.entry((key, column)).or_insert(0.0) += v;
        *total_cells.entry((*phase, column)).or_insert(0.0) += v;
    }

    if skipped > 0 {
        debug!(rows = skipped, "rows without a quantity type");
    }

    Summaries {
        daily: widen(daily_keys, &daily_cells),
        total: widen(total_keys, &total_cells),
    }
}

/// One row per key, reading each column from the `(key, column) -> value`
/// map. Columns that never received a value are 0.
fn widen<K: Ord + Copy + std::hash::Hash>(
    keys: BTreeSet<K>,
    cells: &HashMap<(K, Column), f64>,
) -> Summary<K> {
    keys.into_iter()
        .map(|key| {
            let row = Measures::from_fn(|c| cells.get(&(key, c)).copied().unwrap_or(0.0));
            (key, row)
        })
        .collect()
}
