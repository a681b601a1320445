use crate::phase::{classify_phase, Phase, PhaseGroup};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tabled::Tabled;

/// Column names of the production-order export.
pub mod columns {
    pub const ORDER_NUMBER: &str = "ORDER_NUMBER";
    pub const SKU_CODE: &str = "SKU_CODE";
    pub const BASIC_START_DATE: &str = "BASIC_START_DATE";
    pub const DISASSEMBLY_FAZE: &str = "DISASSEMBLY_FAZE";
    pub const PLAN_QTY: &str = "PLAN_QTY";
    pub const TARGET_QTY: &str = "TARGET_QTY";
    pub const ACTUAL_QTY: &str = "ACTUAL_QTY";
    pub const QTY_TYPE_NAME: &str = "QTY_TYPE_NAME";
    pub const QTY: &str = "QTY";
    pub const WORKING_HOURS_PLAN_L3: &str = "Working_hours_Plan_L3";
    pub const WORKING_HOURS_PLAN_L4: &str = "Working_hours_Plan_L4";

    pub const ALL: [&str; 11] = [
        ORDER_NUMBER,
        SKU_CODE,
        BASIC_START_DATE,
        DISASSEMBLY_FAZE,
        PLAN_QTY,
        TARGET_QTY,
        ACTUAL_QTY,
        QTY_TYPE_NAME,
        QTY,
        WORKING_HOURS_PLAN_L3,
        WORKING_HOURS_PLAN_L4,
    ];
}

/// The three measure columns every summary carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Column {
    Plan,
    Target,
    Actual,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Plan, Column::Target, Column::Actual];

    /// Map a `QTY_TYPE_NAME` label onto its column.
    pub fn from_qty_type(label: &str) -> Option<Column> {
        match label.trim() {
            "PLAN" => Some(Column::Plan),
            "TARGET" => Some(Column::Target),
            "ACTUAL" => Some(Column::Actual),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Column::Plan => "Plan",
            Column::Target => "Target",
            Column::Actual => "Actual",
        }
    }
}

/// A non-blank `QTY_TYPE_NAME` label. Labels other than PLAN/TARGET/ACTUAL
/// (e.g. `SCRAP`) still put their key into the pivot, with nothing to add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QtyType {
    Measure(Column),
    Other,
}

impl QtyType {
    /// `None` for a blank label.
    pub fn parse(label: &str) -> Option<QtyType> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(Column::from_qty_type(label).map_or(QtyType::Other, QtyType::Measure))
    }
}

/// Which numbers feed an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialView {
    Input,
    Output,
    WorkingHours,
}

impl MaterialView {
    pub const ALL: [MaterialView; 3] = [
        MaterialView::Input,
        MaterialView::Output,
        MaterialView::WorkingHours,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MaterialView::Input => "Input",
            MaterialView::Output => "Output",
            MaterialView::WorkingHours => "Working Hours",
        }
    }

    pub fn required_columns(&self) -> &'static [&'static str] {
        use columns::*;
        match self {
            MaterialView::Input => &[
                ORDER_NUMBER,
                SKU_CODE,
                BASIC_START_DATE,
                DISASSEMBLY_FAZE,
                PLAN_QTY,
                TARGET_QTY,
                ACTUAL_QTY,
            ],
            MaterialView::Output => &[BASIC_START_DATE, DISASSEMBLY_FAZE, QTY_TYPE_NAME, QTY],
            MaterialView::WorkingHours => &[
                BASIC_START_DATE,
                DISASSEMBLY_FAZE,
                QTY_TYPE_NAME,
                WORKING_HOURS_PLAN_L3,
                WORKING_HOURS_PLAN_L4,
            ],
        }
    }
}

/// One cleaned row of the export. Empty numeric cells stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub order_id: String,
    pub sku_code: String,
    pub start_date: NaiveDate,
    pub phase_code: String,
    pub plan_qty: Option<f64>,
    pub target_qty: Option<f64>,
    pub actual_qty: Option<f64>,
    pub qty_type: Option<QtyType>,
    pub qty: Option<f64>,
    pub working_hours_plan_l3: Option<f64>,
    pub working_hours_plan_l4: Option<f64>,
}

impl Record {
    pub fn phase(&self) -> Option<Phase> {
        classify_phase(&self.phase_code)
    }

    /// L3 + L4 hours. Absent when either operand is absent.
    pub fn working_hours(&self) -> Option<f64> {
        Some(self.working_hours_plan_l3? + self.working_hours_plan_l4?)
    }

    pub fn quantity(&self, column: Column) -> Option<f64> {
        match column {
            Column::Plan => self.plan_qty,
            Column::Target => self.target_qty,
            Column::Actual => self.actual_qty,
        }
    }
}

/// Records together with the header columns they were read from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    columns: BTreeSet<String>,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new<I, S>(columns: I, records: Vec<Record>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            records,
        }
    }

    /// A record set carrying the full export header.
    pub fn with_all_columns(records: Vec<Record>) -> Self {
        Self::new(columns::ALL, records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn columns(&self) -> &BTreeSet<String> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Required columns absent from the header, in the order they were asked for.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|c| !self.columns.contains(**c))
            .map(|c| c.to_string())
            .collect()
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.start_date).min()?;
        let max = self.records.iter().map(|r| r.start_date).max()?;
        Some((min, max))
    }

    /// Records whose phase code is not in the phase table.
    pub fn unknown_phase_rows(&self) -> usize {
        self.records.iter().filter(|r| r.phase().is_none()).count()
    }
}

/// Plan/Target/Actual values of one summary row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Measures {
    #[serde(rename = "Plan")]
    pub plan: f64,
    #[serde(rename = "Target")]
    pub target: f64,
    #[serde(rename = "Actual")]
    pub actual: f64,
}

impl Measures {
    pub fn new(plan: f64, target: f64, actual: f64) -> Self {
        Self {
            plan,
            target,
            actual,
        }
    }

    pub fn from_fn<F: FnMut(Column) -> f64>(mut f: F) -> Self {
        Self::new(f(Column::Plan), f(Column::Target), f(Column::Actual))
    }

    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Plan => self.plan,
            Column::Target => self.target,
            Column::Actual => self.actual,
        }
    }

    pub fn get_mut(&mut self, column: Column) -> &mut f64 {
        match column {
            Column::Plan => &mut self.plan,
            Column::Target => &mut self.target,
            Column::Actual => &mut self.actual,
        }
    }

    /// Add a possibly-missing value; `None` leaves the cell unchanged.
    pub fn accumulate(&mut self, column: Column, value: Option<f64>) {
        if let Some(v) = value {
            *self.get_mut(column) += v;
        }
    }
}

impl std::ops::Add for Measures {
    type Output = Measures;

    fn add(self, rhs: Measures) -> Measures {
        Measures::from_fn(|c| self.get(c) + rhs.get(c))
    }
}

/// Grouping key of the daily tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DailyKey {
    pub date: NaiveDate,
    pub phase: PhaseGroup,
}

impl DailyKey {
    pub fn new(date: NaiveDate, phase: PhaseGroup) -> Self {
        Self { date, phase }
    }
}

/// Plan/Target/Actual rows keyed by `K`, iterated in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary<K: Ord> {
    rows: BTreeMap<K, Measures>,
}

impl<K: Ord> Default for Summary<K> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Summary<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&Measures> {
        self.rows.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Measures)> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K: Ord> FromIterator<(K, Measures)> for Summary<K> {
    fn from_iter<T: IntoIterator<Item = (K, Measures)>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

pub type DailySummary = Summary<DailyKey>;
pub type TotalSummary = Summary<PhaseGroup>;

/// Seconds of labor per unit, shaped like the summaries it was derived from.
pub type ProductivityTable<K> = Summary<K>;

/// Daily and total tables of one material view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summaries {
    pub daily: DailySummary,
    pub total: TotalSummary,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailySummaryRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Phase")]
    #[tabled(rename = "Phase")]
    pub phase: String,
    #[serde(rename = "Plan")]
    #[tabled(rename = "Plan")]
    pub plan: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Actual")]
    #[tabled(rename = "Actual")]
    pub actual: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TotalSummaryRow {
    #[serde(rename = "Phase")]
    #[tabled(rename = "Phase")]
    pub phase: String,
    #[serde(rename = "Plan")]
    #[tabled(rename = "Plan")]
    pub plan: String,
    #[serde(rename = "Target")]
    #[tabled(rename = "Target")]
    pub target: String,
    #[serde(rename = "Actual")]
    #[tabled(rename = "Actual")]
    pub actual: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PhaseProductivity {
    pub phase: PhaseGroup,
    pub input: Measures,
    pub output: Measures,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub records_loaded: usize,
    pub records_in_range: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub phases: Vec<PhaseProductivity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> Record {
        Record {
            order_id: "1".into(),
            sku_code: "S".into(),
            start_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            phase_code: "PC01".into(),
            plan_qty: None,
            target_qty: None,
            actual_qty: None,
            qty_type: None,
            qty: None,
            working_hours_plan_l3: Some(1.5),
            working_hours_plan_l4: None,
        }
    }

    #[test]
    fn working_hours_need_both_levels() {
        let mut r = record("2024-05-01");
        assert_eq!(r.phase(), Some(Phase::Cutting));
        assert_eq!(r.working_hours(), None);
        r.working_hours_plan_l4 = Some(2.0);
        assert_eq!(r.working_hours(), Some(3.5));
    }

    #[test]
    fn missing_columns_keeps_request_order() {
        let set = RecordSet::new(["QTY", "ORDER_NUMBER"], vec![]);
        let missing = set.missing_columns(&["SKU_CODE", "QTY", "BASIC_START_DATE"]);
        assert_eq!(missing, vec!["SKU_CODE", "BASIC_START_DATE"]);
    }

    #[test]
    fn date_bounds_spans_records() {
        let set = RecordSet::with_all_columns(vec![
            record("2024-05-03"),
            record("2024-05-01"),
            record("2024-05-02"),
        ]);
        let (min, max) = set.date_bounds().unwrap();
        assert_eq!(min.to_string(), "2024-05-01");
        assert_eq!(max.to_string(), "2024-05-03");
        assert!(RecordSet::default().date_bounds().is_none());
    }

    #[test]
    fn counts_unrecognized_phase_codes() {
        let mut odd = record("2024-05-02");
        odd.phase_code = "ZZ99".into();
        let set = RecordSet::with_all_columns(vec![record("2024-05-01"), odd]);
        assert_eq!(set.unknown_phase_rows(), 1);
    }

    #[test]
    fn qty_type_labels() {
        assert_eq!(Column::from_qty_type(" PLAN "), Some(Column::Plan));
        assert_eq!(Column::from_qty_type("ACTUAL"), Some(Column::Actual));
        assert_eq!(Column::from_qty_type("plan"), None);
        assert_eq!(Column::from_qty_type("OTHER"), None);
        assert_eq!(QtyType::parse("TARGET"), Some(QtyType::Measure(Column::Target)));
        assert_eq!(QtyType::parse("SCRAP"), Some(QtyType::Other));
        assert_eq!(QtyType::parse("  "), None);
    }

    #[test]
    fn measures_add_skips_missing() {
        let mut m = Measures::default();
        m.accumulate(Column::Target, Some(4.0));
        m.accumulate(Column::Target, None);
        m.accumulate(Column::Actual, Some(1.0));
        assert_eq!(m, Measures::new(0.0, 4.0, 1.0));
    }
}
