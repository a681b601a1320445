use crate::error::{ReportError, ReportResult};
use crate::types::RecordSet;
use crate::util::parse_date_safe;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

/// Inclusive day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both ends as user input; any time component is dropped.
    pub fn parse(start: &str, end: &str) -> ReportResult<Self> {
        Ok(Self::new(parse_day(start)?, parse_day(end)?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parse one user-supplied day.
pub fn parse_day(input: &str) -> ReportResult<NaiveDate> {
    parse_date_safe(Some(input)).ok_or_else(|| ReportError::InvalidDate(input.trim().to_string()))
}

/// Keep the records whose start date lies in `[start, end]`.
///
/// An empty result is not an error: it is logged as an empty range and the
/// downstream tables simply come out empty.
pub fn filter_by_date(records: &RecordSet, start: NaiveDate, end: NaiveDate) -> RecordSet {
    let range = DateRange::new(start, end);
    let kept: Vec<_> = records
        .records()
        .iter()
        .filter(|r| range.contains(r.start_date))
        .cloned()
        .collect();

    if kept.is_empty() {
        warn!(
            %start,
            %end,
            total = records.len(),
            "EmptyRange: no records fall inside the selected date range"
        );
    } else {
        debug!(%start, %end, kept = kept.len(), total = records.len(), "filtered records by date");
    }

    RecordSet::new(records.columns().iter().cloned(), kept)
}
