use crate::phase::UnknownPhasePolicy;
use chrono::NaiveDate;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "production_orders.xlsx";
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// Settings for one run of the report tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub input: PathBuf,
    /// Worksheet to read; the first one when unset.
    pub sheet: Option<String>,
    pub output_dir: PathBuf,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub unknown_phase: UnknownPhasePolicy,
    pub preview_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            sheet: None,
            output_dir: PathBuf::from("."),
            start: None,
            end: None,
            unknown_phase: UnknownPhasePolicy::default(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl ReportConfig {
    /// Resolve the report range, falling back to the loaded data's bounds.
    pub fn resolve_range(&self, bounds: Option<(NaiveDate, NaiveDate)>) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end, bounds) {
            (Some(s), Some(e), _) => Some((s, e)),
            (s, e, Some((min, max))) => Some((s.unwrap_or(min), e.unwrap_or(max))),
            (_, _, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn range_prefers_explicit_dates() {
        let cfg = ReportConfig {
            start: Some(day(2)),
            end: Some(day(3)),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_range(Some((day(1), day(9)))), Some((day(2), day(3))));
        assert_eq!(cfg.resolve_range(None), Some((day(2), day(3))));
    }

    #[test]
    fn range_fills_gaps_from_data() {
        let cfg = ReportConfig {
            start: Some(day(4)),
            ..Default::default()
        };
        assert_eq!(cfg.resolve_range(Some((day(1), day(9)))), Some((day(4), day(9))));
        assert_eq!(ReportConfig::default().resolve_range(None), None);
    }
}
