use thiserror::Error;

/// Errors raised while loading an export or building a report from it.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("unsupported file format: {0} (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV parse failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel parse failed: {0}")]
    Excel(#[from] calamine::XlsxError),

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
