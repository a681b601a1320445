use crate::error::{ReportError, ReportResult};
use crate::types::{columns, QtyType, Record, RecordSet};
use crate::util::{excel_serial_to_datetime, is_missing_marker, parse_date_safe, parse_f64_safe};
use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> ReportResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
            _ => Err(ReportError::UnsupportedFormat(ext)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDataset {
    pub records: RecordSet,
    pub report: LoadReport,
}

/// Header row plus data rows, every cell rendered as text.
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

pub fn load_path(path: &Path, sheet: Option<&str>) -> ReportResult<LoadedDataset> {
    let format = SourceFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, format, sheet)
}

/// Parse an export held in memory. `sheet` only applies to workbooks; without
/// it the first worksheet is read.
pub fn load_bytes(bytes: &[u8], format: SourceFormat, sheet: Option<&str>) -> ReportResult<LoadedDataset> {
    let table = match format {
        SourceFormat::Csv => read_csv_table(bytes)?,
        SourceFormat::Xlsx => read_xlsx_table(bytes, sheet)?,
    };
    let dataset = records_from_table(table)?;
    info!(
        rows = dataset.report.total_rows,
        loaded = dataset.report.loaded_rows,
        parse_errors = dataset.report.parse_errors,
        "loaded production orders"
    );
    Ok(dataset)
}

fn read_csv_table(bytes: &[u8]) -> ReportResult<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);
    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|v| v.trim().to_string()).collect());
    }
    Ok(RawTable { headers, rows })
}

fn read_xlsx_table(bytes: &[u8], sheet: Option<&str>) -> ReportResult<RawTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| ReportError::SheetNotFound(wanted.to_string()))?,
        None => names.first().cloned().ok_or(ReportError::EmptyWorkbook)?,
    };
    let range = workbook.worksheet_range(&name)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable {
            headers: Vec::new(),
            rows: Vec::new(),
        });
    };
    let headers = header_row
        .iter()
        .map(|cell| cell_text(cell).trim().to_string())
        .collect();
    let rows = rows
        .map(|row| row.iter().map(|cell| cell_text(cell).trim().to_string()).collect())
        .collect();
    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn records_from_table(table: RawTable) -> ReportResult<LoadedDataset> {
    let index: HashMap<&str, usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.as_str(), i))
        .collect();
    if !index.contains_key(columns::BASIC_START_DATE) {
        return Err(ReportError::Schema {
            missing: vec![columns::BASIC_START_DATE.to_string()],
        });
    }

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records = Vec::new();

    for (line, row) in table.rows.iter().enumerate() {
        if row.iter().all(|v| is_missing_marker(v)) {
            continue;
        }
        total_rows += 1;
        let cell = |name: &str| {
            index
                .get(name)
                .and_then(|i| row.get(*i))
                .map(String::as_str)
                .filter(|v| !is_missing_marker(v))
        };
        match parse_record(&cell) {
            Ok(record) => records.push(record),
            Err(field) => {
                parse_errors += 1;
                warn!(row = line + 2, field, "skipping row with unparseable value");
            }
        }
    }

    let records = RecordSet::new(table.headers, records);
    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
        date_bounds: records.date_bounds(),
    };
    Ok(LoadedDataset { records, report })
}

/// Build one record, or name the column that failed to parse. Missing-value
/// markers have already been turned into absent cells by `cell`.
fn parse_record<'a, F>(cell: &F) -> Result<Record, &'static str>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let number = |name: &'static str| match cell(name) {
        None => Ok(None),
        Some(raw) => parse_f64_safe(Some(raw)).map(Some).ok_or(name),
    };
    let text = |name: &str| cell(name).unwrap_or_default().to_string();

    Ok(Record {
        order_id: text(columns::ORDER_NUMBER),
        sku_code: text(columns::SKU_CODE),
        start_date: parse_date_safe(cell(columns::BASIC_START_DATE))
            .ok_or(columns::BASIC_START_DATE)?,
        phase_code: text(columns::DISASSEMBLY_FAZE),
        plan_qty: number(columns::PLAN_QTY)?,
        target_qty: number(columns::TARGET_QTY)?,
        actual_qty: number(columns::ACTUAL_QTY)?,
        qty_type: cell(columns::QTY_TYPE_NAME).and_then(QtyType::parse),
        qty: number(columns::QTY)?,
        working_hours_plan_l3: number(columns::WORKING_HOURS_PLAN_L3)?,
        working_hours_plan_l4: number(columns::WORKING_HOURS_PLAN_L4)?,
    })
}
