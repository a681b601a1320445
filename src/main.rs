// Entry point and high-level CLI flow.
//
// - Option [1] loads the production-order export, printing diagnostics.
// - Option [2] asks for a date range and generates the productivity report:
//   CSV tables, trend series and a JSON summary, with previews on the console.
// - Option [3] forgets the cached copy of the file and loads it again.
// With `--batch` the load and report run once without the menu.
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use phase_productivity::cache::DatasetCache;
use phase_productivity::config::{ReportConfig, DEFAULT_INPUT, DEFAULT_PREVIEW_ROWS};
use phase_productivity::loader::LoadedDataset;
use phase_productivity::reports::{build_report, daily_rows, total_rows};
use phase_productivity::filter::parse_day;
use phase_productivity::util::format_int;
use phase_productivity::{logging, output, DateRange, UnknownPhasePolicy};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Productivity report for meat-processing production orders
#[derive(Parser, Debug)]
#[command(name = "phase-productivity", version)]
struct Cli {
    /// Production-order export (.xlsx or .csv)
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Worksheet name (defaults to the first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Directory for generated CSV/JSON files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// First day of the report range (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,

    /// Last day of the report range (YYYY-MM-DD, inclusive)
    #[arg(long, value_parser = parse_cli_date)]
    end: Option<NaiveDate>,

    /// How to report rows whose phase code is not recognised
    #[arg(long, value_enum, default_value_t = UnknownPhasePolicy::Group)]
    unknown_phase: UnknownPhasePolicy,

    /// Rows shown per table preview
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    preview_rows: usize,

    /// Load and generate once, without the interactive menu
    #[arg(long)]
    batch: bool,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl From<&Cli> for ReportConfig {
    fn from(cli: &Cli) -> Self {
        ReportConfig {
            input: cli.input.clone(),
            sheet: cli.sheet.clone(),
            output_dir: cli.output_dir.clone(),
            start: cli.start,
            end: cli.end,
            unknown_phase: cli.unknown_phase,
            preview_rows: cli.preview_rows,
        }
    }
}

fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    parse_day(s).map_err(|e| e.to_string())
}

// Session state owned by `main`: the loaded dataset lives in the cache, the
// current selection is just a handle to it.
struct AppState {
    config: ReportConfig,
    cache: DatasetCache,
    data: Option<Arc<LoadedDataset>>,
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Prompt for a date, returning `default` for an empty answer.
fn prompt_date(label: &str, default: NaiveDate) -> String {
    let answer = read_line(&format!("{} (YYYY-MM-DD) [{}]: ", label, default));
    if answer.is_empty() {
        default.to_string()
    } else {
        answer
    }
}

/// Ask for both ends of the range until they parse.
fn prompt_range(start: NaiveDate, end: NaiveDate) -> DateRange {
    loop {
        let first = prompt_date("Start date", start);
        let last = prompt_date("End date", end);
        match DateRange::parse(&first, &last) {
            Ok(range) => return range,
            Err(e) => println!("{}. Please try again.", e),
        }
    }
}

/// Handle option [1]: load the export through the cache.
fn handle_load(state: &mut AppState) -> Result<()> {
    let path = state.config.input.clone();
    let data = state
        .cache
        .load(&path, state.config.sheet.as_deref())
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let report = &data.report;
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        format_int(report.total_rows),
        format_int(report.loaded_rows)
    );
    if report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped due to parse/validation errors.",
            format_int(report.parse_errors)
        );
    }
    if let Some((min, max)) = report.date_bounds {
        println!("Dates available: {} to {}", min, max);
    }
    println!();
    state.data = Some(data);
    Ok(())
}

/// Handle option [3]: drop the cached copy and read the file again.
fn handle_reload(state: &mut AppState) -> Result<()> {
    let dropped = state.cache.invalidate(&state.config.input);
    state.data = None;
    println!("Discarded {} cached dataset(s).", dropped);
    handle_load(state)
}

/// Handle option [2]: generate the report for a range.
///
/// Side effects: writes the CSV tables and JSON files into the output
/// directory and prints previews of the total tables.
fn handle_generate_report(state: &AppState, interactive: bool) -> Result<()> {
    let Some(data) = state.data.as_ref() else {
        bail!("No data loaded. Please load the file first (option 1).");
    };
    let Some((start, end)) = state.config.resolve_range(data.report.date_bounds) else {
        bail!("The loaded file has no dated rows to report on.");
    };
    let range = if interactive {
        prompt_range(start, end)
    } else {
        DateRange::new(start, end)
    };

    println!("Generating report for {} to {}...\n", range.start, range.end);
    let report = build_report(&data.records, range, state.config.unknown_phase)
        .context("Report generation failed")?;
    if report.records_in_range == 0 {
        println!("Warning: no records fall inside the selected date range.\n");
    }

    let written = output::write_report(&report, data.records.len(), &state.config.output_dir)
        .with_context(|| format!("Failed to write into {}", state.config.output_dir.display()))?;

    let rows = state.config.preview_rows;
    output::preview_table("Input Summary", None, &total_rows(&report.input.total), rows);
    output::preview_table("Output Summary", None, &total_rows(&report.output.total), rows);
    output::preview_table(
        "Working Hours Summary",
        Some("hours"),
        &total_rows(&report.working_hours.total),
        rows,
    );
    output::preview_table(
        "Total Input Productivity",
        Some("seconds per unit"),
        &total_rows(&report.total_input_productivity),
        rows,
    );
    output::preview_table(
        "Total Output Productivity",
        Some("seconds per unit"),
        &total_rows(&report.total_output_productivity),
        rows,
    );
    println!("Daily Input Productivity (first {} rows)", rows);
    output::preview_table_rows(&daily_rows(&report.input_productivity), rows);

    println!("Outputs saved to {} files in {}\n", written.len(), state.config.output_dir.display());
    Ok(())
}

fn run_menu(state: &mut AppState) {
    loop {
        println!("Production Data Analysis");
        println!("[1] Load the file");
        println!("[2] Generate Report");
        println!("[3] Reload the file\n");
        let result = match read_line("Enter choice: ").as_str() {
            "1" => handle_load(state),
            "2" => {
                println!();
                match handle_generate_report(state, true) {
                    Ok(()) => {
                        if !prompt_back_to_menu() {
                            println!("Exiting the program.");
                            break;
                        }
                        Ok(())
                    }
                    Err(e) => Err(e),
                }
            }
            "3" => handle_reload(state),
            _ => {
                println!("Invalid choice. Please enter 1, 2 or 3.\n");
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("Error: {:#}\n", e);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut state = AppState {
        config: ReportConfig::from(&cli),
        cache: DatasetCache::new(),
        data: None,
    };

    if cli.batch {
        handle_load(&mut state)?;
        handle_generate_report(&state, false)?;
        return Ok(());
    }

    run_menu(&mut state);
    Ok(())
}
