//! Productivity reporting for meat-processing production orders.
//!
//! The pipeline classifies phase codes, filters by date, aggregates input,
//! output and working-hour figures per phase and day, and derives seconds of
//! labor per unit from the quantity and hours tables.

pub mod aggregate;
pub mod cache;
pub mod charts;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod output;
pub mod phase;
pub mod productivity;
pub mod reports;
pub mod types;
pub mod util;

pub use aggregate::aggregate;
pub use error::{ReportError, ReportResult};
pub use filter::{filter_by_date, DateRange};
pub use phase::{classify_phase, Phase, PhaseGroup, UnknownPhasePolicy};
pub use productivity::compute_productivity;
pub use reports::{build_report, ProductivityReport};
pub use types::{MaterialView, Record, RecordSet};
