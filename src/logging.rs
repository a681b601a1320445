// Logging setup on top of `tracing-subscriber`.
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter for a `-v` count: warnings only, then info, then debug.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Initialise the global subscriber. `RUST_LOG` wins over `verbosity`, e.g.
/// `RUST_LOG=phase_productivity=trace`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    // Logs go to stderr so they never interleave with the table previews.
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Verbose logging routed through the test harness writer.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(5), "debug");
    }

    #[test]
    fn init_test_is_repeatable() {
        init_test();
        init_test();
        tracing::debug!("logging initialised twice without panicking");
    }
}
