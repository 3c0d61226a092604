//! Logging setup for the CLI.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the tracing subscriber.
///
/// `RUST_LOG` selects the level (default `info`), e.g. `RUST_LOG=calc_core=debug`.
/// Logs go to stderr so stdout stays clean for JSON and CSV output.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}
