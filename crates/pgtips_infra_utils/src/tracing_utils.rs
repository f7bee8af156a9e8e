use std::sync::OnceLock;

use time::macros::format_description;
use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;
// Ensures the subscriber is installed at most once per process.
static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Installs the global tracing subscriber. Logs go to stderr, keeping stdout free for generated
/// output. The level defaults to `INFO` and can be overridden through `RUST_LOG`.
pub fn configure_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        // Use default time formatting with subsecond precision limited to three digits.
        let time_format = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        );
        let timer = UtcTime::new(time_format);

        let fmt_layer = fmt::layer()
            .compact()
            .with_timer(timer)
            .with_target(false) // No module name.
            // Instead, file name and line number.
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        // Another subscriber may already be installed, e.g. by a test harness.
        if tracing_subscriber::registry()
            .with(fmt_layer)
            .with(get_filter_layer(DEFAULT_LEVEL))
            .try_init()
            .is_ok()
        {
            tracing::debug!("Tracing has been successfully initialized.");
        }
    });
}

/// Builds the level filter: `RUST_LOG` directives if set, `level` otherwise.
pub fn get_filter_layer(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder().with_default_directive(level.into()).from_env_lossy()
}
