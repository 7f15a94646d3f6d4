//! Diagnostic logging for the CLI.
//!
//! Logs go to stderr so command output on stdout stays machine-readable.
//! `TSCAT_LOG` takes an `EnvFilter` directive (`debug`, `tscat=trace`, ...);
//! the default shows warnings only.

use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "TSCAT_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Install the global subscriber. A second call is a no-op.
pub fn init(json: bool) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.without_time().try_init()
    };
}
