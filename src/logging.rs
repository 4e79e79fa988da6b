use tracing_subscriber::EnvFilter;

/// Env var holding the log filter (e.g. `debug`, `paramline::parse=trace`).
pub const LOG_ENV: &str = "PARAMLINE_LOG";

/// Initialize tracing on stderr.
///
/// Quiet by default so stdout stays clean for the JSON outcome.
/// `PARAMLINE_LOG` overrides the `warn` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
