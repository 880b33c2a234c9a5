use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STEADFAST_LOG";

/// Diagnostics go to stderr so stdout stays parseable. `STEADFAST_LOG` wins
/// over `-v` when set.
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
