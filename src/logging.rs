//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `default_level`. Output goes to
/// stderr so command output on stdout stays clean.
pub fn init(default_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}
