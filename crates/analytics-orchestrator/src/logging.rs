use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `RUST_LOG` filters, defaulting to `info`.
///
/// Returns false when a subscriber was already installed.
pub fn init_logging(json: bool) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init()
            .is_ok()
    }
}
