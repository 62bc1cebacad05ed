use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global fmt subscriber. `RUST_LOG` wins over `default_level`.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("Logging already initialized");
    }
}
