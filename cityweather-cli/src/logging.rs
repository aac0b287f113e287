use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise only warnings and errors are shown,
/// or everything from this tool at debug level with `-v`.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "warn,cityweather=debug,cityweather_core=debug"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!(verbose, "logging initialized");
}
