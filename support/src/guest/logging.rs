use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Install a global subscriber which writes proc-block logs to stderr.
///
/// Filtering is controlled by the `RUST_LOG` environment variable and
/// defaults to `warn`. Calling this more than once (or after the host has
/// installed its own subscriber) is a no-op.
pub fn initialize_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let installed = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    if installed.is_ok() {
        tracing::debug!("Proc-block logging initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initializing_twice_is_fine() {
        initialize_logger();
        initialize_logger();

        tracing::warn!(answer = 42, "Still logging");
    }
}
