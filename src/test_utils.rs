use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once per test binary.
///
/// Honors `RUST_LOG`; output goes through the test writer so it is only
/// shown for failing tests. A subscriber installed elsewhere is left alone.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "info".into()),
            )
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
