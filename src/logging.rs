//! # Logging
//! src/logging.rs
//!
//! Logging estructurado con `tracing`. La salida va a stderr para que stdout
//! quede libre para las vistas JSON del CLI.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Inicializa el subscriber global con el filtro dado (`"info"`, `"summary_jobs=debug"`, ...)
///
/// Sólo la primera llamada tiene efecto. Si el filtro no se puede parsear se
/// usa `info`.
pub fn init_logging(filter: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_names(true)
                .with_level(true)
                .with_filter(env_filter),
        );

        // Puede existir un subscriber global (por ejemplo en tests)
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }
    });
}
