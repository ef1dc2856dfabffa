//! # Configuración
//! src/config.rs
//!
//! Configuración del núcleo de resúmenes con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./summary_jobs --workers 8 \
//!   --queue-capacity 64 \
//!   --summarizer-cmd "python3 summarize.py" \
//!   --summarizer-timeout-ms 30000 \
//!   notes/*.txt
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! WORKER_COUNT=8 SUMMARIZER_CMD="python3 summarize.py" ./summary_jobs < doc.txt
//! ```

use crate::error::ConfigError;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Configuración del sistema de resúmenes
#[derive(Debug, Clone, Parser)]
#[command(name = "summary_jobs")]
#[command(about = "Resume documentos de forma asíncrona con un pool de workers y caché de resultados")]
#[command(version)]
pub struct Config {
    // === Workers ===
    /// Número de workers del dispatcher
    #[arg(long = "workers", default_value = "4", env = "WORKER_COUNT")]
    pub worker_count: usize,

    /// Capacidad máxima de la cola de jobs
    #[arg(long = "queue-capacity", default_value = "1000", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Validación ===
    /// Mínimo de palabras por texto
    #[arg(long = "min-words", default_value = "10", env = "MIN_WORDS")]
    pub min_words: usize,

    /// Máximo de caracteres por texto
    #[arg(long = "max-chars", default_value = "2000", env = "MAX_CHARS")]
    pub max_chars: usize,

    // === Summarizer ===
    /// Comando externo que resume (texto por stdin, resumen por stdout)
    #[arg(long = "summarizer-cmd", env = "SUMMARIZER_CMD")]
    pub summarizer_command: Option<String>,

    /// Timeout de cada llamada al summarizer en milisegundos (0 = sin timeout)
    #[arg(long = "summarizer-timeout-ms", default_value = "0", env = "SUMMARIZER_TIMEOUT_MS")]
    pub summarizer_timeout_ms: u64,

    // === Polling ===
    /// Intervalo de polling de resultados en milisegundos
    #[arg(long = "poll-interval-ms", default_value = "200", env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Filtro de logs (sintaxis de tracing EnvFilter)
    #[arg(long = "log", default_value = "info", env = "RUST_LOG")]
    pub log_filter: String,

    /// Archivos a resumir (uno por documento); sin archivos se lee stdin
    #[arg(value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Timeout del summarizer, si está habilitado
    pub fn summarizer_timeout(&self) -> Option<Duration> {
        (self.summarizer_timeout_ms > 0).then(|| Duration::from_millis(self.summarizer_timeout_ms))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(invalid("worker count must be >= 1"));
        }
        if self.queue_capacity == 0 {
            return Err(invalid("queue capacity must be >= 1"));
        }
        if self.min_words == 0 {
            return Err(invalid("min words must be >= 1"));
        }
        if self.max_chars == 0 {
            return Err(invalid("max chars must be >= 1"));
        }
        // N palabras necesitan al menos N caracteres más N-1 separadores
        if self.min_words.saturating_mul(2).saturating_sub(1) > self.max_chars {
            return Err(invalid(&format!(
                "no text can satisfy min words {} with max chars {}",
                self.min_words, self.max_chars
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll interval must be > 0"));
        }
        if let Some(command) = &self.summarizer_command {
            if command.trim().is_empty() {
                return Err(invalid("summarizer command must not be empty"));
            }
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            workers = self.worker_count,
            queue_capacity = self.queue_capacity,
            min_words = self.min_words,
            max_chars = self.max_chars,
            summarizer = self.summarizer_command.as_deref().unwrap_or("<none>"),
            summarizer_timeout_ms = self.summarizer_timeout_ms,
            poll_interval_ms = self.poll_interval_ms,
            inputs = self.inputs.len(),
            "⚙️  configuration"
        );
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_capacity: 1000,
            min_words: 10,
            max_chars: 2000,
            summarizer_command: None,
            summarizer_timeout_ms: 0,
            poll_interval_ms: 200,
            log_filter: "info".to_string(),
            inputs: Vec::new(),
        }
    }
}
