//! # Submission Gateway
//! src/jobs/gateway.rs
//!
//! Punto de entrada para quien envía textos y hace polling:
//!
//! - `submit_job(text)`: valida, crea la tarea en `Pending`, la encola y
//!   retorna el ID de inmediato (no espera a que termine)
//! - `status(id)` / `result(id)`: consultas sobre el Task Store
//!
//! Los errores de validación y de búsqueda se reportan de forma síncrona.
//! Los errores del summarizer sólo se ven haciendo polling.

use crate::config::Config;
use crate::error::{StoreError, SubmitError, ValidationError};
use crate::jobs::cache::{CacheStats, ResultCache};
use crate::jobs::dispatcher::{Dispatcher, DispatcherConfig};
use crate::jobs::queue::QueueStats;
use crate::jobs::storage::{StatusCounts, TaskStore};
use crate::jobs::summarizer::Summarizer;
use crate::jobs::types::{TaskId, TaskRecord, TaskResult, TaskStatus};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Límites de entrada de `submit_job`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    /// Mínimo de palabras (inclusive)
    pub min_words: usize,

    /// Máximo de caracteres (inclusive)
    pub max_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            min_words: 10,
            max_chars: 2000,
        }
    }
}

impl InputLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            min_words: config.min_words,
            max_chars: config.max_chars,
        }
    }

    /// Valida un texto
    ///
    /// Las palabras se separan por cualquier espacio en blanco y los
    /// caracteres se cuentan como escalares Unicode.
    pub fn validate(&self, text: &str) -> Result<(), ValidationError> {
        let words = text.split_whitespace().count();
        if words < self.min_words {
            return Err(ValidationError::TooShort {
                words,
                min_words: self.min_words,
            });
        }

        let chars = text.chars().count();
        if chars > self.max_chars {
            return Err(ValidationError::TooLong {
                chars,
                max_chars: self.max_chars,
            });
        }

        Ok(())
    }
}

/// Estadísticas del servicio completo
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    pub workers: usize,
    pub queue: QueueStats,
    pub tasks: StatusCounts,
    pub cache: CacheStats,
}

/// Gateway de envío y consulta de tareas
pub struct Gateway {
    store: Arc<TaskStore>,
    cache: Arc<ResultCache>,
    dispatcher: Dispatcher,
    limits: InputLimits,
}

impl Gateway {
    pub fn new(
        store: Arc<TaskStore>,
        cache: Arc<ResultCache>,
        dispatcher: Dispatcher,
        limits: InputLimits,
    ) -> Self {
        Self {
            store,
            cache,
            dispatcher,
            limits,
        }
    }

    /// Arma store, caché y dispatcher a partir de la configuración
    pub fn from_config(config: &Config, summarizer: Arc<dyn Summarizer>) -> std::io::Result<Self> {
        Self::start(
            DispatcherConfig::from_config(config),
            InputLimits::from_config(config),
            summarizer,
        )
    }

    /// Arma store, caché y dispatcher nuevos
    pub fn start(
        dispatcher_config: DispatcherConfig,
        limits: InputLimits,
        summarizer: Arc<dyn Summarizer>,
    ) -> std::io::Result<Self> {
        let store = Arc::new(TaskStore::new());
        let cache = Arc::new(ResultCache::new());
        let dispatcher = Dispatcher::new(
            dispatcher_config,
            Arc::clone(&store),
            Arc::clone(&cache),
            summarizer,
        )?;

        Ok(Self::new(store, cache, dispatcher, limits))
    }

    /// Envía un texto a resumir y retorna el ID de la tarea
    ///
    /// Si la validación falla o la cola está llena no queda ninguna tarea
    /// creada.
    pub fn submit_job(&self, text: impl Into<String>) -> Result<TaskId, SubmitError> {
        let text = text.into();

        if let Err(err) = self.limits.validate(&text) {
            debug!(error = %err, "rejected submission");
            return Err(err.into());
        }

        let task_id = self.store.create();

        if let Err(err) = self.dispatcher.submit(task_id, text) {
            self.store.discard(&task_id);
            return Err(err);
        }

        debug!(task_id = %task_id, "task accepted");
        Ok(task_id)
    }

    /// Estado de una tarea
    pub fn status(&self, id: &TaskId) -> Result<TaskStatus, StoreError> {
        self.store.get_status(id)
    }

    /// Resultado de una tarea (`NotReady` mientras siga pendiente)
    pub fn result(&self, id: &TaskId) -> Result<TaskResult, StoreError> {
        self.store.get_result(id)
    }

    /// Registro completo de una tarea
    pub fn task(&self, id: &TaskId) -> Result<TaskRecord, StoreError> {
        self.store.get(id)
    }

    pub fn limits(&self) -> InputLimits {
        self.limits
    }

    /// Espera a que no queden jobs encolados ni en ejecución
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.dispatcher.wait_idle(timeout)
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            workers: self.dispatcher.worker_count(),
            queue: self.dispatcher.queue_stats(),
            tasks: self.store.counts(),
            cache: self.cache.stats(),
        }
    }

    /// Termina los jobs aceptados y detiene los workers
    pub fn shutdown(&self) {
        self.dispatcher.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::summarizer::doubles::{CountingSummarizer, GatedSummarizer};

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn gateway(summarizer: Arc<dyn Summarizer>) -> Gateway {
        Gateway::start(DispatcherConfig::default(), InputLimits::default(), summarizer).unwrap()
    }

    // ==================== Validation ====================

    #[test]
    fn test_validate_word_boundary() {
        let limits = InputLimits::default();

        assert_eq!(
            limits.validate(&words(9)),
            Err(ValidationError::TooShort { words: 9, min_words: 10 })
        );
        assert!(limits.validate(&words(10)).is_ok());
        assert!(limits.validate("a b c d e f g h i j").is_ok());
    }

    #[test]
    fn test_validate_whitespace_runs() {
        let limits = InputLimits::default();
        let text = "  one\ttwo\n\nthree   four five six seven eight nine  ";
        assert_eq!(
            limits.validate(text),
            Err(ValidationError::TooShort { words: 9, min_words: 10 })
        );
    }

    #[test]
    fn test_validate_char_boundary() {
        let limits = InputLimits::default();

        let mut text = words(10);
        text.push_str(&"x".repeat(2000 - text.len()));
        assert_eq!(text.chars().count(), 2000);
        assert!(limits.validate(&text).is_ok());

        text.push('x');
        assert_eq!(
            limits.validate(&text),
            Err(ValidationError::TooLong { chars: 2001, max_chars: 2000 })
        );
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        let limits = InputLimits::default();
        // 10 palabras de 199 'ñ' + 9 espacios = 1999 caracteres, pero 3989 bytes
        let text = vec!["ñ".repeat(199); 10].join(" ");
        assert_eq!(text.chars().count(), 1999);
        assert!(text.len() > 2000);
        assert!(limits.validate(&text).is_ok());
    }

    // ==================== Submission ====================

    #[test]
    fn test_invalid_input_creates_no_task() {
        let gw = gateway(Arc::new(CountingSummarizer::default()));

        let err = gw.submit_job(words(3)).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidInput(ValidationError::TooShort { .. })));

        let err = gw.submit_job(format!("{} {}", words(10), "y".repeat(2001))).unwrap_err();
        assert!(matches!(err, SubmitError::InvalidInput(ValidationError::TooLong { .. })));

        assert_eq!(gw.stats().tasks.total(), 0);
    }

    #[test]
    fn test_submit_returns_pending_task() {
        let gate = Arc::new(GatedSummarizer::default());
        let gw = gateway(gate.clone());

        let id = gw.submit_job(words(12)).unwrap();

        assert_eq!(gw.status(&id).unwrap(), TaskStatus::Pending);
        assert_eq!(gw.result(&id).unwrap(), TaskResult::NotReady);

        gate.release();
        assert!(gw.wait_idle(Duration::from_secs(5)));

        assert_eq!(gw.status(&id).unwrap(), TaskStatus::Completed);
        assert_eq!(
            gw.result(&id).unwrap(),
            TaskResult::Ready {
                status: TaskStatus::Completed,
                summary: Some("summary of 12 words".to_string()),
            }
        );
    }

    #[test]
    fn test_unknown_id_not_found() {
        let gw = gateway(Arc::new(CountingSummarizer::default()));
        let unknown = TaskId::new();

        assert!(matches!(gw.status(&unknown), Err(StoreError::NotFound(_))));
        assert!(matches!(gw.result(&unknown), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_queue_full_leaves_no_task() {
        let gate = Arc::new(GatedSummarizer::default());
        let config = DispatcherConfig {
            worker_count: 1,
            queue_capacity: 1,
        };
        let gw = Gateway::start(config, InputLimits::default(), gate.clone()).unwrap();

        gw.submit_job(words(10)).unwrap();
        assert!(gate.wait_started(1, Duration::from_secs(5)));
        gw.submit_job(words(11)).unwrap();

        let err = gw.submit_job(words(12)).unwrap_err();
        assert_eq!(err, SubmitError::QueueFull { capacity: 1 });
        assert_eq!(gw.stats().tasks.total(), 2);

        gate.release();
        assert!(gw.wait_idle(Duration::from_secs(5)));
        assert_eq!(gw.stats().tasks.completed, 2);
    }

    #[test]
    fn test_submit_after_shutdown() {
        let gw = gateway(Arc::new(CountingSummarizer::default()));
        gw.shutdown();

        assert_eq!(gw.submit_job(words(10)), Err(SubmitError::ShuttingDown));
        assert_eq!(gw.stats().tasks.total(), 0);
    }

    #[test]
    fn test_custom_limits() {
        let limits = InputLimits {
            min_words: 2,
            max_chars: 10,
        };
        let gw = Gateway::start(
            DispatcherConfig::default(),
            limits,
            Arc::new(CountingSummarizer::default()),
        )
        .unwrap();

        assert!(gw.submit_job("two words").is_ok());
        assert!(gw.submit_job("one").is_err());
        assert!(gw.submit_job("far too many chars").is_err());
        assert_eq!(gw.limits(), limits);
    }

    #[test]
    fn test_stats() {
        let gw = gateway(Arc::new(CountingSummarizer::default()));
        gw.submit_job(words(10)).unwrap();
        gw.submit_job(words(10)).unwrap();
        assert!(gw.wait_idle(Duration::from_secs(5)));

        let stats = gw.stats();
        assert_eq!(stats.workers, 4);
        assert_eq!(stats.tasks.total(), 2);
        assert_eq!(stats.cache.entries, 1);
        assert_eq!(stats.queue.queued, 0);
    }
}
