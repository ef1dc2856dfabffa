//! # Errores del Sistema de Resúmenes
//! src/error.rs
//!
//! Taxonomía de errores del núcleo. Cada componente tiene su propio enum:
//!
//! - `ValidationError`: el texto no cumple los límites de entrada
//! - `SubmitError`: fallos síncronos al encolar (no se crea tarea)
//! - `StoreError`: tarea desconocida o transición inválida
//! - `SummarizationError`: fallo del summarizer externo (termina en `Failed`)
//! - `QueueError`: errores internos de la cola de jobs
//! - `ConfigError`: configuración inválida
//!
//! `NotReady` no aparece aquí: una tarea pendiente no es un error, ver
//! [`TaskResult::NotReady`](crate::jobs::TaskResult::NotReady).

use std::time::Duration;
use thiserror::Error;

use crate::jobs::TaskId;

/// El texto enviado no pasa la validación de entrada
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text too short to summarize: {words} words, need at least {min_words}")]
    TooShort { words: usize, min_words: usize },

    #[error("text too long, max {max_chars} chars (got {chars})")]
    TooLong { chars: usize, max_chars: usize },
}

/// Errores síncronos de `submit_job`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("job queue is full (max capacity: {capacity})")]
    QueueFull { capacity: usize },

    #[error("dispatcher is shutting down")]
    ShuttingDown,
}

impl From<QueueError> for SubmitError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Full { capacity } => SubmitError::QueueFull { capacity },
            QueueError::Closed => SubmitError::ShuttingDown,
        }
    }
}

/// Errores del Task Store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error("task {id} already finished with status '{status}'")]
    AlreadyTerminal { id: TaskId, status: String },
}

impl StoreError {
    pub fn not_found(id: impl ToString) -> Self {
        StoreError::NotFound(id.to_string())
    }
}

/// Fallo del summarizer externo
///
/// El `Display` de cada variante es la razón que queda guardada en
/// `TaskStatus::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummarizationError {
    #[error("{0}")]
    Unavailable(String),

    #[error("summarization failed: {0}")]
    Failed(String),

    #[error("summarizer returned an empty summary")]
    EmptySummary,

    #[error("summarization exceeded timeout of {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("summarizer panicked: {0}")]
    Panicked(String),
}

/// Errores de la cola de jobs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue is full (max capacity: {capacity})")]
    Full { capacity: usize },

    #[error("queue is closed")]
    Closed,
}

/// Configuración inválida
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let short = ValidationError::TooShort { words: 9, min_words: 10 };
        assert!(short.to_string().contains("too short"));
        assert!(short.to_string().contains("9 words"));

        let long = ValidationError::TooLong { chars: 2001, max_chars: 2000 };
        assert!(long.to_string().contains("max 2000 chars"));
    }

    #[test]
    fn test_queue_error_maps_to_submit_error() {
        assert_eq!(
            SubmitError::from(QueueError::Full { capacity: 8 }),
            SubmitError::QueueFull { capacity: 8 }
        );
        assert_eq!(SubmitError::from(QueueError::Closed), SubmitError::ShuttingDown);
    }

    #[test]
    fn test_summarization_error_reason() {
        let err = SummarizationError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "summarization exceeded timeout of 1500ms");

        let err = SummarizationError::Unavailable("Summarizer model not loaded".to_string());
        assert_eq!(err.to_string(), "Summarizer model not loaded");
    }
}
