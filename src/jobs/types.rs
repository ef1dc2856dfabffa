//! # Tipos y Estructuras para el Sistema de Tareas
//! src/jobs/types.rs
//!
//! Define los tipos fundamentales del ciclo de vida de una tarea de resumen.
//!
//! ```text
//! Pending ──► Completed
//!    │
//!    ├──────► CompletedCached
//!    │
//!    └──────► Failed(reason)
//! ```
//!
//! Una tarea sale de `Pending` exactamente una vez y nunca regresa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StoreError;

/// Identificador opaco de una tarea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Genera un ID nuevo (UUID v4)
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = StoreError;

    /// Sólo acepta el ID tal como se emitió (UUID con guiones, en
    /// minúsculas). Cualquier otra cadena nunca pudo haber sido emitida, así
    /// que se reporta como `NotFound`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Uuid::parse_str(s) {
            Ok(uuid) if uuid.to_string() == s => Ok(TaskId(uuid)),
            _ => Err(StoreError::not_found(s)),
        }
    }
}

/// Estado de una tarea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TaskStatus {
    /// Tarea creada, esperando a un worker
    Pending,

    /// Resumen calculado por el summarizer
    Completed,

    /// Resumen tomado de la caché
    CompletedCached,

    /// El summarizer falló
    Failed { reason: String },
}

impl TaskStatus {
    /// Verifica si el estado es terminal
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }

    /// Verifica si la tarea terminó con un resumen
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::CompletedCached)
    }

    /// Etiqueta corta sin la razón del fallo
    pub fn kind(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::CompletedCached => "completed_cached",
            TaskStatus::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Pending => f.write_str("pending"),
            TaskStatus::Completed => f.write_str("completed"),
            TaskStatus::CompletedCached => f.write_str("completed (cached)"),
            TaskStatus::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Registro de una tarea en el Task Store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// ID único de la tarea
    pub id: TaskId,

    /// Estado actual
    pub status: TaskStatus,

    /// Resumen (presente sólo en `Completed` / `CompletedCached`)
    pub result: Option<String>,

    /// Timestamp de creación
    pub created_at: DateTime<Utc>,

    /// Timestamp de la transición terminal
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Crea un registro nuevo en estado `Pending`
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            status: TaskStatus::Pending,
            result: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Marca la tarea como completada con su resumen
    pub fn mark_completed(&mut self, summary: String, cached: bool) -> Result<(), StoreError> {
        self.ensure_pending()?;
        self.status = if cached {
            TaskStatus::CompletedCached
        } else {
            TaskStatus::Completed
        };
        self.result = Some(summary);
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Marca la tarea como fallida
    pub fn mark_failed(&mut self, reason: String) -> Result<(), StoreError> {
        self.ensure_pending()?;
        self.status = TaskStatus::Failed { reason };
        self.result = None;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Vista de resultado para quien hace polling
    pub fn to_result(&self) -> TaskResult {
        if self.status.is_pending() {
            TaskResult::NotReady
        } else {
            TaskResult::Ready {
                status: self.status.clone(),
                summary: self.result.clone(),
            }
        }
    }

    // Una sola transición por tarea: Pending → terminal
    fn ensure_pending(&self) -> Result<(), StoreError> {
        if self.is_terminal() {
            return Err(StoreError::AlreadyTerminal {
                id: self.id,
                status: self.status.to_string(),
            });
        }
        Ok(())
    }
}

/// Resultado de consultar una tarea
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// La tarea sigue en `Pending`, intentar más tarde
    NotReady,

    /// La tarea llegó a un estado terminal
    Ready {
        status: TaskStatus,
        summary: Option<String>,
    },
}

impl TaskResult {
    pub fn is_ready(&self) -> bool {
        matches!(self, TaskResult::Ready { .. })
    }
}
