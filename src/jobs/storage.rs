//! # Task Store
//! src/jobs/storage.rs
//!
//! Única fuente de verdad del ciclo de vida de las tareas. Guarda los
//! registros en memoria durante toda la vida del proceso (no hay expiración).
//!
//! Un solo `RwLock` protege el mapa: los pollers sólo leen y cada tarea
//! recibe exactamente una escritura terminal de un único worker.

use crate::error::StoreError;
use crate::jobs::types::{TaskId, TaskRecord, TaskResult, TaskStatus};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Store en memoria de tareas
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<TaskId, TaskRecord>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Crea una tarea nueva en `Pending` y retorna su ID
    ///
    /// El ID nunca colisiona con uno existente: si el UUID generado ya
    /// está en el mapa se genera otro.
    pub fn create(&self) -> TaskId {
        let mut tasks = self.tasks.write();

        loop {
            let id = TaskId::new();
            if let Entry::Vacant(slot) = tasks.entry(id) {
                slot.insert(TaskRecord::new(id));
                return id;
            }
        }
    }

    /// Obtiene una copia del registro completo
    pub fn get(&self, id: &TaskId) -> Result<TaskRecord, StoreError> {
        self.tasks
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Obtiene el estado de una tarea
    pub fn get_status(&self, id: &TaskId) -> Result<TaskStatus, StoreError> {
        self.tasks
            .read()
            .get(id)
            .map(|task| task.status.clone())
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Obtiene el resultado de una tarea
    ///
    /// Si la tarea sigue pendiente retorna `TaskResult::NotReady`, que no es
    /// un error.
    pub fn get_result(&self, id: &TaskId) -> Result<TaskResult, StoreError> {
        self.tasks
            .read()
            .get(id)
            .map(TaskRecord::to_result)
            .ok_or_else(|| StoreError::not_found(id))
    }

    /// Transición `Pending → Completed | CompletedCached`
    pub fn mark_completed(&self, id: &TaskId, summary: String, cached: bool) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(id).ok_or_else(|| StoreError::not_found(id))?;
        task.mark_completed(summary, cached)
    }

    /// Transición `Pending → Failed`
    pub fn mark_failed(&self, id: &TaskId, reason: String) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write();
        let task = tasks.get_mut(id).ok_or_else(|| StoreError::not_found(id))?;
        task.mark_failed(reason)
    }

    /// Elimina una tarea que nunca llegó a encolarse
    ///
    /// Sólo borra registros en `Pending`; una tarea aceptada por el
    /// dispatcher no se elimina nunca.
    pub(crate) fn discard(&self, id: &TaskId) -> bool {
        let mut tasks = self.tasks.write();
        match tasks.get(id) {
            Some(task) if task.status.is_pending() => tasks.remove(id).is_some(),
            _ => false,
        }
    }

    /// Número de tareas almacenadas
    pub fn count(&self) -> usize {
        self.tasks.read().len()
    }

    /// Cuenta las tareas por estado
    pub fn counts(&self) -> StatusCounts {
        let tasks = self.tasks.read();
        let mut counts = StatusCounts::default();

        for task in tasks.values() {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::CompletedCached => counts.completed_cached += 1,
                TaskStatus::Failed { .. } => counts.failed += 1,
            }
        }

        counts
    }
}

/// Conteo de tareas por estado
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
    pub completed_cached: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.completed + self.completed_cached + self.failed
    }
}
