//! # Dispatcher (Pool de Workers)
//! src/jobs/dispatcher.rs
//!
//! Desacopla la latencia de envío de la latencia del summarizer y limita
//! cuántas llamadas al summarizer corren a la vez.
//!
//! ```text
//! submit() ──► JobQueue ──► worker-0 ─┐
//!                      ├──► worker-1 ─┼──► ResultCache / Summarizer ──► TaskStore
//!                      └──► worker-N ─┘
//! ```
//!
//! Cada job lo ejecuta exactamente un worker, una sola vez:
//! 1. lookup en la caché; si acierta → `CompletedCached`
//! 2. si no, se llama al summarizer (sin tener ningún lock tomado)
//!    - éxito → se guarda en caché y la tarea queda `Completed`
//!    - fallo → la tarea queda `Failed(reason)`, sin reintentos

use crate::config::Config;
use crate::error::{StoreError, SubmitError, SummarizationError};
use crate::jobs::cache::{cache_key, ResultCache};
use crate::jobs::queue::{Job, JobQueue, QueueStats};
use crate::jobs::storage::TaskStore;
use crate::jobs::summarizer::{panic_message, Summarizer};
use crate::jobs::types::{TaskId, TaskStatus};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuración del Dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Número de workers del pool
    pub worker_count: usize,

    /// Capacidad máxima de la cola
    pub queue_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            worker_count: 4,
            queue_capacity: 1000,
        }
    }
}

impl DispatcherConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            worker_count: config.worker_count,
            queue_capacity: config.queue_capacity,
        }
    }
}

/// Resultado de ejecutar un job, antes de escribirlo en el store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// El resumen ya estaba en caché
    CacheHit(String),

    /// El summarizer produjo un resumen nuevo
    Summarized(String),

    /// El summarizer falló
    Failed(SummarizationError),
}

/// Dependencias compartidas por todos los workers
struct WorkerContext {
    queue: JobQueue,
    store: Arc<TaskStore>,
    cache: Arc<ResultCache>,
    summarizer: Arc<dyn Summarizer>,
}

/// Pool de workers de tamaño fijo
pub struct Dispatcher {
    config: DispatcherConfig,
    queue: JobQueue,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Crea el dispatcher e inicia sus workers
    pub fn new(
        config: DispatcherConfig,
        store: Arc<TaskStore>,
        cache: Arc<ResultCache>,
        summarizer: Arc<dyn Summarizer>,
    ) -> std::io::Result<Self> {
        let queue = JobQueue::new(config.queue_capacity);
        let context = Arc::new(WorkerContext {
            queue: queue.clone(),
            store,
            cache,
            summarizer,
        });

        let dispatcher = Self {
            config,
            queue,
            workers: Mutex::new(Vec::with_capacity(config.worker_count)),
        };

        dispatcher.spawn_workers(&context)?;

        Ok(dispatcher)
    }

    /// Inicia los workers para procesar jobs
    fn spawn_workers(&self, context: &Arc<WorkerContext>) -> std::io::Result<()> {
        let mut workers = self.workers.lock();

        for i in 0..self.config.worker_count {
            let name = format!("summary-worker-{}", i);
            let context = Arc::clone(context);

            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || worker_loop(&name, &context))?;

            workers.push(handle);
        }

        Ok(())
    }

    /// Encola un job
    ///
    /// Nunca bloquea: si la cola está llena falla con `SubmitError::QueueFull`.
    pub fn submit(&self, task_id: TaskId, text: String) -> Result<(), SubmitError> {
        self.queue.enqueue(Job::new(task_id, text)).map_err(|err| {
            warn!(task_id = %task_id, error = %err, "job rejected by dispatcher");
            SubmitError::from(err)
        })
    }

    pub fn worker_count(&self) -> usize {
        self.config.worker_count
    }

    /// Obtiene estadísticas de la cola
    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Espera a que no queden jobs encolados ni en ejecución
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    /// Cierra la cola, deja que los workers terminen lo ya aceptado y los espera
    pub fn shutdown(&self) {
        self.queue.close();

        let workers: Vec<_> = self.workers.lock().drain(..).collect();
        if workers.is_empty() {
            return;
        }

        info!(workers = workers.len(), "shutting down dispatcher");
        for handle in workers {
            if handle.join().is_err() {
                warn!("worker thread panicked during shutdown");
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Loop principal del worker
fn worker_loop(name: &str, context: &WorkerContext) {
    info!(worker = name, "🔧 worker started");

    while let Some(job) = context.queue.dequeue() {
        debug!(
            worker = name,
            task_id = %job.task_id,
            waited_ms = job.enqueued_at.elapsed().as_millis() as u64,
            "🔨 picked up job"
        );

        let outcome = execute_job(&job, &context.cache, context.summarizer.as_ref());
        record_outcome(name, &job, outcome, context);

        context.queue.finish();
    }

    info!(worker = name, "worker stopped");
}

/// Ejecuta un job: caché primero, summarizer en caso de miss
///
/// La llamada al summarizer no tiene ningún lock tomado; sólo el lookup y el
/// store de la caché se sincronizan. Un panic del summarizer se convierte en
/// un fallo de la tarea.
pub fn execute_job(job: &Job, cache: &ResultCache, summarizer: &dyn Summarizer) -> JobOutcome {
    if let Some(summary) = cache.lookup(&job.text) {
        debug!(task_id = %job.task_id, key = &cache_key(&job.text)[..12], "cache hit");
        return JobOutcome::CacheHit(summary);
    }

    let result = panic::catch_unwind(AssertUnwindSafe(|| summarizer.summarize(&job.text)))
        .unwrap_or_else(|payload| Err(SummarizationError::Panicked(panic_message(&*payload))));

    match result {
        // Un resumen vacío no cuenta como resultado ni se guarda en caché
        Ok(summary) if summary.trim().is_empty() => JobOutcome::Failed(SummarizationError::EmptySummary),
        Ok(summary) => {
            cache.store(&job.text, &summary);
            JobOutcome::Summarized(summary)
        }
        Err(err) => JobOutcome::Failed(err),
    }
}

/// Escribe la transición terminal de la tarea
fn record_outcome(worker: &str, job: &Job, outcome: JobOutcome, context: &WorkerContext) {
    let task_id = job.task_id;

    match write_outcome(&context.store, &task_id, outcome) {
        Ok(status) if status.is_success() => {
            info!(worker, task_id = %task_id, "✅ {}", status);
        }
        Ok(status) => {
            warn!(worker, task_id = %task_id, "❌ {}", status);
        }
        Err(err @ StoreError::AlreadyTerminal { .. }) => {
            warn!(worker, task_id = %task_id, error = %err, "ignoring second terminal transition");
        }
        Err(err @ StoreError::NotFound(_)) => {
            warn!(worker, task_id = %task_id, error = %err, "job finished for unknown task");
        }
    }
}

/// Aplica el resultado al store y retorna el estado terminal escrito
fn write_outcome(store: &TaskStore, task_id: &TaskId, outcome: JobOutcome) -> Result<TaskStatus, StoreError> {
    match outcome {
        JobOutcome::CacheHit(summary) => store.mark_completed(task_id, summary, true)?,
        JobOutcome::Summarized(summary) => store.mark_completed(task_id, summary, false)?,
        JobOutcome::Failed(err) => store.mark_failed(task_id, err.to_string())?,
    }
    store.get_status(task_id)
}
