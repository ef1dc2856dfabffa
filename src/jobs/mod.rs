//! # Sistema de Tareas de Resumen
//!
//! Núcleo asíncrono: ciclo de vida de las tareas, pool de workers y caché
//! de resultados entre el envío y el summarizer externo.
//!
//! ## Flujo
//!
//! ```text
//! Gateway::submit_job ─► TaskStore::create (Pending) ─► Dispatcher::submit
//!                                                          │
//!                        worker: ResultCache ─► Summarizer ─► TaskStore (terminal)
//!
//! Gateway::status / Gateway::result ◄── polling
//! ```

pub mod cache;
pub mod dispatcher;
pub mod gateway;
pub mod queue;
pub mod storage;
pub mod summarizer;
pub mod types;

pub use cache::{CacheStats, ResultCache};
pub use dispatcher::{Dispatcher, DispatcherConfig, JobOutcome};
pub use gateway::{Gateway, InputLimits, ServiceStats};
pub use queue::{Job, JobQueue, QueueStats};
pub use storage::{StatusCounts, TaskStore};
pub use summarizer::{CommandSummarizer, Summarizer, TimeoutSummarizer, UnavailableSummarizer};
pub use types::{TaskId, TaskRecord, TaskResult, TaskStatus};
