//! # Cola de Jobs
//! src/jobs/queue.rs
//!
//! Cola FIFO acotada y thread-safe entre el Gateway y los workers.
//!
//! - `enqueue` nunca bloquea: si la cola está llena retorna `QueueError::Full`
//! - `dequeue` bloquea al worker hasta que haya un job o la cola se cierre
//! - al cerrar, los jobs ya encolados se siguen entregando hasta vaciarla
//!
//! La cola también lleva la cuenta de los jobs que un worker tomó y todavía
//! no terminó (`active`), para poder esperar a que el pool quede ocioso.

use crate::error::QueueError;
use crate::jobs::types::TaskId;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Un trabajo pendiente de resumir
#[derive(Debug, Clone)]
pub struct Job {
    pub task_id: TaskId,
    pub text: String,
    pub enqueued_at: Instant,
}

impl Job {
    pub fn new(task_id: TaskId, text: String) -> Self {
        Self {
            task_id,
            text,
            enqueued_at: Instant::now(),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    jobs: VecDeque<Job>,
    active: usize,
    closed: bool,
}

impl QueueState {
    fn is_idle(&self) -> bool {
        self.jobs.is_empty() && self.active == 0
    }
}

#[derive(Debug)]
struct QueueInner {
    state: Mutex<QueueState>,

    /// Notifica a los workers cuando hay jobs nuevos (o se cerró la cola)
    available: Condvar,

    /// Notifica cuando la cola queda vacía y sin jobs activos
    idle: Condvar,

    max_capacity: usize,
}

/// Cola FIFO acotada
///
/// Clonar la cola comparte el mismo estado interno.
#[derive(Debug, Clone)]
pub struct JobQueue {
    inner: Arc<QueueInner>,
}

impl JobQueue {
    /// Crea una nueva cola con capacidad máxima
    pub fn new(max_capacity: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                available: Condvar::new(),
                idle: Condvar::new(),
                max_capacity,
            }),
        }
    }

    /// Encola un job
    pub fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        let mut state = self.inner.state.lock();

        if state.closed {
            return Err(QueueError::Closed);
        }

        if state.jobs.len() >= self.inner.max_capacity {
            return Err(QueueError::Full {
                capacity: self.inner.max_capacity,
            });
        }

        state.jobs.push_back(job);
        self.inner.available.notify_one();

        Ok(())
    }

    /// Desencola el job más antiguo
    ///
    /// Bloquea hasta que haya un job disponible. Retorna `None` sólo cuando
    /// la cola está cerrada y vacía. Cada job entregado cuenta como activo
    /// hasta que el worker llame a [`JobQueue::finish`].
    pub fn dequeue(&self) -> Option<Job> {
        let mut state = self.inner.state.lock();

        loop {
            if let Some(job) = state.jobs.pop_front() {
                state.active += 1;
                return Some(job);
            }

            if state.closed {
                return None;
            }

            self.inner.available.wait(&mut state);
        }
    }

    /// Intenta desencolar sin bloquear
    pub fn try_dequeue(&self) -> Option<Job> {
        let mut state = self.inner.state.lock();
        let job = state.jobs.pop_front()?;
        state.active += 1;
        Some(job)
    }

    /// Marca como terminado un job entregado por `dequeue`
    pub fn finish(&self) {
        let mut state = self.inner.state.lock();
        state.active = state.active.saturating_sub(1);

        if state.is_idle() {
            self.inner.idle.notify_all();
        }
    }

    /// Cierra la cola: no acepta más jobs y despierta a los workers
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        self.inner.available.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Espera hasta que la cola esté vacía y ningún worker tenga un job
    ///
    /// Retorna `false` si se agotó el timeout.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();

        while !state.is_idle() {
            if self.inner.idle.wait_until(&mut state, deadline).timed_out() {
                return state.is_idle();
            }
        }

        true
    }

    /// Retorna el tamaño actual de la cola
    pub fn len(&self) -> usize {
        self.inner.state.lock().jobs.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retorna la capacidad máxima
    pub fn max_capacity(&self) -> usize {
        self.inner.max_capacity
    }

    /// Verifica si la cola está llena
    pub fn is_full(&self) -> bool {
        self.len() >= self.inner.max_capacity
    }

    /// Obtiene estadísticas de la cola
    pub fn stats(&self) -> QueueStats {
        let state = self.inner.state.lock();

        QueueStats {
            queued: state.jobs.len(),
            active: state.active,
            capacity: self.inner.max_capacity,
            closed: state.closed,
        }
    }
}

/// Estadísticas de la cola
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queued: usize,
    pub active: usize,
    pub capacity: usize,
    pub closed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn job(text: &str) -> Job {
        Job::new(TaskId::new(), text.to_string())
    }

    #[test]
    fn test_queue_fifo_order() {
        let queue = JobQueue::new(10);

        queue.enqueue(job("one")).unwrap();
        queue.enqueue(job("two")).unwrap();
        queue.enqueue(job("three")).unwrap();

        assert_eq!(queue.try_dequeue().unwrap().text, "one");
        assert_eq!(queue.try_dequeue().unwrap().text, "two");
        assert_eq!(queue.try_dequeue().unwrap().text, "three");
        assert!(queue.try_dequeue().is_none());
    }

    #[test]
    fn test_queue_capacity() {
        let queue = JobQueue::new(2);

        assert!(queue.enqueue(job("1")).is_ok());
        assert!(queue.enqueue(job("2")).is_ok());
        assert!(queue.is_full());
        assert_eq!(queue.enqueue(job("3")), Err(QueueError::Full { capacity: 2 }));

        // Al sacar uno vuelve a haber espacio
        queue.try_dequeue().unwrap();
        assert!(queue.enqueue(job("3")).is_ok());
    }

    #[test]
    fn test_closed_queue_rejects_and_drains() {
        let queue = JobQueue::new(10);
        queue.enqueue(job("pending")).unwrap();
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.enqueue(job("late")), Err(QueueError::Closed));

        // Lo ya encolado se sigue entregando
        assert_eq!(queue.dequeue().unwrap().text, "pending");
        queue.finish();
        assert!(queue.dequeue().is_none());
    }

    #[test]
    fn test_dequeue_blocks_until_enqueue() {
        let queue = JobQueue::new(10);
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.dequeue().map(|job| job.text))
        };

        queue.enqueue(job("wake up")).unwrap();
        assert_eq!(consumer.join().unwrap().as_deref(), Some("wake up"));
    }

    #[test]
    fn test_close_wakes_blocked_workers() {
        let queue = JobQueue::new(10);
        let workers: Vec<_> = (0..3)
            .map(|_| {
                let queue = queue.clone();
                thread::spawn(move || queue.dequeue().is_none())
            })
            .collect();

        queue.close();

        for worker in workers {
            assert!(worker.join().unwrap());
        }
    }

    #[test]
    fn test_active_jobs_tracking() {
        let queue = JobQueue::new(10);
        queue.enqueue(job("a")).unwrap();

        let _taken = queue.dequeue().unwrap();
        let stats = queue.stats();
        assert_eq!(stats.queued, 0);
        assert_eq!(stats.active, 1);
        assert!(!queue.wait_idle(Duration::from_millis(20)));

        queue.finish();
        assert_eq!(queue.stats().active, 0);
        assert!(queue.wait_idle(Duration::from_millis(20)));
    }

    #[test]
    fn test_wait_idle_wakes_on_finish() {
        let queue = JobQueue::new(10);
        queue.enqueue(job("a")).unwrap();

        let worker = {
            let queue = queue.clone();
            thread::spawn(move || {
                let _job = queue.dequeue();
                thread::sleep(Duration::from_millis(30));
                queue.finish();
            })
        };

        assert!(queue.wait_idle(Duration::from_secs(5)));
        worker.join().unwrap();
    }

    #[test]
    fn test_stats() {
        let queue = JobQueue::new(5);
        queue.enqueue(job("a")).unwrap();
        queue.enqueue(job("b")).unwrap();

        assert_eq!(
            queue.stats(),
            QueueStats {
                queued: 2,
                active: 0,
                capacity: 5,
                closed: false,
            }
        );
        assert_eq!(queue.max_capacity(), 5);
        assert_eq!(queue.len(), 2);
        assert!(!queue.is_empty());
    }
}
