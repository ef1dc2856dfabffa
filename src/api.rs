//! # Vistas de la Frontera HTTP
//! src/api.rs
//!
//! Tipos serializables que una capa HTTP devolvería en cada endpoint, y las
//! funciones que los arman a partir del [`Gateway`]. El ruteo en sí no vive
//! aquí.
//!
//! | Endpoint            | Éxito                          | Error                |
//! |---------------------|--------------------------------|----------------------|
//! | `POST /summarize`   | [`SubmitReceipt`]              | 400 / 503            |
//! | `GET /status/{id}`  | [`StatusView`]                 | 404                  |
//! | `GET /result/{id}`  | [`ResultReply`] (200 o 202)    | 404                  |
//!
//! # Ejemplo de response
//! ```json
//! {"task_id": "5f0c...", "status_url": "/status/5f0c...", "result_url": "/result/5f0c..."}
//! ```

use crate::error::{StoreError, SubmitError};
use crate::jobs::{Gateway, TaskId, TaskResult};
use serde::{Deserialize, Serialize};

/// Detalle de la respuesta a un resultado pendiente
pub const STILL_PROCESSING: &str = "Task still processing";

/// Detalle de la respuesta a un ID desconocido
pub const TASK_NOT_FOUND: &str = "Task not found";

/// Respuesta a un envío aceptado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub task_id: String,
    pub status_url: String,
    pub result_url: String,
}

impl SubmitReceipt {
    pub fn for_task(id: &TaskId) -> Self {
        Self {
            task_id: id.to_string(),
            status_url: format!("/status/{}", id),
            result_url: format!("/result/{}", id),
        }
    }
}

/// Respuesta de `GET /status/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    pub task_id: String,
    pub status: String,
}

/// Resultado de una tarea terminada
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultView {
    pub task_id: String,
    pub status: String,
    pub result: Option<String>,
}

/// Respuesta 202 a una tarea que sigue pendiente
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingView {
    pub task_id: String,
    pub detail: String,
}

/// Respuesta de `GET /result/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultReply {
    Ready(ResultView),
    Processing(ProcessingView),
}

impl ResultReply {
    /// Código HTTP que le corresponde
    pub fn status_code(&self) -> u16 {
        match self {
            ResultReply::Ready(_) => 200,
            ResultReply::Processing(_) => 202,
        }
    }
}

/// Cuerpo de una respuesta de error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorView {
    pub detail: String,

    /// Código HTTP (no se serializa en el cuerpo)
    #[serde(skip)]
    pub status_code: u16,
}

impl ErrorView {
    pub fn new(status_code: u16, detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            status_code,
        }
    }
}

impl From<SubmitError> for ErrorView {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::InvalidInput(reason) => ErrorView::new(400, capitalize(&reason.to_string())),
            other => ErrorView::new(503, other.to_string()),
        }
    }
}

impl From<StoreError> for ErrorView {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ErrorView::new(404, TASK_NOT_FOUND),
            other => ErrorView::new(409, other.to_string()),
        }
    }
}

// "text too short..." -> "Text too short..."
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `POST /summarize`
pub fn submit(gateway: &Gateway, text: &str) -> Result<SubmitReceipt, ErrorView> {
    let id = gateway.submit_job(text)?;
    Ok(SubmitReceipt::for_task(&id))
}

/// `GET /status/{id}`
pub fn status(gateway: &Gateway, raw_id: &str) -> Result<StatusView, ErrorView> {
    let id: TaskId = raw_id.parse()?;
    let status = gateway.status(&id)?;
    Ok(StatusView {
        task_id: id.to_string(),
        status: status.to_string(),
    })
}

/// `GET /result/{id}`
pub fn result(gateway: &Gateway, raw_id: &str) -> Result<ResultReply, ErrorView> {
    let id: TaskId = raw_id.parse()?;
    let reply = match gateway.result(&id)? {
        TaskResult::NotReady => ResultReply::Processing(ProcessingView {
            task_id: id.to_string(),
            detail: STILL_PROCESSING.to_string(),
        }),
        TaskResult::Ready { status, summary } => ResultReply::Ready(ResultView {
            task_id: id.to_string(),
            status: status.to_string(),
            result: summary,
        }),
    };
    Ok(reply)
}
