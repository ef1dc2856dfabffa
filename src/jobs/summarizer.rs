//! # Summarizer
//! src/jobs/summarizer.rs
//!
//! Capacidad externa que produce un resumen a partir de un texto. El núcleo
//! no sabe si detrás hay un modelo local o una API remota: sólo llama a
//! [`Summarizer::summarize`] y tolera latencias de segundos y fallos.
//!
//! Implementaciones incluidas:
//! - cualquier closure `Fn(&str) -> Result<String, SummarizationError>`
//! - [`CommandSummarizer`]: programa externo (texto por stdin, resumen por stdout)
//! - [`TimeoutSummarizer`]: envuelve otro summarizer con un timeout
//! - [`UnavailableSummarizer`]: falla siempre (no hay summarizer configurado)

use crate::error::SummarizationError;
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Mensaje con el que fallan las tareas cuando no hay summarizer
pub const MODEL_NOT_LOADED: &str = "Summarizer model not loaded";

/// Capacidad de resumir texto
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, SummarizationError>;
}

impl<F> Summarizer for F
where
    F: Fn(&str) -> Result<String, SummarizationError> + Send + Sync,
{
    fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        self(text)
    }
}

/// Summarizer que falla siempre con la misma razón
#[derive(Debug, Clone)]
pub struct UnavailableSummarizer {
    reason: String,
}

impl UnavailableSummarizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

impl Default for UnavailableSummarizer {
    fn default() -> Self {
        Self::new(MODEL_NOT_LOADED)
    }
}

impl Summarizer for UnavailableSummarizer {
    fn summarize(&self, _text: &str) -> Result<String, SummarizationError> {
        Err(SummarizationError::Unavailable(self.reason.clone()))
    }
}

/// Ejecuta un programa externo por cada resumen
///
/// El texto se escribe en el stdin del proceso y el resumen se lee de su
/// stdout (sin espacios al inicio o al final).
#[derive(Debug, Clone)]
pub struct CommandSummarizer {
    program: String,
    args: Vec<String>,
}

impl CommandSummarizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Construye el summarizer desde una línea de comando (`"prog arg1 arg2"`)
    ///
    /// Retorna `None` si la línea está vacía.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Summarizer for CommandSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SummarizationError::Unavailable(format!("failed to start '{}': {}", self.program, e))
            })?;

        // stdin se escribe desde otro thread mientras se lee stdout, si no
        // un proceso que emite mientras lee llena el pipe y se bloquea
        let writer = match child.stdin.take() {
            Some(mut stdin) => {
                let input = text.to_string();
                let spawned = thread::Builder::new()
                    .name("summarizer-stdin".to_string())
                    .spawn(move || stdin.write_all(input.as_bytes()));

                match spawned {
                    Ok(handle) => Some(handle),
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(SummarizationError::Unavailable(format!(
                            "failed to spawn stdin writer: {}",
                            e
                        )));
                    }
                }
            }
            None => None,
        };

        // Siempre se espera al proceso, aunque la escritura haya fallado
        let output = child
            .wait_with_output()
            .map_err(|e| SummarizationError::Failed(format!("failed to read output: {}", e)))?;

        let written = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked"))),
            None => Ok(()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            let detail = if detail.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                detail.to_string()
            };
            return Err(SummarizationError::Failed(detail));
        }

        if let Err(e) = written {
            return Err(SummarizationError::Failed(format!("failed to write input: {}", e)));
        }

        let summary = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if summary.is_empty() {
            return Err(SummarizationError::EmptySummary);
        }

        Ok(summary)
    }
}

/// Envuelve un summarizer con un tiempo máximo de ejecución
///
/// La llamada interna corre en un thread auxiliar. Si no termina a tiempo
/// la tarea falla con `SummarizationError::Timeout`; el thread auxiliar se
/// abandona (no hay forma de abortar la llamada externa).
pub struct TimeoutSummarizer {
    inner: Arc<dyn Summarizer>,
    timeout: Duration,
    poll_interval: Duration,
}

impl TimeoutSummarizer {
    pub fn new(inner: Arc<dyn Summarizer>, timeout: Duration) -> Self {
        Self {
            inner,
            timeout,
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl Summarizer for TimeoutSummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_string();

        let handle = thread::Builder::new()
            .name("summarizer-call".to_string())
            .spawn(move || inner.summarize(&text))
            .map_err(|e| SummarizationError::Unavailable(format!("failed to spawn thread: {}", e)))?;

        let start = Instant::now();
        while start.elapsed() < self.timeout {
            if handle.is_finished() {
                return handle
                    .join()
                    .unwrap_or_else(|payload| Err(SummarizationError::Panicked(panic_message(&*payload))));
            }
            thread::sleep(self.poll_interval);
        }

        Err(SummarizationError::Timeout(self.timeout))
    }
}

/// Extrae el mensaje de un panic
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_summarizer() {
        let summarizer = |text: &str| Ok::<_, SummarizationError>(text.to_uppercase());
        assert_eq!(summarizer.summarize("abc").unwrap(), "ABC");
    }

    #[test]
    fn test_unavailable_summarizer() {
        let summarizer = UnavailableSummarizer::default();
        let err = summarizer.summarize("anything").unwrap_err();
        assert_eq!(err.to_string(), MODEL_NOT_LOADED);
    }

    #[test]
    fn test_command_line_parsing() {
        let summarizer = CommandSummarizer::from_command_line("python3 summarize.py --short").unwrap();
        assert_eq!(summarizer.program(), "python3");
        assert_eq!(summarizer.args, vec!["summarize.py", "--short"]);

        assert!(CommandSummarizer::from_command_line("   ").is_none());
    }

    #[test]
    fn test_command_missing_program() {
        let summarizer = CommandSummarizer::new("definitely-not-a-real-program-xyz", vec![]);
        let err = summarizer.summarize("text").unwrap_err();
        assert!(matches!(err, SummarizationError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_echoes_stdout() {
        let summarizer = CommandSummarizer::new("cat", vec![]);
        let summary = summarizer.summarize("  piped through cat \n").unwrap();
        assert_eq!(summary, "piped through cat");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_carries_stderr() {
        let summarizer = CommandSummarizer::new(
            "sh",
            vec!["-c".to_string(), "echo 'model exploded' >&2; exit 3".to_string()],
        );
        let err = summarizer.summarize("text").unwrap_err();
        assert_eq!(err, SummarizationError::Failed("model exploded".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_empty_output() {
        let summarizer = CommandSummarizer::new("sh", vec!["-c".to_string(), "cat > /dev/null".to_string()]);
        let err = summarizer.summarize("text").unwrap_err();
        assert_eq!(err, SummarizationError::EmptySummary);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_streams_large_input() {
        // Más grande que el buffer de un pipe: cat emite mientras lee
        let input = "word ".repeat(60_000);
        let summarizer = CommandSummarizer::new("cat", vec![]);
        let summary = summarizer.summarize(&input).unwrap();
        assert_eq!(summary.len(), input.trim().len());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_closed_stdin_waits_for_child() {
        let summarizer = CommandSummarizer::new(
            "sh",
            vec!["-c".to_string(), "exec 0<&-; sleep 0.3".to_string()],
        );
        let input = "x".repeat(200_000);

        let start = Instant::now();
        let err = summarizer.summarize(&input).unwrap_err();

        match err {
            SummarizationError::Failed(msg) => assert!(msg.starts_with("failed to write input"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
        // Retorna sólo después de que el proceso terminó (y fue recogido)
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[test]
    fn test_timeout_passes_fast_result() {
        let inner: Arc<dyn Summarizer> = Arc::new(|text: &str| Ok::<_, SummarizationError>(format!("<{}>", text)));
        let summarizer = TimeoutSummarizer::new(inner, Duration::from_secs(5));
        assert_eq!(summarizer.summarize("fast").unwrap(), "<fast>");
    }

    #[test]
    fn test_timeout_expires() {
        let inner: Arc<dyn Summarizer> = Arc::new(|_: &str| {
            thread::sleep(Duration::from_millis(500));
            Ok::<_, SummarizationError>("too late".to_string())
        });
        let summarizer = TimeoutSummarizer::new(inner, Duration::from_millis(50));

        let err = summarizer.summarize("slow").unwrap_err();
        assert_eq!(err, SummarizationError::Timeout(Duration::from_millis(50)));
    }

    #[test]
    fn test_timeout_propagates_inner_error() {
        let inner: Arc<dyn Summarizer> = Arc::new(UnavailableSummarizer::new("offline"));
        let summarizer = TimeoutSummarizer::new(inner, Duration::from_secs(5));
        assert_eq!(
            summarizer.summarize("x").unwrap_err(),
            SummarizationError::Unavailable("offline".to_string())
        );
    }

    #[test]
    fn test_timeout_reports_panic() {
        let inner: Arc<dyn Summarizer> = Arc::new(|_: &str| -> Result<String, SummarizationError> {
            panic!("inference crashed")
        });
        let summarizer = TimeoutSummarizer::new(inner, Duration::from_secs(5));
        assert_eq!(
            summarizer.summarize("x").unwrap_err(),
            SummarizationError::Panicked("inference crashed".to_string())
        );
    }
}
