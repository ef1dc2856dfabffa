//! # Summary Jobs - Entry Point
//! src/main.rs
//!
//! Lee documentos (archivos o stdin), los envía al gateway, imprime un
//! recibo JSON por documento y hace polling hasta que todas las tareas
//! terminan.
//!
//! Códigos de salida: 0 ok, 1 error de I/O, 2 configuración inválida.

use anyhow::{Context, Result};
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::thread;
use summary_jobs::api::{self, ResultReply};
use summary_jobs::config::Config;
use summary_jobs::jobs::summarizer::MODEL_NOT_LOADED;
use summary_jobs::jobs::{CommandSummarizer, Gateway, Summarizer, TimeoutSummarizer, UnavailableSummarizer};
use summary_jobs::logging::init_logging;
use tracing::{error, info, warn};

fn main() {
    let config = Config::new();
    init_logging(&config.log_filter);

    if let Err(e) = config.validate() {
        error!("💥 {}", e);
        std::process::exit(2);
    }
    config.log_summary();

    if let Err(e) = run(&config) {
        error!("💥 Error fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<()> {
    let documents = read_documents(config)?;

    let gateway = Gateway::from_config(config, build_summarizer(config))
        .context("failed to start worker pool")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut pending = Vec::new();
    for (name, text) in &documents {
        match api::submit(&gateway, text) {
            Ok(receipt) => {
                writeln!(out, "{}", serde_json::to_string(&receipt)?)?;
                pending.push(receipt.task_id);
            }
            Err(err) => {
                warn!(input = %name, detail = %err.detail, "document rejected");
                let body = serde_json::json!({ "input": name, "detail": err.detail });
                writeln!(out, "{}", body)?;
            }
        }
    }

    while !pending.is_empty() {
        let mut still_pending = Vec::with_capacity(pending.len());
        for task_id in pending {
            match api::result(&gateway, &task_id) {
                Ok(ResultReply::Ready(view)) => writeln!(out, "{}", serde_json::to_string(&view)?)?,
                Ok(ResultReply::Processing(_)) => still_pending.push(task_id),
                Err(err) => anyhow::bail!("task {} vanished: {}", task_id, err.detail),
            }
        }
        pending = still_pending;

        if !pending.is_empty() {
            thread::sleep(config.poll_interval());
        }
    }
    out.flush()?;

    let stats = gateway.stats();
    info!(stats = %serde_json::to_string(&stats)?, "📊 all tasks finished");

    gateway.shutdown();
    Ok(())
}

/// Un documento por archivo, o stdin completo si no hay archivos
fn read_documents(config: &Config) -> Result<Vec<(String, String)>> {
    if config.inputs.is_empty() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(vec![("<stdin>".to_string(), text)]);
    }

    config
        .inputs
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((path.display().to_string(), text))
        })
        .collect()
}

fn build_summarizer(config: &Config) -> Arc<dyn Summarizer> {
    let command = config
        .summarizer_command
        .as_deref()
        .and_then(CommandSummarizer::from_command_line);

    let summarizer: Arc<dyn Summarizer> = match command {
        Some(command) => {
            info!(program = command.program(), "🧠 using external summarizer");
            Arc::new(command)
        }
        None => {
            warn!("no summarizer configured, tasks will fail with '{}'", MODEL_NOT_LOADED);
            Arc::new(UnavailableSummarizer::default())
        }
    };

    match config.summarizer_timeout() {
        Some(timeout) => Arc::new(TimeoutSummarizer::new(summarizer, timeout)),
        None => summarizer,
    }
}
