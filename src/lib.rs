//! # Summary Jobs
//! src/lib.rs
//!
//! Núcleo asíncrono de un servicio de resúmenes: recibe un texto, agenda un
//! job de resumen y permite consultar el estado y el resultado haciendo
//! polling.
//!
//! ## Arquitectura
//!
//! - `jobs`: ciclo de vida de tareas, cola, pool de workers y caché
//! - `api`: vistas serializables para una capa HTTP externa
//! - `config`: configuración por CLI y variables de entorno
//! - `error`: taxonomía de errores
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use summary_jobs::config::Config;
//! use summary_jobs::jobs::{Gateway, UnavailableSummarizer};
//!
//! let gateway = Gateway::from_config(&Config::default(), Arc::new(UnavailableSummarizer::default()))?;
//! let id = gateway.submit_job("one two three four five six seven eight nine ten")?;
//! println!("{}", gateway.status(&id)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
