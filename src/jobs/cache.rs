//! # Caché de Resultados
//! src/jobs/cache.rs
//!
//! Mapea el texto exacto enviado a su resumen ya calculado, para no volver a
//! llamar al summarizer con el mismo texto.
//!
//! Las entradas se direccionan por contenido: la clave es el SHA-256 del
//! texto, y cada entrada guarda también el texto original para que un
//! `lookup` sólo acierte con una coincidencia byte a byte. No hay
//! normalización (mayúsculas o espacios distintos son un miss) ni expiración.

use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Calcula la clave de caché (SHA-256 en hex) de un texto
pub fn cache_key(text: &str) -> String {
    format!("{:x}", Sha256::digest(text.as_bytes()))
}

#[derive(Debug, Clone)]
struct CacheEntry {
    text: String,
    summary: String,
}

/// Caché de resúmenes thread-safe
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Busca el resumen de un texto (coincidencia exacta)
    pub fn lookup(&self, text: &str) -> Option<String> {
        let key = cache_key(text);

        let found = self
            .entries
            .read()
            .get(&key)
            .filter(|entry| entry.text == text)
            .map(|entry| entry.summary.clone());

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);

        found
    }

    /// Guarda (o reemplaza) el resumen de un texto
    ///
    /// Escrituras concurrentes para el mismo texto son seguras: gana la
    /// última, y se espera que el valor sea el mismo.
    pub fn store(&self, text: &str, summary: &str) {
        let key = cache_key(text);
        let entry = CacheEntry {
            text: text.to_string(),
            summary: summary.to_string(),
        };

        self.entries.write().insert(key, entry);
    }

    /// Número de entradas
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Estadísticas de la caché
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
