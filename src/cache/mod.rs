//! Cache
//!
//! Este módulo contiene el contrato del cache de clientes y sus
//! implementaciones (Redis y memoria). Ningún fallo del cache se propaga
//! como error de negocio: se reporta como degradado y el coordinador
//! decide cómo absorberlo.

pub mod cache_config;
pub mod memory_cache;
pub mod redis_client;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::models::customer::Customer;

pub use cache_config::CacheConfig;
pub use memory_cache::MemoryCache;
pub use redis_client::RedisClient;

/// Fallo degradado del cache
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache operation '{operation}' timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("cache connection error: {0}")]
    Connection(String),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Resultado de una lectura del cache.
///
/// Una entrada expirada y una inexistente son indistinguibles (`Miss`).
#[derive(Debug)]
pub enum CacheLookup {
    Hit(Customer),
    Miss,
    Degraded(CacheError),
}

/// Contrato del cache de snapshots de clientes, indexado por identificador natural
#[async_trait]
pub trait CustomerCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheLookup;

    /// Siempre (re)instala el TTL
    async fn set(&self, key: &str, customer: &Customer, ttl: Duration) -> Result<(), CacheError>;

    /// Devuelve si la entrada existía
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn clear_all(&self) -> Result<(), CacheError>;

    async fn is_connected(&self) -> bool;
}
