//! Configuración de cache
//!
//! Este módulo contiene la configuración para el sistema de cache.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuración del cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub redis_url: String,
    /// TTL en segundos de cada snapshot
    pub default_ttl: u64,
    /// Timeout por operación; corto para no bloquear el camino crítico
    pub timeout_ms: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://localhost:6379".to_string(),
            default_ttl: 3600, // 1 hora
            timeout_ms: 250,
            key_prefix: "customer".to_string(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl.max(1))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_is_never_zero() {
        let config = CacheConfig {
            default_ttl: 0,
            ..CacheConfig::default()
        };
        assert_eq!(config.ttl(), Duration::from_secs(1));
    }
}
