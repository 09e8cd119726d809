//! Cache en memoria
//!
//! Implementación del contrato de cache sobre un `HashMap` con expiración por
//! entrada. Se usa en desarrollo local (`CACHE_BACKEND=memory`) y en pruebas.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::{CacheError, CacheLookup, CustomerCache};
use crate::models::customer::Customer;

/// Snapshot serializado con su instante de expiración
#[derive(Debug, Clone)]
struct MemoryEntry {
    payload: String,
    expires_at: Instant,
}

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de entradas vigentes
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|entry| entry.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CustomerCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheLookup {
        let payload = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => Some(entry.payload.clone()),
                Some(_) => None,
                None => {
                    debug!("❌ Cache MISS para clave: {}", key);
                    return CacheLookup::Miss;
                }
            }
        };

        match payload {
            Some(payload) => match serde_json::from_str::<Customer>(&payload) {
                Ok(customer) => {
                    debug!("📥 Cache HIT para clave: {}", key);
                    CacheLookup::Hit(customer)
                }
                Err(e) => CacheLookup::Degraded(e.into()),
            },
            None => {
                // Expirada: se purga salvo que otra escritura la haya renovado
                let mut entries = self.entries.write().await;
                if entries
                    .get(key)
                    .is_some_and(|entry| entry.expires_at <= Instant::now())
                {
                    entries.remove(key);
                }
                debug!("⏰ Cache expirado para clave: {}", key);
                CacheLookup::Miss
            }
        }
    }

    async fn set(&self, key: &str, customer: &Customer, ttl: Duration) -> Result<(), CacheError> {
        let payload = serde_json::to_string(customer)?;
        let entry = MemoryEntry {
            payload,
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        debug!("💾 Cache SET para clave: {} (TTL: {:?})", key, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.write().await.remove(key);
        Ok(matches!(removed, Some(entry) if entry.expires_at > Instant::now()))
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
