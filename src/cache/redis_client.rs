use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, RedisResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CacheConfig, CacheError, CacheLookup, CustomerCache};
use crate::models::customer::Customer;

/// Claves por iteración de SCAN en `clear_all`
const SCAN_BATCH: usize = 200;

/// Cliente Redis con connection manager y operaciones async acotadas por timeout
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(config: CacheConfig) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())?;
        let manager = ConnectionManager::new(client).await?;

        // Test de conexión usando un comando simple
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager, config })
    }

    /// Generar clave de cache con prefijo
    fn make_key(&self, identifier: &str) -> String {
        format!("{}:{}", self.config.key_prefix, identifier)
    }

    /// Ejecutar un comando con el timeout del cache
    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        let timeout = self.config.timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(CacheError::Connection(e.to_string())),
            Err(_) => Err(CacheError::Timeout { operation, timeout }),
        }
    }
}

#[async_trait]
impl CustomerCache for RedisClient {
    async fn get(&self, key: &str) -> CacheLookup {
        let key = self.make_key(key);
        let mut conn = self.manager.clone();

        match self.timed("get", conn.get::<_, Option<String>>(&key)).await {
            Ok(Some(value)) => match serde_json::from_str::<Customer>(&value) {
                Ok(customer) => {
                    debug!("📥 Cache HIT para clave: {}", key);
                    CacheLookup::Hit(customer)
                }
                Err(e) => {
                    warn!("⚠️ Snapshot ilegible en cache para clave {}: {}", key, e);
                    CacheLookup::Degraded(e.into())
                }
            },
            Ok(None) => {
                debug!("❌ Cache MISS para clave: {}", key);
                CacheLookup::Miss
            }
            Err(e) => CacheLookup::Degraded(e),
        }
    }

    async fn set(&self, key: &str, customer: &Customer, ttl: Duration) -> Result<(), CacheError> {
        let key = self.make_key(key);
        let mut conn = self.manager.clone();

        let serialized = serde_json::to_string(customer)?;
        let seconds = ttl.as_secs().max(1);

        self.timed("set", conn.set_ex::<_, _, ()>(&key, serialized, seconds))
            .await?;

        debug!("💾 Cache SET para clave: {} (TTL: {}s)", key, seconds);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let key = self.make_key(key);
        let mut conn = self.manager.clone();

        let count = self.timed("delete", conn.del::<_, i64>(&key)).await?;

        debug!("🗑️ Cache DELETE para clave: {} (eliminados: {})", key, count);
        Ok(count > 0)
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        let pattern = format!("{}:*", self.config.key_prefix);
        let mut conn = self.manager.clone();
        let mut cursor: u64 = 0;
        let mut removed: i64 = 0;

        info!("🧹 Limpiando cache de clientes ({})...", pattern);

        loop {
            let mut scan = redis::cmd("SCAN");
            scan.arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH);
            let (next, keys) = self
                .timed("scan", scan.query_async::<_, (u64, Vec<String>)>(&mut conn))
                .await?;

            if !keys.is_empty() {
                removed += self.timed("delete", conn.del::<_, i64>(keys)).await?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!("✅ Cache limpiado ({} claves eliminadas)", removed);
        Ok(())
    }

    /// Verificar si Redis está conectado
    async fn is_connected(&self) -> bool {
        let mut conn = self.manager.clone();
        let ping = redis::cmd("PING");
        let response = self
            .timed("ping", ping.query_async::<_, String>(&mut conn))
            .await;
        matches!(response, Ok(pong) if pong == "PONG")
    }
}
