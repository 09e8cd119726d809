//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

use crate::cache::CacheConfig;
use crate::config::database::DatabaseConfig;

/// Backend del store persistente
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Backend del cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow!("STORAGE_BACKEND desconocido: '{}'", other)),
        }
    }
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" => Ok(CacheBackend::Memory),
            other => Err(anyhow!("CACHE_BACKEND desconocido: '{}'", other)),
        }
    }
}

/// Usuario habilitado para obtener tokens (`usuario:contraseña:ROL`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSeed {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub storage_backend: StorageBackend,
    pub cache_backend: CacheBackend,
    pub database: Option<DatabaseConfig>,
    pub cache: CacheConfig,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub users: Vec<UserSeed>,
    pub notification_webhook_url: Option<String>,
    pub cors_origins: Vec<String>,
}

const DEFAULT_USERS: &str = "user:password:USER,admin:admin:ADMIN";
const DEVELOPMENT_JWT_SECRET: &str = "development-only-secret";

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} inválido ('{}'): {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

/// Interpretar `usuario:contraseña:ROL` separados por comas
pub fn parse_users(raw: &str) -> Result<Vec<UserSeed>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            // La contraseña puede contener ':'; el rol es el último segmento
            let parsed = entry
                .split_once(':')
                .and_then(|(username, rest)| rest.rsplit_once(':').map(|(p, r)| (username, p, r)));
            match parsed {
                Some((username, password, role))
                    if !username.is_empty() && !password.is_empty() && !role.is_empty() =>
                {
                    Ok(UserSeed {
                        username: username.to_string(),
                        password: password.to_string(),
                        role: role.to_ascii_uppercase(),
                    })
                }
                _ => Err(anyhow!("Entrada AUTH_USERS inválida: '{}'", entry)),
            }
        })
        .collect()
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let environment = var_or("ENVIRONMENT", "development");
        let storage_backend: StorageBackend = var_or("STORAGE_BACKEND", "postgres").parse()?;
        let cache_backend: CacheBackend = var_or("CACHE_BACKEND", "redis").parse()?;

        let database = match storage_backend {
            StorageBackend::Postgres => {
                let url = env::var("DATABASE_URL")
                    .context("DATABASE_URL must be set when STORAGE_BACKEND=postgres")?;
                Some(DatabaseConfig {
                    url,
                    max_connections: parse_var("DB_MAX_CONNECTIONS", 10)?,
                    timeout_ms: parse_var("DB_TIMEOUT_MS", 5000)?,
                    ..DatabaseConfig::default()
                })
            }
            StorageBackend::Memory => None,
        };

        let cache_defaults = CacheConfig::default();
        let cache = CacheConfig {
            redis_url: var_or("REDIS_URL", &cache_defaults.redis_url),
            default_ttl: parse_var("CACHE_TTL_SECONDS", cache_defaults.default_ttl)?,
            timeout_ms: parse_var("CACHE_TIMEOUT_MS", cache_defaults.timeout_ms)?,
            key_prefix: var_or("CACHE_KEY_PREFIX", &cache_defaults.key_prefix),
        };

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == "development" => DEVELOPMENT_JWT_SECRET.to_string(),
            _ => return Err(anyhow!("JWT_SECRET must be set outside development")),
        };

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            host: var_or("HOST", "0.0.0.0"),
            storage_backend,
            cache_backend,
            database,
            cache,
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", 36_000)?,
            users: parse_users(&var_or("AUTH_USERS", DEFAULT_USERS))?,
            notification_webhook_url: env::var("NOTIFICATION_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
