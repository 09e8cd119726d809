use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use customer_service::cache::{CustomerCache, MemoryCache, RedisClient};
use customer_service::config::{CacheBackend, EnvironmentConfig, StorageBackend};
use customer_service::database;
use customer_service::repositories::{
    CustomerRepository, MemoryCustomerRepository, PgCustomerRepository,
};
use customer_service::routes::create_app_router;
use customer_service::services::auth_service::AuthService;
use customer_service::services::customer_service::CustomerService;
use customer_service::services::notification_service::{
    LogNotificationSink, NotificationSink, WebhookNotificationSink,
};
use customer_service::state::AppState;
use customer_service::utils::jwt::JwtConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("👥 Customer Service - Registro de clientes");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);
    if config.is_development() && std::env::var("JWT_SECRET").is_err() {
        warn!("⚠️ JWT_SECRET no definido: usando secreto de desarrollo");
    }

    // Store persistente
    let repository: Arc<dyn CustomerRepository> = match config.storage_backend {
        StorageBackend::Postgres => {
            let db_config = config
                .database
                .clone()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL es requerido con STORAGE_BACKEND=postgres"))?;

            let pool = match database::connect(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };

            Arc::new(PgCustomerRepository::new(pool, db_config.operation_timeout()))
        }
        StorageBackend::Memory => {
            warn!("⚠️ Usando store en memoria: los datos se pierden al reiniciar");
            Arc::new(MemoryCustomerRepository::new())
        }
    };

    // Cache
    let cache: Arc<dyn CustomerCache> = match config.cache_backend {
        CacheBackend::Redis => match RedisClient::new(config.cache.clone()).await {
            Ok(client) => {
                info!("✅ Redis conectado exitosamente");
                Arc::new(client)
            }
            Err(e) => {
                error!("❌ Error conectando a Redis: {}", e);
                return Err(anyhow::anyhow!("Error de Redis: {}", e));
            }
        },
        CacheBackend::Memory => {
            info!("🧠 Usando cache en memoria");
            Arc::new(MemoryCache::new())
        }
    };

    // Notificaciones de alta
    let notifier: Arc<dyn NotificationSink> = match &config.notification_webhook_url {
        Some(url) => {
            info!("📣 Notificaciones vía webhook: {}", url);
            Arc::new(WebhookNotificationSink::new(reqwest::Client::new(), url.clone()))
        }
        None => Arc::new(LogNotificationSink),
    };

    let customers = CustomerService::new(cache, repository, notifier, config.cache.ttl());
    let auth = AuthService::new(&config.users, JwtConfig::from(&config))?;

    let app_state = AppState::new(customers, auth);
    let app = create_app_router(app_state, &config.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en {}", config.server_url());
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health - Health check");
    info!("   POST   /auth/login - Obtener token");
    info!("👥 Endpoints - Customer (JWT):");
    info!("   POST   /customer - Registrar cliente (customer_type en el cuerpo)");
    info!("   POST   /customer/personal - Registrar cliente PERSONAL");
    info!("   POST   /customer/business - Registrar cliente BUSINESS");
    info!("   GET    /customer - Listar clientes");
    info!("   GET    /customer/:identifier - Obtener cliente");
    info!("   PUT    /customer/:identifier/address - Actualizar dirección");
    info!("   PUT    /customer/:identifier/status - Actualizar estado");
    info!("   DELETE /customer/:identifier - Eliminar cliente");
    info!("   DELETE /customer/cache - Vaciar cache (ADMIN)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
