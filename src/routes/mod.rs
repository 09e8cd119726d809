pub mod auth_routes;
pub mod customer_routes;

use axum::{extract::State, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_middleware;
use crate::state::AppState;

/// Router completo de la API
pub fn create_app_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes::auth_routes())
        .nest(
            "/customer",
            customer_routes::create_customer_router(state.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_middleware(cors_origins))
        .with_state(state)
}

/// Health check; un cache caído no vuelve el servicio no saludable
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cache": state.customers.cache_available().await,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
