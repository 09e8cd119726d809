use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde_json::{json, Value};

use crate::controllers::customer_controller::CustomerController;
use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerCreateResponse, CustomerResponse, UpdateAddressRequest,
    UpdateStatusRequest,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::models::customer::CustomerVariant;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Rutas de clientes, todas protegidas por JWT
pub fn create_customer_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers).post(create_customer))
        .route("/personal", post(create_personal))
        .route("/business", post(create_business))
        .route("/cache", delete(clear_cache))
        .route("/:identifier", get(get_customer).delete(delete_customer))
        .route("/:identifier/address", put(update_address))
        .route("/:identifier/status", put(update_status))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn controller(state: &AppState) -> CustomerController {
    CustomerController::new(state.customers.clone())
}

async fn create(
    state: AppState,
    variant: Option<CustomerVariant>,
    request: CreateCustomerRequest,
) -> Result<(StatusCode, Json<CustomerCreateResponse>), AppError> {
    let response = controller(&state).create(variant, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerCreateResponse>), AppError> {
    create(state, None, request).await
}

async fn create_personal(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerCreateResponse>), AppError> {
    create(state, Some(CustomerVariant::Personal), request).await
}

async fn create_business(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CustomerCreateResponse>), AppError> {
    create(state, Some(CustomerVariant::Business), request).await
}

async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let response = controller(&state).list().await?;
    Ok(Json(response))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<CustomerResponse>, AppError> {
    let response = controller(&state).get(&identifier).await?;
    Ok(Json(response))
}

async fn update_address(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Json(request): Json<UpdateAddressRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    let response = controller(&state)
        .update_address(&identifier, request)
        .await?;
    Ok(Json(response))
}

async fn update_status(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<CustomerResponse>, AppError> {
    let response = controller(&state)
        .update_status(&identifier, request)
        .await?;
    Ok(Json(response))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<StatusCode, AppError> {
    controller(&state).delete(&identifier).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cache(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Value>, AppError> {
    controller(&state).clear_cache(&user).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Cache de clientes vaciado"
    })))
}
