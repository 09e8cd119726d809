//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::services::auth_service::AuthService;
use crate::services::customer_service::CustomerService;

#[derive(Clone)]
pub struct AppState {
    pub customers: CustomerService,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(customers: CustomerService, auth: AuthService) -> Self {
        Self {
            customers,
            auth: Arc::new(auth),
        }
    }
}
