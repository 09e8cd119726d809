use chrono::Utc;
use tracing::warn;
use validator::Validate;

use crate::dto::customer_dto::{
    CreateCustomerRequest, CustomerCreateResponse, CustomerResponse, UpdateAddressRequest,
    UpdateStatusRequest,
};
use crate::middleware::auth::{AuthenticatedUser, ROLE_ADMIN};
use crate::models::customer::CustomerVariant;
use crate::services::customer_service::CustomerService;
use crate::utils::errors::AppError;

pub struct CustomerController {
    service: CustomerService,
}

impl CustomerController {
    pub fn new(service: CustomerService) -> Self {
        Self { service }
    }

    /// `variant` fija el tipo en las rutas `/personal` y `/business`;
    /// con `None` se usa el `customer_type` del cuerpo.
    pub async fn create(
        &self,
        variant: Option<CustomerVariant>,
        request: CreateCustomerRequest,
    ) -> Result<CustomerCreateResponse, AppError> {
        request.validate()?;

        let customer = self.service.create(request.into_draft(variant)).await?;
        Ok(CustomerCreateResponse::success(customer))
    }

    pub async fn get(&self, identifier: &str) -> Result<CustomerResponse, AppError> {
        let customer = self.service.find_by_identifier(identifier).await?;
        Ok(customer.into())
    }

    pub async fn list(&self) -> Result<Vec<CustomerResponse>, AppError> {
        let customers = self.service.find_all().await?;
        Ok(customers.into_iter().map(CustomerResponse::from).collect())
    }

    pub async fn update_address(
        &self,
        identifier: &str,
        request: UpdateAddressRequest,
    ) -> Result<CustomerResponse, AppError> {
        request.validate()?;

        let customer = self
            .service
            .update_address(identifier, request.address, Utc::now())
            .await?;
        Ok(customer.into())
    }

    pub async fn update_status(
        &self,
        identifier: &str,
        request: UpdateStatusRequest,
    ) -> Result<CustomerResponse, AppError> {
        request.validate()?;

        let status = request.status.trim().to_uppercase();
        let customer = self
            .service
            .update_status(identifier, status, Utc::now())
            .await?;
        Ok(customer.into())
    }

    pub async fn delete(&self, identifier: &str) -> Result<(), AppError> {
        self.service.delete(identifier).await?;
        Ok(())
    }

    pub async fn clear_cache(&self, user: &AuthenticatedUser) -> Result<(), AppError> {
        user.require_role(ROLE_ADMIN)?;

        self.service.clear_cache().await.map_err(|e| {
            warn!("⚠️ {} no pudo vaciar el cache: {}", user.username, e);
            AppError::ServiceUnavailable(format!("Cache no disponible: {}", e))
        })
    }
}
