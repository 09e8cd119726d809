use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::customer::{Customer, CustomerDraft, CustomerVariant};

// Request para crear un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    /// Obligatorio en `POST /customer`; las rutas por tipo lo fijan
    pub customer_type: Option<String>,

    #[serde(alias = "dni")]
    #[validate(length(min = 1, max = 32))]
    pub identifier: String,

    #[validate(length(max = 255))]
    pub name: Option<String>,

    #[serde(alias = "surName")]
    #[validate(length(max = 255))]
    pub surname: Option<String>,

    #[serde(alias = "phoneNumber")]
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,
}

impl CreateCustomerRequest {
    pub fn into_draft(self, variant: Option<CustomerVariant>) -> CustomerDraft {
        let customer_type = match variant {
            Some(variant) => variant.as_str().to_string(),
            None => self.customer_type.unwrap_or_default(),
        };

        CustomerDraft {
            customer_type,
            identifier: self.identifier,
            name: self.name,
            surname: self.surname,
            phone_number: self.phone_number,
            address: self.address,
        }
    }
}

// Request para actualizar la dirección
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 500))]
    pub address: String,
}

// Request para actualizar el estado
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(length(min = 1, max = 32))]
    pub status: String,
}

// Response de cliente
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub id: Option<Uuid>,
    pub customer_type: CustomerVariant,
    pub identifier: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub flag_vip: bool,
    pub flag_pyme: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            customer_type: customer.variant(),
            identifier: customer.natural_identifier().to_string(),
            id: customer.id,
            name: customer.name,
            surname: customer.surname,
            phone_number: customer.phone_number,
            address: customer.address,
            status: customer.status,
            flag_vip: customer.flag_vip,
            flag_pyme: customer.flag_pyme,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

// Response de creación
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerCreateResponse {
    pub message: String,
    pub customer: CustomerResponse,
}

impl CustomerCreateResponse {
    pub fn success(customer: Customer) -> Self {
        Self {
            message: "El DNI fue registrado correctamente".to_string(),
            customer: customer.into(),
        }
    }
}
