//! Modelo de Customer
//!
//! Este módulo contiene el registro de cliente y su identificador natural.
//! Un cliente es persona natural (DNI) o empresa (RUC); el identificador se
//! modela como unión etiquetada para que tipo y campo poblado nunca diverjan.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Estado inicial de todo cliente recién creado
pub const CUSTOMER_ACTIVE: &str = "ACTIVE";

/// Tipo de cliente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerVariant {
    Personal,
    Business,
}

impl CustomerVariant {
    pub const ALL: [CustomerVariant; 2] = [CustomerVariant::Personal, CustomerVariant::Business];

    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerVariant::Personal => "PERSONAL",
            CustomerVariant::Business => "BUSINESS",
        }
    }

    /// Interpretar una etiqueta de tipo (sin distinguir mayúsculas)
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for CustomerVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identificador natural del cliente, etiquetado por tipo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "variant", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerIdentifier {
    Personal(String),
    Business(String),
}

impl CustomerIdentifier {
    pub fn new(variant: CustomerVariant, value: impl Into<String>) -> Self {
        match variant {
            CustomerVariant::Personal => CustomerIdentifier::Personal(value.into()),
            CustomerVariant::Business => CustomerIdentifier::Business(value.into()),
        }
    }

    pub fn variant(&self) -> CustomerVariant {
        match self {
            CustomerIdentifier::Personal(_) => CustomerVariant::Personal,
            CustomerIdentifier::Business(_) => CustomerVariant::Business,
        }
    }

    /// Valor del identificador natural (DNI o RUC)
    pub fn natural_identifier(&self) -> &str {
        match self {
            CustomerIdentifier::Personal(value) | CustomerIdentifier::Business(value) => value,
        }
    }
}

impl fmt::Display for CustomerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.variant(), self.natural_identifier())
    }
}

/// Customer principal - mapea a la tabla customers y es también el
/// snapshot que se guarda en cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Asignado por el store persistente en la primera escritura
    pub id: Option<Uuid>,
    pub identifier: CustomerIdentifier,
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

impl Customer {
    /// Construir un cliente nuevo (sin id) a partir de un borrador ya resuelto
    pub fn from_draft(identifier: CustomerIdentifier, draft: CustomerDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            identifier,
            name: draft.name,
            surname: draft.surname,
            phone_number: draft.phone_number,
            address: draft.address,
            status: CUSTOMER_ACTIVE.to_string(),
            flag_vip: false,
            flag_pyme: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn natural_identifier(&self) -> &str {
        self.identifier.natural_identifier()
    }

    pub fn variant(&self) -> CustomerVariant {
        self.identifier.variant()
    }
}

/// Datos de creación tal como llegan desde la frontera; el tipo de cliente
/// todavía no está validado
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDraft {
    pub customer_type: String,
    pub identifier: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Campo mutable de un cliente; cada actualización cambia exactamente uno
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerFieldUpdate {
    Address(String),
    Status(String),
}

impl CustomerFieldUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            CustomerFieldUpdate::Address(_) => "address",
            CustomerFieldUpdate::Status(_) => "status",
        }
    }

    /// Aplicar la mutación y sellar la fecha de modificación
    pub fn apply(self, customer: &mut Customer, timestamp: DateTime<Utc>) {
        match self {
            CustomerFieldUpdate::Address(address) => customer.address = Some(address),
            CustomerFieldUpdate::Status(status) => customer.status = status,
        }
        customer.updated_at = timestamp;
    }
}
