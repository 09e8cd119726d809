//! Resolución de identificadores naturales
//!
//! Determina qué identificador es autoritativo para un cliente según su tipo
//! y verifica la unicidad contra el store persistente.

use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

use crate::models::customer::{CustomerDraft, CustomerIdentifier, CustomerVariant};
use crate::repositories::CustomerRepository;
use crate::utils::errors::{CustomerError, CustomerResult};

/// Regla de formato del identificador de un tipo de cliente
struct IdentifierRule {
    variant: CustomerVariant,
    pattern: Regex,
}

lazy_static! {
    /// DNI: 8 dígitos exactos. RUC: sólo dígitos, hasta el ancho de `business_id`.
    static ref IDENTIFIER_RULES: Vec<IdentifierRule> = vec![
        IdentifierRule {
            variant: CustomerVariant::Personal,
            pattern: Regex::new(r"^[0-9]{8}$").expect("valid personal identifier regex"),
        },
        IdentifierRule {
            variant: CustomerVariant::Business,
            pattern: Regex::new(r"^[0-9]{1,32}$").expect("valid business identifier regex"),
        },
    ];
}

fn rule_for(variant: CustomerVariant) -> Option<&'static IdentifierRule> {
    IDENTIFIER_RULES.iter().find(|rule| rule.variant == variant)
}

#[derive(Clone)]
pub struct IdentifierResolver {
    repository: Arc<dyn CustomerRepository>,
}

impl IdentifierResolver {
    pub fn new(repository: Arc<dyn CustomerRepository>) -> Self {
        Self { repository }
    }

    /// Obtener el identificador natural de un borrador.
    ///
    /// Un tipo desconocido es siempre `InvalidVariant`, nunca "no encontrado".
    pub fn resolve(&self, draft: &CustomerDraft) -> CustomerResult<CustomerIdentifier> {
        let invalid_variant = || CustomerError::InvalidVariant(draft.customer_type.clone());

        let variant = CustomerVariant::parse(&draft.customer_type).ok_or_else(invalid_variant)?;
        let rule = rule_for(variant).ok_or_else(invalid_variant)?;

        let value = draft.identifier.trim();
        if !rule.pattern.is_match(value) {
            return Err(CustomerError::InvalidIdentifier {
                variant: variant.to_string(),
                identifier: draft.identifier.clone(),
            });
        }

        Ok(CustomerIdentifier::new(variant, value))
    }

    /// ¿Existe ya un cliente con este identificador dentro de su tipo?
    pub async fn is_duplicate(&self, identifier: &CustomerIdentifier) -> CustomerResult<bool> {
        self.repository.exists_by_identifier(identifier).await
    }
}
