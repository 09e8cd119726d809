//! Repositorio en memoria
//!
//! Store de clientes sobre un `HashMap`, con asignación de id y unicidad por
//! tipo igual que los índices de PostgreSQL. Se usa con
//! `STORAGE_BACKEND=memory` y en pruebas.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::customer_repository::CustomerRepository;
use crate::models::customer::{Customer, CustomerIdentifier, CustomerVariant};
use crate::utils::errors::{CustomerError, CustomerResult};

#[derive(Clone, Default)]
pub struct MemoryCustomerRepository {
    records: Arc<RwLock<HashMap<Uuid, Customer>>>,
}

impl MemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CustomerRepository for MemoryCustomerRepository {
    async fn exists_by_identifier(&self, identifier: &CustomerIdentifier) -> CustomerResult<bool> {
        let records = self.records.read().await;
        Ok(records.values().any(|c| &c.identifier == identifier))
    }

    async fn find_by_identifier(&self, identifier: &str) -> CustomerResult<Option<Customer>> {
        let records = self.records.read().await;
        let mut matches: Vec<&Customer> = records
            .values()
            .filter(|c| c.natural_identifier() == identifier)
            .collect();
        matches.sort_by_key(|c| c.variant() != CustomerVariant::Personal);
        Ok(matches.first().map(|c| (*c).clone()))
    }

    async fn find_all(&self) -> CustomerResult<Vec<Customer>> {
        let records = self.records.read().await;
        let mut all: Vec<Customer> = records.values().cloned().collect();
        all.sort_by(|a, b| a.natural_identifier().cmp(b.natural_identifier()));
        Ok(all)
    }

    async fn save(&self, customer: &Customer) -> CustomerResult<Customer> {
        let mut records = self.records.write().await;

        match customer.id {
            Some(id) => {
                let stored = records
                    .get_mut(&id)
                    .ok_or_else(|| CustomerError::NotFound(customer.natural_identifier().to_string()))?;
                let created_at = stored.created_at;
                *stored = Customer {
                    created_at,
                    ..customer.clone()
                };
                Ok(stored.clone())
            }
            None => {
                if records.values().any(|c| c.identifier == customer.identifier) {
                    return Err(CustomerError::DuplicateIdentifier(
                        customer.natural_identifier().to_string(),
                    ));
                }
                let id = Uuid::new_v4();
                let stored = Customer {
                    id: Some(id),
                    ..customer.clone()
                };
                records.insert(id, stored.clone());
                Ok(stored)
            }
        }
    }

    async fn delete(&self, customer: &Customer) -> CustomerResult<()> {
        let mut records = self.records.write().await;
        match customer.id {
            Some(id) => {
                records.remove(&id);
            }
            None => records.retain(|_, c| c.identifier != customer.identifier),
        }
        Ok(())
    }
}
