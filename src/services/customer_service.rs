//! Coordinador de clientes
//!
//! Decide, para cada lectura y mutación, si consultar el cache, el store
//! persistente o ambos, y cómo mantenerlos reconciliados:
//!
//! - lectura: cache primero; en miss (o cache degradado) se consulta el
//!   store y se puebla el cache con TTL fijo.
//! - creación: rechazo de duplicados por tipo, guardado, cache y notificación.
//! - actualización: snapshot vía lectura, mutación de un campo, guardado y
//!   sobrescritura incondicional del cache.
//! - eliminación: store primero (autoritativo), luego el cache.
//!
//! No hay locks por registro. Dos operaciones concurrentes sobre el mismo
//! identificador compiten y gana la última escritura; la unicidad bajo
//! creaciones concurrentes queda en manos del store.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheError, CacheLookup, CustomerCache};
use crate::models::customer::{
    Customer, CustomerDraft, CustomerFieldUpdate, CustomerIdentifier, CustomerVariant,
};
use crate::repositories::CustomerRepository;
use crate::services::identifier_resolver::IdentifierResolver;
use crate::services::notification_service::NotificationSink;
use crate::utils::errors::{CustomerError, CustomerResult};

#[derive(Clone)]
pub struct CustomerService {
    cache: Arc<dyn CustomerCache>,
    repository: Arc<dyn CustomerRepository>,
    resolver: IdentifierResolver,
    notifier: Arc<dyn NotificationSink>,
    cache_ttl: Duration,
}

impl CustomerService {
    pub fn new(
        cache: Arc<dyn CustomerCache>,
        repository: Arc<dyn CustomerRepository>,
        notifier: Arc<dyn NotificationSink>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            resolver: IdentifierResolver::new(repository.clone()),
            cache,
            repository,
            notifier,
            cache_ttl,
        }
    }

    /// Crear un cliente nuevo
    pub async fn create(&self, draft: CustomerDraft) -> CustomerResult<Customer> {
        let identifier = self.resolver.resolve(&draft)?;
        info!("🆕 Creando cliente {}", identifier);

        if self.resolver.is_duplicate(&identifier).await? {
            info!("⚠️ Cliente ya existe: {}", identifier);
            return Err(CustomerError::DuplicateIdentifier(
                identifier.natural_identifier().to_string(),
            ));
        }

        let customer = Customer::from_draft(identifier, draft, Utc::now());
        let saved = self.repository.save(&customer).await.map_err(|e| {
            error!("❌ Error guardando cliente {}: {}", customer.identifier, e);
            e
        })?;

        info!("✅ Cliente guardado: {} (id: {:?})", saved.identifier, saved.id);

        if self.is_shadowed(&saved).await {
            debug!(
                "🔀 {} comparte identificador con un cliente PERSONAL; no se cachea",
                saved.identifier
            );
        } else {
            self.populate_cache(&saved).await;
        }
        self.notifier.publish(&saved);

        Ok(saved)
    }

    /// Buscar un cliente por identificador natural (cache-aside)
    pub async fn find_by_identifier(&self, identifier: &str) -> CustomerResult<Customer> {
        match self.cache.get(identifier).await {
            CacheLookup::Hit(customer) => return Ok(customer),
            CacheLookup::Miss => {}
            CacheLookup::Degraded(e) => {
                warn!("⚠️ Cache degradado leyendo {}, se consulta el store: {}", identifier, e);
            }
        }

        let customer = self
            .repository
            .find_by_identifier(identifier)
            .await?
            .ok_or_else(|| CustomerError::NotFound(identifier.to_string()))?;

        self.populate_cache(&customer).await;
        Ok(customer)
    }

    /// Listar todos los clientes ordenados por identificador natural.
    /// El listado nunca pasa por el cache.
    pub async fn find_all(&self) -> CustomerResult<Vec<Customer>> {
        info!("📋 Consultando todos los clientes");
        let mut customers = self.repository.find_all().await?;
        customers.sort_by_cached_key(|c| {
            (c.natural_identifier().to_owned(), c.variant() != CustomerVariant::Personal)
        });
        Ok(customers)
    }

    pub async fn update_address(
        &self,
        identifier: &str,
        address: String,
        timestamp: DateTime<Utc>,
    ) -> CustomerResult<Customer> {
        self.update_field(identifier, CustomerFieldUpdate::Address(address), timestamp)
            .await
    }

    pub async fn update_status(
        &self,
        identifier: &str,
        status: String,
        timestamp: DateTime<Utc>,
    ) -> CustomerResult<Customer> {
        self.update_field(identifier, CustomerFieldUpdate::Status(status), timestamp)
            .await
    }

    /// Mutar un único campo y dejar el cache reflejando la última escritura
    pub async fn update_field(
        &self,
        identifier: &str,
        update: CustomerFieldUpdate,
        timestamp: DateTime<Utc>,
    ) -> CustomerResult<Customer> {
        let field = update.field_name();
        info!("✏️ Actualizando {} del cliente {}", field, identifier);

        let mut customer = self.find_by_identifier(identifier).await?;
        update.apply(&mut customer, timestamp);

        let saved = match self.repository.save(&customer).await {
            Ok(saved) => saved,
            Err(CustomerError::NotFound(missing)) => {
                // El store ya no lo tiene: el snapshot del cache es huérfano
                if let Err(e) = self.cache.delete(identifier).await {
                    warn!(
                        "⚠️ No se pudo retirar del cache el cliente inexistente {}: {}",
                        identifier, e
                    );
                }
                return Err(CustomerError::NotFound(missing));
            }
            Err(e) => return Err(e),
        };

        if let Err(e) = self
            .cache
            .set(saved.natural_identifier(), &saved, self.cache_ttl)
            .await
        {
            warn!(
                "⚠️ No se pudo refrescar el cache tras actualizar {} de {}; puede servirse un dato obsoleto hasta que expire el TTL: {}",
                field, identifier, e
            );
        }

        info!("✅ Cliente {} actualizado ({})", identifier, field);
        Ok(saved)
    }

    /// Eliminar un cliente del store y del cache.
    ///
    /// Si la limpieza del cache falla la eliminación se reporta exitosa y no
    /// se revierte.
    pub async fn delete(&self, identifier: &str) -> CustomerResult<()> {
        let customer = self.find_by_identifier(identifier).await?;

        self.repository.delete(&customer).await?;

        match self.cache.delete(customer.natural_identifier()).await {
            Ok(was_present) => {
                debug!("🗑️ Cache de {} eliminado (existía: {})", identifier, was_present);
            }
            Err(e) => {
                warn!(
                    "⚠️ No se pudo eliminar {} del cache; puede servirse un registro eliminado hasta que expire el TTL: {}",
                    identifier, e
                );
            }
        }

        info!("🗑️ Cliente {} eliminado", identifier);
        Ok(())
    }

    /// Vaciar el cache de clientes. A diferencia del resto de operaciones,
    /// aquí el fallo del cache sí se informa al llamador.
    pub async fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear_all().await
    }

    pub async fn cache_available(&self) -> bool {
        self.cache.is_connected().await
    }

    /// Un BUSINESS cuyo identificador también existe como PERSONAL no es lo
    /// que devuelve una búsqueda sin tipo, así que no puede ocupar su entrada.
    async fn is_shadowed(&self, customer: &Customer) -> bool {
        if customer.variant() != CustomerVariant::Business {
            return false;
        }

        let personal = CustomerIdentifier::Personal(customer.natural_identifier().to_string());
        match self.repository.exists_by_identifier(&personal).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("⚠️ No se pudo comprobar la precedencia de {}: {}", customer.identifier, e);
                true
            }
        }
    }

    /// Poblar el cache con un snapshot; el fallo es degradado
    async fn populate_cache(&self, customer: &Customer) {
        if let Err(e) = self
            .cache
            .set(customer.natural_identifier(), customer, self.cache_ttl)
            .await
        {
            warn!(
                "⚠️ No se pudo poblar el cache para {}: {}",
                customer.identifier, e
            );
        }
    }
}
