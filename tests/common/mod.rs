#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use customer_service::cache::{CacheError, CacheLookup, CustomerCache, MemoryCache};
use customer_service::models::customer::{Customer, CustomerDraft, CustomerIdentifier};
use customer_service::repositories::{CustomerRepository, MemoryCustomerRepository};
use customer_service::services::customer_service::CustomerService;
use customer_service::services::notification_service::NotificationSink;
use customer_service::utils::errors::{CustomerError, CustomerResult};

pub const CACHE_TTL: Duration = Duration::from_secs(60);

pub fn personal_draft(identifier: &str, address: &str) -> CustomerDraft {
    CustomerDraft {
        customer_type: "PERSONAL".to_string(),
        identifier: identifier.to_string(),
        name: Some("Ana".to_string()),
        surname: Some("Quispe".to_string()),
        phone_number: Some("999888777".to_string()),
        address: Some(address.to_string()),
    }
}

pub fn business_draft(identifier: &str, address: &str) -> CustomerDraft {
    CustomerDraft {
        customer_type: "BUSINESS".to_string(),
        identifier: identifier.to_string(),
        name: Some("Comercial Andina".to_string()),
        address: Some(address.to_string()),
        ..CustomerDraft::default()
    }
}

/// Store en memoria que cuenta las llamadas que llegan al almacenamiento
#[derive(Clone, Default)]
pub struct CountingRepository {
    pub inner: MemoryCustomerRepository,
    pub finds: Arc<AtomicUsize>,
    pub saves: Arc<AtomicUsize>,
}

impl CountingRepository {
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CustomerRepository for CountingRepository {
    async fn exists_by_identifier(&self, identifier: &CustomerIdentifier) -> CustomerResult<bool> {
        self.inner.exists_by_identifier(identifier).await
    }

    async fn find_by_identifier(&self, identifier: &str) -> CustomerResult<Option<Customer>> {
        self.finds.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_identifier(identifier).await
    }

    async fn find_all(&self) -> CustomerResult<Vec<Customer>> {
        self.inner.find_all().await
    }

    async fn save(&self, customer: &Customer) -> CustomerResult<Customer> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(customer).await
    }

    async fn delete(&self, customer: &Customer) -> CustomerResult<()> {
        self.inner.delete(customer).await
    }
}

/// Store caído: toda operación es un fallo duro
pub struct FailingRepository;

fn unreachable_store() -> CustomerError {
    CustomerError::StoreFailure("connection refused".to_string())
}

#[async_trait]
impl CustomerRepository for FailingRepository {
    async fn exists_by_identifier(&self, _: &CustomerIdentifier) -> CustomerResult<bool> {
        Err(unreachable_store())
    }

    async fn find_by_identifier(&self, _: &str) -> CustomerResult<Option<Customer>> {
        Err(unreachable_store())
    }

    async fn find_all(&self) -> CustomerResult<Vec<Customer>> {
        Err(unreachable_store())
    }

    async fn save(&self, _: &Customer) -> CustomerResult<Customer> {
        Err(unreachable_store())
    }

    async fn delete(&self, _: &Customer) -> CustomerResult<()> {
        Err(unreachable_store())
    }
}

/// Cache caído: toda operación se degrada
pub struct FailingCache;

fn cache_down() -> CacheError {
    CacheError::Connection("connection reset by peer".to_string())
}

#[async_trait]
impl CustomerCache for FailingCache {
    async fn get(&self, _: &str) -> CacheLookup {
        CacheLookup::Degraded(cache_down())
    }

    async fn set(&self, _: &str, _: &Customer, _: Duration) -> Result<(), CacheError> {
        Err(cache_down())
    }

    async fn delete(&self, _: &str) -> Result<bool, CacheError> {
        Err(cache_down())
    }

    async fn clear_all(&self) -> Result<(), CacheError> {
        Err(cache_down())
    }

    async fn is_connected(&self) -> bool {
        false
    }
}

/// Sink que guarda los eventos publicados
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub published: Arc<Mutex<Vec<Customer>>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, customer: &Customer) {
        self.published.lock().unwrap().push(customer.clone());
    }
}

pub struct Harness {
    pub service: CustomerService,
    pub cache: MemoryCache,
    pub repository: CountingRepository,
    pub sink: RecordingSink,
}

pub fn harness() -> Harness {
    harness_with_ttl(CACHE_TTL)
}

pub fn harness_with_ttl(ttl: Duration) -> Harness {
    let cache = MemoryCache::new();
    let repository = CountingRepository::default();
    let sink = RecordingSink::default();

    let service = CustomerService::new(
        Arc::new(cache.clone()),
        Arc::new(repository.clone()),
        Arc::new(sink.clone()),
        ttl,
    );

    Harness {
        service,
        cache,
        repository,
        sink,
    }
}
