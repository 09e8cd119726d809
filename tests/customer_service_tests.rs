mod common;

use chrono::{TimeZone, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use customer_service::cache::{CacheLookup, CustomerCache, MemoryCache};
use customer_service::models::customer::{Customer, CustomerIdentifier, CustomerVariant};
use customer_service::repositories::{CustomerRepository, MemoryCustomerRepository};
use customer_service::services::customer_service::CustomerService;
use customer_service::utils::errors::CustomerError;

async fn cached(cache: &MemoryCache, key: &str) -> Option<Customer> {
    match cache.get(key).await {
        CacheLookup::Hit(customer) => Some(customer),
        _ => None,
    }
}

#[tokio::test]
async fn test_full_customer_lifecycle() {
    let h = harness();

    let created = h
        .service
        .create(personal_draft("12345678", "Main St"))
        .await
        .unwrap();
    assert!(created.id.is_some());
    assert_eq!(cached(&h.cache, "12345678").await, Some(created.clone()));

    let duplicate = h.service.create(personal_draft("12345678", "Other St")).await;
    assert_eq!(
        duplicate,
        Err(CustomerError::DuplicateIdentifier("12345678".to_string()))
    );

    let found = h.service.find_by_identifier("12345678").await.unwrap();
    assert_eq!(found.address.as_deref(), Some("Main St"));

    let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    let updated = h
        .service
        .update_address("12345678", "Second St".to_string(), t1)
        .await
        .unwrap();
    assert_eq!(updated.address.as_deref(), Some("Second St"));
    assert_eq!(updated.updated_at, t1);

    let found = h.service.find_by_identifier("12345678").await.unwrap();
    assert_eq!(found.address.as_deref(), Some("Second St"));

    h.service.delete("12345678").await.unwrap();
    assert_eq!(
        h.service.find_by_identifier("12345678").await,
        Err(CustomerError::NotFound("12345678".to_string()))
    );
}

#[tokio::test]
async fn test_miss_reads_store_and_populates_cache() {
    let h = harness();
    let now = Utc::now();
    let identifier = CustomerIdentifier::new(CustomerVariant::Personal, "87654321");
    let stored = h
        .repository
        .inner
        .save(&Customer::from_draft(identifier, personal_draft("87654321", "Jr. Lima"), now))
        .await
        .unwrap();

    let found = h.service.find_by_identifier("87654321").await.unwrap();
    assert_eq!(found, stored);
    assert_eq!(h.repository.finds(), 1);
    assert_eq!(cached(&h.cache, "87654321").await, Some(stored));

    // Segunda lectura servida por el cache
    h.service.find_by_identifier("87654321").await.unwrap();
    assert_eq!(h.repository.finds(), 1);
}

#[tokio::test]
async fn test_cached_entry_takes_precedence_over_store() {
    let h = harness();
    let created = h
        .service
        .create(personal_draft("11112222", "Av. Arequipa"))
        .await
        .unwrap();

    let mut stale = created.clone();
    stale.address = Some("Cached St".to_string());
    h.cache.set("11112222", &stale, CACHE_TTL).await.unwrap();

    let found = h.service.find_by_identifier("11112222").await.unwrap();
    assert_eq!(found.address.as_deref(), Some("Cached St"));
    assert_eq!(h.repository.finds(), 0);
}

#[tokio::test]
async fn test_expired_entry_falls_back_to_store() {
    let h = harness_with_ttl(Duration::from_millis(30));
    h.service
        .create(personal_draft("33334444", "Calle 1"))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(80)).await;

    h.service.find_by_identifier("33334444").await.unwrap();
    assert_eq!(h.repository.finds(), 1);
}

#[tokio::test]
async fn test_update_overwrites_stale_cache() {
    let h = harness();
    let created = h
        .service
        .create(personal_draft("55556666", "Old St"))
        .await
        .unwrap();

    let mut stale = created.clone();
    stale.address = Some("Stale St".to_string());
    stale.phone_number = Some("000000000".to_string());
    h.cache.set("55556666", &stale, CACHE_TTL).await.unwrap();

    let t1 = Utc.with_ymd_and_hms(2025, 5, 10, 8, 30, 0).unwrap();
    let updated = h
        .service
        .update_address("55556666", "New St".to_string(), t1)
        .await
        .unwrap();

    assert_eq!(updated.address.as_deref(), Some("New St"));
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(cached(&h.cache, "55556666").await, Some(updated.clone()));

    let found = h.service.find_by_identifier("55556666").await.unwrap();
    assert_eq!(found.address.as_deref(), Some("New St"));
    assert_eq!(found, updated);

    let stored = h.repository.inner.find_by_identifier("55556666").await.unwrap();
    assert_eq!(stored, Some(updated));
}

#[tokio::test]
async fn test_update_status_is_saved_and_cached() {
    let h = harness();
    h.service
        .create(personal_draft("56565656", "Jr. Puno"))
        .await
        .unwrap();

    let t1 = Utc.with_ymd_and_hms(2025, 5, 11, 9, 0, 0).unwrap();
    let updated = h
        .service
        .update_status("56565656", "INACTIVE".to_string(), t1)
        .await
        .unwrap();

    assert_eq!(updated.status, "INACTIVE");
    assert_eq!(updated.updated_at, t1);
    assert_eq!(cached(&h.cache, "56565656").await, Some(updated));
}

#[tokio::test]
async fn test_update_of_record_gone_from_store_evicts_cache_entry() {
    let h = harness();
    let created = h
        .service
        .create(personal_draft("12345678", "Main St"))
        .await
        .unwrap();

    // Eliminado en el store sin que se limpiara el cache
    h.repository.inner.delete(&created).await.unwrap();
    assert!(cached(&h.cache, "12345678").await.is_some());

    let result = h
        .service
        .update_address("12345678", "Second St".to_string(), Utc::now())
        .await;
    assert_eq!(result, Err(CustomerError::NotFound("12345678".to_string())));
    assert_eq!(cached(&h.cache, "12345678").await, None);

    assert_eq!(
        h.service.find_by_identifier("12345678").await,
        Err(CustomerError::NotFound("12345678".to_string()))
    );
}

#[tokio::test]
async fn test_update_missing_customer_is_not_found() {
    let h = harness();

    let result = h
        .service
        .update_address("99999999", "Nowhere".to_string(), Utc::now())
        .await;

    assert_eq!(result, Err(CustomerError::NotFound("99999999".to_string())));
    assert_eq!(h.repository.saves(), 0);
    assert!(h.cache.is_empty().await);
}

#[tokio::test]
async fn test_delete_removes_store_and_cache_entries() {
    let h = harness();
    h.service
        .create(personal_draft("20202020", "Av. Brasil"))
        .await
        .unwrap();

    h.service.delete("20202020").await.unwrap();

    assert!(h.repository.inner.is_empty().await);
    assert_eq!(cached(&h.cache, "20202020").await, None);
    assert_eq!(
        h.service.delete("20202020").await,
        Err(CustomerError::NotFound("20202020".to_string()))
    );
}

#[tokio::test]
async fn test_duplicate_performs_no_write() {
    let h = harness();
    h.service
        .create(business_draft("20100047218", "Av. Javier Prado"))
        .await
        .unwrap();

    let result = h
        .service
        .create(business_draft("20100047218", "Av. Javier Prado"))
        .await;

    assert_eq!(
        result,
        Err(CustomerError::DuplicateIdentifier("20100047218".to_string()))
    );
    assert_eq!(h.repository.saves(), 1);
    assert_eq!(h.repository.inner.len().await, 1);
    assert_eq!(h.sink.count(), 1);
}

#[tokio::test]
async fn test_uniqueness_is_checked_per_variant() {
    let h = harness();
    let personal = h
        .service
        .create(personal_draft("12121212", "Personal St"))
        .await
        .unwrap();
    let business = h
        .service
        .create(business_draft("12121212", "Business St"))
        .await
        .unwrap();

    assert_ne!(personal.id, business.id);
    assert_eq!(h.repository.inner.len().await, 2);

    // La búsqueda sin tipo devuelve el PERSONAL, también desde el cache
    assert_eq!(cached(&h.cache, "12121212").await, Some(personal.clone()));
    let found = h.service.find_by_identifier("12121212").await.unwrap();
    assert_eq!(found, personal);
}

#[tokio::test]
async fn test_invalid_input_is_rejected_before_store_access() {
    let h = harness();

    let mut draft = personal_draft("12345678", "Main St");
    draft.customer_type = "VIP".to_string();
    assert_eq!(
        h.service.create(draft).await,
        Err(CustomerError::InvalidVariant("VIP".to_string()))
    );

    let result = h.service.create(personal_draft("1234", "Main St")).await;
    assert!(matches!(result, Err(CustomerError::InvalidIdentifier { .. })));

    assert_eq!(h.repository.saves(), 0);
    assert_eq!(h.sink.count(), 0);
}

#[tokio::test]
async fn test_find_all_is_ordered_and_bypasses_cache() {
    let h = harness();
    for identifier in ["30000000", "10000000", "20000000"] {
        h.service
            .create(personal_draft(identifier, "Jr. Cusco"))
            .await
            .unwrap();
    }
    h.cache.clear_all().await.unwrap();

    let all = h.service.find_all().await.unwrap();
    let identifiers: Vec<&str> = all.iter().map(|c| c.natural_identifier()).collect();

    assert_eq!(identifiers, vec!["10000000", "20000000", "30000000"]);
    assert!(h.cache.is_empty().await);
}

#[tokio::test]
async fn test_degraded_cache_never_changes_outcome() {
    let repository = MemoryCustomerRepository::new();
    let sink = RecordingSink::default();
    let service = CustomerService::new(
        Arc::new(FailingCache),
        Arc::new(repository.clone()),
        Arc::new(sink.clone()),
        CACHE_TTL,
    );

    service
        .create(personal_draft("40404040", "Av. Grau"))
        .await
        .unwrap();
    let found = service.find_by_identifier("40404040").await.unwrap();
    assert_eq!(found.address.as_deref(), Some("Av. Grau"));

    let updated = service
        .update_address("40404040", "Av. Tacna".to_string(), Utc::now())
        .await
        .unwrap();
    assert_eq!(updated.address.as_deref(), Some("Av. Tacna"));

    service.delete("40404040").await.unwrap();
    assert!(repository.is_empty().await);
    assert_eq!(sink.count(), 1);

    assert!(!service.cache_available().await);
    assert!(service.clear_cache().await.is_err());
}

#[tokio::test]
async fn test_store_failure_is_propagated() {
    let service = CustomerService::new(
        Arc::new(MemoryCache::new()),
        Arc::new(FailingRepository),
        Arc::new(RecordingSink::default()),
        CACHE_TTL,
    );

    assert!(matches!(
        service.find_by_identifier("12345678").await,
        Err(CustomerError::StoreFailure(_))
    ));
    assert!(matches!(
        service.create(personal_draft("12345678", "Main St")).await,
        Err(CustomerError::StoreFailure(_))
    ));
    assert!(matches!(
        service.find_all().await,
        Err(CustomerError::StoreFailure(_))
    ));
}

#[tokio::test]
async fn test_concurrent_creates_leave_a_single_record() {
    let h = harness();

    let attempts = (0..8).map(|_| {
        let service = h.service.clone();
        async move { service.create(personal_draft("77778888", "Race St")).await }
    });
    let results = join_all(attempts).await;

    let created = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(created, 1);
    assert!(results.iter().all(|r| match r {
        Ok(_) => true,
        Err(e) => matches!(e, CustomerError::DuplicateIdentifier(_)),
    }));
    assert_eq!(h.repository.inner.len().await, 1);
}
