use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

use crate::models::customer::{Customer, CustomerIdentifier, CustomerVariant};
use crate::utils::errors::{CustomerError, CustomerResult};

/// Store persistente y autoritativo de clientes.
///
/// Todo fallo aquí es duro: se propaga como `StoreFailure` y nunca se
/// reintenta ni se silencia.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Existencia dentro del dominio de unicidad del tipo del identificador
    async fn exists_by_identifier(&self, identifier: &CustomerIdentifier) -> CustomerResult<bool>;

    async fn find_by_identifier(&self, identifier: &str) -> CustomerResult<Option<Customer>>;

    async fn find_all(&self) -> CustomerResult<Vec<Customer>>;

    /// Inserta si no tiene id (asignándolo) o actualiza el registro existente
    async fn save(&self, customer: &Customer) -> CustomerResult<Customer>;

    async fn delete(&self, customer: &Customer) -> CustomerResult<()>;
}

/// Columna que guarda el identificador natural de cada tipo
fn identifier_column(variant: CustomerVariant) -> &'static str {
    match variant {
        CustomerVariant::Personal => "personal_id",
        CustomerVariant::Business => "business_id",
    }
}

fn store_failure(operation: &str, e: sqlx::Error) -> CustomerError {
    error!("❌ Error de base de datos en {}: {}", operation, e);
    CustomerError::StoreFailure(format!("Error {}: {}", operation, e))
}

/// Mapear una fila a `Customer` validando que tipo y columna poblada coincidan
fn customer_from_row(row: &PgRow) -> CustomerResult<Customer> {
    let get_err = |e: sqlx::Error| store_failure("reading customer row", e);

    let customer_type: String = row.try_get("customer_type").map_err(get_err)?;
    let variant = CustomerVariant::parse(&customer_type).ok_or_else(|| {
        CustomerError::StoreFailure(format!("Unknown customer_type '{}' in store", customer_type))
    })?;

    let value: Option<String> = row
        .try_get(identifier_column(variant))
        .map_err(get_err)?;
    let value = value.ok_or_else(|| {
        CustomerError::StoreFailure(format!(
            "Customer row of type {} has no {}",
            variant,
            identifier_column(variant)
        ))
    })?;

    Ok(Customer {
        id: Some(row.try_get::<Uuid, _>("id").map_err(get_err)?),
        identifier: CustomerIdentifier::new(variant, value),
        name: row.try_get("name").map_err(get_err)?,
        surname: row.try_get("surname").map_err(get_err)?,
        phone_number: row.try_get("phone_number").map_err(get_err)?,
        address: row.try_get("address").map_err(get_err)?,
        status: row.try_get("status").map_err(get_err)?,
        flag_vip: row.try_get("flag_vip").map_err(get_err)?,
        flag_pyme: row.try_get("flag_pyme").map_err(get_err)?,
        created_at: row.try_get("created_at").map_err(get_err)?,
        updated_at: row.try_get("updated_at").map_err(get_err)?,
    })
}

pub struct PgCustomerRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Ejecutar una consulta acotada por el timeout del store
    async fn bounded<T, F>(&self, operation: &str, fut: F) -> CustomerResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(|e| store_failure(operation, e)),
            Err(_) => {
                error!("❌ Timeout de base de datos en {} ({:?})", operation, self.timeout);
                Err(CustomerError::StoreFailure(format!(
                    "Error {}: timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }

    async fn insert(&self, customer: &Customer) -> CustomerResult<Customer> {
        let identifier = &customer.identifier;
        let (personal_id, business_id) = match identifier {
            CustomerIdentifier::Personal(dni) => (Some(dni.as_str()), None),
            CustomerIdentifier::Business(ruc) => (None, Some(ruc.as_str())),
        };

        let query = sqlx::query(
            r#"
            INSERT INTO customers (
                id, customer_type, personal_id, business_id, name, surname,
                phone_number, address, status, flag_vip, flag_pyme, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(identifier.variant().as_str())
        .bind(personal_id)
        .bind(business_id)
        .bind(&customer.name)
        .bind(&customer.surname)
        .bind(&customer.phone_number)
        .bind(&customer.address)
        .bind(&customer.status)
        .bind(customer.flag_vip)
        .bind(customer.flag_pyme)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .fetch_one(&self.pool);

        match tokio::time::timeout(self.timeout, query).await {
            Ok(Ok(row)) => customer_from_row(&row),
            // El índice único parcial resuelve la carrera entre creadores
            Ok(Err(sqlx::Error::Database(db))) if db.is_unique_violation() => Err(
                CustomerError::DuplicateIdentifier(identifier.natural_identifier().to_string()),
            ),
            Ok(Err(e)) => Err(store_failure("creating customer", e)),
            Err(_) => Err(CustomerError::StoreFailure(format!(
                "Error creating customer: timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn update(&self, id: Uuid, customer: &Customer) -> CustomerResult<Customer> {
        let row = self
            .bounded(
                "updating customer",
                sqlx::query(
                    r#"
                    UPDATE customers
                    SET name = $2, surname = $3, phone_number = $4, address = $5,
                        status = $6, flag_vip = $7, flag_pyme = $8, updated_at = $9
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(&customer.name)
                .bind(&customer.surname)
                .bind(&customer.phone_number)
                .bind(&customer.address)
                .bind(&customer.status)
                .bind(customer.flag_vip)
                .bind(customer.flag_pyme)
                .bind(customer.updated_at)
                .fetch_optional(&self.pool),
            )
            .await?;

        match row {
            Some(row) => customer_from_row(&row),
            None => Err(CustomerError::NotFound(customer.natural_identifier().to_string())),
        }
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn exists_by_identifier(&self, identifier: &CustomerIdentifier) -> CustomerResult<bool> {
        let variant = identifier.variant();
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE customer_type = $1 AND {} = $2)",
            identifier_column(variant)
        );

        let result: (bool,) = self
            .bounded(
                "checking identifier",
                sqlx::query_as(&sql)
                    .bind(variant.as_str())
                    .bind(identifier.natural_identifier())
                    .fetch_one(&self.pool),
            )
            .await?;

        debug!("🔍 Existencia de {}: {}", identifier, result.0);
        Ok(result.0)
    }

    async fn find_by_identifier(&self, identifier: &str) -> CustomerResult<Option<Customer>> {
        let row = self
            .bounded(
                "finding customer",
                sqlx::query(
                    r#"
                    SELECT * FROM customers
                    WHERE personal_id = $1 OR business_id = $1
                    ORDER BY (customer_type = 'PERSONAL') DESC
                    LIMIT 1
                    "#,
                )
                .bind(identifier)
                .fetch_optional(&self.pool),
            )
            .await?;

        row.as_ref().map(customer_from_row).transpose()
    }

    async fn find_all(&self) -> CustomerResult<Vec<Customer>> {
        let rows = self
            .bounded(
                "listing customers",
                sqlx::query(
                    r#"SELECT * FROM customers ORDER BY COALESCE(personal_id, business_id) COLLATE "C" ASC"#,
                )
                .fetch_all(&self.pool),
            )
            .await?;

        rows.iter().map(customer_from_row).collect()
    }

    async fn save(&self, customer: &Customer) -> CustomerResult<Customer> {
        match customer.id {
            Some(id) => self.update(id, customer).await,
            None => self.insert(customer).await,
        }
    }

    async fn delete(&self, customer: &Customer) -> CustomerResult<()> {
        match customer.id {
            Some(id) => {
                self.bounded(
                    "deleting customer",
                    sqlx::query("DELETE FROM customers WHERE id = $1")
                        .bind(id)
                        .execute(&self.pool),
                )
                .await?;
            }
            None => {
                let variant = customer.variant();
                let sql = format!(
                    "DELETE FROM customers WHERE customer_type = $1 AND {} = $2",
                    identifier_column(variant)
                );
                self.bounded(
                    "deleting customer",
                    sqlx::query(&sql)
                        .bind(variant.as_str())
                        .bind(customer.natural_identifier())
                        .execute(&self.pool),
                )
                .await?;
            }
        }

        Ok(())
    }
}
