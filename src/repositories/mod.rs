//! Repositorios
//!
//! Acceso al store persistente de clientes.

pub mod customer_repository;
pub mod memory_customer_repository;

pub use customer_repository::{CustomerRepository, PgCustomerRepository};
pub use memory_customer_repository::MemoryCustomerRepository;
