//! Services module
//!
//! Este módulo contiene la lógica de negocio: el coordinador de clientes
//! y los servicios que orquesta.

pub mod auth_service;
pub mod customer_service;
pub mod identifier_resolver;
pub mod notification_service;
