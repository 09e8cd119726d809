//! Modelos del sistema
//!
//! Este módulo contiene los modelos de dominio de clientes.

pub mod customer;
