//! Customer Service
//!
//! Registro de clientes con cache coordinado: PostgreSQL como fuente de
//! verdad y Redis como cache de lectura.

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
