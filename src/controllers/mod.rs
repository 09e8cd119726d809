pub mod auth_controller;
pub mod customer_controller;
