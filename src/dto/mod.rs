pub mod auth_dto;
pub mod customer_dto;
