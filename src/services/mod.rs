pub mod auth_service;
pub mod values_service;
