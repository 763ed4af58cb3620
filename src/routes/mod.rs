pub mod system_routes;
pub mod values_routes;
