pub mod credentials;
pub mod values;
