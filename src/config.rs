use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::level_filters::LevelFilter;

use crate::errors::ServiceError;
use crate::state::credentials::AppUser;
use crate::state::values::Backend;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Backend selector: "simple" keeps bare values, anything else keeps
    /// timestamped records.
    #[serde(default = "default_values_service_type")]
    pub values_service_type: String,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_app_description")]
    pub app_description: String,

    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// Users allowed to call /values. Empty means every call is rejected.
    #[serde(default)]
    pub app_users: Vec<AppUser>,
}

/// Metadata served on /info.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppMetadata {
    pub name: String,
    pub description: String,
    pub version: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_values_service_type() -> String {
    "default".to_string()
}

fn default_app_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_app_description() -> String {
    env!("CARGO_PKG_DESCRIPTION").to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl AppConfig {
    /// Read and parse `path`, then apply environment overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, ServiceError> {
        let file = fs::read_to_string(path).map_err(|source| ServiceError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        let mut cfg = Self::from_json(&file)?;
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        Ok(serde_json::from_str::<AppConfig>(json)?)
    }

    /// Override metadata and the backend selector from `APP_NAME`,
    /// `APP_DESCRIPTION`, `APP_VERSION` and `VALUES_SERVICE_TYPE`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("APP_NAME") {
            self.app_name = v;
        }
        if let Some(v) = lookup("APP_DESCRIPTION") {
            self.app_description = v;
        }
        if let Some(v) = lookup("APP_VERSION") {
            self.app_version = v;
        }
        if let Some(v) = lookup("VALUES_SERVICE_TYPE") {
            self.values_service_type = v;
        }
    }

    pub fn backend(&self) -> Backend {
        Backend::from_selector(&self.values_service_type)
    }

    pub fn metadata(&self) -> AppMetadata {
        AppMetadata {
            name: self.app_name.clone(),
            description: self.app_description.clone(),
            version: self.app_version.clone(),
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            _ => LevelFilter::INFO,
        }
    }
}
