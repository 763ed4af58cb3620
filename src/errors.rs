use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::state::values::Identifier;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("ID '{0}' Not Found")]
    NotFound(Identifier),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("config.json not found in: {}", format_paths(.0))]
    ConfigNotFound(Vec<PathBuf>),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Two configured users share the same id.
    #[error("Duplicate credential id '{0}'")]
    DuplicateCredential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ServiceError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            other => {
                tracing::error!("{other}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
