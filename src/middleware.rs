use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::errors::ServiceError;
use crate::services::auth_service::AuthGate;

/// Reject the request with 401 unless its `Authorization` header passes the gate.
///
/// A header value that is not visible ASCII is treated as missing.
pub async fn require_credentials(
    State(gate): State<AuthGate>,
    req: Request,
    next: Next,
) -> Result<Response, ServiceError> {
    let header_value = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if !gate.authenticate(header_value) {
        tracing::warn!(
            method = %req.method(),
            path = %req.uri().path(),
            "request rejected: authentication failed"
        );
        return Err(ServiceError::Unauthorized);
    }

    Ok(next.run(req).await)
}
