use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};

use crate::errors::ServiceError;
use crate::middleware::require_credentials;
use crate::services::auth_service::AuthGate;
use crate::services::values_service;
use crate::state::values::{Identifier, Record, SharedStore};

/// Build the /values routes. Every one of them sits behind the auth gate.
pub fn routes(store: SharedStore, gate: AuthGate) -> Router {
    Router::new()
        .route("/values", get(get_all).post(post_value))
        .route(
            "/values/:id",
            get(get_value)
                .put(put_value)
                .delete(delete_value),
        )
        .route_layer(middleware::from_fn_with_state(gate, require_credentials))
        .with_state(store)
}

/// Request bodies may be a JSON string literal or raw text.
fn value_from_body(body: String) -> String {
    serde_json::from_str::<String>(&body).unwrap_or(body)
}

//
// ─────────────────────────────────────────────────────────────
// GET /values
// Every record, keyed by id
// ─────────────────────────────────────────────────────────────
//
async fn get_all(
    State(store): State<SharedStore>,
) -> Json<HashMap<Identifier, Record>>
{
    Json(values_service::retrieve_all(&store))
}

//
// ─────────────────────────────────────────────────────────────
// GET /values/{id}
// Return the record or 404
// ─────────────────────────────────────────────────────────────
//
async fn get_value(
    Path(id): Path<Identifier>,
    State(store): State<SharedStore>,
) -> Result<Json<Record>, ServiceError>
{
    values_service::retrieve(&store, id)
        .map(Json)
        .ok_or(ServiceError::NotFound(id))
}

//
// ─────────────────────────────────────────────────────────────
// POST /values
// Store a new value under the next id
// ─────────────────────────────────────────────────────────────
//
async fn post_value(
    State(store): State<SharedStore>,
    body: String,
) -> StatusCode
{
    let id = values_service::store(&store, value_from_body(body));
    tracing::info!(id, "created value");
    StatusCode::OK
}

//
// ─────────────────────────────────────────────────────────────
// PUT /values/{id}
// Replace the value of an existing record
// ─────────────────────────────────────────────────────────────
//
async fn put_value(
    Path(id): Path<Identifier>,
    State(store): State<SharedStore>,
    body: String,
) -> Result<StatusCode, ServiceError>
{
    if values_service::update(&store, id, value_from_body(body)) {
        Ok(StatusCode::OK)
    } else {
        Err(ServiceError::NotFound(id))
    }
}

//
// ─────────────────────────────────────────────────────────────
// DELETE /values/{id}
// Remove a record; its id is never handed out again
// ─────────────────────────────────────────────────────────────
//
async fn delete_value(
    Path(id): Path<Identifier>,
    State(store): State<SharedStore>,
) -> Result<StatusCode, ServiceError>
{
    if values_service::delete(&store, id) {
        Ok(StatusCode::OK)
    } else {
        Err(ServiceError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, HeaderValue, Method, Request},
    };
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_app;
    use crate::config::AppMetadata;
    use crate::state::credentials::{AppUser, CredentialTable};
    use crate::state::values::{new_store, Backend};

    const VALID: &str = "alice:secret";

    fn test_app(backend: Backend) -> (Router, SharedStore) {
        let credentials = CredentialTable::from_users(vec![AppUser {
            id: "alice".into(),
            password: "secret".into(),
        }])
        .unwrap();
        let store = new_store(backend);
        let metadata = AppMetadata {
            name: "test".into(),
            description: "test app".into(),
            version: "0.0.0".into(),
        };
        let app = build_app(
            store.clone(),
            AuthGate::new(Arc::new(credentials)),
            metadata,
        );
        (app, store)
    }

    fn request(method: Method, uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn post_stores_value() {
        let (app, store) = test_app(Backend::Plain);

        let response = app
            .oneshot(request(Method::POST, "/values", Some(VALID), "hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.is_empty());
        assert_eq!(
            values_service::retrieve(&store, 1),
            Some(Record::Plain("hello".into()))
        );
    }

    #[tokio::test]
    async fn post_accepts_json_string_body() {
        let (app, store) = test_app(Backend::Plain);

        let response = app
            .oneshot(request(Method::POST, "/values", Some(VALID), "\"hello\""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(values_service::retrieve(&store, 1).unwrap().value(), "hello");
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let (app, store) = test_app(Backend::Plain);
        values_service::store(&store, "hello".into());

        let response = app
            .oneshot(request(Method::GET, "/values/1", Some("alice:wrong"), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn every_auth_failure_looks_the_same() {
        let (app, _) = test_app(Backend::Plain);

        let mut responses = Vec::new();
        for auth in [None, Some("alice"), Some("bob:secret"), Some("alice:wrong")] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, "/values", auth, ""))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            responses.push(body_text(response).await);
        }

        assert!(responses.iter().all(|body| body == &responses[0]));
    }

    #[tokio::test]
    async fn non_ascii_header_counts_as_missing() {
        let (app, store) = test_app(Backend::Plain);

        let mut req = request(Method::POST, "/values", None, "hello");
        req.headers_mut().insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"alice:s\xe9cret").unwrap(),
        );

        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn rejected_writes_do_not_touch_the_store() {
        let (app, store) = test_app(Backend::Timestamped);

        let response = app
            .oneshot(request(Method::POST, "/values", Some("alice:wrong"), "hello"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_id_is_not_found() {
        let (app, _) = test_app(Backend::Plain);

        let response = app
            .oneshot(request(Method::GET, "/values/999", Some(VALID), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "ID '999' Not Found");
    }

    #[tokio::test]
    async fn put_and_delete_missing_id_are_not_found() {
        let (app, _) = test_app(Backend::Timestamped);

        let response = app
            .clone()
            .oneshot(request(Method::PUT, "/values/7", Some(VALID), "x"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "ID '7' Not Found");

        let response = app
            .oneshot(request(Method::DELETE, "/values/7", Some(VALID), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "ID '7' Not Found");
    }

    #[tokio::test]
    async fn put_replaces_value() {
        let (app, store) = test_app(Backend::Plain);
        let id = values_service::store(&store, "hello".into());

        let response = app
            .clone()
            .oneshot(request(Method::PUT, &format!("/values/{id}"), Some(VALID), "world"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, &format!("/values/{id}"), Some(VALID), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, Value::from("world"));
    }

    #[tokio::test]
    async fn put_advances_updated_timestamp() {
        let (app, store) = test_app(Backend::Timestamped);
        let id = values_service::store(&store, "hello".into());

        let before = body_json(
            app.clone()
                .oneshot(request(Method::GET, &format!("/values/{id}"), Some(VALID), ""))
                .await
                .unwrap(),
        )
        .await;

        let response = app
            .clone()
            .oneshot(request(Method::PUT, &format!("/values/{id}"), Some(VALID), "world"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let after = body_json(
            app.oneshot(request(Method::GET, &format!("/values/{id}"), Some(VALID), ""))
                .await
                .unwrap(),
        )
        .await;

        let instant = |v: &Value, field: &str| -> DateTime<Utc> {
            serde_json::from_value(v[field].clone()).unwrap()
        };

        assert_eq!(after["value"], "world");
        assert_eq!(after["id"], id);
        assert_eq!(instant(&after, "created"), instant(&before, "created"));
        assert!(instant(&after, "updated") > instant(&before, "updated"));
        assert!(instant(&after, "updated") >= instant(&after, "created"));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let (app, store) = test_app(Backend::Timestamped);
        let id = values_service::store(&store, "hello".into());

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, &format!("/values/{id}"), Some(VALID), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(request(Method::GET, &format!("/values/{id}"), Some(VALID), ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_all_returns_every_record() {
        let (app, store) = test_app(Backend::Plain);
        values_service::store(&store, "a".into());
        values_service::store(&store, "b".into());

        let response = app
            .oneshot(request(Method::GET, "/values", Some(VALID), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({ "1": "a", "2": "b" }));
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (app, _) = test_app(Backend::Plain);

        let response = app
            .oneshot(request(Method::GET, "/values/abc", Some(VALID), ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
