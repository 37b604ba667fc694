//! Defines routes for blob upload, download and health probes.
//!
//! ## Structure
//! - `POST /`           — multipart upload, one object per `file` part
//! - `GET  /{id}`       — download payload
//! - `HEAD /{id}`       — payload headers only
//! - `GET  /{id}/info`  — stored record as JSON
//! - `GET  /healthz`, `GET /readyz` — probes

use crate::{
    handlers::{
        health_handlers::{healthz, readyz},
        object_handlers::{get_object, head_object, object_info, upload_objects},
    },
    services::object_store::ObjectStore,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build the router. Upload bodies larger than `max_upload_bytes` are rejected.
///
/// The router carries the shared `ObjectStore` handle to all handlers.
pub fn routes(max_upload_bytes: usize) -> Router<ObjectStore> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route(
            "/",
            post(upload_objects).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/{id}", get(get_object).head(head_object))
        .route("/{id}/info", get(object_info))
}
