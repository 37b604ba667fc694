//! Blob store: keeps uploaded payloads and their JSON metadata on local disk,
//! in directories derived from time-ordered object identifiers.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use services::object_store::ObjectStore;

/// Build the HTTP application around `store`.
pub fn app(store: ObjectStore, max_upload_bytes: usize) -> Router {
    routes::routes::routes(max_upload_bytes).with_state(store)
}
