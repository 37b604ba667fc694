//! HTTP handlers for uploading and downloading blobs.
//!
//! Store calls are blocking, so each one runs on the blocking pool. Upload
//! bodies are streamed into the blocking copy through a bounded channel rather
//! than buffered in memory.

use crate::{
    errors::AppError,
    models::{
        object::{APPLICATION_OCTET_STREAM, Object},
        object_id::ObjectId,
    },
    services::object_store::{ObjectStore, StoreResult},
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::Field},
    http::{HeaderMap, HeaderValue, header},
    response::Response,
};
use bytes::Bytes;
use futures::stream;
use std::{fs::File, io};
use tokio::{sync::mpsc, task};
use tokio_util::io::{ReaderStream, StreamReader, SyncIoBridge};

/// Multipart part name carrying uploaded files.
pub const UPLOAD_FIELD: &str = "file";

/// Chunks buffered between the request body and the disk writer.
const BRIDGE_CAPACITY: usize = 8;

/// `POST /` — store every `file` part of a multipart body as a new object.
///
/// Responds with the stored records, in part order.
pub async fn upload_objects(
    State(store): State<ObjectStore>,
    mut multipart: Multipart,
) -> Result<Json<Vec<Object>>, AppError> {
    let mut stored = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::new(err.status(), err.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let object = store_field(&store, field).await?;
        tracing::info!("created blob {} ({} bytes)", object.id, object.size);
        stored.push(object);
    }

    if stored.is_empty() {
        return Err(AppError::bad_request("no blobs stored"));
    }
    Ok(Json(stored))
}

/// Stream one multipart part into a fresh object.
async fn store_field(store: &ObjectStore, mut field: Field<'_>) -> Result<Object, AppError> {
    let mut object = store.create();
    object.name = field.file_name().unwrap_or_default().to_string();
    object.content_type = field.content_type().unwrap_or_default().to_string();

    let (tx, mut rx) = mpsc::channel::<io::Result<Bytes>>(BRIDGE_CAPACITY);
    let chunks = stream::poll_fn(move |cx| rx.poll_recv(cx));
    let reader = SyncIoBridge::new(StreamReader::new(chunks));
    let writer = {
        let store = store.clone();
        task::spawn_blocking(move || store.persist(object, reader))
    };

    let mut upload_err = None;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                // A closed channel means the writer already failed; its error
                // is picked up below.
                if tx.send(Ok(chunk)).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(err) => {
                let _ = tx.send(Err(io::Error::other(err.body_text()))).await;
                upload_err = Some(err);
                break;
            }
        }
    }
    drop(tx);

    let result = writer.await?;
    if let Some(err) = upload_err {
        return Err(AppError::new(err.status(), err.body_text()));
    }
    Ok(result?)
}

/// `GET /{id}` — stream the payload back.
pub async fn get_object(
    State(store): State<ObjectStore>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let (object, file, len) = open_object(store, &raw_id).await?;

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    let mut response = Response::new(Body::from_stream(stream));
    set_object_headers(response.headers_mut(), &object, len);
    Ok(response)
}

/// `HEAD /{id}` — same headers as GET, no body.
pub async fn head_object(
    State(store): State<ObjectStore>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let (object, _file, len) = open_object(store, &raw_id).await?;
    let mut response = Response::new(Body::empty());
    set_object_headers(response.headers_mut(), &object, len);
    Ok(response)
}

/// `GET /{id}/info` — the stored record as JSON.
pub async fn object_info(
    State(store): State<ObjectStore>,
    Path(raw_id): Path<String>,
) -> Result<Json<Object>, AppError> {
    Ok(Json(load_object(store, &raw_id).await?))
}

async fn load_object(store: ObjectStore, raw_id: &str) -> Result<Object, AppError> {
    let id = parse_id(raw_id)?;
    Ok(task::spawn_blocking(move || store.load(&id)).await??)
}

/// Load the record and open the payload, returning the payload's on-disk
/// length. That length can differ from `size` while a rewrite is in flight.
async fn open_object(store: ObjectStore, raw_id: &str) -> Result<(Object, File, u64), AppError> {
    let id = parse_id(raw_id)?;
    Ok(task::spawn_blocking(move || -> StoreResult<_> {
        let object = store.load(&id)?;
        let file = store.open_payload(&id)?;
        let len = file.metadata()?.len();
        Ok((object, file, len))
    })
    .await??)
}

fn parse_id(raw: &str) -> Result<ObjectId, AppError> {
    raw.parse()
        .map_err(|err| AppError::bad_request(format!("invalid object id `{}`: {}", raw, err)))
}

fn set_object_headers(headers: &mut HeaderMap, object: &Object, len: u64) {
    let content_type = if object.content_type.is_empty() {
        APPLICATION_OCTET_STREAM
    } else {
        object.content_type.as_str()
    };
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(APPLICATION_OCTET_STREAM)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));

    if let Some(created) = object.created_at() {
        let http_date = created.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(value) = HeaderValue::from_str(&http_date) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }
}
