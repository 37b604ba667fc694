//! Represents an object (blob) held by the store.

use crate::models::object_id::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fallback MIME type when nothing better is known.
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Descriptive record for a single stored object.
///
/// This is what lands in `meta.json` next to the payload and what the upload
/// endpoint returns. The payload bytes themselves are never held here.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Object {
    /// Identifier naming the object. Also decides where it lives on disk.
    #[serde(default)]
    pub id: ObjectId,

    /// Original filename supplied by the uploader.
    #[serde(default)]
    pub name: String,

    /// MIME type of the payload.
    #[serde(default)]
    pub content_type: String,

    /// Payload length in bytes, as measured while writing.
    #[serde(default)]
    pub size: u64,

    /// Freeform key/value data about the object.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl Object {
    /// An empty record around `id`.
    pub fn with_id(id: ObjectId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// When the object was created, read from its identifier.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.id.created_at()
    }
}
