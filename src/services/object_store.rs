//! src/services/object_store.rs
//!
//! ObjectStore — persists payloads and their JSON metadata under a dated
//! directory derived from each object's identifier (see `layout`). There is no
//! index: an object is re-opened from its identifier alone.
//!
//! Every operation is blocking filesystem I/O. Async callers are expected to
//! run these calls on a blocking thread (`tokio::task::spawn_blocking`).

use crate::{
    models::{object::Object, object_id::ObjectId},
    services::{
        content_type,
        layout::{DaySegment, Layout, METADATA_FILE, PAYLOAD_FILE},
    },
};
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter, ErrorKind, Read, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object id `{0}`")]
    InvalidIdentifier(String),
    #[error("object store misconfigured: {0}")]
    MisconfiguredStore(String),
    #[error("object `{0}` not found")]
    NotFound(ObjectId),
    #[error("metadata for object `{id}` is corrupt: {source}")]
    CorruptMetadata {
        id: ObjectId,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    StorageUnavailable(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Settings fixed for the lifetime of a store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Directory everything is stored beneath.
    pub root: PathBuf,
    pub day_segment: DaySegment,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            day_segment: DaySegment::default(),
        }
    }
}

/// Handle to the on-disk object store. Cheap to clone.
///
/// Objects with distinct identifiers never share a directory, so no locking
/// is done. Concurrent writes to the *same* identifier are not coordinated.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    layout: Arc<Layout>,
}

impl ObjectStore {
    /// Build a store over `config.root`. Does not touch the filesystem.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let layout = Layout::new(config.root, config.day_segment);
        layout.check_root()?;
        Ok(Self {
            layout: Arc::new(layout),
        })
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    /// A new, empty record with a fresh identifier. Performs no I/O.
    pub fn create(&self) -> Object {
        Object::with_id(ObjectId::generate())
    }

    pub fn object_dir(&self, id: &ObjectId) -> StoreResult<PathBuf> {
        self.layout.object_dir(id)
    }

    /// True iff `id` is valid and its payload file is present and openable.
    ///
    /// Metadata is not consulted.
    pub fn exists(&self, id: &ObjectId) -> bool {
        if !id.is_valid() {
            return false;
        }
        let Ok(path) = self.layout.payload_path(id) else {
            return false;
        };
        match File::open(&path).and_then(|file| file.metadata()) {
            Ok(meta) => meta.is_file(),
            Err(_) => false,
        }
    }

    /// Store the payload read from `src`, then its metadata.
    ///
    /// The stored content type is resolved from the declared type and the
    /// filename. `size` is set to the number of bytes actually written.
    ///
    /// If the metadata write fails, the error is returned and the payload is
    /// left in place.
    pub fn persist<R: Read>(&self, mut object: Object, mut src: R) -> StoreResult<Object> {
        object.content_type = content_type::resolve(&object.content_type, &object.name);
        self.write_payload(&mut object, &mut src)?;
        if let Err(err) = self.write_metadata(&object) {
            warn!("payload for {} stored but metadata write failed: {}", object.id, err);
            return Err(err);
        }
        debug!(
            "persisted object {} ({} bytes, {})",
            object.id, object.size, object.content_type
        );
        Ok(object)
    }

    /// Stream `src` into the object's payload file and record its size.
    ///
    /// Bytes go to a temporary file first and are renamed onto `data` only
    /// once the copy is complete and synced. On any failure the temporary file
    /// is removed and an existing payload is left untouched.
    pub fn write_payload<R: Read + ?Sized>(
        &self,
        object: &mut Object,
        src: &mut R,
    ) -> StoreResult<u64> {
        let dir = self.ensure_dir(&object.id)?;
        let mut pending = PendingFile::create(&dir, PAYLOAD_FILE)?;

        let mut writer = BufWriter::new(pending.file_mut());
        let size = io::copy(src, &mut writer)?;
        writer.flush()?;
        drop(writer);

        pending.persist(&dir.join(PAYLOAD_FILE))?;
        object.size = size;
        Ok(size)
    }

    /// Serialize `object` to `meta.json` in its directory.
    pub fn write_metadata(&self, object: &Object) -> StoreResult<()> {
        let dir = self.ensure_dir(&object.id)?;
        let mut pending = PendingFile::create(&dir, METADATA_FILE)?;

        let mut writer = BufWriter::new(pending.file_mut());
        serde_json::to_writer(&mut writer, object).map_err(io::Error::from)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        pending.persist(&dir.join(METADATA_FILE))?;
        Ok(())
    }

    /// Read back the record for `id`. The payload is not touched.
    ///
    /// The returned `id` is always the requested one, whatever the file says.
    pub fn load(&self, id: &ObjectId) -> StoreResult<Object> {
        let path = self.layout.metadata_path(id)?;
        let file = File::open(&path).map_err(|err| not_found_or(err, id))?;

        let mut object: Object =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                if source.is_io() {
                    StoreError::StorageUnavailable(source.into())
                } else {
                    StoreError::CorruptMetadata { id: *id, source }
                }
            })?;
        object.id = *id;
        Ok(object)
    }

    /// Open the payload of `id` for reading. The caller owns the handle.
    pub fn open_payload(&self, id: &ObjectId) -> StoreResult<File> {
        let path = self.layout.payload_path(id)?;
        let file = File::open(&path).map_err(|err| not_found_or(err, id))?;
        if !file.metadata()?.is_file() {
            return Err(StoreError::NotFound(*id));
        }
        Ok(file)
    }

    /// Create the object's directory (idempotent) and return it.
    fn ensure_dir(&self, id: &ObjectId) -> StoreResult<PathBuf> {
        let dir = self.layout.object_dir(id)?;
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

fn not_found_or(err: io::Error, id: &ObjectId) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(*id)
    } else {
        StoreError::StorageUnavailable(err)
    }
}

/// A temporary sibling of a target file, removed on drop unless persisted.
struct PendingFile {
    path: PathBuf,
    file: File,
    armed: bool,
}

impl PendingFile {
    fn create(dir: &Path, target: &str) -> io::Result<Self> {
        let path = dir.join(format!(".{}.tmp-{}", target, Uuid::new_v4()));
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        Ok(Self {
            path,
            file,
            armed: true,
        })
    }

    fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Sync and atomically rename onto `dest`, replacing any previous file.
    fn persist(mut self, dest: &Path) -> io::Result<()> {
        self.file.sync_all()?;
        fs::rename(&self.path, dest)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("removed partial file {}", self.path.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                "failed to remove partial file {}: {}",
                self.path.display(),
                err
            ),
        }
    }
}
