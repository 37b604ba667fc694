//! On-disk layout: where an object lives, derived from its identifier alone.
//!
//! ```text
//! {root}/{YYYY}/{MM}/{day}/{id}/data
//! {root}/{YYYY}/{MM}/{day}/{id}/meta.json
//! ```
//!
//! There is no index. The dated prefix comes from the timestamp embedded in
//! the identifier (UTC) and the leaf directory is the identifier itself.

use crate::{
    models::object_id::ObjectId,
    services::object_store::{StoreError, StoreResult},
};
use clap::ValueEnum;
use std::path::{Path, PathBuf};

/// File holding the raw payload inside an object directory.
pub const PAYLOAD_FILE: &str = "data";

/// File holding the serialized [`Object`](crate::models::object::Object).
pub const METADATA_FILE: &str = "meta.json";

/// How the third directory level is formatted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DaySegment {
    /// Two-digit year (`%y`). Matches directories written by earlier
    /// deployments, e.g. `2024/03/24/`.
    #[default]
    Legacy,
    /// Two-digit day of month (`%d`), e.g. `2024/03/17/`.
    DayOfMonth,
}

impl DaySegment {
    fn format(self) -> &'static str {
        match self {
            DaySegment::Legacy => "%y",
            DaySegment::DayOfMonth => "%d",
        }
    }
}

/// Maps identifiers to directories under a storage root.
#[derive(Clone, Debug)]
pub struct Layout {
    root: PathBuf,
    day_segment: DaySegment,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>, day_segment: DaySegment) -> Self {
        Self {
            root: root.into(),
            day_segment,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fails with `MisconfiguredStore` when no root is set.
    pub fn check_root(&self) -> StoreResult<()> {
        if self.root.as_os_str().is_empty() {
            return Err(StoreError::MisconfiguredStore(
                "storage root path is not set".into(),
            ));
        }
        Ok(())
    }

    /// Path segments below the root: year, month, day segment, identifier.
    pub fn segments(&self, id: &ObjectId) -> StoreResult<[String; 4]> {
        let created = id
            .created_at()
            .filter(|_| id.is_valid())
            .ok_or_else(|| StoreError::InvalidIdentifier(id.to_string()))?;
        self.check_root()?;

        Ok([
            created.format("%Y").to_string(),
            created.format("%m").to_string(),
            created.format(self.day_segment.format()).to_string(),
            id.to_string(),
        ])
    }

    /// Directory owning both files of the object.
    pub fn object_dir(&self, id: &ObjectId) -> StoreResult<PathBuf> {
        let mut path = self.root.clone();
        path.extend(self.segments(id)?);
        Ok(path)
    }

    pub fn payload_path(&self, id: &ObjectId) -> StoreResult<PathBuf> {
        Ok(self.object_dir(id)?.join(PAYLOAD_FILE))
    }

    pub fn metadata_path(&self, id: &ObjectId) -> StoreResult<PathBuf> {
        Ok(self.object_dir(id)?.join(METADATA_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_layout_uses_two_digit_year_as_third_level() {
        let layout = Layout::new("/srv/blobs", DaySegment::Legacy);
        let id = ObjectId::generate();
        let created = id.created_at().unwrap();

        let dir = layout.object_dir(&id).unwrap();
        let expected = format!("{}/{}", created.format("%Y/%m/%y"), id);
        assert!(
            dir.ends_with(&expected),
            "expected {} to end with {}",
            dir.display(),
            expected
        );
        assert!(dir.starts_with("/srv/blobs"));
    }

    #[test]
    fn day_of_month_layout() {
        let layout = Layout::new("/srv/blobs", DaySegment::DayOfMonth);
        let id = ObjectId::generate();
        let created = id.created_at().unwrap();
        let segments = layout.segments(&id).unwrap();
        assert_eq!(segments[0], created.format("%Y").to_string());
        assert_eq!(segments[1], created.format("%m").to_string());
        assert_eq!(segments[2], created.format("%d").to_string());
        assert_eq!(segments[3], id.to_string());
    }

    #[test]
    fn derivation_is_pure_and_repeatable() {
        let layout = Layout::new("/srv/blobs", DaySegment::Legacy);
        let id = ObjectId::generate();
        assert_eq!(layout.object_dir(&id).unwrap(), layout.object_dir(&id).unwrap());
    }

    #[test]
    fn distinct_ids_get_distinct_dirs() {
        let layout = Layout::new("/srv/blobs", DaySegment::Legacy);
        let a = ObjectId::generate();
        let b = ObjectId::generate();
        assert_ne!(layout.object_dir(&a).unwrap(), layout.object_dir(&b).unwrap());
    }

    #[test]
    fn file_names_are_fixed() {
        let layout = Layout::new("/srv/blobs", DaySegment::Legacy);
        let id = ObjectId::generate();
        let dir = layout.object_dir(&id).unwrap();
        assert_eq!(layout.payload_path(&id).unwrap(), dir.join("data"));
        assert_eq!(layout.metadata_path(&id).unwrap(), dir.join("meta.json"));
    }

    #[test]
    fn nil_id_is_rejected() {
        let layout = Layout::new("/srv/blobs", DaySegment::Legacy);
        let err = layout.object_dir(&ObjectId::nil()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));
    }

    #[test]
    fn empty_root_is_rejected() {
        let layout = Layout::new("", DaySegment::Legacy);
        let err = layout.object_dir(&ObjectId::generate()).unwrap_err();
        assert!(matches!(err, StoreError::MisconfiguredStore(_)));
    }
}
