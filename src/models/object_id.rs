//! Time-ordered object identifiers.
//!
//! Every stored object is named by an [`ObjectId`]. The identifier embeds its
//! creation time, which is what lets the store derive a dated directory from
//! the identifier alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A 128-bit, time-ordered identifier for one stored object.
///
/// Fresh identifiers are UUIDv7. Version 1 and 6 identifiers also carry a
/// timestamp and are accepted as valid, so older data stays addressable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generate a fresh identifier stamped with the current time.
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// The zero identifier. Never valid.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// True when the identifier is set and embeds a creation timestamp.
    pub fn is_valid(&self) -> bool {
        !self.0.is_nil() && self.0.get_timestamp().is_some()
    }

    /// Creation time embedded in the identifier.
    ///
    /// Returns `None` for the nil identifier and for UUID versions that carry
    /// no timestamp (e.g. v4).
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.0.is_nil() {
            return None;
        }
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_hyphenated())
    }
}

impl FromStr for ObjectId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_valid_and_dated() {
        let before = Utc::now().timestamp_millis();
        let id = ObjectId::generate();
        let after = Utc::now().timestamp_millis();

        assert!(id.is_valid());
        let ts = id.created_at().unwrap().timestamp_millis();
        assert!(ts >= before && ts <= after, "{ts} not in [{before}, {after}]");
    }

    #[test]
    fn nil_is_invalid() {
        let id = ObjectId::nil();
        assert!(!id.is_valid());
        assert!(id.created_at().is_none());
        assert_eq!(id, ObjectId::default());
    }

    #[test]
    fn random_uuid_is_not_addressable() {
        let id: ObjectId = "2b1c9f7e-4f6a-4d2b-9c1e-5a7f3e2d1c0b".parse().unwrap();
        assert!(!id.is_valid());
        assert!(id.created_at().is_none());
    }

    #[test]
    fn legacy_v1_ids_remain_valid() {
        // time-based, version 1
        let id: ObjectId = "c232ab00-9414-11e5-8994-feff819cdc9f".parse().unwrap();
        assert!(id.is_valid());
        assert!(id.created_at().is_some());
    }

    #[test]
    fn canonical_string_round_trips() {
        let id = ObjectId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text, text.to_lowercase());
        let parsed: ObjectId = text.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn sequential_ids_have_non_decreasing_timestamps() {
        let ids: Vec<ObjectId> = (0..64).map(|_| ObjectId::generate()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0].created_at() <= pair[1].created_at());
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ObjectId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
