//! Core data models for the blob store.
//!
//! An [`object::Object`] is the descriptive record persisted next to each
//! payload; an [`object_id::ObjectId`] names it and fixes its location.

pub mod object;
pub mod object_id;
