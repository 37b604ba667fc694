//! Storage core: identifier-to-path layout, content-type resolution and the
//! blocking object store built on them.

pub mod content_type;
pub mod layout;
pub mod object_store;
