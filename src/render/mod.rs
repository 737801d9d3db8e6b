//! Boundary collaborators for the resolution engine.
//!
//! The engine treats narrative flattening and URL construction as opaque
//! pure functions: it accumulates their outputs but never inspects them.

pub mod flatten;
pub mod urls;

pub use flatten::{Description, EntryFlattener, PlainFlattener};
pub use urls::{clean_url, image_url};
