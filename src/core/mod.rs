pub mod config;
pub mod error;
pub mod key;

pub use error::{LoreError, Result};
pub use key::EntityKey;
