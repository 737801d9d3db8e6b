use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoreError {
    #[error("Record is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("Unrecognized modification item kind '{kind}' on entity '{entity}'")]
    UnknownModificationKind { entity: String, kind: String },

    #[error("Unknown image href type '{href_type}' on entity '{entity}'")]
    UnknownImageHref { entity: String, href_type: String },

    #[error("No base entity at key: {0}")]
    MissingBaseEntity(crate::core::key::EntityKey),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoreError>;
