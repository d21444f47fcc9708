use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelgraphError {
    #[error("Unsupported column type '{storage_type}' for column '{column}' on model '{model}'")]
    UnsupportedType {
        model: String,
        column: String,
        storage_type: String,
    },

    #[error("Model '{0}' has no primary key, cannot generate an update input")]
    MissingPrimaryKey(String),

    #[error("Duplicate mapping: {0}")]
    DuplicateMapping(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unresolved reference to '{reference}' in field '{type_name}.{field}'")]
    ForwardReference {
        type_name: String,
        field: String,
        reference: String,
    },

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Row loader error: {0}")]
    Loader(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schema generation error: {0}")]
    SchemaGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for RelgraphError {
    fn from(err: toml::de::Error) -> Self {
        RelgraphError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for RelgraphError {
    fn from(err: toml::ser::Error) -> Self {
        RelgraphError::Serialization(format!("TOML serialization error: {}", err))
    }
}

impl From<serde_json::Error> for RelgraphError {
    fn from(err: serde_json::Error) -> Self {
        RelgraphError::Serialization(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RelgraphError>;
