use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no usable input found: {0}")]
    MissingSource(String),

    #[error("schema validation failed for column '{column}': {detail}")]
    SchemaValidation { column: String, detail: String },

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("store write failed: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Shorthand for a validation failure on a named column.
    pub fn schema(column: impl Into<String>, detail: impl Into<String>) -> Self {
        PipelineError::SchemaValidation {
            column: column.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
