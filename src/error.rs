use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to read trade file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode trade file {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown filter key: {0}")]
    UnknownFilter(String),

    #[error("invalid value {value:?} for filter {key}")]
    InvalidFilterValue { key: String, value: String },

    #[error("bucket edges must be finite and strictly increasing: {0:?}")]
    InvalidEdges(Vec<f64>),

    #[error("bucket edges {0:?} are not a comma separated list of numbers")]
    UnparseableEdges(String),

    #[error("invalid value {value:?} for config key {key}")]
    InvalidConfig { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, JournalError>;
