pub mod api;
pub mod bio;
pub mod cli;
pub mod core;
pub mod index;
pub mod remote;
pub mod storage;
pub mod utils;

pub use crate::api::AssemblyApi;
pub use crate::core::config::Config;
pub use crate::index::{ContigIndexer, SearchParams, SearchResult};
pub use crate::storage::{SequenceCache, SubsequenceExtractor};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Referenced object is neither an assembly nor a legacy contig set (index path)
    #[error("The ref is not an Assembly or ContigSet data object. It was a {0}")]
    UnsupportedType(String),

    /// Referenced object is neither an assembly nor a legacy contig set (sequence path)
    #[error("{0} is not a valid input type for this function")]
    InvalidType(String),

    #[error("Unknown column name '{column}', please use one of {known:?}")]
    UnknownColumn { column: String, known: Vec<String> },

    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Error parsing contig from: [{line}]: {reason}")]
    CorruptIndex { line: String, reason: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AssemblyError {
    fn from(err: serde_json::Error) -> Self {
        AssemblyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
