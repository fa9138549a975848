//! Error types for the converter.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion runs.
///
/// Every variant is terminal for the run that produced it. Recoverable
/// conditions never reach this type: they are logged as warnings and a
/// default is substituted at the point of detection.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration document could not be read or parsed
    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Configuration value present but unusable
    #[error("Invalid config value for '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    /// The mandatory `Layout` section is absent
    #[error("no VertexLayout in config (missing 'Layout' section)")]
    MissingLayout,

    /// Input requires an asset root directory that was not given
    #[error("{flag} expected when loading {input}")]
    MissingAssetRoot { flag: &'static str, input: PathBuf },

    /// No loader registered for the input kind
    #[error("No loader available for {0} input")]
    NoLoader(&'static str),

    /// Loader failed to import the input
    #[error("Import failed: {0}")]
    Import(String),

    /// IR is internally inconsistent
    #[error("IR integrity violation: {0}")]
    Integrity(String),

    /// Index value does not fit the configured index width
    #[error("Index {index} does not fit into {bytes}-byte indices")]
    IndexOverflow { index: u32, bytes: u8 },

    /// Invalid ORB data on read
    #[error("Invalid ORB file: {0}")]
    InvalidOrb(String),

    /// ORB file is truncated
    #[error("Unexpected end of ORB data at position {0}")]
    UnexpectedEof(u64),

    /// Processor definition does not apply to the IR
    #[error("Processor definition error: {0}")]
    Processor(String),

    /// Command line could not be parsed
    #[error("Invalid arguments: {0}")]
    Args(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create an integrity violation error.
    pub fn integrity(msg: impl Into<String>) -> Self {
        Self::Integrity(msg.into())
    }

    /// Create an invalid config value error.
    pub fn invalid_config(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidConfig { key: key.into(), message: msg.into() }
    }

    /// Map an open error, turning `NotFound` into [`Error::FileNotFound`].
    pub fn from_open(e: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path.into())
        } else {
            Self::Io(e)
        }
    }
}

/// Result type alias for converter operations.
pub type Result<T> = std::result::Result<T, Error>;
