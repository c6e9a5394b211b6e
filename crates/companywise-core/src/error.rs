use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the companywise crates.
#[derive(Error, Debug)]
pub enum CompanywiseError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be created, written or renamed into place.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or serialized.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The dataset root directory does not exist or is not a directory.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// The dataset root directory could not be listed.
    #[error("Failed to list {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// No company matches the requested slug or name.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// A timeframe key is not one of the five catalog keys.
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// A sort specification could not be parsed.
    #[error("Invalid sort order: {0}")]
    InvalidSort(String),

    /// An operation requires a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,

    /// Interactive sign-in was requested but no identity is configured.
    #[error("No user identity configured for sign-in")]
    NoIdentity,

    /// The remote solved-status store rejected or failed an operation.
    #[error("Remote store error for user {user_id}: {message}")]
    Remote { user_id: String, message: String },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience alias used throughout the companywise crates.
pub type Result<T> = std::result::Result<T, CompanywiseError>;
