use std::path::PathBuf;
use thiserror::Error;

/// Failure to read a store document from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("store file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("store file {} is not valid JSON: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store file {} has an invalid structure: {reason}", path.display())]
    SchemaInvalid { path: PathBuf, reason: String },

    #[error("unexpected error while loading {}: {source}", path.display())]
    Unexpected {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Malformed { path, .. }
            | LoadError::SchemaInvalid { path, .. }
            | LoadError::Unexpected { path, .. } => path,
        }
    }
}

/// Failure to write the store document. The in-memory store is unaffected.
#[derive(Debug, Error)]
#[error("failed to save store to {}: {source}", path.display())]
pub struct SaveError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// A precondition of an add, edit or credential update was not met.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field '{0}' must not be empty")]
    EmptyField(&'static str),

    #[error("library with name '{name}' already exists in {city}, on {address}")]
    DuplicateName {
        name: String,
        city: String,
        address: String,
    },

    #[error("library '{existing}' already exists at {address}, {city}")]
    DuplicateAddress {
        existing: String,
        city: String,
        address: String,
    },

    #[error("unknown field '{0}'; expected one of name, city, address")]
    UnknownField(String),

    #[error("library '{0}' not found")]
    LibraryNotFound(String),

    #[error("password cannot be empty")]
    EmptyPassword,
}

/// Delete of a library that is not in the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("library '{name}' not found")]
pub struct NotFoundError {
    pub name: String,
}
