use std::io;

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid document name {0:?}: must be a plain file name inside the site root")]
    InvalidDocumentName(String),

    #[error("Failed to read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error("{file} changed since it was scanned (expected version {expected}, found {actual})")]
    VersionConflict {
        file: String,
        expected: String,
        actual: String,
    },
}

/// Body returned for requests rejected before any file was touched.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl From<&ContentError> for ErrorResponse {
    fn from(err: &ContentError) -> Self {
        ErrorResponse {
            success: false,
            error: err.to_string(),
        }
    }
}
