//! Station list error types.

use std::path::PathBuf;

/// Errors that can occur when loading the station-code list.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The list file could not be read
    #[error("failed to read station list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the list JSON
    #[error("JSON parse error in station list: {message}")]
    Json { message: String },

    /// The list contained no valid station codes
    #[error("station list {path} contains no valid CRS codes")]
    Empty { path: PathBuf },
}
