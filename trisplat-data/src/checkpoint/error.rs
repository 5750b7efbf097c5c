//! Error types for checkpoint loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a splat checkpoint.
///
/// Every variant is fatal; there is no partial load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open checkpoint {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed checkpoint container: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' has shape {found:?}, expected {expected}")]
    Shape {
        field: &'static str,
        expected: String,
        found: Vec<usize>,
    },

    #[error("Field '{field}' has {found} vertices, expected {expected} to match triangles_points")]
    VertexCountMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Triangle {triangle} references vertex {index}, but only {vertex_count} vertices exist")]
    IndexOutOfRange {
        triangle: usize,
        index: i64,
        vertex_count: usize,
    },

    #[error("Field '{field}' has invalid value: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
