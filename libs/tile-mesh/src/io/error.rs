//! Error types for mesh file I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh I/O operations.
pub type IoResult<T> = Result<T, IoError>;

/// Errors that can occur while reading or writing STL files.
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// File exceeds the accepted size.
    #[error("file too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size on disk.
        size: u64,
        /// Accepted maximum.
        max: u64,
    },

    /// Invalid file content (parse error).
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Binary STL shorter than its header.
    #[error("invalid STL header: expected {expected} bytes, got {got}")]
    InvalidHeader {
        /// Expected header size.
        expected: usize,
        /// Actual header size.
        got: usize,
    },

    /// Binary STL with fewer triangles than announced.
    #[error("invalid face count: expected {expected}, got {got}")]
    InvalidFaceCount {
        /// Number of faces in the header.
        expected: u32,
        /// Number of complete faces present.
        got: u32,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error in an ASCII STL.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

impl IoError {
    /// Create an `InvalidContent` error with the given message.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_display() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("terrain.stl"),
        };
        assert_eq!(err.to_string(), "file not found: terrain.stl");
    }

    #[test]
    fn test_parse_float_conversion() {
        let parse_err = "abc".parse::<f64>().unwrap_err();
        let err: IoError = parse_err.into();
        assert!(matches!(err, IoError::ParseFloat(_)));
    }
}
