//! Error handling for the TagScan scanners
//!
//! The sanitizing scanner itself never fails: malformed input degrades
//! locally (unterminated literals end at EOF, unknown directives are skipped
//! to end of line). The fallible surface is file access.

use std::fmt;
use thiserror::Error;

/// Errors produced while setting up or driving a scan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("internal scanner error: {message}")]
    Internal { message: String },
}

impl ScanError {
    /// Create an I/O error with the offending path attached
    pub fn io(path: impl fmt::Display, err: &std::io::Error) -> Self {
        ScanError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }
}

/// Convert from String (for simple error cases)
impl From<String> for ScanError {
    fn from(message: String) -> Self {
        ScanError::Internal { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ScanError::io("missing.c", &io);
        assert_eq!(err.to_string(), "failed to read missing.c: no such file");
    }

    #[test]
    fn test_from_string() {
        let err: ScanError = "bad state".to_string().into();
        assert_eq!(err.to_string(), "internal scanner error: bad state");
    }
}
