//! Error types for gtfunify.

use std::io;
use thiserror::Error;

/// Errors raised while reading the annotation stream.
#[derive(Error, Debug)]
pub enum UnifyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line that cannot become a [`crate::types::Feature`]. Recoverable:
    /// only the locus the line belongs to is abandoned.
    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord {
        line: usize,
        message: String,
        /// Locus id recovered from the raw line text, if it carried one.
        locus: Option<String>,
    },
}

impl UnifyError {
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        UnifyError::MalformedRecord {
            line,
            message: message.into(),
            locus: None,
        }
    }

    /// Attach the locus id found in the raw text of a malformed line.
    pub fn in_locus(self, id: Option<String>) -> Self {
        match self {
            UnifyError::MalformedRecord { line, message, .. } => UnifyError::MalformedRecord {
                line,
                message,
                locus: id,
            },
            other => other,
        }
    }

    /// Locus a malformed record belongs to, when it could be recovered.
    pub fn locus_id(&self) -> Option<&str> {
        match self {
            UnifyError::MalformedRecord { locus, .. } => locus.as_deref(),
            UnifyError::Io(_) => None,
        }
    }

    /// Whether processing may continue past this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, UnifyError::MalformedRecord { .. })
    }
}

pub type Result<T> = std::result::Result<T, UnifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_is_recoverable() {
        let err = UnifyError::malformed(7, "invalid start coordinate 'x'");
        assert!(err.is_recoverable());
        assert_eq!(err.locus_id(), None);
        assert_eq!(
            err.to_string(),
            "Malformed record at line 7: invalid start coordinate 'x'"
        );
    }

    #[test]
    fn test_malformed_carries_locus() {
        let err = UnifyError::malformed(3, "bad").in_locus(Some("RLOC_2".to_string()));
        assert_eq!(err.locus_id(), Some("RLOC_2"));
    }

    #[test]
    fn test_io_is_fatal() {
        let err = UnifyError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_recoverable());
        assert_eq!(err.locus_id(), None);
    }
}
