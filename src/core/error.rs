//! Error types for vcf4-reader
//!
//! Defines all error types used throughout the library.

use thiserror::Error;

/// Origin label used for sources that are not backed by a file
pub const STREAM_ORIGIN: &str = "<stream>";

/// Main error type for VCF reading operations
#[derive(Debug, Error)]
pub enum VcfError {
    /// A header line is present but unusable (e.g. `##fileformat` without a value)
    #[error("Malformed header in {origin} at line {line}: {message}")]
    MalformedHeader {
        origin: String,
        line: usize,
        message: String,
    },

    /// No `#CHROM` line was seen before the data section (or end of input)
    #[error("Missing #CHROM header line in {origin}")]
    MissingHeader { origin: String },

    /// A data line could not be turned into a record (e.g. non-numeric POS)
    #[error("Malformed record in {origin} at line {line}: {message}")]
    MalformedRecord {
        origin: String,
        line: usize,
        message: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VcfError {
    /// Create a malformed header error
    pub fn malformed_header(origin: &str, line: usize, message: impl Into<String>) -> Self {
        VcfError::MalformedHeader {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Create a missing header error
    pub fn missing_header(origin: &str) -> Self {
        VcfError::MissingHeader {
            origin: origin.to_string(),
        }
    }

    /// Create a malformed record error
    pub fn malformed_record(origin: &str, line: usize, message: impl Into<String>) -> Self {
        VcfError::MalformedRecord {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Whether the error aborts the whole source (header errors) or only a record
    pub fn is_fatal(&self) -> bool {
        !matches!(self, VcfError::MalformedRecord { .. })
    }
}

/// Result type alias for VCF operations
pub type Result<T> = std::result::Result<T, VcfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = VcfError::malformed_record("calls.vcf", 12, "invalid POS 'abc'");
        assert_eq!(
            err.to_string(),
            "Malformed record in calls.vcf at line 12: invalid POS 'abc'"
        );

        let err = VcfError::missing_header("calls.vcf.gz");
        assert_eq!(err.to_string(), "Missing #CHROM header line in calls.vcf.gz");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(VcfError::missing_header(STREAM_ORIGIN).is_fatal());
        assert!(VcfError::malformed_header(STREAM_ORIGIN, 1, "x").is_fatal());
        assert!(!VcfError::malformed_record(STREAM_ORIGIN, 3, "x").is_fatal());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        let err: VcfError = io.into();
        assert!(matches!(err, VcfError::Io(_)));
        assert!(err.is_fatal());
    }
}
