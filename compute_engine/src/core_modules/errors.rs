// THEORY:
// Every engine reports failure through one error type. The taxonomy is small and
// closed: each variant names the class of contract violation, and carries a
// human-readable message describing the offending value. No variant is fatal and
// none is ever retried; an operation either returns its full result or exactly
// one of these.
//
// `ErrorKind` is the data-free discriminant. Boundaries (HTTP, CLI) use its
// stable wire name (`as_str`) in structured error bodies so clients can branch
// on the kind without parsing messages.

use std::fmt;
use thiserror::Error;

pub type ComputeResult<T> = Result<T, ComputeError>;

/// The class of a `ComputeError`, without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    MalformedMatrix,
    DimensionMismatch,
    MalformedNumericList,
    EmptyInput,
    UnsupportedFormat,
}

impl ErrorKind {
    /// The stable name used in `{errorKind, message}` bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::MalformedMatrix => "MalformedMatrix",
            ErrorKind::DimensionMismatch => "DimensionMismatch",
            ErrorKind::MalformedNumericList => "MalformedNumericList",
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contract violation detected by one of the engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComputeError {
    /// Argument missing, non-numeric, negative, or outside the operation's domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A matrix whose rows do not all have the same length (or that has no cells).
    #[error("malformed matrix: {0}")]
    MalformedMatrix(String),
    /// Shapes that cannot be combined: `cols(A) != rows(B)`, or a pixel buffer
    /// whose length disagrees with `width * height * channels`.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    /// A numeric list containing a token that is not a number.
    #[error("malformed numeric list: {0}")]
    MalformedNumericList(String),
    /// Text that yields no tokens after normalization.
    #[error("empty input: {0}")]
    EmptyInput(String),
    /// A pixel buffer with a channel count other than 3 or 4.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl ComputeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ComputeError::InvalidInput(_) => ErrorKind::InvalidInput,
            ComputeError::MalformedMatrix(_) => ErrorKind::MalformedMatrix,
            ComputeError::DimensionMismatch(_) => ErrorKind::DimensionMismatch,
            ComputeError::MalformedNumericList(_) => ErrorKind::MalformedNumericList,
            ComputeError::EmptyInput(_) => ErrorKind::EmptyInput,
            ComputeError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
        }
    }

    /// The message without the kind prefix that `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            ComputeError::InvalidInput(message)
            | ComputeError::MalformedMatrix(message)
            | ComputeError::DimensionMismatch(message)
            | ComputeError::MalformedNumericList(message)
            | ComputeError::EmptyInput(message)
            | ComputeError::UnsupportedFormat(message) => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let error = ComputeError::DimensionMismatch("2 != 3".to_string());
        assert_eq!(error.kind(), ErrorKind::DimensionMismatch);
        assert_eq!(error.kind().as_str(), "DimensionMismatch");
        assert_eq!(error.message(), "2 != 3");
    }

    #[test]
    fn display_prefixes_the_kind() {
        let error = ComputeError::EmptyInput("no tokens".to_string());
        assert_eq!(error.to_string(), "empty input: no tokens");
    }
}
