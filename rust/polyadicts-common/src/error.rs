
use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn truncated(element: impl Into<String>) -> Error {
        ErrorKind::Truncated {
            element: element.into(),
        }
        .into()
    }

    pub fn range_exceeded(element: impl Into<String>) -> Error {
        ErrorKind::RangeExceeded {
            element: element.into(),
        }
        .into()
    }

    pub fn malformed(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::Malformed {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn rank_mismatch(expected: usize, found: usize) -> Error {
        ErrorKind::RankMismatch { expected, found }.into()
    }

    pub fn insufficient_space(required: usize, available: usize) -> Error {
        ErrorKind::InsufficientSpace {
            required,
            available,
        }
        .into()
    }

    pub fn index_out_of_range(index: usize, rank: usize) -> Error {
        ErrorKind::IndexOutOfRange { index, rank }.into()
    }

    pub fn out_of_memory(requested: usize) -> Error {
        ErrorKind::OutOfMemory { requested }.into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    /// Returns `true` if this error was caused by untrusted input data
    /// (as opposed to caller misuse or resource exhaustion).
    pub fn is_data_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Truncated { .. }
                | ErrorKind::RangeExceeded { .. }
                | ErrorKind::Malformed { .. }
                | ErrorKind::RankMismatch { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The input buffer ends before a required field completes.
    #[error("truncated input while reading '{element}'")]
    Truncated { element: String },

    /// A value, or the overall encoded size, does not fit the representable range.
    #[error("value out of representable range for '{element}'")]
    RangeExceeded { element: String },

    /// Structurally self-inconsistent input.
    #[error("malformed data for '{element}': {message}")]
    Malformed { element: String, message: String },

    /// The rank stored in a tuple differs from the rank the caller expects.
    #[error("rank mismatch: expected {expected}, found {found}")]
    RankMismatch { expected: usize, found: usize },

    #[error("destination buffer is too small: {required} bytes required, {available} available")]
    InsufficientSpace { required: usize, available: usize },

    #[error("item index {index} is out of range for rank {rank}")]
    IndexOutOfRange { index: usize, rank: usize },

    #[error("failed to allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
