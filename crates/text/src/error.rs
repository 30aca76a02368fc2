use std::io;
use thiserror::Error;

/// Error returned by every reader, writer, pool and sink operation.
///
/// Only [`TextError::Io`] carries an underlying cause; the other variants describe misuse of
/// the component itself and are never retried internally.
#[derive(Error, Debug)]
pub enum TextError {
    #[error("text stream has been disposed")]
    Disposed,

    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("byte source is not readable")]
    InvalidSource,

    #[error("byte sink is not writable")]
    InvalidSink,

    #[error("operation cancelled")]
    Cancelled,

    #[error("requested buffer of {requested} elements exceeds the pool limit {max}")]
    BufferTooLarge { requested: usize, max: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl TextError {
    pub fn invalid_argument<S: ToString>(str: S) -> Self {
        Self::InvalidArgument { reason: str.to_string() }
    }

    pub fn buffer_too_large(requested: usize, max: usize) -> Self {
        Self::BufferTooLarge { requested, max }
    }

    /// Returns true if the error was caused by using a disposed reader or writer
    #[inline]
    pub fn is_disposed(&self) -> bool {
        matches!(self, TextError::Disposed)
    }

    /// Returns true if the error reports a cancelled asynchronous operation
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TextError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts_through_from() {
        let error: TextError = io::Error::new(io::ErrorKind::UnexpectedEof, "peer went away").into();
        assert!(matches!(error, TextError::Io { .. }));
        assert_eq!(error.to_string(), "io error: peer went away");
    }

    #[test]
    fn helper_constructors() {
        assert_eq!(TextError::invalid_argument("count out of range").to_string(), "invalid argument: count out of range");
        assert_eq!(
            TextError::buffer_too_large(4096, 1024).to_string(),
            "requested buffer of 4096 elements exceeds the pool limit 1024"
        );
        assert!(TextError::Disposed.is_disposed());
        assert!(TextError::Cancelled.is_cancelled());
        assert!(!TextError::InvalidSource.is_cancelled());
    }
}
