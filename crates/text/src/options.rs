//! Reader and writer configuration.
//!
//! Both option types deserialize from any serde format; missing fields fall back to their
//! defaults.

use serde::Deserialize;

/// Default capacity of the reader's byte buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Options of a [`StreamTextReader`](crate::reader::StreamTextReader).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReaderOptions {
    /// Bytes requested from the source per refill. Must be positive.
    pub buffer_size: usize,
}

impl ReaderOptions {
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self { buffer_size }
    }
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { buffer_size: DEFAULT_BUFFER_SIZE }
    }
}

/// Options of a [`PipeTextWriter`](crate::writer::PipeTextWriter).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WriterOptions {
    /// Line ending appended by `write_line`.
    pub new_line: String,
}

impl WriterOptions {
    pub fn with_new_line<S: Into<String>>(new_line: S) -> Self {
        Self { new_line: new_line.into() }
    }
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self { new_line: "\n".to_owned() }
    }
}
