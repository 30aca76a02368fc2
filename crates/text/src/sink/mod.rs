//! Byte sinks fed by [`PipeTextWriter`](crate::writer::PipeTextWriter).
//!
//! A sink works like a pipe writer: the producer reserves a writable segment, encodes straight
//! into it and commits the number of bytes it actually produced. Completion ends the logical
//! stream; it happens exactly once.
//!
//! # Components
//!
//! - [`ByteSink`] / [`AsyncByteSink`]: the reserve/commit/complete capability and its
//!   asynchronous flush
//! - [`BufferSink`]: collects everything in memory, ready to become a response body
//! - [`IoSink`]: buffers committed bytes and writes them to a [`tokio::io::AsyncWrite`]
//! - [`MinimumChunkingSink`]: only forwards flushes once enough bytes piled up

mod buffer_sink;
mod chunking_sink;
mod io_sink;

pub use buffer_sink::BufferSink;
pub use chunking_sink::MinimumChunkingSink;
pub use io_sink::IoSink;

use std::io;

use async_trait::async_trait;
use bytes::BytesMut;

/// Reserve/commit byte sink.
pub trait ByteSink {
    /// Whether the sink still accepts bytes; checked once when a writer is constructed.
    fn is_writable(&self) -> bool {
        true
    }

    /// Returns a writable segment of at least `size_hint` bytes.
    ///
    /// Reserving again before [`commit`](ByteSink::commit) discards the previous reservation.
    fn reserve(&mut self, size_hint: usize) -> &mut [u8];

    /// Marks the first `written` bytes of the last reserved segment as data.
    fn commit(&mut self, written: usize);

    /// Ends the stream, optionally with the error that aborted it.
    ///
    /// Only the first call has an effect.
    fn complete(&mut self, error: Option<io::Error>);
}

/// Asynchronous side of a [`ByteSink`].
#[async_trait]
pub trait AsyncByteSink: ByteSink + Send {
    /// Pushes committed bytes towards the underlying transport.
    async fn flush(&mut self) -> io::Result<()>;

    /// Ends the stream, giving the sink a chance to drain first.
    async fn complete_async(&mut self, error: Option<io::Error>) -> io::Result<()> {
        self.complete(error);
        Ok(())
    }
}

/// Completion state shared by the sinks of this module.
#[derive(Debug, Default)]
enum Completion {
    #[default]
    Open,
    Done,
    Failed(io::Error),
}

impl Completion {
    #[inline]
    fn is_open(&self) -> bool {
        matches!(self, Completion::Open)
    }

    fn complete(&mut self, error: Option<io::Error>) -> bool {
        if !self.is_open() {
            return false;
        }

        *self = match error {
            Some(e) => Completion::Failed(e),
            None => Completion::Done,
        };
        true
    }

    fn error(&self) -> Option<&io::Error> {
        match self {
            Completion::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Growable byte buffer with at most one outstanding reservation at its tail.
#[derive(Debug, Default)]
struct Segments {
    buf: BytesMut,
    reserved_at: Option<usize>,
}

impl Segments {
    fn with_capacity(capacity: usize) -> Self {
        Self { buf: BytesMut::with_capacity(capacity), reserved_at: None }
    }

    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        let start = self.committed_len();
        self.buf.truncate(start);
        self.buf.resize(start + size_hint, 0);
        self.reserved_at = Some(start);
        &mut self.buf[start..]
    }

    fn commit(&mut self, written: usize) {
        let Some(start) = self.reserved_at.take() else {
            debug_assert!(written == 0, "commit without reservation");
            return;
        };

        debug_assert!(start + written <= self.buf.len(), "commit beyond reservation");
        let end = (start + written).min(self.buf.len());
        self.buf.truncate(end);
    }

    #[inline]
    fn committed_len(&self) -> usize {
        self.reserved_at.unwrap_or(self.buf.len())
    }

    fn committed(&self) -> &[u8] {
        &self.buf[..self.committed_len()]
    }

    fn take_committed(&mut self) -> BytesMut {
        let len = self.committed_len();
        if let Some(start) = self.reserved_at.as_mut() {
            *start -= len;
        }
        self.buf.split_to(len)
    }
}
