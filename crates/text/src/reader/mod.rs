//! Buffered text reader over a byte source.
//!
//! [`StreamTextReader`] pulls raw bytes from a source into a fixed byte buffer, decodes them
//! with its [`Codec`] into a char buffer, and serves chars, char slices and lines out of that
//! char buffer.
//!
//! # Refill
//!
//! A refill reads at most one byte buffer worth of bytes. It only reads again when the bytes
//! decoded to nothing (half a multi-byte sequence), so once a single char is available the
//! refill returns. A read returning fewer bytes than requested marks the source as blocked;
//! [`read_into`](crate::text::TextSource::read_into) then returns what it has rather than
//! waiting for more.
//!
//! At the end of the source the decoder is flushed, so a truncated sequence still shows up as
//! U+FFFD.
//!
//! # Blocking and async
//!
//! The reader implements [`TextSource`](crate::text::TextSource) when the source is a
//! [`ByteSource`](crate::source::ByteSource) and
//! [`AsyncTextSource`](crate::text::AsyncTextSource) when it is an
//! [`AsyncByteSource`](crate::source::AsyncByteSource). Both only differ in how the source is
//! read; the buffers are manipulated by the same code, never across an await point.

mod async_read;
mod sync_read;

use std::fmt;
use std::mem;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::codec::{Codec, EncodingCodec};
use crate::error::TextError;
use crate::options::ReaderOptions;
use crate::pool::{BufferPool, HeapPool};
use crate::source::Readable;
use crate::utils::ensure;

/// A buffered, line-aware text reader.
///
/// # Example
///
/// ```
/// use micro_text::codec::EncodingCodec;
/// use micro_text::reader::StreamTextReader;
/// use micro_text::text::TextSource;
///
/// let body: &[u8] = b"first\r\nsecond\n";
/// let mut reader = StreamTextReader::new(body, EncodingCodec::utf8()).unwrap();
///
/// assert_eq!(reader.read_line().unwrap().as_deref(), Some("first"));
/// assert_eq!(reader.read_line().unwrap().as_deref(), Some("second"));
/// assert_eq!(reader.read_line().unwrap(), None);
/// ```
pub struct StreamTextReader<S, C = EncodingCodec> {
    source: S,
    codec: C,

    bytes: Vec<u8>,
    chars: Vec<char>,
    byte_capacity: usize,

    /// next unread char
    char_index: usize,
    /// valid chars in `chars`
    chars_read: usize,
    /// the last source read returned fewer bytes than requested
    is_blocked: bool,
    disposed: bool,

    /// chars of the line being read, kept here so an interrupted `read_line` loses nothing
    partial_line: Option<String>,
    /// `partial_line` is complete, it ended in a `\r` that may be followed by a `\n`
    line_feed_pending: bool,

    byte_pool: Arc<dyn BufferPool<u8>>,
    char_pool: Arc<dyn BufferPool<char>>,
    cancellation: Option<CancellationToken>,
}

impl<S, C> StreamTextReader<S, C>
where
    S: Readable,
    C: Codec,
{
    /// Creates a reader with the default options and heap-allocated buffers.
    ///
    /// # Errors
    /// Returns [`TextError::InvalidSource`] when the source is not readable.
    pub fn new(source: S, codec: C) -> Result<Self, TextError> {
        Self::with_options(source, codec, ReaderOptions::default())
    }

    /// Creates a reader with heap-allocated buffers.
    ///
    /// # Errors
    /// Returns [`TextError::InvalidSource`] when the source is not readable and
    /// [`TextError::InvalidArgument`] when the buffer size is zero.
    pub fn with_options(source: S, codec: C, options: ReaderOptions) -> Result<Self, TextError> {
        Self::with_pools(source, codec, options, Arc::new(HeapPool), Arc::new(HeapPool))
    }

    /// Creates a reader whose buffers come from the given pools.
    ///
    /// The byte buffer is acquired first. If the char buffer can't be acquired, the byte buffer
    /// goes back to its pool before the error is returned.
    ///
    /// # Errors
    /// Besides the errors of [`with_options`](StreamTextReader::with_options), any error a pool
    /// returns from `acquire`.
    pub fn with_pools(
        source: S,
        codec: C,
        options: ReaderOptions,
        byte_pool: Arc<dyn BufferPool<u8>>,
        char_pool: Arc<dyn BufferPool<char>>,
    ) -> Result<Self, TextError> {
        ensure!(source.is_readable(), TextError::InvalidSource);
        ensure!(options.buffer_size > 0, TextError::invalid_argument("buffer size must be positive"));

        let byte_capacity = options.buffer_size;
        let char_capacity = codec
            .max_chars_for(byte_capacity)
            .ok_or_else(|| TextError::invalid_argument(format!("buffer size {byte_capacity} is too large")))?;

        let bytes = byte_pool.acquire(byte_capacity)?;
        let chars = match char_pool.acquire(char_capacity) {
            Ok(chars) => chars,
            Err(e) => {
                byte_pool.release(bytes);
                return Err(e);
            }
        };
        if bytes.len() < byte_capacity || chars.len() < char_capacity {
            let reason = format!(
                "pool returned {} bytes and {} chars, {byte_capacity} and {char_capacity} were requested",
                bytes.len(),
                chars.len()
            );
            byte_pool.release(bytes);
            char_pool.release(chars);
            return Err(TextError::invalid_argument(reason));
        }

        Ok(Self {
            source,
            codec,
            bytes,
            chars,
            byte_capacity,
            char_index: 0,
            chars_read: 0,
            is_blocked: false,
            disposed: false,
            partial_line: None,
            line_feed_pending: false,
            byte_pool,
            char_pool,
            cancellation: None,
        })
    }
}

impl<S, C> StreamTextReader<S, C> {
    /// Attaches a token that aborts the asynchronous operations of this reader.
    ///
    /// Once the token is cancelled, every asynchronous call fails with
    /// [`TextError::Cancelled`] before touching the source or the buffers.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns the buffers to their pools. Every later operation fails with
    /// [`TextError::Disposed`]; disposing again does nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.release_buffers();
        debug!("stream text reader disposed");
    }

    fn release_buffers(&mut self) {
        self.disposed = true;
        self.char_index = 0;
        self.chars_read = 0;
        self.byte_pool.release(mem::take(&mut self.bytes));
        self.char_pool.release(mem::take(&mut self.chars));
    }

    #[inline]
    fn ensure_active(&self) -> Result<(), TextError> {
        ensure!(!self.disposed, TextError::Disposed);
        Ok(())
    }

    #[inline]
    fn ensure_not_cancelled(&self) -> Result<(), TextError> {
        if let Some(token) = &self.cancellation {
            ensure!(!token.is_cancelled(), TextError::Cancelled);
        }
        Ok(())
    }

    #[inline]
    fn is_exhausted(&self) -> bool {
        self.char_index == self.chars_read
    }

    fn copy_to(&mut self, dst: &mut [char]) -> usize {
        let len = (self.chars_read - self.char_index).min(dst.len());
        dst[..len].copy_from_slice(&self.chars[self.char_index..self.char_index + len]);
        self.char_index += len;
        len
    }

    /// Consumes the next char if it is a `\n`; called right after a refill that followed a `\r`.
    fn skip_line_feed(&mut self) {
        if !self.is_exhausted() && self.chars[self.char_index] == '\n' {
            self.char_index += 1;
        }
    }

    /// Looks for the first `\r` or `\n` among the buffered chars and returns the finished line.
    ///
    /// A line found on the first pass (no partial line yet) is collected straight from the
    /// buffer; otherwise the chars are appended to the partial line. Returns `None` when the
    /// buffer must be refilled first, including for a `\r` that is the last buffered char.
    fn scan_line(&mut self) -> Option<String> {
        if self.line_feed_pending {
            self.line_feed_pending = false;
            self.skip_line_feed();
            return Some(self.partial_line.take().unwrap_or_default());
        }

        let available = &self.chars[self.char_index..self.chars_read];

        let Some(pos) = available.iter().position(|&ch| ch == '\r' || ch == '\n') else {
            self.partial_line.get_or_insert_with(|| String::with_capacity(available.len())).extend(available);
            self.char_index = self.chars_read;
            return None;
        };

        let terminator = available[pos];
        let line = match self.partial_line.take() {
            Some(mut line) => {
                line.extend(&available[..pos]);
                line
            }
            None => available[..pos].iter().collect(),
        };
        self.char_index += pos + 1;

        if terminator == '\r' {
            if self.is_exhausted() {
                self.partial_line = Some(line);
                self.line_feed_pending = true;
                return None;
            }
            self.skip_line_feed();
        }
        Some(line)
    }

    /// Hands out whatever line is left once the source has ended.
    fn finish_line(&mut self) -> Option<String> {
        self.line_feed_pending = false;
        self.partial_line.take()
    }
}

impl<S, C: Codec> StreamTextReader<S, C> {
    /// Clears the char buffer ahead of a refill.
    fn begin_refill(&mut self) {
        self.char_index = 0;
        self.chars_read = 0;
    }

    /// Decodes the `read` bytes just read from the source.
    ///
    /// Returns `true` once the refill is done: either chars were produced or the source ended.
    fn decode_read(&mut self, read: usize) -> bool {
        if read == 0 {
            let flushed = self.codec.decode(&[], &mut self.chars[self.chars_read..], true);
            self.chars_read += flushed;
            trace!(chars = self.chars_read, "byte source reached the end");
            return true;
        }

        self.is_blocked = read < self.byte_capacity;
        let decoded = self.codec.decode(&self.bytes[..read], &mut self.chars[self.chars_read..], false);
        self.chars_read += decoded;
        trace!(bytes = read, chars = self.chars_read, blocked = self.is_blocked, "refilled char buffer");
        self.chars_read > 0
    }
}

/// Returns `buf[index..index + count]`, rejecting ranges that don't fit.
fn checked_range(buf: &mut [char], index: usize, count: usize) -> Result<&mut [char], TextError> {
    ensure!(index <= buf.len(), TextError::invalid_argument(format!("index {index} exceeds buffer length {}", buf.len())));
    ensure!(
        count <= buf.len() - index,
        TextError::invalid_argument(format!("count {count} exceeds the {} chars after index {index}", buf.len() - index))
    );
    Ok(&mut buf[index..index + count])
}

impl<S, C> Drop for StreamTextReader<S, C> {
    fn drop(&mut self) {
        if !self.disposed {
            self.release_buffers();
        }
    }
}

impl<S, C> fmt::Debug for StreamTextReader<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamTextReader")
            .field("byte_capacity", &self.byte_capacity)
            .field("buffered", &(self.chars_read - self.char_index))
            .field("is_blocked", &self.is_blocked)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
