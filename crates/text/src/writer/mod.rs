//! Text writer encoding straight into a byte sink.
//!
//! [`PipeTextWriter`] needs no char buffer of its own: for every write it asks the codec for
//! the worst-case encoded size, reserves a segment of that size in the sink, encodes into it
//! and commits what was actually produced.
//!
//! Encoding never performs I/O. [`flush`](crate::text::TextSink::flush) only pushes out
//! whatever the encoder still holds; getting bytes onto the transport is the sink's business,
//! triggered by [`dispose_async`](PipeTextWriter::dispose_async) or by flushing the sink
//! itself.

mod async_write;

use std::fmt;
use std::io;

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::codec::{Codec, EncodingCodec};
use crate::error::TextError;
use crate::options::WriterOptions;
use crate::sink::ByteSink;
use crate::text::TextSink;
use crate::utils::ensure;

/// A text writer over a [`ByteSink`].
///
/// The writer never emits a byte order mark. It must be disposed: disposing emits the
/// encoder's trailing state and completes the sink exactly once.
///
/// # Example
///
/// ```
/// use micro_text::codec::EncodingCodec;
/// use micro_text::sink::BufferSink;
/// use micro_text::text::TextSink;
/// use micro_text::writer::PipeTextWriter;
///
/// let mut writer = PipeTextWriter::new(BufferSink::new(), EncodingCodec::utf8()).unwrap();
/// writer.write_line("hello").unwrap();
/// writer.dispose();
///
/// assert_eq!(writer.get_ref().as_bytes(), b"hello\n");
/// ```
pub struct PipeTextWriter<K, C = EncodingCodec> {
    sink: K,
    codec: C,
    new_line: String,
    disposed: bool,
    cancellation: Option<CancellationToken>,
}

impl<K, C> PipeTextWriter<K, C>
where
    K: ByteSink,
    C: Codec,
{
    /// Creates a writer ending lines with `"\n"`.
    ///
    /// # Errors
    /// Returns [`TextError::InvalidSink`] when the sink is not writable.
    pub fn new(sink: K, codec: C) -> Result<Self, TextError> {
        Self::with_options(sink, codec, WriterOptions::default())
    }

    /// # Errors
    /// Returns [`TextError::InvalidSink`] when the sink is not writable.
    pub fn with_options(sink: K, codec: C, options: WriterOptions) -> Result<Self, TextError> {
        ensure!(sink.is_writable(), TextError::InvalidSink);
        Ok(Self { sink, codec, new_line: options.new_line, disposed: false, cancellation: None })
    }

    /// Emits the encoder's trailing state and completes the sink.
    ///
    /// Disposing again does nothing. Every later write fails with [`TextError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        let error = self.finish_encoding();
        self.sink.complete(error);
        debug!("pipe text writer disposed");
    }

    /// Flushes the encoder in final mode, turning a failure into the sink's completion error.
    fn finish_encoding(&mut self) -> Option<io::Error> {
        encode_into(&mut self.sink, &mut self.codec, "", true).err().map(|e| {
            warn!(cause = %e, "failed to flush encoder on dispose");
            io::Error::other(e)
        })
    }
}

impl<K, C> PipeTextWriter<K, C> {
    /// Attaches a token that aborts the asynchronous writes of this writer.
    ///
    /// Once the token is cancelled, every asynchronous write fails with
    /// [`TextError::Cancelled`] before anything is encoded.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    #[inline]
    pub fn get_ref(&self) -> &K {
        &self.sink
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn new_line(&self) -> &str {
        &self.new_line
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
}

/// Encodes `text` into one freshly reserved sink segment.
fn encode_into<K, C>(sink: &mut K, codec: &mut C, text: &str, last: bool) -> Result<(), TextError>
where
    K: ByteSink,
    C: Codec,
{
    if text.is_empty() && !last {
        return Ok(());
    }

    let size_hint = codec
        .byte_count_for(text, last)
        .ok_or_else(|| TextError::invalid_argument(format!("{} bytes of text are too large to encode", text.len())))?;

    let segment = sink.reserve(size_hint);
    let written = match codec.encode(text, segment, last) {
        Ok(written) => written,
        Err(e) => {
            sink.commit(0);
            return Err(e);
        }
    };
    sink.commit(written);

    trace!(len = text.len(), size_hint, written, last, "encoded text");
    Ok(())
}

impl<K, C> TextSink for PipeTextWriter<K, C>
where
    K: ByteSink,
    C: Codec,
{
    fn write(&mut self, text: &str) -> Result<(), TextError> {
        self.ensure_active()?;
        encode_into(&mut self.sink, &mut self.codec, text, false)
    }

    fn write_line(&mut self, text: &str) -> Result<(), TextError> {
        self.ensure_active()?;
        encode_into(&mut self.sink, &mut self.codec, text, false)?;
        encode_into(&mut self.sink, &mut self.codec, &self.new_line, false)
    }

    /// Encodes in final mode, so stateful encodings return to their initial state.
    ///
    /// A shift-based encoding such as ISO-2022-JP re-enters its shifted state on the next
    /// write. Decoders may flag the back-to-back escape sequences this produces, so a flush in
    /// the middle of a stream does not always round-trip cleanly.
    fn flush(&mut self) -> Result<(), TextError> {
        self.ensure_active()?;
        encode_into(&mut self.sink, &mut self.codec, "", true)
    }
}

impl<K, C> Drop for PipeTextWriter<K, C> {
    fn drop(&mut self) {
        if !self.disposed {
            warn!("pipe text writer dropped without dispose, trailing encoder state is lost");
        }
    }
}

impl<K, C> fmt::Debug for PipeTextWriter<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipeTextWriter")
            .field("new_line", &self.new_line)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
