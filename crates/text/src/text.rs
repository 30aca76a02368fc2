//! Character-level capabilities implemented by the reader and the writer.
//!
//! [`TextSource`] and [`TextSink`] block on the underlying byte I/O, [`AsyncTextSource`] and
//! [`AsyncTextSink`] suspend instead. Both flavours of one implementation share their decoding
//! and encoding logic, so they produce identical results for identical input.

use std::fmt;

use async_trait::async_trait;

use crate::error::TextError;

/// Chunk size used by the provided `read_to_string` methods.
const READ_TO_STRING_CHUNK: usize = 256;

/// Blocking character reader.
pub trait TextSource {
    /// Returns the next char without consuming it, or `None` at the end of the stream.
    fn peek(&mut self) -> Result<Option<char>, TextError>;

    /// Consumes and returns the next char, or `None` at the end of the stream.
    fn read(&mut self) -> Result<Option<char>, TextError>;

    /// Reads chars into `buf` and returns how many were written.
    ///
    /// Returns fewer chars than requested when the source delivered a short read, and `0`
    /// only at the end of the stream (or for an empty `buf`).
    fn read_into(&mut self, buf: &mut [char]) -> Result<usize, TextError>;

    /// Like [`read_into`](TextSource::read_into) on `buf[index..index + count]`.
    ///
    /// # Errors
    /// Returns [`TextError::InvalidArgument`] when the range does not fit in `buf`.
    fn read_range(&mut self, buf: &mut [char], index: usize, count: usize) -> Result<usize, TextError>;

    /// Reads one line without its terminator, or `None` when nothing is left.
    ///
    /// `\r\n`, `\r` and `\n` all end a line.
    fn read_line(&mut self) -> Result<Option<String>, TextError>;

    /// Reads everything up to the end of the stream.
    fn read_to_string(&mut self) -> Result<String, TextError> {
        let mut text = String::new();
        let mut chunk = ['\0'; READ_TO_STRING_CHUNK];
        loop {
            let read = self.read_into(&mut chunk)?;
            if read == 0 {
                return Ok(text);
            }
            text.extend(&chunk[..read]);
        }
    }
}

/// Suspending character reader, the asynchronous twin of [`TextSource`].
#[async_trait]
pub trait AsyncTextSource: Send {
    async fn peek_async(&mut self) -> Result<Option<char>, TextError>;

    async fn read_async(&mut self) -> Result<Option<char>, TextError>;

    async fn read_into_async(&mut self, buf: &mut [char]) -> Result<usize, TextError>;

    async fn read_range_async(&mut self, buf: &mut [char], index: usize, count: usize) -> Result<usize, TextError>;

    /// Async form of [`TextSource::read_line`].
    ///
    /// # Cancel safety
    /// Dropping the future while it waits on the source loses nothing: the chars already taken
    /// from the buffer stay with the reader and start the line returned by the next call.
    async fn read_line_async(&mut self) -> Result<Option<String>, TextError>;

    async fn read_to_string_async(&mut self) -> Result<String, TextError> {
        let mut text = String::new();
        let mut chunk = ['\0'; READ_TO_STRING_CHUNK];
        loop {
            let read = self.read_into_async(&mut chunk).await?;
            if read == 0 {
                return Ok(text);
            }
            text.extend(&chunk[..read]);
        }
    }
}

/// Blocking character writer.
pub trait TextSink {
    fn write(&mut self, text: &str) -> Result<(), TextError>;

    fn write_char(&mut self, ch: char) -> Result<(), TextError> {
        self.write(ch.encode_utf8(&mut [0; 4]))
    }

    /// Writes `text` followed by the configured line ending.
    fn write_line(&mut self, text: &str) -> Result<(), TextError>;

    /// Emits whatever the encoder still holds.
    fn flush(&mut self) -> Result<(), TextError>;

    /// Lets `write!` and `writeln!` target the sink.
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), TextError> {
        match args.as_str() {
            Some(text) => self.write(text),
            None => self.write(&args.to_string()),
        }
    }
}

/// Suspending character writer, the asynchronous twin of [`TextSink`].
#[async_trait]
pub trait AsyncTextSink: Send {
    async fn write_async(&mut self, text: &str) -> Result<(), TextError>;

    async fn write_line_async(&mut self, text: &str) -> Result<(), TextError>;

    async fn flush_async(&mut self) -> Result<(), TextError>;
}
