//! Character codecs used by the reader and the writer.
//!
//! A [`Codec`] translates between raw body bytes and `char`s for one fixed character
//! encoding. Both halves are stateful: a multi-byte sequence split across two calls is
//! carried over inside the codec, and the `last` flag flushes whatever is still pending.
//!
//! # Components
//!
//! - [`Codec`]: the abstraction consumed by [`StreamTextReader`](crate::reader::StreamTextReader)
//!   and [`PipeTextWriter`](crate::writer::PipeTextWriter)
//! - [`EncodingCodec`]: implementation for every WHATWG encoding, backed by `encoding_rs`
//!
//! Choosing the encoding (content negotiation, charset sniffing) is the caller's job; a codec
//! is handed over already configured.

mod encoding_codec;

pub use encoding_codec::EncodingCodec;

use crate::error::TextError;

/// Stateful decoder/encoder pair for a single character encoding.
///
/// Each reader or writer owns its codec exclusively, so implementations are free to keep
/// partial input between calls.
pub trait Codec {
    /// Decodes `src` into `dst` and returns the number of chars written.
    ///
    /// Bytes that end in the middle of a multi-byte sequence are kept and completed by the
    /// next call. With `last` set, pending bytes are flushed (malformed remainders become
    /// U+FFFD) and the decoder starts over.
    ///
    /// `dst` must hold at least [`max_chars_for(src.len())`](Codec::max_chars_for) chars.
    fn decode(&mut self, src: &[u8], dst: &mut [char], last: bool) -> usize;

    /// Encodes `src` into `dst` and returns the number of bytes written.
    ///
    /// With `last` set, any trailing state (for example the return to ASCII of a
    /// shift-based encoding) is emitted and the encoder starts over. A byte order mark is
    /// never written.
    ///
    /// `dst` must hold at least [`byte_count_for(src, last)`](Codec::byte_count_for) bytes.
    ///
    /// # Errors
    /// Returns [`TextError::InvalidArgument`] when `dst` can't take the whole of `src`. No
    /// part of `src` is dropped silently.
    fn encode(&mut self, src: &str, dst: &mut [u8], last: bool) -> Result<usize, TextError>;

    /// Upper bound of chars that decoding `byte_count` bytes can produce.
    ///
    /// Returns `None` if the bound overflows `usize`.
    fn max_chars_for(&self, byte_count: usize) -> Option<usize>;

    /// Upper bound of bytes that encoding `src` can produce, numeric character references
    /// for unmappable chars included.
    ///
    /// Returns `None` if the bound overflows `usize`.
    fn byte_count_for(&self, src: &str, last: bool) -> Option<usize>;
}
