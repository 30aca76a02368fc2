//! [`Codec`] implementation backed by `encoding_rs`.

use std::fmt;

use encoding_rs::{CoderResult, Decoder, Encoder, Encoding, UTF_8, UTF_16BE, UTF_16LE};
use tracing::trace;

use crate::codec::Codec;
use crate::error::TextError;

/// Bytes a decoder may still hold from the previous call, on top of the new input.
const CARRY_OVER_BYTES: usize = 4;

/// Longest numeric character reference (`&#1114111;`) plus the escape back to ASCII a
/// stateful encoder emits before it.
const REFERENCE_MAX_BYTES: usize = 13;

/// A [`Codec`] for any encoding known to `encoding_rs`.
///
/// The decoder does no BOM handling: a leading byte order mark is decoded like any other
/// character, so `decode(encode(text)) == text` holds for every input. The encoder never
/// writes a BOM.
///
/// `encoding_rs` only encodes to ASCII-compatible encodings; UTF-16LE and UTF-16BE are
/// therefore encoded natively here instead of silently falling back to UTF-8.
pub struct EncodingCodec {
    encoding: &'static Encoding,
    decoder: Decoder,
    encoder: TextEncoder,
    /// reused output of the utf-8 decoder before it is split into chars
    scratch: String,
}

enum TextEncoder {
    Whatwg(Encoder),
    Utf16 { big_endian: bool },
}

impl TextEncoder {
    fn new(encoding: &'static Encoding) -> Self {
        if encoding == UTF_16LE {
            Self::Utf16 { big_endian: false }
        } else if encoding == UTF_16BE {
            Self::Utf16 { big_endian: true }
        } else {
            Self::Whatwg(encoding.new_encoder())
        }
    }
}

impl EncodingCodec {
    /// Creates a codec for `encoding`.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            decoder: encoding.new_decoder_without_bom_handling(),
            encoder: TextEncoder::new(encoding),
            scratch: String::new(),
        }
    }

    /// Creates a UTF-8 codec.
    pub fn utf8() -> Self {
        Self::new(UTF_8)
    }

    /// Creates a codec from a WHATWG encoding label such as `"utf-8"` or `"latin1"`.
    ///
    /// # Errors
    /// Returns [`TextError::InvalidArgument`] when the label is unknown.
    pub fn for_label(label: &str) -> Result<Self, TextError> {
        Encoding::for_label(label.as_bytes())
            .map(Self::new)
            .ok_or_else(|| TextError::invalid_argument(format!("unknown encoding label: {label}")))
    }

    /// The encoding this codec translates.
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }
}

impl Default for EncodingCodec {
    fn default() -> Self {
        Self::utf8()
    }
}

impl fmt::Debug for EncodingCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodingCodec").field("encoding", &self.encoding.name()).finish_non_exhaustive()
    }
}

impl Codec for EncodingCodec {
    fn decode(&mut self, src: &[u8], dst: &mut [char], last: bool) -> usize {
        self.scratch.clear();
        if let Some(needed) = self.decoder.max_utf8_buffer_length(src.len()) {
            self.scratch.reserve(needed);
        }

        let (_result, read, replaced) = self.decoder.decode_to_string(src, &mut self.scratch, last);
        if replaced {
            trace!(encoding = self.encoding.name(), "malformed input replaced with U+FFFD");
        }
        debug_assert_eq!(read, src.len(), "decoder must consume the whole input");

        let mut written = 0;
        for (slot, ch) in dst.iter_mut().zip(self.scratch.chars()) {
            *slot = ch;
            written += 1;
        }

        if last {
            self.decoder = self.encoding.new_decoder_without_bom_handling();
        }
        written
    }

    fn encode(&mut self, src: &str, dst: &mut [u8], last: bool) -> Result<usize, TextError> {
        let capacity = dst.len();
        let written = match &mut self.encoder {
            TextEncoder::Whatwg(encoder) => {
                let (result, _read, written, unmappable) = encoder.encode_from_utf8(src, dst, last);
                if unmappable {
                    trace!(encoding = self.encoding.name(), "unmappable chars written as numeric character references");
                }
                if matches!(result, CoderResult::OutputFull) {
                    return Err(output_too_small(capacity, src.len()));
                }
                written
            }
            TextEncoder::Utf16 { big_endian } => {
                let mut written = 0;
                for unit in src.encode_utf16() {
                    let slot = dst.get_mut(written..written + 2).ok_or_else(|| output_too_small(capacity, src.len()))?;
                    let bytes = if *big_endian { unit.to_be_bytes() } else { unit.to_le_bytes() };
                    slot.copy_from_slice(&bytes);
                    written += 2;
                }
                written
            }
        };

        if last {
            self.encoder = TextEncoder::new(self.encoding);
        }
        Ok(written)
    }

    fn max_chars_for(&self, byte_count: usize) -> Option<usize> {
        self.decoder.max_utf16_buffer_length(byte_count.checked_add(CARRY_OVER_BYTES)?)
    }

    fn byte_count_for(&self, src: &str, _last: bool) -> Option<usize> {
        match &self.encoder {
            TextEncoder::Whatwg(encoder) => {
                let mappable = encoder.max_buffer_length_from_utf8_if_no_unmappables(src.len())?;
                if encoder.encoding().can_encode_everything() {
                    return Some(mappable);
                }
                // any non-ascii char may turn into a numeric character reference
                let references = src.chars().filter(|c| !c.is_ascii()).count();
                references.checked_mul(REFERENCE_MAX_BYTES)?.checked_add(mappable)
            }
            TextEncoder::Utf16 { .. } => src.len().checked_mul(2),
        }
    }
}

fn output_too_small(capacity: usize, len: usize) -> TextError {
    TextError::invalid_argument(format!("output of {capacity} bytes is too small for {len} bytes of text"))
}
