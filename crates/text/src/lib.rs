//! Buffered streaming text reader and writer for HTTP bodies
//!
//! This crate converts between raw body bytes and text without ever holding a whole body in
//! memory. The reading side decodes into a fixed char buffer and splits lines correctly across
//! buffer boundaries; the writing side encodes straight into the segments of a byte sink.
//!
//! # Features
//!
//! - Every WHATWG encoding through `encoding_rs`, plus native UTF-16 output
//! - `\r`, `\n` and `\r\n` line terminators, including a `\r\n` split by a refill
//! - Short reads from streaming sources are returned instead of waited on
//! - Blocking and async APIs with identical output
//! - Pooled buffers, released exactly once
//! - Request-abort cancellation for the async APIs
//!
//! # Example
//!
//! ```
//! use micro_text::codec::EncodingCodec;
//! use micro_text::reader::StreamTextReader;
//! use micro_text::sink::BufferSink;
//! use micro_text::text::{AsyncTextSink, AsyncTextSource};
//! use micro_text::writer::PipeTextWriter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut writer = PipeTextWriter::new(BufferSink::new(), EncodingCodec::for_label("shift_jis").unwrap()).unwrap();
//! writer.write_line_async("こんにちは").await.unwrap();
//! writer.write_line_async("world").await.unwrap();
//! writer.dispose_async().await.unwrap();
//!
//! let body = std::mem::take(writer.get_mut()).freeze();
//! let mut reader = StreamTextReader::new(body.as_ref(), EncodingCodec::for_label("shift_jis").unwrap()).unwrap();
//! assert_eq!(reader.read_line_async().await.unwrap().as_deref(), Some("こんにちは"));
//! assert_eq!(reader.read_line_async().await.unwrap().as_deref(), Some("world"));
//! assert_eq!(reader.read_line_async().await.unwrap(), None);
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: the [`Codec`](codec::Codec) abstraction and its `encoding_rs` implementation
//! - [`source`]: byte sources the reader pulls from
//! - [`sink`]: byte sinks the writer pushes into
//! - [`reader`]: [`StreamTextReader`](reader::StreamTextReader)
//! - [`writer`]: [`PipeTextWriter`](writer::PipeTextWriter)
//! - [`text`]: the char-level capability traits both implement
//! - [`pool`]: buffer pools backing the reader
//! - [`options`]: serde-loadable configuration
//!
//! # Error Handling
//!
//! Every fallible operation returns [`error::TextError`]. Misuse (a disposed instance, a bad
//! range, an unreadable source) is reported as its own variant; I/O failures of the
//! underlying source or sink are wrapped in [`TextError::Io`](error::TextError::Io).
//!
//! # Limitations
//!
//! - Picking the encoding is left to the caller
//! - One instance serves one caller at a time; there is no internal locking

pub mod codec;
pub mod error;
pub mod options;
pub mod pool;
pub mod reader;
pub mod sink;
pub mod source;
pub mod text;
pub mod writer;

mod utils;

pub use codec::{Codec, EncodingCodec};
pub use error::TextError;
pub use reader::StreamTextReader;
pub use text::{AsyncTextSink, AsyncTextSource, TextSink, TextSource};
pub use writer::PipeTextWriter;
