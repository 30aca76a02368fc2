use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::Full;
use tracing::trace;

use crate::sink::{AsyncByteSink, ByteSink, Completion, Segments};

/// An in-memory [`ByteSink`].
///
/// Everything committed stays in one contiguous buffer; [`freeze`](BufferSink::freeze) or
/// [`into_body`](BufferSink::into_body) hand it over once writing is done.
#[derive(Debug, Default)]
pub struct BufferSink {
    segments: Segments,
    completion: Completion,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { segments: Segments::with_capacity(capacity), completion: Completion::Open }
    }

    /// The bytes committed so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.segments.committed()
    }

    pub fn is_completed(&self) -> bool {
        !self.completion.is_open()
    }

    /// The error the stream was completed with, if any.
    pub fn error(&self) -> Option<&io::Error> {
        self.completion.error()
    }

    pub fn freeze(mut self) -> Bytes {
        self.segments.take_committed().freeze()
    }

    /// Turns the committed bytes into a complete `http_body::Body`.
    pub fn into_body(self) -> Full<Bytes> {
        Full::new(self.freeze())
    }
}

impl ByteSink for BufferSink {
    fn is_writable(&self) -> bool {
        self.completion.is_open()
    }

    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        self.segments.reserve(size_hint)
    }

    fn commit(&mut self, written: usize) {
        self.segments.commit(written);
    }

    fn complete(&mut self, error: Option<io::Error>) {
        if self.completion.complete(error) {
            trace!(len = self.segments.committed_len(), "buffer sink completed");
        }
    }
}

#[async_trait]
impl AsyncByteSink for BufferSink {
    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_reserve_commit_complete() {
        let mut sink = BufferSink::new();
        assert!(sink.is_writable());

        sink.reserve(5).copy_from_slice(b"hello");
        sink.commit(5);
        sink.complete(None);

        assert!(sink.is_completed());
        assert!(!sink.is_writable());
        assert!(sink.error().is_none());
        assert_eq!(sink.freeze(), Bytes::from_static(b"hello"));
    }

    #[test]
    fn test_first_completion_wins() {
        let mut sink = BufferSink::new();
        sink.complete(Some(io::Error::other("aborted")));
        sink.complete(None);
        assert_eq!(sink.error().map(ToString::to_string), Some("aborted".to_string()));
    }

    #[tokio::test]
    async fn test_into_body_yields_committed_bytes() {
        let mut sink = BufferSink::with_capacity(16);
        sink.reserve(8)[..4].copy_from_slice(b"body");
        sink.commit(4);
        sink.complete_async(None).await.unwrap();

        let bytes = sink.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(bytes, Bytes::from_static(b"body"));
    }
}
