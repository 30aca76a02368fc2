use std::io;

use async_trait::async_trait;
use tracing::trace;

use crate::sink::{AsyncByteSink, ByteSink};

/// Wraps a sink so that flushes only reach it once enough bytes are pending.
///
/// Many tiny flushes would otherwise each turn into their own transport chunk. Completion is
/// always forwarded, which drains whatever is still pending.
#[derive(Debug)]
pub struct MinimumChunkingSink<S> {
    inner: S,
    unflushed: usize,
}

impl<S> MinimumChunkingSink<S> {
    /// Pending byte count a flush must exceed before it is forwarded.
    pub const FLUSH_THRESHOLD: usize = 4089;

    pub fn new(inner: S) -> Self {
        Self { inner, unflushed: 0 }
    }

    #[inline]
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    /// Bytes committed since the last forwarded flush.
    pub fn unflushed(&self) -> usize {
        self.unflushed
    }
}

impl<S: ByteSink> ByteSink for MinimumChunkingSink<S> {
    fn is_writable(&self) -> bool {
        self.inner.is_writable()
    }

    fn reserve(&mut self, size_hint: usize) -> &mut [u8] {
        self.inner.reserve(size_hint)
    }

    fn commit(&mut self, written: usize) {
        self.unflushed += written;
        self.inner.commit(written);
    }

    fn complete(&mut self, error: Option<io::Error>) {
        self.inner.complete(error);
    }
}

#[async_trait]
impl<S: AsyncByteSink> AsyncByteSink for MinimumChunkingSink<S> {
    async fn flush(&mut self) -> io::Result<()> {
        if self.unflushed <= Self::FLUSH_THRESHOLD {
            trace!(unflushed = self.unflushed, "hold back flush below threshold");
            return Ok(());
        }

        self.unflushed = 0;
        self.inner.flush().await
    }

    async fn complete_async(&mut self, error: Option<io::Error>) -> io::Result<()> {
        self.unflushed = 0;
        self.inner.complete_async(error).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::IoSink;

    fn commit(sink: &mut impl ByteSink, len: usize) {
        sink.reserve(len).fill(b'x');
        sink.commit(len);
    }

    #[tokio::test]
    async fn test_small_flushes_are_held_back() {
        let mut sink = MinimumChunkingSink::new(IoSink::new(Vec::new()));

        commit(&mut sink, 10);
        sink.flush().await.unwrap();
        assert!(sink.get_ref().get_ref().is_empty());
        assert_eq!(sink.unflushed(), 10);

        commit(&mut sink, MinimumChunkingSink::<()>::FLUSH_THRESHOLD);
        sink.flush().await.unwrap();
        assert_eq!(sink.get_ref().get_ref().len(), 10 + MinimumChunkingSink::<()>::FLUSH_THRESHOLD);
        assert_eq!(sink.unflushed(), 0);
    }

    #[tokio::test]
    async fn test_completion_drains_pending_bytes() {
        let mut sink = MinimumChunkingSink::new(IoSink::new(Vec::new()));
        commit(&mut sink, 3);

        sink.complete_async(None).await.unwrap();
        assert!(!sink.is_writable());
        assert_eq!(sink.into_inner().into_inner().len(), 3);
    }
}
