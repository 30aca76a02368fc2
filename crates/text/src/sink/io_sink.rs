use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, trace};

use crate::sink::{AsyncByteSink, ByteSink, Completion, Segments};

/// A [`ByteSink`] in front of an [`AsyncWrite`].
///
/// Committed bytes are buffered until [`flush`](AsyncByteSink::flush), which writes them out
/// and flushes the writer. [`complete_async`](AsyncByteSink::complete_async) drains the buffer
/// and shuts the writer down. The synchronous [`complete`](ByteSink::complete) can't do I/O:
/// it only ends the stream, and whatever is still buffered goes out on the next `flush`.
#[derive(Debug)]
pub struct IoSink<W> {
    writer: W,
    segments: Segments,
    completion: Completion,
}

impl<W> IoSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self::with_capacity(writer, 8 * 1024)
    }

    pub fn with_capacity(writer: W, buffer_size: usize) -> Self {
        Self { writer, segments: Segments::with_capacity(buffer_size), completion: Completion::Open }
    }

    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    #[inline]
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Bytes committed but not yet written out.
    pub fn buffered(&self) -> usize {
        self.segments.committed_len()
    }
}

impl<W> ByteSink for IoSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
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
            debug!(buffered = self.buffered(), "io sink completed");
        }
    }
}

#[async_trait]
impl<W> AsyncByteSink for IoSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn flush(&mut self) -> io::Result<()> {
        if self.buffered() > 0 {
            let bytes = self.segments.take_committed();
            trace!(len = bytes.len(), "write buffered bytes");
            self.writer.write_all(&bytes).await?;
        }
        self.writer.flush().await
    }

    async fn complete_async(&mut self, error: Option<io::Error>) -> io::Result<()> {
        if !self.completion.is_open() {
            return Ok(());
        }
        if error.is_some() {
            self.complete(error);
            return Ok(());
        }

        let drained = match AsyncByteSink::flush(self).await {
            Ok(()) => self.writer.shutdown().await,
            Err(e) => Err(e),
        };
        match drained {
            Ok(()) => {
                self.complete(None);
                Ok(())
            }
            Err(e) => {
                error!(cause = %e, "failed to drain io sink");
                self.complete(Some(io::Error::new(e.kind(), e.to_string())));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flush_writes_committed_bytes() {
        let mut sink = IoSink::new(Vec::new());
        sink.reserve(16)[..5].copy_from_slice(b"hello");
        sink.commit(5);

        assert!(sink.get_ref().is_empty());
        assert_eq!(sink.buffered(), 5);

        AsyncByteSink::flush(&mut sink).await.unwrap();
        assert_eq!(sink.get_ref().as_slice(), b"hello");
        assert_eq!(sink.buffered(), 0);
    }

    #[tokio::test]
    async fn test_complete_async_drains_and_shuts_down() {
        let (writer, mut reader) = tokio::io::duplex(64);
        let mut sink = IoSink::with_capacity(writer, 64);
        sink.reserve(3).copy_from_slice(b"end");
        sink.commit(3);

        sink.complete_async(None).await.unwrap();
        assert!(!sink.is_writable());
        // a second completion is a no-op
        sink.complete_async(None).await.unwrap();

        let mut received = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut received).await.unwrap();
        assert_eq!(received, b"end");
    }

    #[tokio::test]
    async fn test_failed_drain_completes_with_error() {
        let (writer, reader) = tokio::io::duplex(8);
        drop(reader);

        let mut sink = IoSink::new(writer);
        sink.reserve(4).copy_from_slice(b"lost");
        sink.commit(4);

        sink.complete_async(None).await.unwrap_err();
        assert!(!sink.is_writable());
        assert_eq!(sink.completion.error().map(io::Error::kind), Some(io::ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn test_sync_complete_keeps_buffer_for_next_flush() {
        let mut sink = IoSink::new(Vec::new());
        sink.reserve(2).copy_from_slice(b"ok");
        sink.commit(2);
        sink.complete(None);

        assert!(!sink.is_writable());
        AsyncByteSink::flush(&mut sink).await.unwrap();
        assert_eq!(sink.into_inner(), b"ok");
    }
}
