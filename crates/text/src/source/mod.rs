//! Byte sources consumed by [`StreamTextReader`](crate::reader::StreamTextReader).
//!
//! A source hands out raw body bytes. The contract mirrors a network stream:
//!
//! - returning fewer bytes than requested means nothing more is readily available right now,
//!   not that the body ended
//! - returning `0` means the body is finished
//!
//! The reader uses the first rule to stop early instead of waiting on a slow peer.
//!
//! # Components
//!
//! - [`ByteSource`] / [`AsyncByteSource`]: blocking and suspending read capabilities
//! - [`ReadSource`]: adapts any [`std::io::Read`]
//! - [`AsyncReadSource`]: adapts any [`tokio::io::AsyncRead`]
//! - [`BodySource`]: adapts an [`http_body::Body`], such as a server request body

mod body_source;

pub use body_source::BodySource;

use std::io;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Whether a source can be read at all; checked once when a reader is constructed.
pub trait Readable {
    fn is_readable(&self) -> bool {
        true
    }
}

/// Blocking byte source.
pub trait ByteSource: Readable {
    /// Reads up to `buf.len()` bytes, returning `0` only at the end of the body.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Suspending byte source.
#[async_trait]
pub trait AsyncByteSource: Readable + Send {
    /// Reads up to `buf.len()` bytes, returning `0` only at the end of the body.
    async fn read_async(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl Readable for &[u8] {}

impl ByteSource for &[u8] {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

#[async_trait]
impl<'a> AsyncByteSource for &'a [u8] {
    async fn read_async(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::Read::read(self, buf)
    }
}

/// Adapts a [`std::io::Read`] into a [`ByteSource`].
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> Readable for ReadSource<R> {}

impl<R: io::Read> ByteSource for ReadSource<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Adapts a [`tokio::io::AsyncRead`] into an [`AsyncByteSource`].
#[derive(Debug)]
pub struct AsyncReadSource<R> {
    inner: R,
}

impl<R> AsyncReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead + Unpin + Send> Readable for AsyncReadSource<R> {}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> AsyncByteSource for AsyncReadSource<R> {
    #[inline]
    async fn read_async(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_reads_then_ends() {
        let mut source: &[u8] = b"hello";
        let mut buf = [0; 3];

        assert_eq!(ByteSource::read(&mut source, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        assert_eq!(ByteSource::read(&mut source, &mut buf).unwrap(), 2);
        assert_eq!(ByteSource::read(&mut source, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_source_delegates() {
        let mut source = ReadSource::new(io::Cursor::new(b"abc".to_vec()));
        let mut buf = [0; 8];
        assert!(source.is_readable());
        assert_eq!(source.read(&mut buf).unwrap(), 3);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_async_read_source_delegates() {
        let (mut client, server) = tokio::io::duplex(64);
        let mut source = AsyncReadSource::new(server);

        tokio::io::AsyncWriteExt::write_all(&mut client, b"ping").await.unwrap();
        drop(client);

        let mut buf = [0; 16];
        assert_eq!(source.read_async(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf[..4], b"ping");
        assert_eq!(source.read_async(&mut buf).await.unwrap(), 0);
    }
}
