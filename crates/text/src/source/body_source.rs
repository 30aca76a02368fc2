use std::error::Error;
use std::io;

use async_trait::async_trait;
use bytes::{Buf, Bytes};
use http_body::Body;
use http_body_util::BodyExt;
use tracing::{error, trace};

use crate::source::{AsyncByteSource, Readable};

/// An [`AsyncByteSource`] reading the data frames of an [`http_body::Body`].
///
/// Each data frame is handed out as-is, so a frame smaller than the reader's buffer shows up
/// as a short read and the reader returns what it has instead of waiting for the next frame.
/// Trailer frames are skipped.
#[derive(Debug)]
pub struct BodySource<B> {
    body: B,
    pending: Bytes,
    eof: bool,
}

impl<B> BodySource<B> {
    pub fn new(body: B) -> Self {
        Self { body, pending: Bytes::new(), eof: false }
    }

    pub fn into_inner(self) -> B {
        self.body
    }
}

impl<B: Body> Readable for BodySource<B> {}

#[async_trait]
impl<B> AsyncByteSource for BodySource<B>
where
    B: Body + Unpin + Send,
    B::Data: Send,
    B::Error: Into<Box<dyn Error + Send + Sync>> + Send,
{
    async fn read_async(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if !self.pending.is_empty() {
                let len = self.pending.len().min(buf.len());
                buf[..len].copy_from_slice(&self.pending[..len]);
                self.pending.advance(len);
                return Ok(len);
            }

            if self.eof || buf.is_empty() {
                return Ok(0);
            }

            let frame = self.body.frame().await;
            match frame {
                Some(Ok(frame)) => match frame.into_data() {
                    Ok(mut data) => {
                        trace!(len = data.remaining(), "receive body data frame");
                        self.pending = data.copy_to_bytes(data.remaining());
                    }
                    Err(_trailers) => {
                        trace!("skip body trailers");
                    }
                },
                Some(Err(e)) => {
                    let e: Box<dyn Error + Send + Sync> = e.into();
                    error!(cause = %e, "failed to read body frame");
                    return Err(io::Error::other(e));
                }
                None => {
                    self.eof = true;
                    return Ok(0);
                }
            }
        }
    }
}
