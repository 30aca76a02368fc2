use async_trait::async_trait;

use crate::codec::Codec;
use crate::error::TextError;
use crate::reader::{StreamTextReader, checked_range};
use crate::source::AsyncByteSource;
use crate::text::AsyncTextSource;

impl<S, C> StreamTextReader<S, C>
where
    S: AsyncByteSource,
    C: Codec + Send,
{
    /// Refills the char buffer; the only place the async reader suspends.
    async fn fill_buffer_async(&mut self) -> Result<usize, TextError> {
        self.begin_refill();
        loop {
            let read = self.source.read_async(&mut self.bytes[..self.byte_capacity]).await?;
            if self.decode_read(read) {
                return Ok(self.chars_read);
            }
        }
    }

    #[inline]
    fn ensure_ready(&self) -> Result<(), TextError> {
        self.ensure_active()?;
        self.ensure_not_cancelled()
    }

    async fn read_into_checked(&mut self, buf: &mut [char]) -> Result<usize, TextError> {
        let mut copied = 0;
        while copied < buf.len() {
            if self.is_exhausted() && self.fill_buffer_async().await? == 0 {
                break;
            }
            copied += self.copy_to(&mut buf[copied..]);
            if self.is_blocked {
                break;
            }
        }
        Ok(copied)
    }
}

#[async_trait]
impl<S, C> AsyncTextSource for StreamTextReader<S, C>
where
    S: AsyncByteSource,
    C: Codec + Send,
{
    async fn peek_async(&mut self) -> Result<Option<char>, TextError> {
        self.ensure_ready()?;
        if self.is_exhausted() && self.fill_buffer_async().await? == 0 {
            return Ok(None);
        }
        Ok(Some(self.chars[self.char_index]))
    }

    async fn read_async(&mut self) -> Result<Option<char>, TextError> {
        self.ensure_ready()?;
        if self.is_exhausted() && self.fill_buffer_async().await? == 0 {
            return Ok(None);
        }
        let ch = self.chars[self.char_index];
        self.char_index += 1;
        Ok(Some(ch))
    }

    async fn read_into_async(&mut self, buf: &mut [char]) -> Result<usize, TextError> {
        self.ensure_ready()?;
        self.read_into_checked(buf).await
    }

    async fn read_range_async(&mut self, buf: &mut [char], index: usize, count: usize) -> Result<usize, TextError> {
        self.ensure_ready()?;
        let range = checked_range(buf, index, count)?;
        self.read_into_checked(range).await
    }

    async fn read_line_async(&mut self) -> Result<Option<String>, TextError> {
        self.ensure_ready()?;

        loop {
            if self.is_exhausted() && self.fill_buffer_async().await? == 0 {
                return Ok(self.finish_line());
            }
            if let Some(line) = self.scan_line() {
                return Ok(Some(line));
            }
        }
    }
}
