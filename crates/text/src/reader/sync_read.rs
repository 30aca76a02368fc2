use crate::codec::Codec;
use crate::error::TextError;
use crate::reader::{StreamTextReader, checked_range};
use crate::source::ByteSource;
use crate::text::TextSource;

impl<S: ByteSource, C: Codec> StreamTextReader<S, C> {
    /// Refills the char buffer, blocking on the source. Returns the chars now buffered, `0`
    /// meaning the end of the stream.
    fn fill_buffer(&mut self) -> Result<usize, TextError> {
        self.begin_refill();
        loop {
            let read = self.source.read(&mut self.bytes[..self.byte_capacity])?;
            if self.decode_read(read) {
                return Ok(self.chars_read);
            }
        }
    }
}

impl<S: ByteSource, C: Codec> TextSource for StreamTextReader<S, C> {
    fn peek(&mut self) -> Result<Option<char>, TextError> {
        self.ensure_active()?;
        if self.is_exhausted() && self.fill_buffer()? == 0 {
            return Ok(None);
        }
        Ok(Some(self.chars[self.char_index]))
    }

    fn read(&mut self) -> Result<Option<char>, TextError> {
        self.ensure_active()?;
        if self.is_exhausted() && self.fill_buffer()? == 0 {
            return Ok(None);
        }
        let ch = self.chars[self.char_index];
        self.char_index += 1;
        Ok(Some(ch))
    }

    fn read_into(&mut self, buf: &mut [char]) -> Result<usize, TextError> {
        self.ensure_active()?;

        let mut copied = 0;
        while copied < buf.len() {
            if self.is_exhausted() && self.fill_buffer()? == 0 {
                break;
            }
            copied += self.copy_to(&mut buf[copied..]);
            if self.is_blocked {
                break;
            }
        }
        Ok(copied)
    }

    fn read_range(&mut self, buf: &mut [char], index: usize, count: usize) -> Result<usize, TextError> {
        self.ensure_active()?;
        let range = checked_range(buf, index, count)?;
        self.read_into(range)
    }

    fn read_line(&mut self) -> Result<Option<String>, TextError> {
        self.ensure_active()?;

        loop {
            if self.is_exhausted() && self.fill_buffer()? == 0 {
                return Ok(self.finish_line());
            }
            if let Some(line) = self.scan_line() {
                return Ok(Some(line));
            }
        }
    }
}
