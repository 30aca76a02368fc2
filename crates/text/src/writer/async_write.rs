use async_trait::async_trait;
use tracing::debug;

use crate::codec::Codec;
use crate::error::TextError;
use crate::sink::AsyncByteSink;
use crate::text::AsyncTextSink;
use crate::writer::{PipeTextWriter, encode_into};

impl<K, C> PipeTextWriter<K, C>
where
    K: AsyncByteSink,
    C: Codec + Send,
{
    /// Emits the encoder's trailing state and completes the sink asynchronously, letting it
    /// drain what it buffered.
    ///
    /// Disposing again does nothing.
    ///
    /// # Errors
    /// Returns the error the sink reported while completing.
    pub async fn dispose_async(&mut self) -> Result<(), TextError> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        let error = self.finish_encoding();
        self.sink.complete_async(error).await?;
        debug!("pipe text writer disposed");
        Ok(())
    }

    #[inline]
    fn ensure_ready(&self) -> Result<(), TextError> {
        self.ensure_active()?;
        self.ensure_not_cancelled()
    }
}

#[async_trait]
impl<K, C> AsyncTextSink for PipeTextWriter<K, C>
where
    K: AsyncByteSink,
    C: Codec + Send,
{
    async fn write_async(&mut self, text: &str) -> Result<(), TextError> {
        self.ensure_ready()?;
        encode_into(&mut self.sink, &mut self.codec, text, false)
    }

    async fn write_line_async(&mut self, text: &str) -> Result<(), TextError> {
        self.ensure_ready()?;
        encode_into(&mut self.sink, &mut self.codec, text, false)?;
        encode_into(&mut self.sink, &mut self.codec, &self.new_line, false)
    }

    async fn flush_async(&mut self) -> Result<(), TextError> {
        self.ensure_ready()?;
        encode_into(&mut self.sink, &mut self.codec, "", true)
    }
}
