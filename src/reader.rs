use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    time::timeout,
};
use tracing::{instrument, trace};

use crate::PipelineError;

/// Pulls the input in slices of at most `chunk_size` bytes.
///
/// A read is only issued when the caller asks for the next chunk, so a slow
/// consumer also slows down how fast the underlying reader is drained.
pub struct ChunkSource<R> {
    reader: R,
    chunk_size: usize,
    read_timeout: Option<Duration>,
    bytes_read: u64,
    chunks_read: u64,
}

impl<R: AsyncRead + Unpin> ChunkSource<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            read_timeout: None,
            bytes_read: 0,
            chunks_read: 0,
        }
    }

    pub fn with_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Returns the next chunk, or `None` at end of input.
    #[instrument(skip(self), fields(chunk_size = self.chunk_size))]
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, PipelineError> {
        let mut buffer = BytesMut::with_capacity(self.chunk_size);
        let mut limited = (&mut self.reader).take(self.chunk_size as u64);
        let read_fut = limited.read_buf(&mut buffer);
        let bytes_read = match self.read_timeout {
            Some(t) => timeout(t, read_fut)
                .await
                .map_err(|_| PipelineError::Timeout)??,
            None => read_fut.await?,
        };

        if bytes_read == 0 {
            trace!(total = self.bytes_read, "end of input");
            return Ok(None);
        }

        self.bytes_read += bytes_read as u64;
        self.chunks_read += 1;
        trace!(bytes_read, total = self.bytes_read, "chunk read");
        Ok(Some(buffer.freeze()))
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }
}
