use crate::error::BoxError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};

/// The receiving half of a streaming call.
#[async_trait]
pub trait ChunkSource: Send {
    /// Next payload, `Ok(None)` once the sender has finished, or the
    /// transport failure that ended the stream.
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, BoxError>;
}

#[async_trait]
impl<S, E> ChunkSource for S
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin,
    E: Into<BoxError> + Send,
{
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, BoxError> {
        self.next().await.transpose().map_err(Into::into)
    }
}
