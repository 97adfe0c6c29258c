// Error types for upload sessions

/// Opaque transport failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A chunk could not be written to its sink. The sink's state for that
/// chunk is undefined.
#[derive(Debug, thiserror::Error)]
#[error("writing chunk to sink: {0}")]
pub struct WriteError(#[from] pub std::io::Error);

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("creating mutation destination: {0}")]
    Destination(#[source] sinkfs::Error),

    #[error("reading uploaded content: {0}")]
    Read(#[source] std::io::Error),

    #[error("parsing uploaded content as a JSON object: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("serializing mutated content: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("writing mutated content: {0}")]
    Write(#[source] std::io::Error),

    #[error("injected failure: {0}")]
    Injected(&'static str),
}

/// Terminal failure of an upload session.
///
/// Each variant maps to one fixed message for the caller; the wrapped
/// cause is only ever logged.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("creating upload destination: {0}")]
    DestinationCreation(#[source] sinkfs::Error),

    #[error("receiving from stream: {0}")]
    StreamReceive(#[source] BoxError),

    #[error(transparent)]
    ChunkWrite(#[from] WriteError),

    #[error("rewinding upload destination: {0}")]
    Seek(#[source] sinkfs::Error),

    #[error("mutating json content: {0}")]
    Transform(#[from] TransformError),
}

impl SessionError {
    /// The message reported to the caller for this failure
    #[must_use]
    pub fn response_message(&self) -> &'static str {
        match self {
            SessionError::DestinationCreation(_) => "could not create upload destination",
            SessionError::StreamReceive(_) => "error while reading stream",
            SessionError::ChunkWrite(_) => "could not write to file",
            SessionError::Seek(_) => "internal server error",
            SessionError::Transform(_) => "could not mutate json content",
        }
    }
}
