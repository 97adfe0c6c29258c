// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};

/// Identifies one upload session. Sinks created for the same session share it,
/// so the raw upload and its mutated form can be related afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(uuid7::Uuid);

impl SessionId {
    /// Allocate a new time-ordered session id
    #[must_use]
    pub fn new() -> Self {
        Self(uuid7::uuid7())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// What a sink is going to hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SinkKind {
    /// Raw bytes as received from the network
    Upload,
    /// Output of the JSON mutation pass
    Mutated,
}

impl SinkKind {
    /// Stable name prefix used by storage backends
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            SinkKind::Upload => "uploaded-file",
            SinkKind::Mutated => "uploaded-file-mutated",
        }
    }
}

/// A destination handle exclusively owned by one session.
///
/// Reads and writes share a single position. Repositioning is optional:
/// callers check [`Sink::is_seekable`] before calling [`Sink::rewind`].
#[async_trait]
pub trait Sink: AsyncRead + AsyncWrite + Send + Unpin {
    /// Whether [`Sink::rewind`] is supported
    fn is_seekable(&self) -> bool;

    /// Move the shared read/write position back to offset 0.
    ///
    /// Pending writes are flushed first.
    async fn rewind(&mut self) -> Result<()>;

    /// Flush and release the underlying storage handle. Content is kept.
    async fn close(&mut self) -> Result<()>;

    /// Release the handle and delete whatever was written.
    async fn discard(self: Box<Self>) -> Result<()>;
}

/// Hands out sinks. Invoked once per sink a session needs.
#[async_trait]
pub trait SinkFactory: Send + Sync {
    async fn create(&self, session: &SessionId, kind: SinkKind) -> Result<Box<dyn Sink>>;
}
