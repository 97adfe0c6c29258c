// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Upload session lifecycle
//!
//! ```text
//! Receiving ──> Mutating ──> Done(Ok)
//!     │             │
//!     └─────────────┴──────> Done(Error)
//! ```
//!
//! The upload destination is closed on every path once acquired. The
//! mutation output is discarded when the transform fails.

use crate::chunk::write_chunk;
use crate::error::{SessionError, TransformError};
use crate::mutator::Mutator;
use crate::source::ChunkSource;
use diagnostics::*;
use sinkfs::{SessionId, Sink, SinkFactory, SinkKind};
use std::fmt;

/// Outcome reported to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Ok,
    Error,
}

/// The single terminal response of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub status: ReportStatus,
    pub message: &'static str,
}

impl UploadReport {
    pub const COMPLETED: &'static str = "upload completed";

    fn completed() -> Self {
        Self {
            status: ReportStatus::Ok,
            message: Self::COMPLETED,
        }
    }

    fn failed(err: &SessionError) -> Self {
        Self {
            status: ReportStatus::Error,
            message: err.response_message(),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == ReportStatus::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Receiving,
    Mutating,
    Done(ReportStatus),
}

impl SessionState {
    /// Whether `next` is a legal successor of this state
    #[must_use]
    pub fn allows(self, next: SessionState) -> bool {
        matches!(
            (self, next),
            (SessionState::Receiving, SessionState::Mutating)
                | (SessionState::Receiving, SessionState::Done(ReportStatus::Error))
                | (SessionState::Mutating, SessionState::Done(_))
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Receiving => write!(f, "receiving"),
            SessionState::Mutating => write!(f, "mutating"),
            SessionState::Done(ReportStatus::Ok) => write!(f, "done(ok)"),
            SessionState::Done(ReportStatus::Error) => write!(f, "done(error)"),
        }
    }
}

/// One streaming upload. Consumed by [`UploadSession::run`], which yields
/// exactly one [`UploadReport`].
pub struct UploadSession<'a> {
    id: SessionId,
    factory: &'a dyn SinkFactory,
    mutator: &'a dyn Mutator,
    state: SessionState,
    chunks: u64,
    bytes_written: u64,
}

impl<'a> UploadSession<'a> {
    #[must_use]
    pub fn new(factory: &'a dyn SinkFactory, mutator: &'a dyn Mutator) -> Self {
        Self::with_id(factory, mutator, SessionId::new())
    }

    #[must_use]
    pub fn with_id(factory: &'a dyn SinkFactory, mutator: &'a dyn Mutator, id: SessionId) -> Self {
        Self {
            id,
            factory,
            mutator,
            state: SessionState::Receiving,
            chunks: 0,
            bytes_written: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Drain `source` into a fresh destination, mutate it, and report.
    pub async fn run<S>(mut self, source: &mut S) -> UploadReport
    where
        S: ChunkSource + ?Sized,
    {
        info!("upload session {session} started", session: self.id.to_string());

        let report = match self.drive(source).await {
            Ok(()) => {
                info!(
                    "upload session {session} completed: {bytes} bytes in {chunks} chunks",
                    session: self.id.to_string(),
                    bytes: self.bytes_written,
                    chunks: self.chunks
                );
                UploadReport::completed()
            }
            Err(err) => {
                error!(
                    "upload session {session} failed in state {state}: {cause}",
                    session: self.id.to_string(),
                    state: self.state.to_string(),
                    cause: err.to_string()
                );
                UploadReport::failed(&err)
            }
        };

        self.transition(SessionState::Done(report.status));
        report
    }

    async fn drive<S>(&mut self, source: &mut S) -> Result<(), SessionError>
    where
        S: ChunkSource + ?Sized,
    {
        let mut sink = self
            .factory
            .create(&self.id, SinkKind::Upload)
            .await
            .map_err(SessionError::DestinationCreation)?;

        let result = self.ingest(source, sink.as_mut()).await;

        if let Err(err) = sink.close().await {
            warn!(
                "upload session {session}: closing upload destination: {cause}",
                session: self.id.to_string(),
                cause: err.to_string()
            );
        }
        result
    }

    async fn ingest<S>(&mut self, source: &mut S, sink: &mut dyn Sink) -> Result<(), SessionError>
    where
        S: ChunkSource + ?Sized,
    {
        self.receive(source, &mut *sink).await?;

        if sink.is_seekable() {
            sink.rewind().await.map_err(SessionError::Seek)?;
        }

        self.transition(SessionState::Mutating);
        self.mutate(sink).await?;
        Ok(())
    }

    async fn receive<S>(&mut self, source: &mut S, sink: &mut dyn Sink) -> Result<(), SessionError>
    where
        S: ChunkSource + ?Sized,
    {
        while let Some(chunk) = source
            .next_chunk()
            .await
            .map_err(SessionError::StreamReceive)?
        {
            self.bytes_written += write_chunk(&chunk, &mut *sink).await?;
            self.chunks += 1;
            debug!(
                "upload session {session}: chunk {chunks} of {len} bytes",
                session: self.id.to_string(),
                chunks: self.chunks,
                len: chunk.len()
            );
        }
        Ok(())
    }

    async fn mutate(&self, input: &mut dyn Sink) -> Result<(), TransformError> {
        let mut output = self
            .factory
            .create(&self.id, SinkKind::Mutated)
            .await
            .map_err(TransformError::Destination)?;

        match self.mutator.mutate(input, output.as_mut()).await {
            Ok(()) => {
                if let Err(err) = output.close().await {
                    warn!(
                        "upload session {session}: closing mutation output: {cause}",
                        session: self.id.to_string(),
                        cause: err.to_string()
                    );
                }
                Ok(())
            }
            Err(err) => {
                if let Err(discard_err) = output.discard().await {
                    warn!(
                        "upload session {session}: discarding mutation output: {cause}",
                        session: self.id.to_string(),
                        cause: discard_err.to_string()
                    );
                }
                Err(err)
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.allows(next),
            "illegal session transition {} -> {next}",
            self.state
        );
        debug!(
            "upload session {session}: {from} -> {to}",
            session: self.id.to_string(),
            from: self.state.to_string(),
            to: next.to_string()
        );
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        use ReportStatus::{Error, Ok};
        use SessionState::{Done, Mutating, Receiving};

        assert!(Receiving.allows(Mutating));
        assert!(Receiving.allows(Done(Error)));
        assert!(Mutating.allows(Done(Ok)));
        assert!(Mutating.allows(Done(Error)));

        assert!(!Receiving.allows(Done(Ok)));
        assert!(!Mutating.allows(Receiving));
        assert!(!Done(Ok).allows(Done(Error)));
        assert!(!Done(Error).allows(Mutating));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Receiving.to_string(), "receiving");
        assert_eq!(SessionState::Done(ReportStatus::Error).to_string(), "done(error)");
    }
}
