// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory sinks with configurable fault injection.
//!
//! Every sink handed out keeps its state behind a shared handle, so a test
//! can inspect what a session wrote (and whether it closed or discarded the
//! sink) after the session has returned and dropped it.

use crate::error::{Error, Result};
use crate::sink::{SessionId, Sink, SinkFactory, SinkKind};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::{Cursor, Read, Write};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Failures to inject into sinks of one kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Faults {
    /// `SinkFactory::create` fails
    pub fail_create: bool,
    /// A write fails once it would take the total past this many bytes
    pub fail_write_after: Option<u64>,
    /// Every read fails
    pub fail_read: bool,
    /// `rewind` fails
    pub fail_seek: bool,
    /// The sink reports itself as not seekable
    pub unseekable: bool,
}

impl Faults {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_create_failure(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// `0` makes the very first non-empty write fail.
    #[must_use]
    pub fn with_write_failure_after(mut self, bytes: u64) -> Self {
        self.fail_write_after = Some(bytes);
        self
    }

    #[must_use]
    pub fn with_read_failure(mut self) -> Self {
        self.fail_read = true;
        self
    }

    #[must_use]
    pub fn with_seek_failure(mut self) -> Self {
        self.fail_seek = true;
        self
    }

    #[must_use]
    pub fn without_seek(mut self) -> Self {
        self.unseekable = true;
        self
    }
}

/// Snapshot of one memory sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecord {
    pub session: SessionId,
    pub kind: SinkKind,
    pub content: Vec<u8>,
    pub bytes_written: u64,
    pub closed: bool,
    pub discarded: bool,
    pub dropped: bool,
}

struct State {
    session: SessionId,
    kind: SinkKind,
    cursor: Cursor<Vec<u8>>,
    bytes_written: u64,
    closed: bool,
    discarded: bool,
    dropped: bool,
}

impl State {
    fn snapshot(&self) -> MemoryRecord {
        MemoryRecord {
            session: self.session,
            kind: self.kind,
            content: self.cursor.get_ref().clone(),
            bytes_written: self.bytes_written,
            closed: self.closed,
            discarded: self.discarded,
            dropped: self.dropped,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct FactoryState {
    faults: HashMap<SinkKind, Faults>,
    sinks: Vec<Arc<Mutex<State>>>,
    create_calls: usize,
}

/// Factory of [`MemorySink`]s. Cloning shares the same record of sinks.
#[derive(Clone, Default)]
pub struct MemorySinkFactory(Arc<Mutex<FactoryState>>);

impl MemorySinkFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `faults` to every sink of `kind` created from now on
    #[must_use]
    pub fn with_faults(self, kind: SinkKind, faults: Faults) -> Self {
        _ = lock(&self.0).faults.insert(kind, faults);
        self
    }

    /// Snapshots of all sinks created so far, in creation order
    #[must_use]
    pub fn records(&self) -> Vec<MemoryRecord> {
        lock(&self.0)
            .sinks
            .iter()
            .map(|s| lock(s).snapshot())
            .collect()
    }

    /// First sink created for `kind`, if any
    #[must_use]
    pub fn record(&self, kind: SinkKind) -> Option<MemoryRecord> {
        self.records().into_iter().find(|r| r.kind == kind)
    }

    /// Number of `create` calls, including failed ones
    #[must_use]
    pub fn create_calls(&self) -> usize {
        lock(&self.0).create_calls
    }
}

#[async_trait]
impl SinkFactory for MemorySinkFactory {
    async fn create(&self, session: &SessionId, kind: SinkKind) -> Result<Box<dyn Sink>> {
        let mut factory = lock(&self.0);
        factory.create_calls += 1;

        let faults = factory.faults.get(&kind).cloned().unwrap_or_default();
        if faults.fail_create {
            return Err(Error::injected("create"));
        }

        let state = Arc::new(Mutex::new(State {
            session: *session,
            kind,
            cursor: Cursor::new(Vec::new()),
            bytes_written: 0,
            closed: false,
            discarded: false,
            dropped: false,
        }));
        factory.sinks.push(state.clone());

        Ok(Box::new(MemorySink { state, faults }))
    }
}

/// A sink holding its content in a `Vec<u8>`
pub struct MemorySink {
    state: Arc<Mutex<State>>,
    faults: Faults,
}

#[async_trait]
impl Sink for MemorySink {
    fn is_seekable(&self) -> bool {
        !self.faults.unseekable
    }

    async fn rewind(&mut self) -> Result<()> {
        if self.faults.unseekable {
            return Err(Error::NotSeekable);
        }
        if self.faults.fail_seek {
            return Err(Error::injected("seek"));
        }
        lock(&self.state).cursor.set_position(0);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        lock(&self.state).closed = true;
        Ok(())
    }

    async fn discard(self: Box<Self>) -> Result<()> {
        let mut state = lock(&self.state);
        state.discarded = true;
        state.cursor = Cursor::new(Vec::new());
        Ok(())
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        lock(&self.state).dropped = true;
    }
}

impl AsyncRead for MemorySink {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        if self.faults.fail_read {
            return Poll::Ready(Err(std::io::Error::other("injected read failure")));
        }
        let mut state = lock(&self.state);
        let n = state.cursor.read(buf.initialize_unfilled())?;
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MemorySink {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        let mut state = lock(&self.state);
        if let Some(limit) = self.faults.fail_write_after {
            if !buf.is_empty() && state.bytes_written + buf.len() as u64 > limit {
                return Poll::Ready(Err(std::io::Error::other("injected write failure")));
            }
        }
        let n = state.cursor.write(buf)?;
        state.bytes_written += n as u64;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
