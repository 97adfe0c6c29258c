// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Host filesystem sinks: one plain file per sink inside a configured directory.

use crate::error::{Error, Result};
use crate::sink::{SessionId, Sink, SinkFactory, SinkKind};
use async_trait::async_trait;
use diagnostics::*;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWrite, AsyncWriteExt, ReadBuf};

/// Creates sinks as files under `root`.
///
/// Names follow `<prefix>-<utc timestamp>-<session id>`, so files from the
/// same session sort together and never collide across sessions.
#[derive(Debug, Clone)]
pub struct HostSinkFactory {
    root: PathBuf,
}

impl HostSinkFactory {
    /// The directory must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` does not exist or is not a directory.
    pub async fn new(root: PathBuf) -> Result<Self> {
        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|e| Error::io(&root, e))?;
        if !metadata.is_dir() {
            return Err(Error::not_a_directory(&root));
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sink_path(&self, session: &SessionId, kind: SinkKind) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        self.root
            .join(format!("{}-{stamp}-{session}", kind.prefix()))
    }
}

#[async_trait]
impl SinkFactory for HostSinkFactory {
    async fn create(&self, session: &SessionId, kind: SinkKind) -> Result<Box<dyn Sink>> {
        let path = self.sink_path(session, kind);

        let mut options = tokio::fs::OpenOptions::new();
        _ = options.read(true).write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            _ = options.mode(0o660);
        }

        let file = options.open(&path).await.map_err(|e| Error::io(&path, e))?;
        let display = path.display().to_string();
        debug!("created host sink {path}", path: display);

        Ok(Box::new(HostSink { path, file }))
    }
}

/// A sink backed by a host file. Forwards I/O to `tokio::fs::File`.
pub struct HostSink {
    path: PathBuf,
    file: tokio::fs::File,
}

impl HostSink {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Sink for HostSink {
    fn is_seekable(&self) -> bool {
        true
    }

    async fn rewind(&mut self) -> Result<()> {
        // tokio refuses to seek while a write is still in flight
        self.file
            .flush()
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        _ = self
            .file
            .seek(SeekFrom::Start(0))
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.file
            .flush()
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        self.file
            .sync_all()
            .await
            .map_err(|e| Error::io(&self.path, e))
    }

    async fn discard(self: Box<Self>) -> Result<()> {
        let HostSink { path, mut file } = *self;
        _ = file.flush().await;
        drop(file);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Error::io(&path, e))?;
        let display = path.display().to_string();
        debug!("discarded host sink {path}", path: display);
        Ok(())
    }
}

impl AsyncRead for HostSink {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_read(cx, buf)
    }
}

impl AsyncWrite for HostSink {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.file).poll_write(cx, buf)
    }

    fn poll_flush(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.file).poll_shutdown(cx)
    }
}
