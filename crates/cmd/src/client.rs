// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! gRPC client: streams a buffer to a server as `FileChunk`s

use crate::proto::{FileChunk, FileChunkResponse, FileUploaderClient};
use anyhow::{Context, Result};
use bytes::Bytes;
use diagnostics::*;
use std::num::NonZeroUsize;
use std::path::Path;

/// Split `content` into chunks of at most `chunk_size` bytes without copying
#[must_use]
pub fn split_chunks(content: &Bytes, chunk_size: NonZeroUsize) -> Vec<FileChunk> {
    let size = chunk_size.get();
    (0..content.len())
        .step_by(size)
        .map(|start| FileChunk {
            data: content.slice(start..(start + size).min(content.len())),
        })
        .collect()
}

/// Stream `content` to `endpoint` and return the server's terminal response
pub async fn upload_bytes(
    endpoint: &str,
    content: Bytes,
    chunk_size: NonZeroUsize,
) -> Result<FileChunkResponse> {
    let chunks = split_chunks(&content, chunk_size);
    debug!(
        "uploading {bytes} bytes in {count} chunks to {endpoint}",
        bytes: content.len(),
        count: chunks.len(),
        endpoint: endpoint
    );

    let mut client = FileUploaderClient::connect(endpoint.to_string())
        .await
        .with_context(|| format!("connecting to {endpoint}"))?;

    let response = client
        .upload_file(tokio_stream::iter(chunks))
        .await
        .context("upload call failed")?;

    Ok(response.into_inner())
}

/// Read a host file and stream it to `endpoint`
pub async fn upload_file(
    endpoint: &str,
    path: &Path,
    chunk_size: NonZeroUsize,
) -> Result<FileChunkResponse> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    upload_bytes(endpoint, Bytes::from(content), chunk_size).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_split_chunks() {
        let content = Bytes::from_static(b"0123456789");
        let chunks = split_chunks(&content, size(4));
        let parts: Vec<&[u8]> = chunks.iter().map(|c| c.data.as_ref()).collect();
        assert_eq!(parts, vec![&b"0123"[..], &b"4567"[..], &b"89"[..]]);
    }

    #[test]
    fn test_split_chunks_exact_and_empty() {
        let content = Bytes::from_static(b"abcd");
        assert_eq!(split_chunks(&content, size(4)).len(), 1);
        assert_eq!(split_chunks(&content, size(100)).len(), 1);
        assert!(split_chunks(&Bytes::new(), size(4)).is_empty());
    }
}
