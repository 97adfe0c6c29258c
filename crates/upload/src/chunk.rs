//! Page-sized appends of network chunks into a sink

use crate::error::WriteError;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Size of each write issued against the destination
pub const PAGE_SIZE: usize = 4096;

/// Write `source` into `dest` in `PAGE_SIZE` pieces, in order.
///
/// Returns the number of bytes written. The first failing write aborts the
/// whole chunk; nothing is retried.
pub async fn write_chunk<W>(source: &[u8], dest: &mut W) -> Result<u64, WriteError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    for page in source.chunks(PAGE_SIZE) {
        dest.write_all(page).await?;
    }
    Ok(source.len() as u64)
}
