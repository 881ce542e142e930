//! OpenSubtitles file hash.
//!
//! The hash is the file size plus the wrapping sum of every little-endian
//! u64 word in the first and last 64 KiB of the file.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Bytes read from each end of the file.
pub const HASH_CHUNK_SIZE: u64 = 64 * 1024;

/// Compute the hash of the file at `path` as 16 lowercase hex digits.
///
/// Returns `Ok(None)` for files smaller than one chunk.
pub async fn movie_hash(path: &Path) -> std::io::Result<Option<String>> {
    let mut file = File::open(path).await?;
    let size = file.metadata().await?.len();
    if size < HASH_CHUNK_SIZE {
        return Ok(None);
    }

    let mut buffer = vec![0u8; HASH_CHUNK_SIZE as usize];
    let mut hash = size;

    file.read_exact(&mut buffer).await?;
    hash = sum_words(hash, &buffer);

    file.seek(SeekFrom::Start(size - HASH_CHUNK_SIZE)).await?;
    file.read_exact(&mut buffer).await?;
    hash = sum_words(hash, &buffer);

    Ok(Some(format!("{:016x}", hash)))
}

fn sum_words(mut acc: u64, chunk: &[u8]) -> u64 {
    for word in chunk.chunks_exact(8) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(word);
        acc = acc.wrapping_add(u64::from_le_bytes(bytes));
    }
    acc
}
