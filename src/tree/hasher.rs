//! Content hashing for snapshot nodes using BLAKE3

use crate::types::{ContentHash, Hash};
use blake3::Hasher;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::trace;

/// Size of each read while streaming a file through the hasher
pub const CHUNK_SIZE: usize = 128 * 1024;

/// Hash a file's contents.
///
/// Any failure to open or read the file yields `ContentHash::Unreadable`; one
/// locked or permission-protected file must not abort a scan.
pub fn hash_file(path: &Path) -> ContentHash {
    match stream_digest(path) {
        Ok(digest) => ContentHash::Digest(digest),
        Err(e) => {
            trace!(path = %path.display(), error = %e, "File unreadable, using sentinel hash");
            ContentHash::Unreadable
        }
    }
}

fn stream_digest(path: &Path) -> io::Result<Hash> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(*hasher.finalize().as_bytes())
}

/// Compute content hash for in-memory bytes
pub fn compute_content_hash(content: &[u8]) -> Hash {
    *blake3::hash(content).as_bytes()
}

/// Compare two files by content hash
pub fn same_content(a: &Path, b: &Path) -> bool {
    hash_file(a) == hash_file(b)
}
