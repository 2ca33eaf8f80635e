//! CRC-32 content hashing for files and sprite directories.

use crate::error::Result;
use crate::sprites::list_sprite_files;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 1024;

/// CRC-32 of a byte buffer.
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// CRC-32 of a file's full contents, streamed in fixed-size chunks.
///
/// Returns 0 if the file cannot be opened or read.
pub fn hash_file(path: &Path) -> u32 {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "error opening file for hashing");
            return 0;
        }
    };

    let mut hasher = crc32fast::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "error reading file for hashing");
                return 0;
            }
        }
    }
    hasher.finalize()
}

/// Order-independent fingerprint of every qualifying sprite file in `dir`.
///
/// Each file contributes `hash(file name) ^ hash(contents)`, folded into the
/// accumulator with XOR.
pub fn hash_directory(dir: &Path) -> Result<u32> {
    let files = list_sprite_files(dir)?;
    Ok(combine(
        files
            .iter()
            .map(|file| (file.file_name.as_str(), hash_file(&file.path))),
    ))
}

/// Fold (file name, content hash) pairs into a directory fingerprint.
pub fn combine<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> u32 {
    entries
        .into_iter()
        .fold(0, |acc, (name, content)| acc ^ hash_bytes(name.as_bytes()) ^ content)
}
