//! Source sprite discovery.
//!
//! A source directory is flat: only regular files directly inside it with a
//! recognized raster extension take part in a build. Hidden entries and
//! sub-directories are ignored. The same filter drives both fingerprinting
//! and scanning so that the two always agree on which files matter.

pub mod scanner;

pub use scanner::scan;

use crate::error::{AtlasError, Result};
use std::path::{Path, PathBuf};

/// Recognized sprite extensions (case-sensitive).
pub const SPRITE_EXTENSIONS: [&str; 3] = ["png", "jpg", "bmp"];

/// A qualifying file found in a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteFile {
    /// File name including extension.
    pub file_name: String,
    /// Full path to the file.
    pub path: PathBuf,
}

impl SpriteFile {
    /// Base name used as the sprite identifier (file name without extension).
    pub fn base_name(&self) -> &str {
        base_name(&self.file_name)
    }
}

/// Check whether a file name passes the hidden-file and extension filters.
pub fn is_sprite_file_name(file_name: &str) -> bool {
    if file_name.starts_with('.') {
        return false;
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && SPRITE_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Strip the final extension from a file name.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// List the qualifying sprite files directly inside `dir`.
///
/// The result is sorted by file name so callers see a stable order regardless
/// of how the platform enumerates the directory.
pub fn list_sprite_files(dir: &Path) -> Result<Vec<SpriteFile>> {
    let unreadable = |source: std::io::Error| AtlasError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !is_sprite_file_name(&file_name) {
            continue;
        }

        // Follows symlinks, so a link to a regular image still counts.
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        files.push(SpriteFile { file_name, path });
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}
