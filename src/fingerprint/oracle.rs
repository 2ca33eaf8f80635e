//! Change detection for atlas targets.
//!
//! A target is fresh only when its atlas image, manifest and fingerprint
//! file all exist and the stored fingerprint equals the current directory
//! fingerprint. The fingerprint is never written here during detection;
//! the pipeline calls [`commit`] once every artifact has been written.

use super::hasher::hash_directory;
use crate::config::ResolvedTarget;
use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a target needs rebuilding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    AtlasMissing,
    ManifestMissing,
    FingerprintMissing,
    FingerprintUnreadable,
    Mismatch { stored: u32, computed: u32 },
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaleReason::AtlasMissing => write!(f, "atlas image not found"),
            StaleReason::ManifestMissing => write!(f, "manifest not found"),
            StaleReason::FingerprintMissing => write!(f, "fingerprint file not found"),
            StaleReason::FingerprintUnreadable => write!(f, "failed to read fingerprint"),
            StaleReason::Mismatch { stored, computed } => {
                write!(f, "fingerprint mismatch (stored {}, computed {})", stored, computed)
            }
        }
    }
}

/// Cache state of a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale(StaleReason),
}

impl Freshness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Freshness::Stale(_))
    }
}

/// Result of consulting the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Check {
    pub freshness: Freshness,
    /// Fingerprint of the source directory as it is now.
    pub fingerprint: u32,
}

/// Path of the fingerprint file for an atlas image: `<atlas stem>.hash` next to it.
pub fn fingerprint_path(atlas_path: &Path) -> PathBuf {
    atlas_path.with_extension("hash")
}

/// Outcome of reading a stored fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stored {
    Missing,
    Unreadable,
    Value(u32),
}

/// Read a fingerprint file: a decimal integer, optionally followed by whitespace.
pub fn read_stored(path: &Path) -> Stored {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Stored::Missing,
        Err(_) => return Stored::Unreadable,
    };
    match text.split_whitespace().next().map(str::parse::<u32>) {
        Some(Ok(value)) => Stored::Value(value),
        _ => Stored::Unreadable,
    }
}

/// Determine whether `target` is fresh and compute its current fingerprint.
///
/// Fails only if the source directory cannot be read.
pub fn check(target: &ResolvedTarget) -> Result<Check> {
    let fingerprint = hash_directory(&target.source_dir)?;

    let freshness = if !target.atlas_path.is_file() {
        Freshness::Stale(StaleReason::AtlasMissing)
    } else if !target.manifest_path.is_file() {
        Freshness::Stale(StaleReason::ManifestMissing)
    } else {
        match read_stored(&target.fingerprint_path) {
            Stored::Missing => Freshness::Stale(StaleReason::FingerprintMissing),
            Stored::Unreadable => Freshness::Stale(StaleReason::FingerprintUnreadable),
            Stored::Value(stored) if stored != fingerprint => {
                Freshness::Stale(StaleReason::Mismatch {
                    stored,
                    computed: fingerprint,
                })
            }
            Stored::Value(_) => Freshness::Fresh,
        }
    };

    tracing::debug!(atlas = %target.name, fingerprint, ?freshness, "checked atlas freshness");

    Ok(Check {
        freshness,
        fingerprint,
    })
}

/// Convenience wrapper around [`check`].
pub fn should_rebuild(target: &ResolvedTarget) -> Result<bool> {
    Ok(check(target)?.freshness.is_stale())
}

/// Persist `fingerprint` as the last known good value for `target`.
pub fn commit(target: &ResolvedTarget, fingerprint: u32) -> Result<()> {
    std::fs::write(&target.fingerprint_path, format!("{}\n", fingerprint))?;
    tracing::info!(atlas = %target.name, fingerprint, "saved new fingerprint");
    Ok(())
}
