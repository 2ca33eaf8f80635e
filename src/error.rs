//! Error types for the atlas build pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AtlasError.
pub type Result<T> = std::result::Result<T, AtlasError>;

/// Main error type for atlas building and loading.
#[derive(Error, Debug)]
pub enum AtlasError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a JSON configuration file.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The sprite source directory could not be listed.
    #[error("Cannot read directory {path:?}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Image dimensions could not be probed from the file header.
    #[error("Failed to read sprite info {path:?}: {source}")]
    SpriteProbe {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A sprite matched an image extension but failed to decode.
    #[error("Failed to load image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The atlas image could not be encoded or saved.
    #[error("Failed to save image {path:?}: {message}")]
    Encode { path: PathBuf, message: String },

    /// More qualifying images than the target allows.
    #[error("Number of sprites ({found}) exceeds max_sprites ({max})")]
    TooManySprites { found: usize, max: usize },

    /// The source directory holds no qualifying images.
    #[error("No valid images found in the directory: {0:?}")]
    NoSprites(PathBuf),

    /// Two images in one directory share a base name.
    #[error("Duplicate sprite name '{name}': {first:?} and {second:?}")]
    DuplicateSprite {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The sprites do not fit into the configured atlas.
    #[error("Failed to pack {count} sprites into {width}x{height} atlas")]
    PackingFailed { count: usize, width: u32, height: u32 },

    /// A manifest file is malformed.
    #[error("Manifest parse error at line {line}: {message}")]
    ManifestParse { line: usize, message: String },

    /// An atlas image exists but its manifest does not.
    #[error("Manifest not found: {0:?}")]
    ManifestMissing(PathBuf),

    /// Atlas image and manifest disagree.
    #[error("Atlas/manifest mismatch: {0}")]
    AtlasMismatch(String),

    /// Invalid build target configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
