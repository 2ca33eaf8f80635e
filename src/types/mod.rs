//! Shared types used throughout the library.

mod rect;

pub use rect::PlacementRect;

use std::path::PathBuf;

/// A sprite's base name paired with its placement in the atlas.
///
/// The ordered list of records for one build is the atlas manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRecord {
    pub name: String,
    pub rect: PlacementRect,
}

impl SpriteRecord {
    pub fn new(name: impl Into<String>, rect: PlacementRect) -> Self {
        Self {
            name: name.into(),
            rect,
        }
    }
}

/// A qualifying source image discovered by the scanner.
///
/// Only the header is probed; pixels are decoded later by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteInfo {
    /// File name without directory or extension, used as the sprite identifier.
    pub name: String,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Full path to the image file.
    pub path: PathBuf,
}

impl SpriteInfo {
    /// The box this sprite asks the packer for.
    pub fn pack_box(&self, id: usize) -> PackBox {
        PackBox {
            id,
            width: self.width,
            height: self.height,
        }
    }
}

/// A rectangle to be placed by a packer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackBox {
    /// Caller-chosen identifier, echoed back unchanged.
    pub id: usize,
    pub width: u32,
    pub height: u32,
}

impl PackBox {
    pub fn new(id: usize, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}
