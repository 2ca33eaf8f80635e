//! Texture atlas building.
//!
//! This module packs sprite rectangles into a fixed-size atlas
//! and composites the sprite pixels into a single image.

pub mod compositor;
pub mod packer;

pub use compositor::{check_atlas_size, composite, AtlasImage, MAX_ATLAS_DIMENSION};
pub use packer::{PackerKind, Placement, RectPacker, ShelfPacker, SkylinePacker};
