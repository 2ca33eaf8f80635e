//! # Sprite Atlas
//!
//! A build step that packs a directory of loose sprite images into a single
//! texture atlas plus a manifest describing where each sprite ended up.
//!
//! ## Overview
//!
//! Each [`BuildTarget`] names a source directory, an atlas image, a manifest
//! and a fixed atlas size. Building a target:
//!
//! 1. fingerprints the source directory and skips the build if nothing changed,
//! 2. scans the directory for `.png`, `.jpg` and `.bmp` sprites,
//! 3. packs their rectangles into the atlas,
//! 4. composites the sprite pixels and saves the atlas as PNG,
//! 5. writes the manifest and then records the new fingerprint.
//!
//! ## Quick Start
//!
//! ```ignore
//! use sprite_atlas::{build_target, BuildOptions, BuildTarget};
//!
//! let target = BuildTarget::new("mainAtlas").with_size(512, 512);
//! let outcome = build_target(&target.resolve("resources".as_ref()), BuildOptions::default())?;
//! ```
//!
//! ## Runtime Loading
//!
//! ```ignore
//! use sprite_atlas::LoadedAtlas;
//!
//! let atlas = LoadedAtlas::load("resources/atlas.png".as_ref(), "resources/atlas.meta".as_ref())?;
//! let player = atlas.rect("player_1");
//! ```

pub mod error;
pub mod types;
pub mod sprites;
pub mod fingerprint;
pub mod atlas;
pub mod manifest;
pub mod config;
pub mod pipeline;
pub mod runtime;

// Re-export main types for convenience
pub use error::{AtlasError, Result};
pub use types::{PackBox, PlacementRect, SpriteInfo, SpriteRecord};
pub use atlas::{AtlasImage, PackerKind, RectPacker, ShelfPacker, SkylinePacker};
pub use config::{BuildTarget, PipelineConfig, ResolvedTarget};
pub use fingerprint::{Freshness, StaleReason};
pub use manifest::SpriteRegistry;
pub use pipeline::{build_all, build_target, BuildOptions, BuildOutcome, BuildReport};
pub use runtime::LoadedAtlas;
