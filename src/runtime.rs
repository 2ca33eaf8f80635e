//! Loading a built atlas for use at runtime.

use crate::atlas::compositor::load_rgba;
use crate::config::ResolvedTarget;
use crate::error::{AtlasError, Result};
use crate::manifest::SpriteRegistry;
use crate::types::PlacementRect;
use image::RgbaImage;
use std::path::Path;

/// An atlas image together with its sprite registry.
#[derive(Debug, Clone)]
pub struct LoadedAtlas {
    pub image: RgbaImage,
    pub registry: SpriteRegistry,
}

impl LoadedAtlas {
    /// Load an atlas image and its manifest.
    ///
    /// An atlas without a manifest, or a manifest whose rectangles fall
    /// outside the image, is an error.
    pub fn load(atlas_path: &Path, manifest_path: &Path) -> Result<Self> {
        let registry = SpriteRegistry::load(manifest_path)?;
        let image = load_rgba(atlas_path)?;

        let (width, height) = image.dimensions();
        if let Some(record) = registry
            .records()
            .iter()
            .find(|r| !r.rect.fits_within(width, height))
        {
            return Err(AtlasError::AtlasMismatch(format!(
                "sprite '{}' ({}) lies outside the {}x{} atlas",
                record.name, record.rect, width, height
            )));
        }

        tracing::debug!(
            atlas = %atlas_path.display(),
            sprites = registry.len(),
            "loaded atlas"
        );
        Ok(Self { image, registry })
    }

    /// Load a target's outputs, also checking the configured atlas size.
    pub fn load_target(target: &ResolvedTarget) -> Result<Self> {
        let loaded = Self::load(&target.atlas_path, &target.manifest_path)?;
        let dimensions = loaded.image.dimensions();
        if dimensions != (target.width, target.height) {
            return Err(AtlasError::AtlasMismatch(format!(
                "{}: atlas is {}x{}, configured {}x{}",
                target.name, dimensions.0, dimensions.1, target.width, target.height
            )));
        }
        Ok(loaded)
    }

    /// Rectangle of a sprite. A miss is logged and returns `None`.
    pub fn rect(&self, name: &str) -> Option<PlacementRect> {
        self.registry.get(name)
    }

    /// Map a sprite-local UV coordinate (0-1) to normalized atlas coordinates.
    pub fn uv(&self, name: &str, u: f32, v: f32) -> Option<[f32; 2]> {
        let rect = self.rect(name)?;
        Some(rect.to_uv(self.image.width(), self.image.height(), u, v))
    }

    /// Copy a sprite's pixels out of the atlas.
    pub fn sprite_pixels(&self, name: &str) -> Option<RgbaImage> {
        let rect = self.rect(name)?;
        Some(image::imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image())
    }
}
