//! Atlas compositing: blit decoded sprites into a single RGBA canvas.

use crate::error::{AtlasError, Result};
use crate::types::PlacementRect;
use image::{ImageEncoder, RgbaImage};
use std::path::Path;

/// Largest accepted atlas side, in pixels.
pub const MAX_ATLAS_DIMENSION: u32 = 16384;

/// Reject atlas sizes that are zero or too large to allocate.
pub fn check_atlas_size(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(AtlasError::InvalidConfig(format!(
            "atlas size {}x{} must be non-zero",
            width, height
        )));
    }
    if width > MAX_ATLAS_DIMENSION || height > MAX_ATLAS_DIMENSION {
        return Err(AtlasError::InvalidConfig(format!(
            "atlas size {}x{} exceeds the {}x{} maximum",
            width, height, MAX_ATLAS_DIMENSION, MAX_ATLAS_DIMENSION
        )));
    }
    Ok(())
}

/// A composited RGBA atlas.
#[derive(Debug, Clone)]
pub struct AtlasImage {
    /// Width of the atlas in pixels.
    pub width: u32,
    /// Height of the atlas in pixels.
    pub height: u32,
    /// RGBA pixel data.
    pub pixels: Vec<u8>,
}

impl AtlasImage {
    /// Create a fully transparent atlas.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        check_atlas_size(width, height)?;
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| AtlasError::InvalidConfig(format!("atlas size {}x{} overflows", width, height)))?;
        Ok(Self {
            width,
            height,
            pixels: vec![0; len],
        })
    }

    /// Get a pixel at (x, y), or `None` outside the atlas.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let mut pixel = [0u8; 4];
        pixel.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(pixel)
    }

    /// Copy `src` into the atlas with its top-left corner at (x, y).
    ///
    /// Pixels that would land outside the atlas are skipped.
    pub fn blit(&mut self, src: &RgbaImage, x: u32, y: u32) {
        let (src_width, src_height) = src.dimensions();
        let src_pixels = src.as_raw();

        for sy in 0..src_height {
            let dst_y = y as u64 + sy as u64;
            if dst_y >= self.height as u64 {
                break;
            }
            for sx in 0..src_width {
                let dst_x = x as u64 + sx as u64;
                if dst_x >= self.width as u64 {
                    break;
                }

                let src_idx = (sy as usize * src_width as usize + sx as usize) * 4;
                let dst_idx = (dst_y as usize * self.width as usize + dst_x as usize) * 4;
                self.pixels[dst_idx..dst_idx + 4].copy_from_slice(&src_pixels[src_idx..src_idx + 4]);
            }
        }
    }

    /// Encode the atlas as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(std::io::Cursor::new(&mut bytes));
        encoder.write_image(
            &self.pixels,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }

    /// Write the atlas to `path` as a PNG, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let encode_err = |message: String| AtlasError::Encode {
            path: path.to_path_buf(),
            message,
        };

        let bytes = self.to_png().map_err(|e| encode_err(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| encode_err(e.to_string()))?;
        }
        std::fs::write(path, bytes).map_err(|e| encode_err(e.to_string()))?;

        tracing::info!(path = %path.display(), "successfully saved atlas image");
        Ok(())
    }
}

/// Decode an image file to RGBA8, expanding grey or RGB sources to full alpha.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let decode_err = |source: image::ImageError| AtlasError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let image = image::ImageReader::open(path)
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| decode_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_err)?;
    Ok(image.to_rgba8())
}

/// Build an atlas by decoding each sprite and copying it into its rectangle.
///
/// Only one sprite's pixels are held in memory at a time.
pub fn composite(width: u32, height: u32, placements: &[(&Path, PlacementRect)]) -> Result<AtlasImage> {
    let mut atlas = AtlasImage::new(width, height)?;

    for (path, rect) in placements {
        let sprite = load_rgba(path)?;
        if sprite.dimensions() != (rect.width, rect.height) {
            tracing::warn!(
                path = %path.display(),
                expected = %rect,
                actual_width = sprite.width(),
                actual_height = sprite.height(),
                "sprite size differs from its placement"
            );
        }
        atlas.blit(&sprite, rect.x, rect.y);
    }

    Ok(atlas)
}
