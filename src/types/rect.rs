//! Pixel rectangles in atlas space.

use std::fmt;

/// A placement rectangle in atlas pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PlacementRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlacementRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check whether this rectangle lies fully inside a `width` x `height` area.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Check whether two rectangles share any pixel.
    pub fn overlaps(&self, other: &PlacementRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (self.x as u64) < other.right()
            && (other.x as u64) < self.right()
            && (self.y as u64) < other.bottom()
            && (other.y as u64) < self.bottom()
    }

    /// Transform a local UV coordinate (0-1) to normalized atlas coordinates.
    pub fn to_uv(&self, atlas_width: u32, atlas_height: u32, u: f32, v: f32) -> [f32; 2] {
        let w = atlas_width.max(1) as f32;
        let h = atlas_height.max(1) as f32;
        [
            (self.x as f32 + u * self.width as f32) / w,
            (self.y as f32 + v * self.height as f32) / h,
        ]
    }
}

impl fmt::Display for PlacementRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.width, self.height)
    }
}
