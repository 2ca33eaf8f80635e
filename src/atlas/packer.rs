//! Rectangle packing strategies.
//!
//! A packer assigns non-overlapping origins to a list of boxes inside a fixed
//! atlas, or reports that they do not fit. Packers never grow the atlas.

use crate::error::{AtlasError, Result};
use crate::types::{PackBox, PlacementRect};
use serde::{Deserialize, Serialize};

/// A box with its assigned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The `id` of the originating [`PackBox`].
    pub id: usize,
    pub rect: PlacementRect,
}

/// A deterministic 2D bin packer.
pub trait RectPacker {
    /// Pack `boxes` into a `width` x `height` atlas.
    ///
    /// On success the placements are returned in the same order as `boxes`.
    fn pack(&self, width: u32, height: u32, boxes: &[PackBox]) -> Result<Vec<Placement>>;
}

/// Selectable packing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum PackerKind {
    /// Bottom-left skyline packing
    #[default]
    Skyline,
    /// Row-by-row shelf packing
    Shelf,
}

impl PackerKind {
    pub fn packer(self) -> Box<dyn RectPacker> {
        match self {
            PackerKind::Skyline => Box::new(SkylinePacker),
            PackerKind::Shelf => Box::new(ShelfPacker),
        }
    }
}

fn infeasible(boxes: &[PackBox], width: u32, height: u32) -> AtlasError {
    AtlasError::PackingFailed {
        count: boxes.len(),
        width,
        height,
    }
}

/// Visit order shared by both strategies: tallest first, then widest.
/// The sort is stable, so equal boxes keep their input order.
fn packing_order(boxes: &[PackBox]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        boxes[b]
            .height
            .cmp(&boxes[a].height)
            .then(boxes[b].width.cmp(&boxes[a].width))
    });
    order
}

/// Bottom-left skyline packer.
///
/// Tracks the top edge of the filled area as a list of horizontal segments
/// and puts each box at the lowest position where it fits, leftmost first.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkylinePacker;

#[derive(Debug, Clone, Copy)]
struct SkylineNode {
    x: u32,
    y: u32,
    width: u32,
}

struct Skyline {
    width: u32,
    height: u32,
    nodes: Vec<SkylineNode>,
}

impl Skyline {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            nodes: vec![SkylineNode { x: 0, y: 0, width }],
        }
    }

    /// Height a box of `width` would rest at if its left edge sat on node `start`.
    fn resting_height(&self, start: usize, width: u32) -> u32 {
        let mut y = 0;
        let mut remaining = width as u64;
        for node in &self.nodes[start..] {
            if remaining == 0 {
                break;
            }
            y = y.max(node.y);
            remaining = remaining.saturating_sub(node.width as u64);
        }
        y
    }

    /// Lowest position for a `width` x `height` box: (node index, x, y).
    fn find_position(&self, width: u32, height: u32) -> Option<(usize, u32, u32)> {
        let mut best: Option<(usize, u32, u32)> = None;
        for (index, node) in self.nodes.iter().enumerate() {
            if node.x as u64 + width as u64 > self.width as u64 {
                break;
            }
            let y = self.resting_height(index, width);
            if y as u64 + height as u64 > self.height as u64 {
                continue;
            }
            if best.map_or(true, |(_, _, best_y)| y < best_y) {
                best = Some((index, node.x, y));
            }
        }
        best
    }

    fn place(&mut self, index: usize, x: u32, y: u32, width: u32, height: u32) {
        self.nodes.insert(
            index,
            SkylineNode {
                x,
                y: y + height,
                width,
            },
        );

        // Trim the segments now covered by the new node.
        let end = x as u64 + width as u64;
        let next = index + 1;
        while next < self.nodes.len() {
            let node = self.nodes[next];
            if node.x as u64 >= end {
                break;
            }
            let covered = (end - node.x as u64) as u32;
            if node.width <= covered {
                self.nodes.remove(next);
            } else {
                self.nodes[next].x += covered;
                self.nodes[next].width -= covered;
                break;
            }
        }

        // Merge neighbours at the same height.
        let mut i = 0;
        while i + 1 < self.nodes.len() {
            if self.nodes[i].y == self.nodes[i + 1].y {
                self.nodes[i].width += self.nodes[i + 1].width;
                self.nodes.remove(i + 1);
            } else {
                i += 1;
            }
        }
    }
}

impl RectPacker for SkylinePacker {
    fn pack(&self, width: u32, height: u32, boxes: &[PackBox]) -> Result<Vec<Placement>> {
        let mut skyline = Skyline::new(width, height);
        let mut rects = vec![PlacementRect::default(); boxes.len()];

        for index in packing_order(boxes) {
            let b = boxes[index];
            if b.width == 0 || b.height == 0 {
                if b.width > width || b.height > height {
                    return Err(infeasible(boxes, width, height));
                }
                rects[index] = PlacementRect::new(0, 0, b.width, b.height);
                continue;
            }
            let (node, x, y) = skyline
                .find_position(b.width, b.height)
                .ok_or_else(|| infeasible(boxes, width, height))?;
            skyline.place(node, x, y, b.width, b.height);
            rects[index] = PlacementRect::new(x, y, b.width, b.height);
        }

        Ok(boxes
            .iter()
            .zip(rects)
            .map(|(b, rect)| Placement { id: b.id, rect })
            .collect())
    }
}

/// Simple row packer: fills rows left to right, starting a new row below the
/// tallest box of the previous one when the current row is full.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

impl RectPacker for ShelfPacker {
    fn pack(&self, width: u32, height: u32, boxes: &[PackBox]) -> Result<Vec<Placement>> {
        let mut rects = vec![PlacementRect::default(); boxes.len()];

        let mut current_x = 0u64;
        let mut current_y = 0u64;
        let mut row_height = 0u64;

        for index in packing_order(boxes) {
            let b = boxes[index];
            let (w, h) = (b.width as u64, b.height as u64);

            // Check if we need to start a new row
            if current_x + w > width as u64 {
                current_x = 0;
                current_y += row_height;
                row_height = 0;
            }

            // Check if we've run out of space
            if current_x + w > width as u64 || current_y + h > height as u64 {
                return Err(infeasible(boxes, width, height));
            }

            rects[index] = PlacementRect::new(current_x as u32, current_y as u32, b.width, b.height);

            current_x += w;
            row_height = row_height.max(h);
        }

        Ok(boxes
            .iter()
            .zip(rects)
            .map(|(b, rect)| Placement { id: b.id, rect })
            .collect())
    }
}
