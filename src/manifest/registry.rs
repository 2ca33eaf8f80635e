//! Runtime sprite lookup.

use crate::error::Result;
use crate::types::{PlacementRect, SpriteRecord};
use std::collections::HashMap;
use std::path::Path;

/// Maps sprite names to their rectangles in one atlas.
///
/// Built once when an atlas is loaded and passed by reference to whatever
/// draws from it. If a name appears more than once, the first record wins.
#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    records: Vec<SpriteRecord>,
    index: HashMap<String, usize>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from manifest records.
    pub fn from_records(records: Vec<SpriteRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            index.entry(record.name.clone()).or_insert(i);
        }
        Self { records, index }
    }

    /// Load a registry from a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_records(super::read(path)?))
    }

    /// Look up a sprite's rectangle. A miss is logged and returns `None`.
    pub fn get(&self, name: &str) -> Option<PlacementRect> {
        match self.index.get(name) {
            Some(&i) => Some(self.records[i].rect),
            None => {
                tracing::warn!(name, "failed to find sprite");
                None
            }
        }
    }

    /// Check if the registry contains a sprite.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in manifest order.
    pub fn records(&self) -> &[SpriteRecord] {
        &self.records
    }
}
