//! Build target configuration.
//!
//! Targets are usually loaded from a JSON file:
//!
//! ```json
//! {
//!   "resource_root": "resources",
//!   "targets": [
//!     { "name": "main", "source": "mainAtlas", "atlas": "atlas.png",
//!       "manifest": "atlas.meta", "width": 1024, "height": 1024, "max_sprites": 256 }
//!   ]
//! }
//! ```
//!
//! Relative target paths are resolved against the resource root, and a
//! relative resource root is resolved against the config file's directory.

use crate::atlas::{check_atlas_size, PackerKind};
use crate::error::{AtlasError, Result};
use crate::fingerprint::fingerprint_path;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Static configuration of one atlas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildTarget {
    /// Target name used in logs.
    pub name: String,
    /// Directory of source sprites.
    pub source: PathBuf,
    /// Output atlas image (PNG).
    pub atlas: PathBuf,
    /// Output manifest.
    pub manifest: PathBuf,
    /// Atlas width in pixels.
    pub width: u32,
    /// Atlas height in pixels.
    pub height: u32,
    /// Maximum number of sprites the source directory may hold.
    pub max_sprites: usize,
    /// Packing strategy.
    pub packer: PackerKind,
}

impl Default for BuildTarget {
    fn default() -> Self {
        Self {
            name: "mainAtlas".to_string(),
            source: PathBuf::from("mainAtlas"),
            atlas: PathBuf::from("atlas.png"),
            manifest: PathBuf::from("atlas.meta"),
            width: 1024,
            height: 1024,
            max_sprites: 256,
            packer: PackerKind::default(),
        }
    }
}

impl BuildTarget {
    /// Create a target whose source directory and outputs are named after it.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: PathBuf::from(&name),
            atlas: PathBuf::from(format!("{}.png", name)),
            manifest: PathBuf::from(format!("{}.meta", name)),
            name,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_max_sprites(mut self, max_sprites: usize) -> Self {
        self.max_sprites = max_sprites;
        self
    }

    pub fn with_packer(mut self, packer: PackerKind) -> Self {
        self.packer = packer;
        self
    }

    /// Check the target on its own.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AtlasError::InvalidConfig(format!("{}: {}", self.name, msg)));

        if let Err(AtlasError::InvalidConfig(msg)) = check_atlas_size(self.width, self.height) {
            return invalid(msg);
        }
        if self.max_sprites == 0 {
            return invalid("max_sprites must be at least 1".to_string());
        }
        if self.atlas.extension().and_then(|e| e.to_str()) != Some("png") {
            return invalid(format!("atlas {:?} must have a .png extension", self.atlas));
        }
        if self.atlas == self.manifest {
            return invalid("atlas and manifest must be different files".to_string());
        }
        Ok(())
    }

    /// Resolve paths against `root`.
    pub fn resolve(&self, root: &Path) -> ResolvedTarget {
        let atlas_path = root.join(&self.atlas);
        ResolvedTarget {
            name: self.name.clone(),
            source_dir: root.join(&self.source),
            fingerprint_path: fingerprint_path(&atlas_path),
            manifest_path: root.join(&self.manifest),
            atlas_path,
            width: self.width,
            height: self.height,
            max_sprites: self.max_sprites,
            packer: self.packer,
        }
    }
}

/// A target with every path resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub name: String,
    pub source_dir: PathBuf,
    pub atlas_path: PathBuf,
    pub manifest_path: PathBuf,
    /// `<atlas stem>.hash` next to the atlas image.
    pub fingerprint_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub max_sprites: usize,
    pub packer: PackerKind,
}

/// All targets of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory that target paths are relative to.
    pub resource_root: PathBuf,
    pub targets: Vec<BuildTarget>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("resources"),
            targets: vec![BuildTarget::default()],
        }
    }
}

impl PipelineConfig {
    /// Parse a config from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config file. A relative resource root is taken relative to the file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut config = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        if config.resource_root.is_relative() {
            if let Some(parent) = path.parent() {
                config.resource_root = parent.join(&config.resource_root);
            }
        }
        Ok(config)
    }

    /// Check every target and reject targets that would write the same files.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(AtlasError::InvalidConfig("no build targets configured".to_string()));
        }

        let mut names = HashSet::new();
        let mut outputs = HashSet::new();
        for target in &self.targets {
            target.validate()?;
            if !names.insert(target.name.as_str()) {
                return Err(AtlasError::InvalidConfig(format!(
                    "duplicate target name '{}'",
                    target.name
                )));
            }

            let resolved = target.resolve(&self.resource_root);
            for path in [
                resolved.atlas_path,
                resolved.manifest_path,
                resolved.fingerprint_path,
            ] {
                if !outputs.insert(path.clone()) {
                    return Err(AtlasError::InvalidConfig(format!(
                        "{}: output {:?} is shared with another target",
                        target.name, path
                    )));
                }
            }
        }
        Ok(())
    }

    /// Targets with paths resolved against the resource root, in config order.
    pub fn resolved_targets(&self) -> Vec<ResolvedTarget> {
        self.targets
            .iter()
            .map(|t| t.resolve(&self.resource_root))
            .collect()
    }
}
