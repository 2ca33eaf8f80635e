//! Build orchestration.
//!
//! For each target: consult the change oracle, and if the target is stale
//! scan, pack, composite, write the atlas, write the manifest and finally
//! commit the new fingerprint. Any failure before the atlas is written
//! leaves every output untouched.

use crate::atlas::{check_atlas_size, composite, RectPacker};
use crate::config::{PipelineConfig, ResolvedTarget};
use crate::error::{AtlasError, Result};
use crate::fingerprint::{self, Freshness, StaleReason};
use crate::manifest;
use crate::sprites;
use crate::types::{PackBox, PlacementRect, SpriteRecord};
use std::path::Path;

/// Knobs for a pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Rebuild even when the target is fresh.
    pub force: bool,
}

/// Summary of a completed rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Manifest records in packer output order.
    pub records: Vec<SpriteRecord>,
    /// Directory fingerprint the build was made from.
    pub fingerprint: u32,
    /// Why the build ran; `None` when forced on a fresh target.
    pub reason: Option<StaleReason>,
    /// False if the manifest could not be written. The fingerprint is not
    /// committed in that case, so the next run rebuilds.
    pub manifest_written: bool,
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing changed since the last build.
    Skipped { fingerprint: u32 },
    Built(BuildReport),
}

impl BuildOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, BuildOutcome::Skipped { .. })
    }
}

/// Build one target with its configured packer.
pub fn build_target(target: &ResolvedTarget, options: BuildOptions) -> Result<BuildOutcome> {
    let packer = target.packer.packer();
    build_target_with(target, packer.as_ref(), options)
}

/// Build one target with an explicit packer.
pub fn build_target_with(
    target: &ResolvedTarget,
    packer: &dyn RectPacker,
    options: BuildOptions,
) -> Result<BuildOutcome> {
    check_atlas_size(target.width, target.height)?;

    let check = fingerprint::check(target)?;
    let reason = match check.freshness {
        Freshness::Fresh if !options.force => {
            tracing::info!(atlas = %target.name, "no changes detected, skipping build");
            return Ok(BuildOutcome::Skipped {
                fingerprint: check.fingerprint,
            });
        }
        Freshness::Fresh => None,
        Freshness::Stale(reason) => {
            tracing::info!(atlas = %target.name, %reason, "triggering atlas rebuild");
            Some(reason)
        }
    };

    tracing::info!(
        atlas = %target.name,
        source = %target.source_dir.display(),
        "attempting to build texture atlas"
    );

    let sprites = sprites::scan(&target.source_dir, target.max_sprites)?;
    if sprites.is_empty() {
        return Err(AtlasError::NoSprites(target.source_dir.clone()));
    }

    let boxes: Vec<PackBox> = sprites
        .iter()
        .enumerate()
        .map(|(i, sprite)| sprite.pack_box(i))
        .collect();
    let placements = packer.pack(target.width, target.height, &boxes)?;

    let sources: Vec<(&Path, PlacementRect)> = placements
        .iter()
        .map(|p| (sprites[p.id].path.as_path(), p.rect))
        .collect();
    let atlas = composite(target.width, target.height, &sources)?;
    atlas.save(&target.atlas_path)?;
    drop(atlas);

    let records: Vec<SpriteRecord> = placements
        .iter()
        .map(|p| SpriteRecord::new(sprites[p.id].name.clone(), p.rect))
        .collect();

    let manifest_written = match manifest::write(&target.manifest_path, &records) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                atlas = %target.name,
                path = %target.manifest_path.display(),
                error = %e,
                "failed to write manifest"
            );
            false
        }
    };

    if manifest_written {
        if let Err(e) = fingerprint::commit(target, check.fingerprint) {
            tracing::warn!(atlas = %target.name, error = %e, "failed to save fingerprint; next run will rebuild");
        }
    } else {
        // A stale fingerprint must not vouch for a half-written manifest.
        match std::fs::remove_file(&target.fingerprint_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(atlas = %target.name, error = %e, "failed to remove fingerprint"),
        }
    }

    Ok(BuildOutcome::Built(BuildReport {
        records,
        fingerprint: check.fingerprint,
        reason,
        manifest_written,
    }))
}

/// Build every target in config order, stopping at the first failure.
pub fn build_all(config: &PipelineConfig, options: BuildOptions) -> Result<Vec<(String, BuildOutcome)>> {
    config.validate()?;

    let mut outcomes = Vec::with_capacity(config.targets.len());
    for target in config.resolved_targets() {
        let outcome = build_target(&target, options)?;
        outcomes.push((target.name, outcome));
    }

    tracing::info!(targets = outcomes.len(), "sprite packer stage complete");
    Ok(outcomes)
}

/// Report each target's freshness without building anything.
pub fn status(config: &PipelineConfig) -> Result<Vec<(String, Freshness)>> {
    config.validate()?;
    config
        .resolved_targets()
        .into_iter()
        .map(|target| Ok((target.name.clone(), fingerprint::check(&target)?.freshness)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildTarget;
    use crate::runtime::LoadedAtlas;
    use image::{Rgba, RgbaImage};

    fn write_sprite(dir: &Path, name: &str, width: u32, height: u32, color: [u8; 4]) {
        std::fs::create_dir_all(dir).unwrap();
        RgbaImage::from_pixel(width, height, Rgba(color))
            .save(dir.join(name))
            .unwrap();
    }

    fn player_target(root: &Path) -> ResolvedTarget {
        let target = BuildTarget::default().with_size(64, 64).with_max_sprites(4);
        let resolved = target.resolve(root);
        write_sprite(&resolved.source_dir, "player_1.png", 16, 16, [255, 0, 0, 255]);
        write_sprite(&resolved.source_dir, "player_2.png", 16, 16, [0, 0, 255, 255]);
        resolved
    }

    fn built(outcome: BuildOutcome) -> BuildReport {
        match outcome {
            BuildOutcome::Built(report) => report,
            other => panic!("expected a build, got {:?}", other),
        }
    }

    #[test]
    fn test_build_then_skip() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());

        let report = built(build_target(&target, BuildOptions::default()).unwrap());
        assert_eq!(report.reason, Some(StaleReason::AtlasMissing));
        assert!(report.manifest_written);
        assert_eq!(report.records.len(), 2);
        assert!(!report.records[0].rect.overlaps(&report.records[1].rect));
        assert!(report.records.iter().all(|r| r.rect.fits_within(64, 64)));

        let records = manifest::read(&target.manifest_path).unwrap();
        assert_eq!(records, report.records);

        let stored = std::fs::read_to_string(&target.fingerprint_path).unwrap();
        assert_eq!(stored, format!("{}\n", report.fingerprint));
        assert_ne!(report.fingerprint, 0);

        let atlas_bytes = std::fs::read(&target.atlas_path).unwrap();
        let outcome = build_target(&target, BuildOptions::default()).unwrap();
        assert_eq!(
            outcome,
            BuildOutcome::Skipped {
                fingerprint: report.fingerprint
            }
        );
        assert_eq!(std::fs::read(&target.atlas_path).unwrap(), atlas_bytes);
    }

    #[test]
    fn test_built_atlas_holds_sprite_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        build_target(&target, BuildOptions::default()).unwrap();

        let loaded = LoadedAtlas::load_target(&target).unwrap();
        let red = loaded.rect("player_1").unwrap();
        assert_eq!(loaded.image.get_pixel(red.x, red.y).0, [255, 0, 0, 255]);
        assert_eq!(
            loaded.image.get_pixel(red.x + 15, red.y + 15).0,
            [255, 0, 0, 255]
        );
        let blue = loaded.sprite_pixels("player_2").unwrap();
        assert!(blue.pixels().all(|p| p.0 == [0, 0, 255, 255]));
    }

    #[test]
    fn test_source_change_triggers_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        let first = built(build_target(&target, BuildOptions::default()).unwrap());

        write_sprite(&target.source_dir, "player_2.png", 16, 16, [0, 255, 0, 255]);
        let second = built(build_target(&target, BuildOptions::default()).unwrap());
        assert!(matches!(second.reason, Some(StaleReason::Mismatch { .. })));
        assert_ne!(first.fingerprint, second.fingerprint);
    }

    #[test]
    fn test_force_rebuilds_fresh_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        build_target(&target, BuildOptions::default()).unwrap();

        let report = built(build_target(&target, BuildOptions { force: true }).unwrap());
        assert_eq!(report.reason, None);
    }

    #[test]
    fn test_too_many_sprites_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        write_sprite(&target.source_dir, "player_3.png", 16, 16, [0, 0, 0, 255]);

        let target = ResolvedTarget {
            max_sprites: 2,
            ..target
        };
        let err = build_target(&target, BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AtlasError::TooManySprites { found: 3, max: 2 }));
        assert!(!target.atlas_path.exists());
        assert!(!target.manifest_path.exists());
        assert!(!target.fingerprint_path.exists());
    }

    #[test]
    fn test_packing_failure_keeps_previous_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        let first = built(build_target(&target, BuildOptions::default()).unwrap());

        // A sprite that cannot fit next to the others.
        write_sprite(&target.source_dir, "boss.png", 64, 64, [1, 1, 1, 255]);
        let err = build_target(&target, BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AtlasError::PackingFailed { .. }));

        let stored = std::fs::read_to_string(&target.fingerprint_path).unwrap();
        assert_eq!(stored, format!("{}\n", first.fingerprint));
        assert!(fingerprint::should_rebuild(&target).unwrap());
    }

    #[test]
    fn test_packing_failure_on_first_build_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        let target = ResolvedTarget {
            width: 24,
            height: 24,
            ..target
        };

        let err = build_target(&target, BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AtlasError::PackingFailed { count: 2, .. }));
        assert!(!target.atlas_path.exists());
        assert!(!target.manifest_path.exists());
        assert!(!target.fingerprint_path.exists());
    }

    #[test]
    fn test_oversized_atlas_rejected_before_any_work() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        let target = ResolvedTarget {
            width: u32::MAX,
            height: u32::MAX,
            ..target
        };

        let err = build_target(&target, BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfig(_)));
        assert!(!target.atlas_path.exists());
        assert!(!target.fingerprint_path.exists());
    }

    #[test]
    fn test_empty_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = BuildTarget::default().resolve(dir.path());
        std::fs::create_dir_all(&target.source_dir).unwrap();

        let err = build_target(&target, BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AtlasError::NoSprites(_)));
    }

    #[test]
    fn test_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let target = BuildTarget::default().resolve(dir.path());

        let err = build_target(&target, BuildOptions::default()).unwrap_err();
        assert!(matches!(err, AtlasError::DirectoryUnreadable { .. }));
    }

    #[test]
    fn test_manifest_failure_does_not_commit_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let target = player_target(dir.path());
        // A directory where the manifest file should be makes the write fail.
        std::fs::create_dir_all(&target.manifest_path).unwrap();

        let report = built(build_target(&target, BuildOptions::default()).unwrap());
        assert!(!report.manifest_written);
        assert!(target.atlas_path.exists());
        assert!(!target.fingerprint_path.exists());
        assert!(fingerprint::should_rebuild(&target).unwrap());
    }

    #[test]
    fn test_build_all_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("resources");
        let config = PipelineConfig {
            resource_root: root.clone(),
            targets: vec![
                BuildTarget::new("chars").with_size(64, 64),
                BuildTarget::new("tiles").with_size(32, 32).with_packer(crate::atlas::PackerKind::Shelf),
            ],
        };
        write_sprite(&root.join("chars"), "hero.png", 16, 16, [1, 2, 3, 255]);
        write_sprite(&root.join("tiles"), "grass.png", 8, 8, [0, 200, 0, 255]);
        write_sprite(&root.join("tiles"), "water.bmp", 8, 8, [0, 0, 200, 255]);

        let before = status(&config).unwrap();
        assert!(before.iter().all(|(_, f)| f.is_stale()));

        let outcomes = build_all(&config, BuildOptions::default()).unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].0, "chars");
        assert!(outcomes.iter().all(|(_, o)| !o.is_skipped()));
        assert!(root.join("tiles.png").exists());
        assert!(root.join("tiles.meta").exists());
        assert!(root.join("tiles.hash").exists());

        let after = status(&config).unwrap();
        assert!(after.iter().all(|(_, f)| *f == Freshness::Fresh));

        let again = build_all(&config, BuildOptions::default()).unwrap();
        assert!(again.iter().all(|(_, o)| o.is_skipped()));
    }

    #[test]
    fn test_status_leaves_stale_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("resources");
        let config = PipelineConfig {
            resource_root: root.clone(),
            targets: vec![BuildTarget::new("chars").with_size(64, 64)],
        };
        write_sprite(&root.join("chars"), "hero.png", 16, 16, [1, 2, 3, 255]);

        for _ in 0..2 {
            let report = status(&config).unwrap();
            assert_eq!(report, vec![("chars".to_string(), Freshness::Stale(StaleReason::AtlasMissing))]);
        }
        assert!(!root.join("chars.png").exists());
        assert!(!root.join("chars.meta").exists());
        assert!(!root.join("chars.hash").exists());
    }

    #[test]
    fn test_build_all_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let config = PipelineConfig {
            resource_root: root.clone(),
            targets: vec![BuildTarget::new("empty"), BuildTarget::new("later")],
        };
        std::fs::create_dir_all(root.join("empty")).unwrap();
        write_sprite(&root.join("later"), "a.png", 4, 4, [0, 0, 0, 255]);

        assert!(build_all(&config, BuildOptions::default()).is_err());
        assert!(!root.join("later.png").exists());
    }
}
