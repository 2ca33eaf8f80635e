//! Sprite scanning: enumerate source images and probe their dimensions.

use super::list_sprite_files;
use crate::error::{AtlasError, Result};
use crate::types::SpriteInfo;
use std::collections::HashMap;
use std::path::Path;

/// Scan `dir` for sprites, reading only image headers.
///
/// Fails if more than `max_count` qualifying files are present, if any file's
/// dimensions cannot be probed, or if two files share a base name.
pub fn scan(dir: &Path, max_count: usize) -> Result<Vec<SpriteInfo>> {
    let files = list_sprite_files(dir)?;
    if files.len() > max_count {
        return Err(AtlasError::TooManySprites {
            found: files.len(),
            max: max_count,
        });
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut sprites: Vec<SpriteInfo> = Vec::with_capacity(files.len());

    for file in files {
        let name = file.base_name().to_string();
        if name.contains(char::is_whitespace) {
            return Err(AtlasError::InvalidConfig(format!(
                "sprite name '{}' contains whitespace and cannot be stored in a manifest",
                name
            )));
        }
        if let Some(&index) = seen.get(&name) {
            return Err(AtlasError::DuplicateSprite {
                name,
                first: sprites[index].path.clone(),
                second: file.path,
            });
        }

        let (width, height) =
            image::image_dimensions(&file.path).map_err(|source| AtlasError::SpriteProbe {
                path: file.path.clone(),
                source,
            })?;

        seen.insert(name.clone(), sprites.len());
        sprites.push(SpriteInfo {
            name,
            width,
            height,
            path: file.path,
        });
    }

    tracing::info!(count = sprites.len(), dir = %dir.display(), "sprites loaded from directory");
    Ok(sprites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]))
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn test_scan_probes_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "player_1.png", 16, 16);
        write_png(dir.path(), "wide.png", 32, 8);

        let sprites = scan(dir.path(), 8).unwrap();
        assert_eq!(sprites.len(), 2);
        assert_eq!(sprites[0].name, "player_1");
        assert_eq!((sprites[0].width, sprites[0].height), (16, 16));
        assert_eq!(sprites[1].name, "wide");
        assert_eq!((sprites[1].width, sprites[1].height), (32, 8));
    }

    #[test]
    fn test_scan_respects_max_count() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..3 {
            write_png(dir.path(), &format!("s{}.png", i), 4, 4);
        }

        assert_eq!(scan(dir.path(), 3).unwrap().len(), 3);
        let err = scan(dir.path(), 2).unwrap_err();
        assert!(matches!(err, AtlasError::TooManySprites { found: 3, max: 2 }));
    }

    #[test]
    fn test_scan_rejects_undecodable_header() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let err = scan(dir.path(), 8).unwrap_err();
        assert!(matches!(err, AtlasError::SpriteProbe { .. }));
    }

    #[test]
    fn test_scan_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "hero.png", 4, 4);
        RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]))
            .save(dir.path().join("hero.bmp"))
            .unwrap();

        let err = scan(dir.path(), 8).unwrap_err();
        match err {
            AtlasError::DuplicateSprite { name, .. } => assert_eq!(name, "hero"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_scan_rejects_whitespace_names() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "big hero.png", 4, 4);

        let err = scan(dir.path(), 8).unwrap_err();
        assert!(matches!(err, AtlasError::InvalidConfig(_)));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan(dir.path(), 8).unwrap().is_empty());
    }
}
