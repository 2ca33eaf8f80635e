//! Atlas manifest serialization.
//!
//! The manifest is plain text: a line with the sprite count `N`, then `N`
//! lines of `<name> <x> <y> <width> <height>`. Records keep the order the
//! pipeline produced them in.

mod registry;

pub use registry::SpriteRegistry;

use crate::error::{AtlasError, Result};
use crate::types::{PlacementRect, SpriteRecord};
use std::fmt::Write as _;
use std::path::Path;

/// Render records in manifest format.
pub fn to_string(records: &[SpriteRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", records.len());
    for record in records {
        debug_assert!(!record.name.contains(char::is_whitespace));
        let _ = writeln!(out, "{} {}", record.name, record.rect);
    }
    out
}

/// Write a manifest file, creating parent directories.
pub fn write(path: &Path, records: &[SpriteRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, to_string(records))?;
    tracing::info!(path = %path.display(), count = records.len(), "successfully saved atlas manifest");
    Ok(())
}

fn parse_err(line: usize, message: impl Into<String>) -> AtlasError {
    AtlasError::ManifestParse {
        line,
        message: message.into(),
    }
}

fn parse_field(token: Option<&str>, field: &str, line: usize) -> Result<u32> {
    let token = token.ok_or_else(|| parse_err(line, format!("missing {}", field)))?;
    token
        .parse()
        .map_err(|_| parse_err(line, format!("invalid {} '{}'", field, token)))
}

/// Parse manifest text back into records.
pub fn parse(text: &str) -> Result<Vec<SpriteRecord>> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    let (_, header) = lines.next().ok_or_else(|| parse_err(1, "empty manifest"))?;
    let count: usize = header
        .parse()
        .map_err(|_| parse_err(1, format!("invalid sprite count '{}'", header)))?;

    // The header is untrusted; grow as records are actually read.
    let mut records = Vec::new();
    for _ in 0..count {
        let (number, line) = lines
            .next()
            .ok_or_else(|| parse_err(records.len() + 2, format!("expected {} records, found {}", count, records.len())))?;

        let mut tokens = line.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| parse_err(number, "missing sprite name"))?;
        let x = parse_field(tokens.next(), "x", number)?;
        let y = parse_field(tokens.next(), "y", number)?;
        let width = parse_field(tokens.next(), "width", number)?;
        let height = parse_field(tokens.next(), "height", number)?;
        if tokens.next().is_some() {
            return Err(parse_err(number, "unexpected trailing fields"));
        }

        records.push(SpriteRecord::new(name, PlacementRect::new(x, y, width, height)));
    }

    if let Some((number, _)) = lines.find(|(_, l)| !l.is_empty()) {
        return Err(parse_err(number, format!("more than {} records", count)));
    }

    Ok(records)
}

/// Read and parse a manifest file.
pub fn read(path: &Path) -> Result<Vec<SpriteRecord>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AtlasError::ManifestMissing(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    parse(&text)
}
