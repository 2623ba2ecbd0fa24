use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::dictionary::NamedDictionary;

/// Parsed-dictionary snapshot on disk, so repeated runs skip re-parsing the
/// raw dictionary files. The snapshot is a plain JSON dump of the store; it
/// carries no versioning beyond the shape itself, delete it to force a
/// re-parse.
pub fn save_snapshot(path: &Path, dictionaries: &[NamedDictionary]) -> anyhow::Result<()> {
    let json = serde_json::to_string(dictionaries).context("serialize dictionary snapshot")?;
    fs::write(path, json).with_context(|| format!("write snapshot: {}", path.display()))?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<Vec<NamedDictionary>> {
    let json =
        fs::read_to_string(path).with_context(|| format!("read snapshot: {}", path.display()))?;
    let dicts: Vec<NamedDictionary> =
        serde_json::from_str(&json).context("parse dictionary snapshot")?;
    Ok(dicts)
}
