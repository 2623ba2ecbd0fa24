use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::render::Mode;
use crate::synthesize::SynthesisLimits;

pub const CONFIG_FILENAME: &str = "vietphrase-engine.toml";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub dictionaries: DictionariesSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineSection {
    /// Display mode: "plain" (canonical meaning) or "all" (every candidate).
    #[serde(default)]
    pub mode: Option<String>,

    #[serde(default)]
    pub max_span_segments: Option<usize>,
    #[serde(default)]
    pub max_combinations: Option<usize>,
    #[serde(default)]
    pub max_suggestions: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DictionariesSection {
    /// Directory holding the dictionary .txt files. Relative paths resolve
    /// against the config file's directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// The user's permanent override list (`key=value` lines).
    #[serde(default)]
    pub names_file: Option<PathBuf>,
    /// Optional JSON snapshot of the parsed store.
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
}

impl AppConfig {
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.engine.mode.as_deref().map(str::trim) {
            Some("all") | Some("literal") => Mode::AllMeanings,
            _ => Mode::Plain,
        }
    }

    #[must_use]
    pub fn synthesis_limits(&self) -> SynthesisLimits {
        let defaults = SynthesisLimits::default();
        SynthesisLimits {
            max_span_segments: self
                .engine
                .max_span_segments
                .unwrap_or(defaults.max_span_segments),
            max_combinations: self
                .engine
                .max_combinations
                .unwrap_or(defaults.max_combinations),
            max_suggestions: self
                .engine
                .max_suggestions
                .unwrap_or(defaults.max_suggestions),
        }
    }
}

fn find_file_upwards(start_dir: &Path, filename: &str, max_levels: usize) -> Option<PathBuf> {
    let mut dir = start_dir;
    for _ in 0..=max_levels {
        let candidate = dir.join(filename);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
    None
}

/// Look for the config next to the working data first, then upwards from the
/// current directory and the executable.
pub fn find_default_config(workdir: &Path, filename: &str) -> Option<PathBuf> {
    if let Some(p) = find_file_upwards(workdir, filename, 8) {
        return Some(p);
    }
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, filename, 8) {
            return Some(p);
        }
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, filename, 8) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}
