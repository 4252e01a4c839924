// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Saved pattern sets (one TOML file per preset)

use crate::error::{PresetError, TemplateError};
use crate::matcher::PatternEntry;
use crate::render::render_template;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const PRESET_EXTENSION: &str = "toml";

/// Patterns, template and sample input saved under a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub template: String,
    /// Input text that was loaded when the preset was saved.
    #[serde(default)]
    pub input: String,
    /// Local time of the last save. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
    // Arrays of tables must come last in TOML.
    #[serde(default)]
    pub patterns: Vec<PatternEntry>,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Render this preset's template against `input`.
    pub fn render(&self, input: &str) -> Result<String, TemplateError> {
        render_template(&self.template, &self.patterns, input)
    }

    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let content = fs::read_to_string(path).map_err(|source| PresetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| PresetError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the preset to `<dir>/<file_name(name)>.toml`, stamping `saved_at`.
    /// A file already holding a preset with another name is never overwritten;
    /// the stem gets a `-2`, `-3`, ... suffix instead.
    pub fn save(&mut self, dir: &Path) -> Result<PathBuf, PresetError> {
        if self.name.trim().is_empty() {
            return Err(PresetError::EmptyName);
        }
        self.name = self.name.trim().to_string();
        fs::create_dir_all(dir).map_err(|source| PresetError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        self.saved_at = Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
        let content = toml::to_string_pretty(self).map_err(|source| PresetError::Serialize {
            name: self.name.clone(),
            source,
        })?;
        let path = target_path(dir, &self.name);
        fs::write(&path, content).map_err(|source| PresetError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(preset = %self.name, path = %path.display(), "preset saved");
        Ok(path)
    }
}

/// First candidate file that is free or already holds the preset called `name`.
fn target_path(dir: &Path, name: &str) -> PathBuf {
    let stem = file_name(name);
    (1..)
        .map(|n| {
            let candidate = if n == 1 {
                stem.clone()
            } else {
                format!("{}-{}", stem, n)
            };
            dir.join(format!("{}.{}", candidate, PRESET_EXTENSION))
        })
        .find(|path| {
            !path.exists() || matches!(Preset::load(path), Ok(existing) if existing.name == name)
        })
        .unwrap_or_else(|| dir.join(format!("{}.{}", stem, PRESET_EXTENSION)))
}

/// File stem for a preset name: letters, digits, '-' and '_' kept, whitespace
/// turned into '_', everything else dropped.
pub fn file_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    if stem.is_empty() {
        "preset".to_string()
    } else {
        stem
    }
}

/// A preset found on disk.
#[derive(Debug, Clone)]
pub struct PresetEntry {
    pub path: PathBuf,
    pub preset: Preset,
    searchable: String,
}

impl PresetEntry {
    pub fn new(path: PathBuf, preset: Preset) -> Self {
        let pattern_names: Vec<&str> = preset.patterns.iter().map(|p| p.name.as_str()).collect();
        let searchable = format!("{}\n{}", preset.name, pattern_names.join(" "));
        Self {
            path,
            preset,
            searchable,
        }
    }

    pub fn name(&self) -> &str {
        &self.preset.name
    }
}

impl AsRef<str> for PresetEntry {
    fn as_ref(&self) -> &str {
        &self.searchable
    }
}

/// Every readable preset under `dir`, sorted by name. Unparseable files are
/// skipped with a warning.
pub fn list_presets(dir: &Path) -> Vec<PresetEntry> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != PRESET_EXTENSION) {
            continue;
        }
        match Preset::load(path) {
            Ok(preset) => entries.push(PresetEntry::new(path.to_path_buf(), preset)),
            Err(e) => tracing::warn!(error = %e, "skipping preset"),
        }
    }
    entries.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
    entries
}

/// Look up a preset by exact name.
pub fn find_preset(dir: &Path, name: &str) -> Result<PresetEntry, PresetError> {
    let name = name.trim();
    list_presets(dir)
        .into_iter()
        .find(|e| e.name() == name)
        .ok_or_else(|| PresetError::NotFound(name.to_string()))
}

pub fn delete_preset(dir: &Path, name: &str) -> Result<PathBuf, PresetError> {
    let entry = find_preset(dir, name)?;
    fs::remove_file(&entry.path).map_err(|source| PresetError::Write {
        path: entry.path.clone(),
        source,
    })?;
    tracing::info!(preset = %name, "preset deleted");
    Ok(entry.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample() -> Preset {
        Preset {
            name: "Order totals".to_string(),
            template: "{for total}{total.group(1)}{/for}".to_string(),
            input: "Total: 5\nTotal: 7".to_string(),
            saved_at: None,
            patterns: vec![PatternEntry::new("total", r"Total: (\d+)")],
        }
    }

    #[test]
    fn save_then_load_keeps_everything_but_the_timestamp() {
        let dir = tempdir().unwrap();
        let mut preset = sample();
        let path = preset.save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Order_totals.toml"));
        assert!(preset.saved_at.is_some());

        let loaded = Preset::load(&path).unwrap();
        assert_eq!(loaded, preset);
        assert_eq!(loaded.render(&loaded.input).unwrap(), "5\n7");
    }

    #[test]
    fn empty_name_is_rejected() {
        let dir = tempdir().unwrap();
        let mut preset = Preset::new("   ");
        assert!(matches!(preset.save(dir.path()), Err(PresetError::EmptyName)));
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(file_name("My preset"), "My_preset");
        assert_eq!(file_name("../etc/passwd"), "etcpasswd");
        assert_eq!(file_name("///"), "preset");
        assert_eq!(file_name("dates-2024_v2"), "dates-2024_v2");
    }

    #[test]
    fn colliding_names_get_their_own_files() {
        let dir = tempdir().unwrap();
        let first = Preset::new("my list").save(dir.path()).unwrap();
        let second = Preset::new("my_list").save(dir.path()).unwrap();
        assert_eq!(first, dir.path().join("my_list.toml"));
        assert_eq!(second, dir.path().join("my_list-2.toml"));

        // Saving again reuses the preset's own file.
        assert_eq!(Preset::new("my list").save(dir.path()).unwrap(), first);
        assert_eq!(Preset::new("my_list").save(dir.path()).unwrap(), second);
    }

    #[test]
    fn unreadable_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("preset.toml"), "name = [").unwrap();
        let path = Preset::new("???").save(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("preset-2.toml"));
        assert_eq!(
            fs::read_to_string(dir.path().join("preset.toml")).unwrap(),
            "name = ["
        );
    }

    #[test]
    fn listing_skips_broken_files_and_sorts_by_name() {
        let dir = tempdir().unwrap();
        Preset::new("beta").save(dir.path()).unwrap();
        Preset::new("Alpha").save(dir.path()).unwrap();
        fs::write(dir.path().join("broken.toml"), "name = [").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let names: Vec<String> = list_presets(dir.path())
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert_eq!(names, vec!["Alpha", "beta"]);
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        assert!(list_presets(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn find_and_delete() {
        let dir = tempdir().unwrap();
        sample().save(dir.path()).unwrap();

        let found = find_preset(dir.path(), "Order totals").unwrap();
        assert_eq!(found.preset.patterns.len(), 1);

        delete_preset(dir.path(), "Order totals").unwrap();
        assert!(matches!(
            find_preset(dir.path(), "Order totals"),
            Err(PresetError::NotFound(_))
        ));
    }

    #[test]
    fn missing_fields_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("minimal.toml");
        fs::write(&path, "name = \"minimal\"\n").unwrap();
        let loaded = Preset::load(&path).unwrap();
        assert_eq!(loaded, Preset::new("minimal"));
    }
}
