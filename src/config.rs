// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - A keyboard-driven regex template processor TUI for Linux

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Theme overrides in config.toml. Hex (#RRGGBB) or named colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub background: String,
    pub foreground: String,
    pub selection: String,
    pub border_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background: "black".to_string(),
            foreground: "white".to_string(),
            selection: "green".to_string(),
            border_color: "cyan".to_string(),
        }
    }
}

/// UI appearance.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Border style: "rounded", "double", "thick", "plain".
    pub border_style: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            border_style: "rounded".to_string(),
        }
    }
}

/// Input and template editor settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Show line numbers in the editors.
    pub line_numbers: bool,
    /// Tab width in spaces (1–16).
    pub tab_width: u8,
    /// Highlight `{...}` commands in the template editor.
    pub highlight_commands: bool,
    /// Re-render on every keystroke; otherwise only on the render key.
    pub live_render: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            line_numbers: true,
            tab_width: 4,
            highlight_commands: true,
            live_render: true,
        }
    }
}

/// Keybindings configuration (string form, e.g. "ctrl-q", "enter").
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    // Global
    pub quit: String,
    pub save: String,
    pub open_preset: String,
    pub command_palette: String,
    pub next_pane: String,
    pub prev_pane: String,
    pub toggle_view: String,
    pub render: String,
    // Generic (used in multiple contexts)
    pub escape: String,
    pub enter: String,
    pub backspace: String,
    pub move_up: String,
    pub move_down: String,
    pub move_up_alt: String,
    pub move_down_alt: String,
    pub delete: String,
    // Patterns pane
    pub pattern_new: String,
    pub pattern_edit: String,
    pub pattern_delete: String,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            quit: "ctrl-q".to_string(),
            save: "ctrl-s".to_string(),
            open_preset: "ctrl-o".to_string(),
            command_palette: "ctrl-p".to_string(),
            next_pane: "tab".to_string(),
            prev_pane: "backtab".to_string(),
            toggle_view: "f2".to_string(),
            render: "f5".to_string(),
            escape: "esc".to_string(),
            enter: "enter".to_string(),
            backspace: "backspace".to_string(),
            move_up: "k".to_string(),
            move_down: "j".to_string(),
            move_up_alt: "up".to_string(),
            move_down_alt: "down".to_string(),
            delete: "delete".to_string(),
            pattern_new: "n".to_string(),
            pattern_edit: "e".to_string(),
            pattern_delete: "d".to_string(),
        }
    }
}

/// Parses a key string (e.g. "ctrl-q", "enter", "f1") into a KeyEvent.
pub fn parse_key_event(s: &str) -> Option<KeyEvent> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split('-').collect();
    let (mut modifiers, key_part) = if parts.len() >= 2 {
        let mut mods = KeyModifiers::empty();
        for p in parts.iter().take(parts.len() - 1) {
            match *p {
                "ctrl" => mods.insert(KeyModifiers::CONTROL),
                "alt" => mods.insert(KeyModifiers::ALT),
                "shift" => mods.insert(KeyModifiers::SHIFT),
                _ => {}
            }
        }
        (mods, parts[parts.len() - 1])
    } else {
        (KeyModifiers::empty(), parts[0])
    };

    let code = match key_part {
        "enter" => KeyCode::Enter,
        "esc" | "escape" => KeyCode::Esc,
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "backtab" => {
            // Terminals report Shift+Tab as BackTab with SHIFT set.
            modifiers.insert(KeyModifiers::SHIFT);
            KeyCode::BackTab
        }
        "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        f if f.len() >= 2 && f.starts_with('f') && f[1..].chars().all(|c| c.is_ascii_digit()) => {
            let n: u8 = f[1..].parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
        _ => {
            let mut chars = key_part.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some(KeyEvent::new(code, modifiers))
}

/// Resolved keybindings (parsed KeyEvents for fast comparison).
#[derive(Debug, Clone)]
pub struct ResolvedKeys {
    pub quit: KeyEvent,
    pub save: KeyEvent,
    pub open_preset: KeyEvent,
    pub command_palette: KeyEvent,
    pub next_pane: KeyEvent,
    pub prev_pane: KeyEvent,
    pub toggle_view: KeyEvent,
    pub render: KeyEvent,
    pub escape: KeyEvent,
    pub enter: KeyEvent,
    pub backspace: KeyEvent,
    pub move_up: KeyEvent,
    pub move_down: KeyEvent,
    pub move_up_alt: KeyEvent,
    pub move_down_alt: KeyEvent,
    pub delete: KeyEvent,
    pub pattern_new: KeyEvent,
    pub pattern_edit: KeyEvent,
    pub pattern_delete: KeyEvent,
}

impl ResolvedKeys {
    pub fn from_config(keys: &KeysConfig) -> Self {
        fn parse_or(s: &str, default: KeyEvent) -> KeyEvent {
            parse_key_event(s).unwrap_or(default)
        }
        fn plain(code: KeyCode) -> KeyEvent {
            KeyEvent::new(code, KeyModifiers::empty())
        }
        fn ctrl(c: char) -> KeyEvent {
            KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
        }

        Self {
            quit: parse_or(&keys.quit, ctrl('q')),
            save: parse_or(&keys.save, ctrl('s')),
            open_preset: parse_or(&keys.open_preset, ctrl('o')),
            command_palette: parse_or(&keys.command_palette, ctrl('p')),
            next_pane: parse_or(&keys.next_pane, plain(KeyCode::Tab)),
            prev_pane: parse_or(
                &keys.prev_pane,
                KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT),
            ),
            toggle_view: parse_or(&keys.toggle_view, plain(KeyCode::F(2))),
            render: parse_or(&keys.render, plain(KeyCode::F(5))),
            escape: parse_or(&keys.escape, plain(KeyCode::Esc)),
            enter: parse_or(&keys.enter, plain(KeyCode::Enter)),
            backspace: parse_or(&keys.backspace, plain(KeyCode::Backspace)),
            move_up: parse_or(&keys.move_up, plain(KeyCode::Char('k'))),
            move_down: parse_or(&keys.move_down, plain(KeyCode::Char('j'))),
            move_up_alt: parse_or(&keys.move_up_alt, plain(KeyCode::Up)),
            move_down_alt: parse_or(&keys.move_down_alt, plain(KeyCode::Down)),
            delete: parse_or(&keys.delete, plain(KeyCode::Delete)),
            pattern_new: parse_or(&keys.pattern_new, plain(KeyCode::Char('n'))),
            pattern_edit: parse_or(&keys.pattern_edit, plain(KeyCode::Char('e'))),
            pattern_delete: parse_or(&keys.pattern_delete, plain(KeyCode::Char('d'))),
        }
    }
}

/// Formats a key config string for display (e.g. "ctrl-q" -> "Ctrl+Q").
pub fn key_display_string(s: &str) -> String {
    let s = s.trim();
    if s.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = s.split('-').collect();
    let (mods, key_part) = if parts.len() >= 2 {
        let mod_str: Vec<String> = parts[..parts.len() - 1]
            .iter()
            .map(|p| match *p {
                "ctrl" => "Ctrl",
                "alt" => "Alt",
                "shift" => "Shift",
                _ => *p,
            })
            .map(|s| s.to_string())
            .collect();
        (mod_str.join("+"), parts[parts.len() - 1])
    } else {
        (String::new(), parts[0])
    };

    let key_display = match key_part.to_lowercase().as_str() {
        "enter" => "Enter".to_string(),
        "esc" | "escape" => "Esc".to_string(),
        "backspace" => "Backspace".to_string(),
        "tab" => "Tab".to_string(),
        "backtab" => "Shift+Tab".to_string(),
        "delete" => "Delete".to_string(),
        "space" => "Space".to_string(),
        "up" => "↑".to_string(),
        "down" => "↓".to_string(),
        "left" => "←".to_string(),
        "right" => "→".to_string(),
        _ => key_part.to_uppercase(),
    };

    if mods.is_empty() {
        key_display
    } else {
        format!("{}+{}", mods, key_display)
    }
}

/// Application configuration loaded from config.toml.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory where presets are stored.
    pub presets_directory: String,
    /// Preset opened at startup when none is given on the command line.
    pub startup_preset: String,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keys: KeysConfig,
}

impl Default for Config {
    fn default() -> Self {
        let presets_directory = ProjectDirs::from("", "", "rexpad")
            .map(|d| d.data_dir().join("presets").display().to_string())
            .unwrap_or_else(|| "~/.local/share/rexpad/presets".to_string());
        Self {
            presets_directory,
            startup_preset: String::new(),
            theme: ThemeConfig::default(),
            editor: EditorConfig::default(),
            ui: UiConfig::default(),
            keys: KeysConfig::default(),
        }
    }
}

impl Config {
    pub fn presets_dir(&self) -> PathBuf {
        expand_path(&self.presets_directory)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "rexpad").context("Could not determine XDG directories")
}

/// Returns the rexpad config directory (~/.config/rexpad).
/// Creates it if it does not exist.
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;
    Ok(config_dir)
}

/// Returns the rexpad data directory (~/.local/share/rexpad), where the log lives.
pub fn ensure_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir)
}

/// Load config from ~/.config/rexpad/config.toml.
pub fn load_config() -> Result<Config> {
    let config_dir = ensure_config_dir()?;
    load_config_from(&config_dir.join("config.toml"))
}

/// Load config from `config_path`, writing a commented default file if missing.
pub fn load_config_from(config_path: &Path) -> Result<Config> {
    let config = if config_path.exists() {
        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?
    } else {
        let default = Config::default();
        let content = generate_default_config(&default);
        fs::write(config_path, content).with_context(|| {
            format!("Failed to write default config: {}", config_path.display())
        })?;
        tracing::info!(path = %config_path.display(), "wrote default config");
        default
    };

    Ok(config)
}

fn generate_default_config(config: &Config) -> String {
    let k = &config.keys;
    let t = &config.theme;
    let e = &config.editor;
    format!(
        r#"# Rexpad Configuration

# Directory where presets (patterns + template) are stored
presets_directory = "{}"

# Preset to open at startup (empty = start blank)
startup_preset = "{}"

[theme]
# Hex (#RRGGBB) or named colors. Override theme.toml for the main colors.
background = "{}"
foreground = "{}"
selection = "{}"
border_color = "{}"

[editor]
line_numbers = {}
tab_width = {}
highlight_commands = {}
# Re-render on every keystroke; when false, press the render key
live_render = {}

[ui]
# Border style: "rounded", "double", "thick", "plain"
border_style = "{}"

[keys]
# Global
quit = "{}"
save = "{}"
open_preset = "{}"
command_palette = "{}"
next_pane = "{}"
prev_pane = "{}"
toggle_view = "{}"
render = "{}"
# Generic
escape = "{}"
enter = "{}"
backspace = "{}"
move_up = "{}"
move_down = "{}"
move_up_alt = "{}"
move_down_alt = "{}"
delete = "{}"
# Patterns pane
pattern_new = "{}"
pattern_edit = "{}"
pattern_delete = "{}"
"#,
        config.presets_directory,
        config.startup_preset,
        t.background,
        t.foreground,
        t.selection,
        t.border_color,
        e.line_numbers,
        e.tab_width,
        e.highlight_commands,
        e.live_render,
        config.ui.border_style,
        k.quit,
        k.save,
        k.open_preset,
        k.command_palette,
        k.next_pane,
        k.prev_pane,
        k.toggle_view,
        k.render,
        k.escape,
        k.enter,
        k.backspace,
        k.move_up,
        k.move_down,
        k.move_up_alt,
        k.move_down_alt,
        k.delete,
        k.pattern_new,
        k.pattern_edit,
        k.pattern_delete,
    )
}

/// Resolves ~ in paths to the user's home directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();
    if path.starts_with("~/") || path == "~" {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/".to_string());
        PathBuf::from(path.replacen('~', &home, 1))
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn parses_key_strings() {
        assert_eq!(
            parse_key_event("ctrl-s"),
            Some(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_key_event("F12"),
            Some(KeyEvent::new(KeyCode::F(12), KeyModifiers::empty()))
        );
        assert_eq!(
            parse_key_event("backtab"),
            Some(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT))
        );
        assert_eq!(parse_key_event("f13"), None);
        assert_eq!(parse_key_event("nope"), None);
        assert_eq!(parse_key_event(""), None);
    }

    #[test]
    fn bad_bindings_fall_back_to_defaults() {
        let keys = KeysConfig {
            save: "not-a-key".to_string(),
            ..KeysConfig::default()
        };
        let resolved = ResolvedKeys::from_config(&keys);
        assert_eq!(
            resolved.save,
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)
        );
    }

    #[test]
    fn displays_keys() {
        assert_eq!(key_display_string("ctrl-q"), "Ctrl+Q");
        assert_eq!(key_display_string("f2"), "F2");
        assert_eq!(key_display_string("backtab"), "Shift+Tab");
        assert_eq!(key_display_string("up"), "↑");
    }

    #[test]
    fn writes_default_config_and_reads_it_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let first = load_config_from(&path).unwrap();
        assert!(path.exists());

        let second = load_config_from(&path).unwrap();
        assert_eq!(first.presets_directory, second.presets_directory);
        assert_eq!(second.keys.save, "ctrl-s");
        assert!(second.editor.live_render);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "presets_directory = \"~/p\"\n[editor]\ntab_width = 2\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.editor.tab_width, 2);
        assert!(config.editor.highlight_commands);
        assert_eq!(config.keys.quit, "ctrl-q");
        assert!(config.presets_dir().ends_with("p"));
    }
}
