// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - A keyboard-driven regex template processor TUI for Linux

use crate::config::ThemeConfig;
use anyhow::{Context, Result};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

fn def(s: &str) -> ColorDef {
    ColorDef(s.to_string())
}

/// Visual theme configuration loaded from theme.toml.
/// Every visible color in the TUI is configurable.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub app_background: ColorDef,
    pub border: ColorDef,
    pub header: ColorDef,
    pub highlight: ColorDef,
    pub text: ColorDef,
    pub pane_border_active: ColorDef,
    pub pane_border_inactive: ColorDef,
    pub list_text_selected_fg: ColorDef,
    pub list_text_selected_bg: ColorDef,
    pub list_text_normal: ColorDef,
    pub output_text: ColorDef,
    pub search_match: ColorDef,
    pub help_text: ColorDef,
    pub editor_bg: ColorDef,
    pub editor_fg: ColorDef,
    pub editor_cursor: ColorDef,
    pub editor_line_number: ColorDef,
    /// Pattern matches highlighted in the input editor.
    pub input_match: ColorDef,
    pub syntax_variable: ColorDef,
    pub syntax_loop: ColorDef,
    pub syntax_math: ColorDef,
    pub syntax_unknown: ColorDef,
    pub diagnostic_error: ColorDef,
    pub diagnostic_warning: ColorDef,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            app_background: def("black"),
            border: def("cyan"),
            header: def("yellow"),
            highlight: def("magenta"),
            text: def("white"),
            pane_border_active: def("cyan"),
            pane_border_inactive: def("dark_gray"),
            list_text_selected_fg: def("green"),
            list_text_selected_bg: def("black"),
            list_text_normal: def("white"),
            output_text: def("white"),
            search_match: def("red"),
            help_text: def("white"),
            editor_bg: def("black"),
            editor_fg: def("white"),
            editor_cursor: def("cyan"),
            editor_line_number: def("dark_gray"),
            input_match: def("yellow"),
            syntax_variable: def("cyan"),
            syntax_loop: def("magenta"),
            syntax_math: def("green"),
            syntax_unknown: def("dark_gray"),
            diagnostic_error: def("red"),
            diagnostic_warning: def("yellow"),
        }
    }
}

/// Color definition supporting hex (#RRGGBB) or named colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ColorDef(String);

impl ColorDef {
    pub fn to_ratatui_color(&self) -> Result<Color> {
        let s = self.0.trim();
        // ratatui has no "orange"
        let normalized = match s.to_lowercase().as_str() {
            "orange1" | "orange" => "yellow",
            "orange2" | "dark_orange" => "dark_gray",
            _ => s,
        };
        Color::from_str(normalized).with_context(|| format!("Invalid color: {}", self.0))
    }
}

/// Load theme from ~/.config/rexpad/theme.toml, writing the defaults if missing.
pub fn load_theme(config_dir: &Path) -> Result<Theme> {
    let theme_path = config_dir.join("theme.toml");

    let theme = if theme_path.exists() {
        let content = fs::read_to_string(&theme_path)
            .with_context(|| format!("Failed to read theme: {}", theme_path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse theme: {}", theme_path.display()))?
    } else {
        let default = Theme::default();
        let content = generate_default_theme(&default);
        fs::write(&theme_path, content)
            .with_context(|| format!("Failed to write default theme: {}", theme_path.display()))?;
        default
    };

    Ok(theme)
}

fn generate_default_theme(theme: &Theme) -> String {
    fn cv(c: &ColorDef) -> String {
        format!("\"{}\"", c.0)
    }
    format!(
        r#"# Rexpad Theme Configuration
# Every visible color is configurable. Hex (#RRGGBB) or named colors.

app_background = {}
border = {}
header = {}
highlight = {}
text = {}

# Panes
pane_border_active = {}
pane_border_inactive = {}
list_text_selected_fg = {}
list_text_selected_bg = {}
list_text_normal = {}
output_text = {}

# Fuzzy match highlighting in the preset picker
search_match = {}

# Footer / help
help_text = {}

# Editors
editor_bg = {}
editor_fg = {}
editor_cursor = {}
editor_line_number = {}
input_match = {}

# Template syntax view
syntax_variable = {}
syntax_loop = {}
syntax_math = {}
syntax_unknown = {}
diagnostic_error = {}
diagnostic_warning = {}
"#,
        cv(&theme.app_background),
        cv(&theme.border),
        cv(&theme.header),
        cv(&theme.highlight),
        cv(&theme.text),
        cv(&theme.pane_border_active),
        cv(&theme.pane_border_inactive),
        cv(&theme.list_text_selected_fg),
        cv(&theme.list_text_selected_bg),
        cv(&theme.list_text_normal),
        cv(&theme.output_text),
        cv(&theme.search_match),
        cv(&theme.help_text),
        cv(&theme.editor_bg),
        cv(&theme.editor_fg),
        cv(&theme.editor_cursor),
        cv(&theme.editor_line_number),
        cv(&theme.input_match),
        cv(&theme.syntax_variable),
        cv(&theme.syntax_loop),
        cv(&theme.syntax_math),
        cv(&theme.syntax_unknown),
        cv(&theme.diagnostic_error),
        cv(&theme.diagnostic_warning),
    )
}

/// Resolved theme with Ratatui Style objects. No hardcoded colors.
#[derive(Clone)]
pub struct ResolvedTheme {
    pub app_background_style: Style,
    pub border_style: Style,
    pub header_style: Style,
    pub highlight_style: Style,
    pub text_style: Style,
    pub pane_border_active_style: Style,
    pub pane_border_inactive_style: Style,
    pub list_text_selected_style: Style,
    pub list_text_normal_style: Style,
    pub output_text_style: Style,
    pub search_match_style: Style,
    pub help_text_style: Style,
    pub editor_bg_style: Style,
    pub editor_fg_style: Style,
    pub editor_cursor_style: Style,
    pub editor_line_number_style: Style,
    pub input_match_style: Style,
    pub syntax_variable_style: Style,
    pub syntax_loop_style: Style,
    pub syntax_math_style: Style,
    pub syntax_unknown_style: Style,
    pub diagnostic_error_style: Style,
    pub diagnostic_warning_style: Style,
}

impl ResolvedTheme {
    /// Resolve theme.toml colors, letting the `[theme]` section of config.toml
    /// override background, foreground, selection and borders.
    pub fn resolve(theme: &Theme, overrides: Option<&ThemeConfig>) -> Result<Self> {
        let mut resolved = Self::from_theme(theme)?;
        if let Some(o) = overrides {
            let bg = def(&o.background).to_ratatui_color()?;
            let fg = def(&o.foreground).to_ratatui_color()?;
            let selection = def(&o.selection).to_ratatui_color()?;
            let border = def(&o.border_color).to_ratatui_color()?;
            resolved.app_background_style = Style::default().bg(bg);
            resolved.editor_bg_style = Style::default().bg(bg);
            resolved.text_style = Style::default().fg(fg);
            resolved.editor_fg_style = Style::default().fg(fg);
            resolved.output_text_style = Style::default().fg(fg);
            resolved.list_text_selected_style = resolved.list_text_selected_style.fg(selection);
            resolved.border_style = Style::default().fg(border);
            resolved.pane_border_active_style = Style::default().fg(border);
        }
        Ok(resolved)
    }

    pub fn from_theme(theme: &Theme) -> Result<Self> {
        Ok(Self {
            app_background_style: Style::default().bg(theme.app_background.to_ratatui_color()?),
            border_style: Style::default().fg(theme.border.to_ratatui_color()?),
            header_style: Style::default()
                .fg(theme.header.to_ratatui_color()?)
                .add_modifier(Modifier::BOLD),
            highlight_style: Style::default().fg(theme.highlight.to_ratatui_color()?),
            text_style: Style::default().fg(theme.text.to_ratatui_color()?),
            pane_border_active_style: Style::default()
                .fg(theme.pane_border_active.to_ratatui_color()?),
            pane_border_inactive_style: Style::default()
                .fg(theme.pane_border_inactive.to_ratatui_color()?),
            list_text_selected_style: Style::default()
                .fg(theme.list_text_selected_fg.to_ratatui_color()?)
                .bg(theme.list_text_selected_bg.to_ratatui_color()?)
                .add_modifier(Modifier::BOLD),
            list_text_normal_style: Style::default()
                .fg(theme.list_text_normal.to_ratatui_color()?),
            output_text_style: Style::default().fg(theme.output_text.to_ratatui_color()?),
            search_match_style: Style::default()
                .fg(theme.search_match.to_ratatui_color()?)
                .add_modifier(Modifier::BOLD),
            help_text_style: Style::default().fg(theme.help_text.to_ratatui_color()?),
            editor_bg_style: Style::default().bg(theme.editor_bg.to_ratatui_color()?),
            editor_fg_style: Style::default().fg(theme.editor_fg.to_ratatui_color()?),
            editor_cursor_style: Style::default()
                .fg(theme.editor_cursor.to_ratatui_color()?)
                .add_modifier(Modifier::REVERSED),
            editor_line_number_style: Style::default()
                .fg(theme.editor_line_number.to_ratatui_color()?),
            input_match_style: Style::default()
                .fg(theme.input_match.to_ratatui_color()?)
                .add_modifier(Modifier::UNDERLINED),
            syntax_variable_style: Style::default()
                .fg(theme.syntax_variable.to_ratatui_color()?),
            syntax_loop_style: Style::default()
                .fg(theme.syntax_loop.to_ratatui_color()?)
                .add_modifier(Modifier::BOLD),
            syntax_math_style: Style::default().fg(theme.syntax_math.to_ratatui_color()?),
            syntax_unknown_style: Style::default()
                .fg(theme.syntax_unknown.to_ratatui_color()?)
                .add_modifier(Modifier::ITALIC),
            diagnostic_error_style: Style::default()
                .fg(theme.diagnostic_error.to_ratatui_color()?)
                .add_modifier(Modifier::BOLD),
            diagnostic_warning_style: Style::default()
                .fg(theme.diagnostic_warning.to_ratatui_color()?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_theme_resolves() {
        assert!(ResolvedTheme::resolve(&Theme::default(), Some(&ThemeConfig::default())).is_ok());
    }

    #[test]
    fn hex_and_orange_colors_parse() {
        assert_eq!(def("#ff0000").to_ratatui_color().unwrap(), Color::Rgb(255, 0, 0));
        assert_eq!(def("orange").to_ratatui_color().unwrap(), Color::Yellow);
        assert!(def("not a color").to_ratatui_color().is_err());
    }

    #[test]
    fn writes_default_theme_once() {
        let dir = tempdir().unwrap();
        load_theme(dir.path()).unwrap();
        let written = fs::read_to_string(dir.path().join("theme.toml")).unwrap();
        assert!(written.contains("syntax_loop = \"magenta\""));
        assert!(load_theme(dir.path()).is_ok());
    }
}
