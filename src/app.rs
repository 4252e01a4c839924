// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - A keyboard-driven regex template processor TUI for Linux

use crate::config::{key_display_string, load_config, Config, EditorConfig, ResolvedKeys};
use crate::picker::{filter_presets, get_match_indices};
use crate::theme::{load_theme, ResolvedTheme};
use anyhow::Result;
use crossterm::event::KeyEvent;
use nucleo_matcher::{Config as MatcherConfig, Matcher};
use rexpad::highlight::{validate, Diagnostic, Severity};
use rexpad::matcher::{is_valid_name, match_all, PatternEntry};
use rexpad::preset::{find_preset, list_presets, Preset, PresetEntry};
use rexpad::render_with;
use std::path::PathBuf;
use tui_textarea::{Input, TextArea};

/// Highlights `{...}` commands in the template editor.
const COMMAND_PATTERN: &str = r"\{[^{}\n]*\}";

/// Which pane or popup has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Patterns,
    Input,
    Template,
    Output,
    /// New / edit pattern popup.
    PatternEditor,
    /// Fuzzy preset picker.
    PresetPicker,
    /// Preset name prompt.
    SavePrompt,
    CommandPalette,
}

impl Focus {
    /// Panes in Tab order.
    pub const PANES: [Focus; 4] = [Focus::Patterns, Focus::Input, Focus::Template, Focus::Output];

    pub fn is_pane(self) -> bool {
        Self::PANES.contains(&self)
    }
}

/// What the right-hand pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputView {
    Rendered,
    Syntax,
}

/// Field being edited in the pattern popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternField {
    Name,
    Regex,
}

/// Command palette action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    NewPattern,
    EditPattern,
    DeletePattern,
    SavePreset,
    SavePresetAs,
    OpenPreset,
    NewPreset,
    ToggleView,
    ClearInput,
    Render,
}

impl CommandAction {
    pub fn label(&self) -> &'static str {
        match self {
            CommandAction::NewPattern => "New Pattern",
            CommandAction::EditPattern => "Edit Pattern",
            CommandAction::DeletePattern => "Delete Pattern",
            CommandAction::SavePreset => "Save Preset",
            CommandAction::SavePresetAs => "Save Preset As",
            CommandAction::OpenPreset => "Open Preset",
            CommandAction::NewPreset => "New Preset",
            CommandAction::ToggleView => "Toggle Output / Syntax View",
            CommandAction::ClearInput => "Clear Input",
            CommandAction::Render => "Render Now",
        }
    }

    pub fn all() -> &'static [CommandAction] {
        &[
            CommandAction::NewPattern,
            CommandAction::EditPattern,
            CommandAction::DeletePattern,
            CommandAction::SavePreset,
            CommandAction::SavePresetAs,
            CommandAction::OpenPreset,
            CommandAction::NewPreset,
            CommandAction::ToggleView,
            CommandAction::ClearInput,
            CommandAction::Render,
        ]
    }
}

/// Main application state.
pub struct App {
    pub config: Config,
    pub resolved_keys: ResolvedKeys,
    pub theme: ResolvedTheme,
    pub presets_dir: PathBuf,

    pub patterns: Vec<PatternEntry>,
    pub pattern_selected: usize,
    /// Matches per pattern; `None` when the regex does not compile.
    pub match_counts: Vec<Option<usize>>,

    pub input: TextArea<'static>,
    pub template: TextArea<'static>,

    pub output: String,
    /// Set when a pattern fails to compile; the output is stale meanwhile.
    pub render_error: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub output_view: OutputView,
    pub output_scroll: u16,

    pub focus: Focus,
    /// Pane that gets focus back when a popup closes.
    pub last_pane: Focus,
    pub preset_name: Option<String>,
    pub dirty: bool,
    pub message: Option<String>,

    // Pattern editor popup
    pub edit_name: String,
    pub edit_regex: String,
    pub edit_field: PatternField,
    pub editing_index: Option<usize>,
    pub edit_error: Option<String>,

    // Preset picker
    pub picker_presets: Vec<PresetEntry>,
    pub picker_filtered: Vec<PresetEntry>,
    pub picker_query: String,
    pub picker_selected: usize,
    pub picker_match_indices: Vec<Vec<u32>>,
    picker_matcher: Matcher,

    // Save-as prompt
    pub save_input: String,

    // Command palette
    pub command_palette_query: String,
    pub command_palette_filtered: Vec<CommandAction>,
    pub command_palette_selected: usize,
}

impl App {
    pub fn new(startup_preset: Option<String>, presets_dir: Option<PathBuf>) -> Result<Self> {
        let config = load_config()?;
        let config_dir = crate::config::ensure_config_dir()?;
        let theme_raw = load_theme(&config_dir)?;
        let theme = ResolvedTheme::resolve(&theme_raw, Some(&config.theme))?;

        let startup = startup_preset.or_else(|| {
            let name = config.startup_preset.trim();
            (!name.is_empty()).then(|| name.to_string())
        });

        let mut app = Self::from_parts(config, theme);
        if let Some(dir) = presets_dir {
            app.presets_dir = dir;
        }
        if let Some(name) = startup {
            match find_preset(&app.presets_dir, &name) {
                Ok(entry) => app.load_preset(entry.preset),
                Err(e) => app.message = Some(e.to_string()),
            }
        }
        Ok(app)
    }

    /// Build an empty session from already loaded config and theme.
    pub fn from_parts(config: Config, theme: ResolvedTheme) -> Self {
        let presets_dir = config.presets_dir();
        let resolved_keys = ResolvedKeys::from_config(&config.keys);
        let input = new_textarea(Vec::new());
        let template = new_textarea(Vec::new());

        let mut app = Self {
            config,
            resolved_keys,
            theme,
            presets_dir,
            patterns: Vec::new(),
            pattern_selected: 0,
            match_counts: Vec::new(),
            input,
            template,
            output: String::new(),
            render_error: None,
            diagnostics: Vec::new(),
            output_view: OutputView::Rendered,
            output_scroll: 0,
            focus: Focus::Input,
            last_pane: Focus::Input,
            preset_name: None,
            dirty: false,
            message: None,
            edit_name: String::new(),
            edit_regex: String::new(),
            edit_field: PatternField::Name,
            editing_index: None,
            edit_error: None,
            picker_presets: Vec::new(),
            picker_filtered: Vec::new(),
            picker_query: String::new(),
            picker_selected: 0,
            picker_match_indices: Vec::new(),
            picker_matcher: Matcher::new(MatcherConfig::DEFAULT),
            save_input: String::new(),
            command_palette_query: String::new(),
            command_palette_filtered: CommandAction::all().to_vec(),
            command_palette_selected: 0,
        };
        app.apply_editor_styles();
        app.recompute();
        app
    }

    /// Returns the display string for a keybinding action (e.g. "save" -> "Ctrl+S").
    pub fn get_key_display_string(&self, action_name: &str) -> String {
        let k = &self.config.keys;
        let s = match action_name {
            "quit" => &k.quit,
            "save" => &k.save,
            "open_preset" => &k.open_preset,
            "command_palette" => &k.command_palette,
            "next_pane" => &k.next_pane,
            "prev_pane" => &k.prev_pane,
            "toggle_view" => &k.toggle_view,
            "render" => &k.render,
            "escape" => &k.escape,
            "enter" => &k.enter,
            "pattern_new" => &k.pattern_new,
            "pattern_edit" => &k.pattern_edit,
            "pattern_delete" => &k.pattern_delete,
            _ => return String::new(),
        };
        key_display_string(s)
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join("\n")
    }

    pub fn template_text(&self) -> String {
        self.template.lines().join("\n")
    }

    pub fn pattern_names(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name.as_str()).collect()
    }

    /// Run the patterns and render the template.
    pub fn recompute(&mut self) {
        let input = self.input_text();
        let template = self.template_text();

        match match_all(&self.patterns, &input) {
            Ok(matches) => {
                self.match_counts = self
                    .patterns
                    .iter()
                    .map(|p| matches.get(&p.name).map(<[_]>::len))
                    .collect();
                self.output = render_with(&template, &matches);
                self.render_error = None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "render skipped");
                self.match_counts = self
                    .patterns
                    .iter()
                    .map(|p| p.compile().ok().map(|re| re.find_iter(&input).count()))
                    .collect();
                self.render_error = Some(e.to_string());
            }
        }

        let names = self.pattern_names();
        self.diagnostics = validate(&template, &names);
    }

    /// Called after any edit to patterns, input or template.
    fn changed(&mut self) {
        self.dirty = true;
        if self.config.editor.live_render {
            self.recompute();
        }
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    fn apply_editor_styles(&mut self) {
        apply_theme_to_textarea(&self.theme, &mut self.input, &self.config.editor);
        apply_theme_to_textarea(&self.theme, &mut self.template, &self.config.editor);
        if self.config.editor.highlight_commands {
            let _ = self.template.set_search_pattern(COMMAND_PATTERN);
            self.template.set_search_style(self.theme.syntax_variable_style);
        }
        self.input.set_search_style(self.theme.input_match_style);
        self.highlight_selected_pattern();
    }

    /// Underline matches of the selected pattern in the input editor.
    fn highlight_selected_pattern(&mut self) {
        let pattern = self
            .patterns
            .get(self.pattern_selected)
            .map(|p| p.pattern.as_str())
            .unwrap_or("");
        if self.input.set_search_pattern(pattern).is_err() {
            let _ = self.input.set_search_pattern("");
        }
    }

    /// Feed a key to the focused editor. Returns true if the text changed.
    pub fn editor_input(&mut self, key: KeyEvent) -> bool {
        let input: Input = key.into();
        let modified = match self.focus {
            Focus::Input => self.input.input(input),
            Focus::Template => self.template.input(input),
            _ => false,
        };
        if modified {
            self.changed();
        }
        modified
    }

    // Pane navigation
    pub fn next_pane(&mut self) {
        self.cycle_pane(1);
    }

    pub fn prev_pane(&mut self) {
        self.cycle_pane(Focus::PANES.len() - 1);
    }

    fn cycle_pane(&mut self, step: usize) {
        let idx = Focus::PANES
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or(0);
        self.focus = Focus::PANES[(idx + step) % Focus::PANES.len()];
        self.last_pane = self.focus;
    }

    fn open_popup(&mut self, popup: Focus) {
        if self.focus.is_pane() {
            self.last_pane = self.focus;
        }
        self.focus = popup;
    }

    fn close_popup(&mut self) {
        self.focus = self.last_pane;
    }

    // Patterns pane
    pub fn pattern_move_up(&mut self) {
        if self.pattern_selected > 0 {
            self.pattern_selected -= 1;
            self.highlight_selected_pattern();
        }
    }

    pub fn pattern_move_down(&mut self) {
        if self.pattern_selected + 1 < self.patterns.len() {
            self.pattern_selected += 1;
            self.highlight_selected_pattern();
        }
    }

    pub fn open_new_pattern(&mut self) {
        self.editing_index = None;
        self.edit_name.clear();
        self.edit_regex.clear();
        self.edit_field = PatternField::Name;
        self.edit_error = None;
        self.open_popup(Focus::PatternEditor);
    }

    pub fn open_edit_pattern(&mut self) {
        let Some(entry) = self.patterns.get(self.pattern_selected) else {
            self.message = Some("No pattern selected".to_string());
            return;
        };
        self.edit_name = entry.name.clone();
        self.edit_regex = entry.pattern.clone();
        self.editing_index = Some(self.pattern_selected);
        self.edit_field = PatternField::Regex;
        self.edit_error = None;
        self.open_popup(Focus::PatternEditor);
    }

    pub fn exit_pattern_editor(&mut self) {
        self.edit_error = None;
        self.close_popup();
    }

    pub fn edit_toggle_field(&mut self) {
        self.edit_field = match self.edit_field {
            PatternField::Name => PatternField::Regex,
            PatternField::Regex => PatternField::Name,
        };
    }

    pub fn edit_add_char(&mut self, c: char) {
        match self.edit_field {
            PatternField::Name => self.edit_name.push(c),
            PatternField::Regex => self.edit_regex.push(c),
        }
    }

    pub fn edit_backspace(&mut self) {
        match self.edit_field {
            PatternField::Name => self.edit_name.pop(),
            PatternField::Regex => self.edit_regex.pop(),
        };
    }

    /// Validate and store the pattern being edited. Keeps the popup open on error.
    pub fn confirm_pattern_edit(&mut self) -> bool {
        let name = self.edit_name.trim().to_string();
        if !is_valid_name(&name) {
            self.edit_error = Some(
                "Name must start with a letter and use only letters, digits or _".to_string(),
            );
            return false;
        }
        let duplicate = self
            .patterns
            .iter()
            .enumerate()
            .any(|(i, p)| p.name == name && Some(i) != self.editing_index);
        if duplicate {
            self.edit_error = Some(format!("A pattern named '{}' already exists", name));
            return false;
        }
        let entry = PatternEntry::new(name, self.edit_regex.clone());
        if let Err(e) = entry.compile() {
            self.edit_error = Some(e.to_string());
            return false;
        }

        match self.editing_index {
            Some(i) if i < self.patterns.len() => {
                self.patterns[i] = entry;
                self.pattern_selected = i;
            }
            _ => {
                self.patterns.push(entry);
                self.pattern_selected = self.patterns.len() - 1;
            }
        }
        self.edit_error = None;
        self.close_popup();
        self.highlight_selected_pattern();
        self.changed();
        true
    }

    pub fn delete_selected_pattern(&mut self) {
        if self.pattern_selected >= self.patterns.len() {
            return;
        }
        let removed = self.patterns.remove(self.pattern_selected);
        if self.pattern_selected >= self.patterns.len() {
            self.pattern_selected = self.patterns.len().saturating_sub(1);
        }
        self.message = Some(format!("Deleted pattern '{}'", removed.name));
        self.highlight_selected_pattern();
        self.changed();
    }

    // Output pane
    pub fn toggle_output_view(&mut self) {
        self.output_view = match self.output_view {
            OutputView::Rendered => OutputView::Syntax,
            OutputView::Syntax => OutputView::Rendered,
        };
        self.output_scroll = 0;
    }

    pub fn output_scroll_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn output_scroll_down(&mut self) {
        self.output_scroll = self.output_scroll.saturating_add(1);
    }

    pub fn clear_input(&mut self) {
        self.input = new_textarea(Vec::new());
        self.apply_editor_styles();
        self.changed();
    }

    // Presets
    pub fn new_preset(&mut self) {
        self.patterns.clear();
        self.pattern_selected = 0;
        self.input = new_textarea(Vec::new());
        self.template = new_textarea(Vec::new());
        self.preset_name = None;
        self.apply_editor_styles();
        self.recompute();
        self.dirty = false;
        self.message = Some("New preset".to_string());
    }

    pub fn load_preset(&mut self, preset: Preset) {
        tracing::info!(preset = %preset.name, "preset loaded");
        self.patterns = preset.patterns;
        self.pattern_selected = 0;
        self.input = new_textarea(text_lines(&preset.input));
        self.template = new_textarea(text_lines(&preset.template));
        self.message = Some(format!("Opened '{}'", preset.name));
        self.preset_name = Some(preset.name);
        self.apply_editor_styles();
        self.recompute();
        self.dirty = false;
    }

    pub fn current_preset(&self, name: &str) -> Preset {
        Preset {
            name: name.to_string(),
            template: self.template_text(),
            input: self.input_text(),
            saved_at: None,
            patterns: self.patterns.clone(),
        }
    }

    /// Save under the current name, or ask for one.
    pub fn save_preset(&mut self) {
        match self.preset_name.clone() {
            Some(name) => self.save_preset_as(&name),
            None => self.enter_save_prompt(),
        }
    }

    pub fn save_preset_as(&mut self, name: &str) {
        let mut preset = self.current_preset(name);
        match preset.save(&self.presets_dir) {
            Ok(_) => {
                self.message = Some(format!("Saved '{}'", preset.name));
                self.preset_name = Some(preset.name);
                self.dirty = false;
            }
            Err(e) => {
                tracing::warn!(error = %e, "save failed");
                self.message = Some(e.to_string());
            }
        }
    }

    pub fn enter_save_prompt(&mut self) {
        self.save_input = self.preset_name.clone().unwrap_or_default();
        self.open_popup(Focus::SavePrompt);
    }

    pub fn exit_save_prompt(&mut self) {
        self.save_input.clear();
        self.close_popup();
    }

    pub fn save_prompt_add_char(&mut self, c: char) {
        self.save_input.push(c);
    }

    pub fn save_prompt_backspace(&mut self) {
        self.save_input.pop();
    }

    pub fn confirm_save_prompt(&mut self) {
        let name = self.save_input.trim().to_string();
        if name.is_empty() {
            self.message = Some("Preset name is empty".to_string());
            return;
        }
        self.close_popup();
        self.save_preset_as(&name);
        self.save_input.clear();
    }

    // Preset picker
    pub fn enter_preset_picker(&mut self) {
        self.picker_presets = list_presets(&self.presets_dir);
        self.picker_query.clear();
        self.picker_selected = 0;
        self.apply_picker_filter();
        self.open_popup(Focus::PresetPicker);
    }

    pub fn exit_preset_picker(&mut self) {
        self.close_popup();
    }

    pub fn picker_add_char(&mut self, c: char) {
        self.picker_query.push(c);
        self.apply_picker_filter();
        self.picker_selected = 0;
    }

    pub fn picker_backspace(&mut self) {
        self.picker_query.pop();
        self.apply_picker_filter();
    }

    fn apply_picker_filter(&mut self) {
        self.picker_filtered =
            filter_presets(&self.picker_presets, &self.picker_query, &mut self.picker_matcher);
        self.picker_match_indices = self
            .picker_filtered
            .iter()
            .map(|e| get_match_indices(e.name(), &self.picker_query, &mut self.picker_matcher))
            .collect();
        if self.picker_selected >= self.picker_filtered.len() {
            self.picker_selected = self.picker_filtered.len().saturating_sub(1);
        }
    }

    pub fn picker_move_up(&mut self) {
        if self.picker_selected > 0 {
            self.picker_selected -= 1;
        }
    }

    pub fn picker_move_down(&mut self) {
        if self.picker_selected + 1 < self.picker_filtered.len() {
            self.picker_selected += 1;
        }
    }

    pub fn open_selected_preset(&mut self) {
        let Some(entry) = self.picker_filtered.get(self.picker_selected).cloned() else {
            return;
        };
        self.close_popup();
        self.load_preset(entry.preset);
    }

    // Command palette
    pub fn enter_command_palette(&mut self) {
        self.command_palette_query.clear();
        self.command_palette_filtered = CommandAction::all().to_vec();
        self.command_palette_selected = 0;
        self.open_popup(Focus::CommandPalette);
    }

    pub fn exit_command_palette(&mut self) {
        self.close_popup();
    }

    pub fn command_palette_add_char(&mut self, c: char) {
        self.command_palette_query.push(c);
        self.apply_command_palette_filter();
    }

    pub fn command_palette_backspace(&mut self) {
        self.command_palette_query.pop();
        self.apply_command_palette_filter();
    }

    fn apply_command_palette_filter(&mut self) {
        let q = self.command_palette_query.to_lowercase();
        self.command_palette_filtered = CommandAction::all()
            .iter()
            .filter(|a| a.label().to_lowercase().contains(&q))
            .copied()
            .collect();
        self.command_palette_selected = 0;
    }

    pub fn command_palette_move_up(&mut self) {
        if self.command_palette_selected > 0 {
            self.command_palette_selected -= 1;
        }
    }

    pub fn command_palette_move_down(&mut self) {
        if self.command_palette_selected + 1 < self.command_palette_filtered.len() {
            self.command_palette_selected += 1;
        }
    }

    pub fn get_command_palette_action(&self) -> Option<CommandAction> {
        self.command_palette_filtered
            .get(self.command_palette_selected)
            .copied()
    }

    /// Close the palette and run `action`.
    pub fn execute_command(&mut self, action: CommandAction) {
        self.exit_command_palette();
        match action {
            CommandAction::NewPattern => self.open_new_pattern(),
            CommandAction::EditPattern => self.open_edit_pattern(),
            CommandAction::DeletePattern => self.delete_selected_pattern(),
            CommandAction::SavePreset => self.save_preset(),
            CommandAction::SavePresetAs => self.enter_save_prompt(),
            CommandAction::OpenPreset => self.enter_preset_picker(),
            CommandAction::NewPreset => self.new_preset(),
            CommandAction::ToggleView => self.toggle_output_view(),
            CommandAction::ClearInput => self.clear_input(),
            CommandAction::Render => self.recompute(),
        }
    }
}

fn text_lines(text: &str) -> Vec<String> {
    text.lines().map(|s| s.to_string()).collect()
}

fn new_textarea(lines: Vec<String>) -> TextArea<'static> {
    let mut textarea = if lines.is_empty() {
        TextArea::default()
    } else {
        TextArea::new(lines)
    };
    textarea.set_max_histories(50);
    textarea
}

fn apply_theme_to_textarea(
    theme: &ResolvedTheme,
    textarea: &mut TextArea<'static>,
    editor_config: &EditorConfig,
) {
    let editor_style = theme.editor_fg_style.patch(theme.editor_bg_style);
    textarea.set_style(editor_style);
    textarea.set_cursor_style(theme.editor_cursor_style);
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    if editor_config.line_numbers {
        textarea.set_line_number_style(theme.editor_line_number_style);
    } else {
        textarea.remove_line_number();
    }
    textarea.set_tab_length(editor_config.tab_width.clamp(1, 16));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    fn test_app() -> (App, TempDir) {
        let dir = tempdir().unwrap();
        let theme = ResolvedTheme::from_theme(&Theme::default()).unwrap();
        let mut app = App::from_parts(Config::default(), theme);
        app.presets_dir = dir.path().to_path_buf();
        (app, dir)
    }

    fn add_pattern(app: &mut App, name: &str, regex: &str) -> bool {
        app.open_new_pattern();
        app.edit_name = name.to_string();
        app.edit_regex = regex.to_string();
        app.confirm_pattern_edit()
    }

    #[test]
    fn renders_live_as_patterns_and_text_change() {
        let (mut app, _dir) = test_app();
        app.template = new_textarea(vec!["{for p}[{p.group(0)}]{/for}".to_string()]);
        app.input = new_textarea(vec!["a1 b2".to_string()]);
        assert!(add_pattern(&mut app, "p", r"\w\d"));
        assert_eq!(app.output, "[a1]\n[b2]");
        assert_eq!(app.match_counts, vec![Some(2)]);
        assert!(app.diagnostics.is_empty());
        assert!(app.dirty);
    }

    #[test]
    fn pattern_editor_rejects_bad_input() {
        let (mut app, _dir) = test_app();
        assert!(!add_pattern(&mut app, "1bad", "x"));
        assert!(app.edit_error.is_some());
        assert_eq!(app.focus, Focus::PatternEditor);

        assert!(!add_pattern(&mut app, "ok", "("));
        assert!(add_pattern(&mut app, "ok", "x"));
        assert_eq!(app.focus, Focus::Input);
        assert!(!add_pattern(&mut app, "ok", "y"));
        assert!(app.edit_error.as_deref().unwrap().contains("already exists"));
    }

    #[test]
    fn editing_keeps_position_and_allows_same_name() {
        let (mut app, _dir) = test_app();
        add_pattern(&mut app, "a", "1");
        add_pattern(&mut app, "b", "2");
        app.pattern_selected = 0;
        app.open_edit_pattern();
        app.edit_regex = "one".to_string();
        assert!(app.confirm_pattern_edit());
        assert_eq!(app.patterns[0], PatternEntry::new("a", "one"));
        assert_eq!(app.patterns.len(), 2);
    }

    #[test]
    fn delete_clamps_selection() {
        let (mut app, _dir) = test_app();
        add_pattern(&mut app, "a", "1");
        add_pattern(&mut app, "b", "2");
        assert_eq!(app.pattern_selected, 1);
        app.delete_selected_pattern();
        assert_eq!(app.pattern_selected, 0);
        assert_eq!(app.pattern_names(), vec!["a"]);
    }

    #[test]
    fn diagnostics_follow_the_template() {
        let (mut app, _dir) = test_app();
        app.template = new_textarea(vec!["{for x}".to_string()]);
        app.recompute();
        assert_eq!(app.error_count(), 1);
        assert_eq!(app.output, "");
    }

    #[test]
    fn save_prompt_then_picker_round_trip() {
        let (mut app, _dir) = test_app();
        add_pattern(&mut app, "n", r"\d+");
        app.template = new_textarea(vec!["sum={MATH {n[0]} + {n[1]}}".to_string()]);
        app.input = new_textarea(vec!["4 and 5".to_string()]);
        app.recompute();
        assert_eq!(app.output, "sum=9");

        app.save_preset();
        assert_eq!(app.focus, Focus::SavePrompt);
        for c in "sums".chars() {
            app.save_prompt_add_char(c);
        }
        app.confirm_save_prompt();
        assert_eq!(app.preset_name.as_deref(), Some("sums"));
        assert!(!app.dirty);

        app.new_preset();
        assert!(app.patterns.is_empty());
        assert_eq!(app.output, "");

        app.enter_preset_picker();
        assert_eq!(app.picker_filtered.len(), 1);
        app.picker_add_char('s');
        app.open_selected_preset();
        assert_eq!(app.preset_name.as_deref(), Some("sums"));
        assert_eq!(app.output, "sum=9");
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn command_palette_filters_and_runs() {
        let (mut app, _dir) = test_app();
        app.enter_command_palette();
        for c in "toggle".chars() {
            app.command_palette_add_char(c);
        }
        let action = app.get_command_palette_action().unwrap();
        assert_eq!(action, CommandAction::ToggleView);
        app.execute_command(action);
        assert_eq!(app.output_view, OutputView::Syntax);
        assert_eq!(app.focus, Focus::Input);
    }

    #[test]
    fn tab_cycles_through_panes() {
        let (mut app, _dir) = test_app();
        app.focus = Focus::Output;
        app.next_pane();
        assert_eq!(app.focus, Focus::Patterns);
        app.prev_pane();
        assert_eq!(app.focus, Focus::Output);
    }

    #[test]
    fn bad_regex_keeps_last_output_and_reports() {
        let (mut app, _dir) = test_app();
        add_pattern(&mut app, "p", r"\d");
        app.template = new_textarea(vec!["{p}".to_string()]);
        app.input = new_textarea(vec!["1 2".to_string()]);
        app.recompute();
        assert_eq!(app.output, "1, 2");

        app.patterns.push(PatternEntry::new("q", "("));
        app.recompute();
        assert!(app.render_error.is_some());
        assert_eq!(app.output, "1, 2");
        assert_eq!(app.match_counts, vec![Some(2), None]);
    }
}
