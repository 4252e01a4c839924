// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - A keyboard-driven regex template processor TUI for Linux

use crate::app::{App, Focus, OutputView, PatternField};
use crate::syntax::render_syntax;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

/// Build a Line with fuzzy match highlighting. Indices are character positions.
fn build_highlighted_line(
    text: &str,
    match_indices: &[u32],
    base_style: Style,
    match_style: Style,
) -> Line<'static> {
    if match_indices.is_empty() {
        return Line::from(Span::styled(text.to_string(), base_style));
    }
    let spans: Vec<Span<'static>> = text
        .chars()
        .enumerate()
        .map(|(i, c)| {
            let style = if match_indices.contains(&(i as u32)) {
                match_style
            } else {
                base_style
            };
            Span::styled(c.to_string(), style)
        })
        .collect();
    Line::from(spans)
}

/// Center a rect within area with given size.
fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_width = area.width * percent_x / 100;
    let popup_height = area.height * percent_y / 100;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;
    Rect {
        x: area.x + x,
        y: area.y + y,
        width: popup_width,
        height: popup_height,
    }
}

fn pane_block<'a>(app: &App, title: String, pane: Focus) -> Block<'a> {
    let border_style = if app.focus == pane {
        app.theme.pane_border_active_style
    } else {
        app.theme.pane_border_inactive_style
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(border_type(&app.config.ui.border_style))
        .border_style(border_style)
}

fn popup_block<'a>(app: &App, title: String) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(border_type(&app.config.ui.border_style))
        .border_style(app.theme.pane_border_active_style)
}

fn border_type(name: &str) -> BorderType {
    match name.trim().to_lowercase().as_str() {
        "plain" => BorderType::Plain,
        "double" => BorderType::Double,
        "thick" => BorderType::Thick,
        _ => BorderType::Rounded,
    }
}

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(
        Block::default().style(app.theme.app_background_style),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(area);

    draw_header(frame, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(22),
            Constraint::Percentage(39),
            Constraint::Percentage(39),
        ])
        .split(chunks[1]);
    let editor_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[1]);

    draw_patterns_pane(frame, app, main_chunks[0]);
    draw_input_pane(frame, app, editor_chunks[0]);
    draw_template_pane(frame, app, editor_chunks[1]);
    draw_output_pane(frame, app, main_chunks[2]);
    draw_footer(frame, app, chunks[2]);

    // Popups on top
    match app.focus {
        Focus::PatternEditor => draw_pattern_editor_popup(frame, app, area),
        Focus::PresetPicker => draw_preset_picker_popup(frame, app, area),
        Focus::SavePrompt => draw_save_popup(frame, app, area),
        Focus::CommandPalette => draw_command_palette_popup(frame, app, area),
        _ => {}
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let name = app.preset_name.as_deref().unwrap_or("untitled");
    let marker = if app.dirty { " *" } else { "" };
    let title = format!("rexpad - {}{}", name, marker);
    let header = Paragraph::new(title)
        .style(app.theme.header_style)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(app.theme.border_style),
        );
    frame.render_widget(header, area);
}

fn draw_patterns_pane(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = if app.patterns.is_empty() {
        let hint = format!("(press {} to add a pattern)", app.get_key_display_string("pattern_new"));
        vec![ListItem::new(Line::from(Span::styled(
            hint,
            app.theme.help_text_style.add_modifier(Modifier::ITALIC),
        )))]
    } else {
        app.patterns
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let style = if i == app.pattern_selected {
                    app.theme.list_text_selected_style
                } else {
                    app.theme.list_text_normal_style
                };
                let count = match app.match_counts.get(i).copied().flatten() {
                    Some(n) => Span::styled(format!(" ({})", n), app.theme.help_text_style),
                    None => Span::styled(" (invalid)", app.theme.diagnostic_error_style),
                };
                ListItem::new(vec![
                    Line::from(vec![Span::styled(entry.name.clone(), style), count]),
                    Line::from(Span::styled(
                        format!("  /{}/", entry.pattern),
                        app.theme.help_text_style,
                    )),
                ])
            })
            .collect()
    };

    let list = List::new(items).block(pane_block(app, " Patterns ".to_string(), Focus::Patterns));
    frame.render_widget(list, area);
}

fn draw_input_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(app, " Input ".to_string(), Focus::Input);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.input, inner);
}

fn draw_template_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = pane_block(app, " Template ".to_string(), Focus::Template);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(&app.template, inner);
}

fn draw_output_pane(frame: &mut Frame, app: &App, area: Rect) {
    let (title, content) = match app.output_view {
        OutputView::Rendered => {
            let mut lines = Vec::new();
            if let Some(err) = &app.render_error {
                lines.push(Line::from(Span::styled(
                    err.clone(),
                    app.theme.diagnostic_error_style,
                )));
                lines.push(Line::from(""));
            }
            if app.output.is_empty() && app.render_error.is_none() {
                lines.push(Line::from(Span::styled(
                    "(empty output)",
                    app.theme.output_text_style.add_modifier(Modifier::ITALIC),
                )));
            } else {
                lines.extend(
                    app.output
                        .split('\n')
                        .map(|l| Line::from(Span::styled(l.to_string(), app.theme.output_text_style))),
                );
            }
            (" Output ", lines)
        }
        OutputView::Syntax => (
            " Syntax ",
            render_syntax(&app.template_text(), &app.diagnostics, &app.theme),
        ),
    };

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((app.output_scroll, 0))
        .block(pane_block(app, title.to_string(), Focus::Output));
    frame.render_widget(paragraph, area);
}

fn draw_pattern_editor_popup(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.editing_index.is_some() {
        " Edit Pattern "
    } else {
        " New Pattern "
    };
    let block = popup_block(app, title.to_string());
    let popup_area = centered_rect(area, 60, 30);
    let inner = block.inner(popup_area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let field_style = |field: PatternField| {
        if app.edit_field == field {
            app.theme.highlight_style
        } else {
            app.theme.text_style
        }
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:  ", app.theme.help_text_style),
            Span::styled(app.edit_name.as_str(), field_style(PatternField::Name)),
        ]),
        Line::from(vec![
            Span::styled("Regex: ", app.theme.help_text_style),
            Span::styled(app.edit_regex.as_str(), field_style(PatternField::Regex)),
        ]),
        Line::from(""),
    ];
    if let Some(err) = &app.edit_error {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            app.theme.diagnostic_error_style,
        )));
    }
    lines.push(Line::from(Span::styled(
        "Tab switch field | Enter save | Esc cancel",
        app.theme.help_text_style.add_modifier(Modifier::ITALIC),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_preset_picker_popup(frame: &mut Frame, app: &App, area: Rect) {
    let block = popup_block(
        app,
        format!(" {} │ Open Preset ", app.get_key_display_string("open_preset")),
    );
    let popup_area = centered_rect(area, 60, 60);
    let inner = block.inner(popup_area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let query_line = Line::from(vec![
        Span::styled("> ", app.theme.highlight_style),
        Span::styled(app.picker_query.as_str(), app.theme.text_style),
    ]);
    frame.render_widget(Paragraph::new(query_line), chunks[0]);

    if app.picker_filtered.is_empty() {
        let msg = if app.picker_presets.is_empty() {
            format!("(no presets in {})", app.presets_dir.display())
        } else {
            "(no matching presets)".to_string()
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                msg,
                app.theme.help_text_style.add_modifier(Modifier::ITALIC),
            )),
            chunks[1],
        );
        return;
    }

    let items: Vec<ListItem> = app
        .picker_filtered
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let base_style = if i == app.picker_selected {
                app.theme.list_text_selected_style
            } else {
                app.theme.list_text_normal_style
            };
            let mut line = build_highlighted_line(
                entry.name(),
                app.picker_match_indices.get(i).map(Vec::as_slice).unwrap_or(&[]),
                base_style,
                app.theme.search_match_style,
            );
            let detail = match &entry.preset.saved_at {
                Some(ts) => format!("  {} patterns, {}", entry.preset.patterns.len(), ts),
                None => format!("  {} patterns", entry.preset.patterns.len()),
            };
            line.spans.push(Span::styled(detail, app.theme.help_text_style));
            ListItem::new(line)
        })
        .collect();

    frame.render_widget(List::new(items), chunks[1]);
}

fn draw_save_popup(frame: &mut Frame, app: &App, area: Rect) {
    let block = popup_block(app, " Save Preset ".to_string());
    let popup_area = centered_rect(area, 50, 15);
    let inner = block.inner(popup_area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let content = Line::from(vec![
        Span::styled("Preset name: ", app.theme.help_text_style),
        Span::styled(app.save_input.as_str(), app.theme.highlight_style),
    ]);
    frame.render_widget(Paragraph::new(content), inner);
}

fn draw_command_palette_popup(frame: &mut Frame, app: &App, area: Rect) {
    let block = popup_block(
        app,
        format!(" {} │ Command Palette ", app.get_key_display_string("command_palette")),
    );
    let popup_area = centered_rect(area, 50, 40);
    let inner = block.inner(popup_area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let query_line = Line::from(vec![
        Span::styled("> ", app.theme.highlight_style),
        Span::styled(app.command_palette_query.as_str(), app.theme.text_style),
    ]);
    frame.render_widget(Paragraph::new(query_line), chunks[0]);

    let items: Vec<ListItem> = app
        .command_palette_filtered
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let style = if i == app.command_palette_selected {
                app.theme.list_text_selected_style
            } else {
                app.theme.list_text_normal_style
            };
            ListItem::new(Line::from(Span::styled(action.label(), style)))
        })
        .collect();

    frame.render_widget(List::new(items), chunks[1]);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key = |action: &str| app.get_key_display_string(action);
    let hint = |k: String, label: &'static str| {
        vec![
            Span::styled(format!(" {} ", k), app.theme.help_text_style),
            Span::styled(label, app.theme.highlight_style),
            Span::styled(" |", app.theme.help_text_style),
        ]
    };

    let (title, mut spans) = match app.focus {
        Focus::Patterns => (
            " Patterns ",
            [
                hint(key("pattern_new"), "new"),
                hint(key("pattern_edit"), "edit"),
                hint(key("pattern_delete"), "delete"),
            ]
            .concat(),
        ),
        Focus::Input | Focus::Template => (
            if app.focus == Focus::Input {
                " Input "
            } else {
                " Template "
            },
            [hint(key("render"), "render"), hint(key("toggle_view"), "syntax")].concat(),
        ),
        Focus::Output => (
            " Output ",
            [hint("j/k".to_string(), "scroll"), hint(key("toggle_view"), "view")].concat(),
        ),
        _ => (
            " Popup ",
            [hint(key("enter"), "confirm"), hint(key("escape"), "cancel")].concat(),
        ),
    };
    spans.extend(
        [
            hint(key("next_pane"), "next pane"),
            hint(key("save"), "save"),
            hint(key("open_preset"), "open"),
            hint(key("command_palette"), "commands"),
            hint(key("quit"), "quit"),
        ]
        .concat(),
    );

    let errors = app.error_count();
    let warnings = app.diagnostics.len() - errors;
    let status = if app.diagnostics.is_empty() {
        Span::styled(" template ok", app.theme.help_text_style)
    } else {
        let style = if errors > 0 {
            app.theme.diagnostic_error_style
        } else {
            app.theme.diagnostic_warning_style
        };
        Span::styled(format!(" {} errors, {} warnings", errors, warnings), style)
    };
    spans.push(status);

    let mut lines = vec![Line::from(spans)];
    if let Some(msg) = &app.message {
        lines.push(Line::from(Span::styled(
            msg.as_str(),
            app.theme.text_style.add_modifier(Modifier::ITALIC),
        )));
    } else if let Some(first) = app.diagnostics.first() {
        lines.push(Line::from(Span::styled(
            first.to_string(),
            app.theme.help_text_style,
        )));
    }

    let footer = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(app.theme.border_style),
        );
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn highlighted_line_splits_matched_chars() {
        let base = Style::default();
        let hit = Style::default().add_modifier(Modifier::BOLD);
        let line = build_highlighted_line("abc", &[0, 2], base, hit);
        let styles: Vec<Style> = line.spans.iter().map(|s| s.style).collect();
        assert_eq!(styles, vec![hit, base, hit]);
    }

    #[test]
    fn unknown_border_style_is_rounded() {
        assert_eq!(border_type("Double"), BorderType::Double);
        assert_eq!(border_type("wavy"), BorderType::Rounded);
    }

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let r = centered_rect(area, 50, 50);
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}
