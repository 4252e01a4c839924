// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Template syntax view

use crate::theme::ResolvedTheme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use rexpad::highlight::{tokenize, Diagnostic, Severity, TokenKind};

/// Render the template with each command styled by kind, followed by its diagnostics.
pub fn render_syntax(
    template: &str,
    diagnostics: &[Diagnostic],
    theme: &ResolvedTheme,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current_line = Vec::new();

    for token in tokenize(template) {
        let style = token_style(token.kind, theme);
        let text = &template[token.range];
        let mut parts = text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                current_line.push(Span::styled(part.to_string(), style));
            }
            if parts.peek().is_some() {
                flush_line(&mut current_line, &mut lines);
            }
        }
    }
    flush_line(&mut current_line, &mut lines);

    lines.push(Line::from(""));
    if diagnostics.is_empty() {
        lines.push(Line::from(Span::styled(
            "No problems found",
            theme.help_text_style.add_modifier(Modifier::ITALIC),
        )));
    } else {
        lines.extend(diagnostics.iter().map(|d| {
            let style = match d.severity {
                Severity::Error => theme.diagnostic_error_style,
                Severity::Warning => theme.diagnostic_warning_style,
            };
            Line::from(Span::styled(d.to_string(), style))
        }));
    }

    lines
}

fn token_style(kind: TokenKind, theme: &ResolvedTheme) -> Style {
    match kind {
        TokenKind::Text => theme.output_text_style,
        TokenKind::Variable => theme.syntax_variable_style,
        TokenKind::LoopStart | TokenKind::LoopEnd => theme.syntax_loop_style,
        TokenKind::Math => theme.syntax_math_style,
        TokenKind::Unknown => theme.syntax_unknown_style,
        TokenKind::Unclosed => theme.diagnostic_warning_style,
    }
}

/// Pushes the pending spans as a line; empty lines are kept.
fn flush_line(spans: &mut Vec<Span<'static>>, lines: &mut Vec<Line<'static>>) {
    lines.push(Line::from(std::mem::take(spans)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use rexpad::highlight::validate;

    fn theme() -> ResolvedTheme {
        ResolvedTheme::from_theme(&Theme::default()).unwrap()
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn keeps_template_lines_and_styles_commands() {
        let theme = theme();
        let lines = render_syntax("a {p}\n\n{MATH 1}", &[], &theme);
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["a {p}", "", "{MATH 1}", "", "No problems found"]);
        assert_eq!(lines[0].spans[1].style, theme.syntax_variable_style);
        assert_eq!(lines[2].spans[0].style, theme.syntax_math_style);
    }

    #[test]
    fn lists_diagnostics_after_the_template() {
        let theme = theme();
        let template = "{for p}";
        let diagnostics = validate(template, &[]);
        let lines = render_syntax(template, &diagnostics, &theme);
        let last = lines.last().unwrap();
        assert_eq!(last.spans[0].style, theme.diagnostic_error_style);
        assert!(line_text(last).contains("no matching"));
    }
}
