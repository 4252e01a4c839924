// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Template syntax highlighting and validation

use crate::math::try_evaluate;
use crate::render::{command_len, math_command_len, parse_loop_start, parse_reference};
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

/// Kind of a highlighted template span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text copied to the output.
    Text,
    /// `{name}`, `{name[i]}`, `{name.group(n)}`, `{name[i].group(n)}`.
    Variable,
    LoopStart,
    LoopEnd,
    Math,
    /// Braced text that is not a command; rendered literally.
    Unknown,
    /// A `{` without a closing brace.
    Unclosed,
}

/// A span of the template, as a byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

/// Split a template into highlightable spans covering every byte.
pub fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut pos = 0;

    while pos < template.len() {
        let rest = &template[pos..];
        let open = rest.find('{').unwrap_or(rest.len());
        if open > 0 {
            push_text(&mut tokens, pos..pos + open);
            pos += open;
            continue;
        }

        let (kind, len) = if let Some((_, len)) = parse_loop_start(rest) {
            (TokenKind::LoopStart, len)
        } else if rest.starts_with("{/for}") {
            (TokenKind::LoopEnd, "{/for}".len())
        } else if let Some(len) = math_command_len(rest) {
            (TokenKind::Math, len)
        } else if let Some(len) = command_len(rest) {
            if parse_reference(&rest[1..len - 1]).is_some() {
                (TokenKind::Variable, len)
            } else {
                (TokenKind::Unknown, len)
            }
        } else {
            (TokenKind::Unclosed, 1)
        };
        tokens.push(Token {
            kind,
            range: pos..pos + len,
        });
        pos += len;
    }

    tokens
}

fn push_text(tokens: &mut Vec<Token>, range: Range<usize>) {
    if let Some(last) = tokens.last_mut() {
        if last.kind == TokenKind::Text && last.range.end == range.start {
            last.range.end = range.end;
            return;
        }
    }
    tokens.push(Token {
        kind: TokenKind::Text,
        range,
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in a template. Line and column are 1-based; the column
/// counts characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: Range<usize>,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}:{}: {}: {}", self.line, self.column, level, self.message)
    }
}

/// Check a template against the pattern names that will be available.
/// Rendering never fails; this reports what would render literally or as 0.
pub fn validate(template: &str, known_names: &[&str]) -> Vec<Diagnostic> {
    let known: HashSet<&str> = known_names.iter().copied().collect();
    let mut found: Vec<(Severity, Range<usize>, String)> = Vec::new();
    let mut open_loop: Option<(&str, Range<usize>)> = None;

    for token in tokenize(template) {
        let text = &template[token.range.clone()];
        match token.kind {
            TokenKind::Text => {}
            TokenKind::LoopStart => {
                let name = parse_loop_start(text).map(|(n, _)| n).unwrap_or_default();
                if !known.contains(name) {
                    found.push((
                        Severity::Warning,
                        token.range.clone(),
                        format!("unknown pattern '{}' in loop", name),
                    ));
                }
                match open_loop.as_ref().map(|(outer, _)| *outer) {
                    Some(outer) => found.push((
                        Severity::Error,
                        token.range.clone(),
                        format!("loops do not nest; '{{for {}}}' is still open", outer),
                    )),
                    None => open_loop = Some((name, token.range.clone())),
                }
            }
            TokenKind::LoopEnd => {
                if open_loop.take().is_none() {
                    found.push((
                        Severity::Error,
                        token.range.clone(),
                        "'{/for}' without a matching '{for}'".to_string(),
                    ));
                }
            }
            TokenKind::Variable => {
                if let Some(reference) = parse_reference(&text[1..text.len() - 1]) {
                    if !known.contains(reference.name) {
                        found.push((
                            Severity::Warning,
                            token.range.clone(),
                            format!("unknown pattern '{}'", reference.name),
                        ));
                    }
                }
            }
            TokenKind::Math => {
                let body = &text["{MATH".len()..text.len() - 1];
                check_math(body, token.range.start, &known, &mut found);
            }
            TokenKind::Unknown => found.push((
                Severity::Warning,
                token.range.clone(),
                format!("'{}' is not a command and will be copied literally", text),
            )),
            TokenKind::Unclosed => found.push((
                Severity::Warning,
                token.range.clone(),
                "unclosed '{' will be copied literally".to_string(),
            )),
        }
    }

    if let Some((name, range)) = open_loop {
        found.push((
            Severity::Error,
            range,
            format!("'{{for {}}}' has no matching '{{/for}}'", name),
        ));
    }

    found.sort_by_key(|(_, range, _)| range.start);
    found
        .into_iter()
        .map(|(severity, range, message)| {
            let (line, column) = line_col(template, range.start);
            Diagnostic {
                severity,
                range,
                line,
                column,
                message,
            }
        })
        .collect()
}

/// References inside MATH are checked by name, then replaced by `1` so the
/// arithmetic itself can be parsed.
fn check_math(
    body: &str,
    token_start: usize,
    known: &HashSet<&str>,
    found: &mut Vec<(Severity, Range<usize>, String)>,
) {
    let body_start = token_start + "{MATH".len();
    let mut expr = String::with_capacity(body.len());
    for token in tokenize(body) {
        let text = &body[token.range.clone()];
        let absolute = body_start + token.range.start..body_start + token.range.end;
        match token.kind {
            TokenKind::Variable => {
                if let Some(reference) = parse_reference(&text[1..text.len() - 1]) {
                    if !known.contains(reference.name) {
                        found.push((
                            Severity::Warning,
                            absolute,
                            format!("unknown pattern '{}'", reference.name),
                        ));
                    }
                }
                expr.push('1');
            }
            TokenKind::Math => expr.push('1'),
            _ => expr.push_str(text),
        }
    }
    if let Err(e) = try_evaluate(&expr) {
        found.push((
            Severity::Warning,
            token_start..body_start + body.len() + 1,
            format!("MATH expression will render as 0: {}", e),
        ));
    }
}

/// 1-based line and character column of a byte offset.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let before = &text[..offset.min(text.len())];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(template: &str) -> Vec<(TokenKind, &str)> {
        tokenize(template)
            .into_iter()
            .map(|t| (t.kind, &template[t.range]))
            .collect()
    }

    fn messages(template: &str, known: &[&str]) -> Vec<String> {
        validate(template, known)
            .into_iter()
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn tokenizes_every_command_kind() {
        assert_eq!(
            kinds("Hi {p}, {for q}{q.group(1)}{/for} {MATH 1 + {p[0]}} {x y} {"),
            vec![
                (TokenKind::Text, "Hi "),
                (TokenKind::Variable, "{p}"),
                (TokenKind::Text, ", "),
                (TokenKind::LoopStart, "{for q}"),
                (TokenKind::Variable, "{q.group(1)}"),
                (TokenKind::LoopEnd, "{/for}"),
                (TokenKind::Text, " "),
                (TokenKind::Math, "{MATH 1 + {p[0]}}"),
                (TokenKind::Text, " "),
                (TokenKind::Unknown, "{x y}"),
                (TokenKind::Text, " "),
                (TokenKind::Unclosed, "{"),
            ]
        );
    }

    #[test]
    fn tokens_cover_the_whole_template() {
        let template = "a {b {c} {MATH (} é {/for}";
        let tokens = tokenize(template);
        let mut expected_start = 0;
        for t in &tokens {
            assert_eq!(t.range.start, expected_start);
            expected_start = t.range.end;
        }
        assert_eq!(expected_start, template.len());
    }

    #[test]
    fn clean_template_has_no_diagnostics() {
        let template = "{for p}\n{p.group(1)} = {MATH {p.group(2)} * 2}\n{/for}\nAll: {p}";
        assert!(validate(template, &["p"]).is_empty());
    }

    #[test]
    fn reports_structure_problems() {
        assert_eq!(
            messages("{for p}\nx", &["p"]),
            vec!["1:1: error: '{for p}' has no matching '{/for}'"]
        );
        assert_eq!(
            messages("x\n  {/for}", &[]),
            vec!["2:3: error: '{/for}' without a matching '{for}'"]
        );
        assert_eq!(
            messages("{for p}{for q}{/for}{/for}", &["p", "q"]),
            vec![
                "1:8: error: loops do not nest; '{for p}' is still open",
                "1:21: error: '{/for}' without a matching '{for}'",
            ]
        );
    }

    #[test]
    fn reports_unknown_names_and_literal_text() {
        assert_eq!(
            messages("{a} {for b}{/for} {c d} {", &["z"]),
            vec![
                "1:1: warning: unknown pattern 'a'",
                "1:5: warning: unknown pattern 'b' in loop",
                "1:19: warning: '{c d}' is not a command and will be copied literally",
                "1:25: warning: unclosed '{' will be copied literally",
            ]
        );
    }

    #[test]
    fn reports_bad_math() {
        assert_eq!(
            messages("{MATH 1 +}", &[]),
            vec!["1:1: warning: MATH expression will render as 0: unexpected end of expression"]
        );
        assert_eq!(
            messages("{MATH {n} / 0}", &[]),
            vec![
                "1:1: warning: MATH expression will render as 0: division by zero",
                "1:7: warning: unknown pattern 'n'",
            ]
        );
    }

    #[test]
    fn line_and_column_count_characters() {
        assert_eq!(line_col("abc", 0), (1, 1));
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
        assert_eq!(line_col("éé{", 4), (1, 3));
    }
}
