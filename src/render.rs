// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Template rendering

use crate::error::TemplateError;
use crate::matcher::{is_valid_name, match_all, MatchResult, MatchSet, PatternEntry};
use crate::math::{evaluate, format_number};

const LOOP_END: &str = "{/for}";

/// Run `patterns` over `input` and render `template` against the matches.
///
/// Only pattern compilation can fail. Template mistakes never do: unknown
/// references are left as written and broken MATH yields `0`.
pub fn render_template(
    template: &str,
    patterns: &[PatternEntry],
    input: &str,
) -> Result<String, TemplateError> {
    let matches = match_all(patterns, input)?;
    Ok(render_with(template, &matches))
}

/// Render `template` against an already computed match set.
pub fn render_with(template: &str, matches: &MatchSet) -> String {
    let renderer = Renderer { matches };
    let rendered = renderer.render(template, None);
    tracing::debug!(
        template_len = template.len(),
        output_len = rendered.len(),
        "template rendered"
    );
    strip_loop_tag_lines(&rendered)
}

/// A variable reference: `name`, `name[i]`, `name.group(n)` or `name[i].group(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'t> {
    pub name: &'t str,
    pub index: Option<usize>,
    pub group: Option<usize>,
}

/// Parse the text between braces as a variable reference.
pub fn parse_reference(content: &str) -> Option<Reference<'_>> {
    let content = content.trim();
    let name_end = content
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(content.len());
    let name = &content[..name_end];
    if !is_valid_name(name) {
        return None;
    }
    let mut rest = &content[name_end..];

    let mut index = None;
    if let Some(after) = rest.strip_prefix('[') {
        let close = after.find(']')?;
        index = Some(parse_digits(&after[..close])?);
        rest = &after[close + 1..];
    }

    let mut group = None;
    if let Some(after) = rest.strip_prefix(".group(") {
        let close = after.find(')')?;
        group = Some(parse_digits(&after[..close])?);
        rest = &after[close + 1..];
    }

    if !rest.is_empty() {
        return None;
    }
    Some(Reference { name, index, group })
}

fn parse_digits(s: &str) -> Option<usize> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// If `text` starts with a `{for name}` tag, return the name and the tag length.
pub fn parse_loop_start(text: &str) -> Option<(&str, usize)> {
    let after = text.strip_prefix("{for")?;
    if !after.starts_with(|c: char| c.is_whitespace()) {
        return None;
    }
    let close = after.find('}')?;
    let name = after[..close].trim();
    if !is_valid_name(name) {
        return None;
    }
    Some((name, "{for".len() + close + 1))
}

/// If `text` starts with a `{MATH ...}` command, return its length.
/// Braces inside the body must balance so references can be embedded.
pub fn math_command_len(text: &str) -> Option<usize> {
    let after = text.strip_prefix("{MATH")?;
    if !(after.starts_with('}') || after.starts_with(|c: char| c.is_whitespace())) {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Length of a plain `{...}` command at the start of `text`.
/// `None` when there is no closing brace before the next opening one.
pub fn command_len(text: &str) -> Option<usize> {
    for (i, c) in text.char_indices().skip(1) {
        match c {
            '}' => return Some(i + 1),
            '{' => return None,
            _ => {}
        }
    }
    None
}

/// The match bound by the enclosing `{for}` loop.
#[derive(Clone, Copy)]
struct Binding<'a> {
    name: &'a str,
    current: &'a MatchResult,
}

struct Renderer<'m> {
    matches: &'m MatchSet,
}

impl<'m> Renderer<'m> {
    fn render(&self, template: &str, binding: Option<Binding<'_>>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut pos = 0;

        while pos < template.len() {
            let rest = &template[pos..];
            let Some(open) = rest.find('{') else {
                out.push_str(rest);
                break;
            };
            out.push_str(&rest[..open]);
            pos += open;
            let rest = &template[pos..];

            if let Some((name, tag_len)) = parse_loop_start(rest) {
                match self.render_loop(&rest[tag_len..], name) {
                    Some((text, body_len)) => {
                        out.push_str(&text);
                        pos += tag_len + body_len + LOOP_END.len();
                    }
                    None => {
                        out.push_str(&rest[..tag_len]);
                        pos += tag_len;
                    }
                }
                continue;
            }

            if let Some(len) = math_command_len(rest) {
                let body = &rest["{MATH".len()..len - 1];
                let expr = self.render(body, binding);
                out.push_str(&format_number(evaluate(&expr)));
                pos += len;
                continue;
            }

            match command_len(rest) {
                Some(len) => {
                    match self.resolve(&rest[1..len - 1], binding) {
                        Some(value) => out.push_str(&value),
                        None => out.push_str(&rest[..len]),
                    }
                    pos += len;
                }
                None => {
                    out.push('{');
                    pos += 1;
                }
            }
        }

        out
    }

    /// Render a loop whose body starts at `after_tag`.
    /// Returns the rendered text and the body length, or `None` when the loop
    /// has no `{/for}` or names an unknown pattern.
    fn render_loop(&self, after_tag: &str, name: &str) -> Option<(String, usize)> {
        let body_len = after_tag.find(LOOP_END)?;
        let body = &after_tag[..body_len];
        let matches = self.matches.get(name)?;

        let iterations: Vec<String> = matches
            .iter()
            .map(|current| self.render(body, Some(Binding { name, current })))
            .map(|text| clean_iteration(&text))
            .filter(|text| !text.is_empty())
            .collect();
        Some((iterations.join("\n"), body_len))
    }

    fn resolve(&self, content: &str, binding: Option<Binding<'_>>) -> Option<String> {
        let reference = parse_reference(content)?;
        let found = self.matches.get(reference.name)?;
        match (reference.index, reference.group) {
            (None, None) => Some(
                found
                    .iter()
                    .map(|m| m.text.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            (Some(i), None) => found.get(i).map(|m| m.text.clone()),
            (None, Some(n)) => {
                let current = match binding {
                    Some(b) if b.name == reference.name => b.current,
                    _ => found.first()?,
                };
                current.group(n).map(str::to_string)
            }
            (Some(i), Some(n)) => found.get(i)?.group(n).map(str::to_string),
        }
    }
}

/// Drop blank lines and trim the iteration.
fn clean_iteration(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Remove lines that consist of nothing but a stray loop tag.
fn strip_loop_tag_lines(text: &str) -> String {
    text.split('\n')
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed == LOOP_END {
                return false;
            }
            !matches!(parse_loop_start(trimmed), Some((_, len)) if len == trimmed.len())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
