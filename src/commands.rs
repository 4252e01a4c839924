// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Headless subcommands

use anyhow::{Context, Result};
use rexpad::highlight::validate;
use rexpad::preset::{find_preset, list_presets, Preset};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Render a saved preset against a file, or stdin when `input` is `None`.
pub fn render(presets_dir: &Path, name: &str, input: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let entry = find_preset(presets_dir, name)?;
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    render_text(&entry.preset, &text, out)
}

pub fn render_text(preset: &Preset, text: &str, out: &mut impl Write) -> Result<()> {
    let output = preset
        .render(text)
        .with_context(|| format!("Failed to render preset '{}'", preset.name))?;
    writeln!(out, "{}", output)?;
    Ok(())
}

/// Print template diagnostics. Returns how many were found.
pub fn check(presets_dir: &Path, name: &str, out: &mut impl Write) -> Result<usize> {
    let entry = find_preset(presets_dir, name)?;
    let preset = &entry.preset;

    let mut problems = 0;
    for pattern in &preset.patterns {
        if let Err(e) = pattern.compile() {
            writeln!(out, "pattern: error: {}", e)?;
            problems += 1;
        }
    }

    let names: Vec<&str> = preset.patterns.iter().map(|p| p.name.as_str()).collect();
    let diagnostics = validate(&preset.template, &names);
    for d in &diagnostics {
        writeln!(out, "{}", d)?;
    }
    problems += diagnostics.len();

    tracing::debug!(preset = %preset.name, problems, "checked");
    Ok(problems)
}

pub fn list(presets_dir: &Path, out: &mut impl Write) -> Result<()> {
    let presets = list_presets(presets_dir);
    if presets.is_empty() {
        writeln!(out, "No presets in {}", presets_dir.display())?;
        return Ok(());
    }
    for entry in presets {
        let saved = entry.preset.saved_at.as_deref().unwrap_or("-");
        writeln!(
            out,
            "{}\t{} patterns\t{}",
            entry.name(),
            entry.preset.patterns.len(),
            saved
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rexpad::PatternEntry;
    use tempfile::tempdir;

    fn save(dir: &Path, name: &str, template: &str, patterns: &[(&str, &str)]) {
        let mut preset = Preset::new(name);
        preset.template = template.to_string();
        preset.patterns = patterns
            .iter()
            .map(|(n, p)| PatternEntry::new(*n, *p))
            .collect();
        preset.save(dir).unwrap();
    }

    #[test]
    fn render_reads_input_file() {
        let dir = tempdir().unwrap();
        save(dir.path(), "emails", "{for m}<{m}>{/for}", &[("m", r"\w+@\w+\.com")]);
        let input = dir.path().join("in.txt");
        fs::write(&input, "a@b.com, c@d.com").unwrap();

        let mut out = Vec::new();
        render(dir.path(), "emails", Some(&input), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<a@b.com>\n<c@d.com>\n");
    }

    #[test]
    fn render_fails_on_missing_preset() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        let err = render(dir.path(), "nope", Some(Path::new("x")), &mut out).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn render_text_reports_bad_pattern() {
        let mut preset = Preset::new("broken");
        preset.patterns.push(PatternEntry::new("p", "("));
        let mut out = Vec::new();
        assert!(render_text(&preset, "text", &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn check_counts_pattern_and_template_problems() {
        let dir = tempdir().unwrap();
        save(dir.path(), "bad", "{for p}\n{zzz}", &[("p", "("), ("q", "x")]);
        let mut out = Vec::new();
        let problems = check(dir.path(), "bad", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(problems, 3);
        assert!(text.starts_with("pattern: error:"));
        assert!(text.contains("2:1: warning:"));

        save(dir.path(), "good", "{q}", &[("q", "x")]);
        let mut out = Vec::new();
        assert_eq!(check(dir.path(), "good", &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn list_prints_one_line_per_preset() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        list(dir.path(), &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No presets"));

        save(dir.path(), "b", "", &[]);
        save(dir.path(), "a", "", &[("x", "x")]);
        let mut out = Vec::new();
        list(dir.path(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let names: Vec<&str> = text.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(text.lines().next().unwrap().contains("1 patterns"));
    }
}
