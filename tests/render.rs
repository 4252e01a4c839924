// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Template rendering end to end

use pretty_assertions::assert_eq;
use rexpad::{match_all, render_template, render_with, PatternEntry, TemplateError};

fn pattern(name: &str, regex: &str) -> PatternEntry {
    PatternEntry::new(name, regex)
}

fn render(template: &str, patterns: &[PatternEntry], input: &str) -> String {
    render_template(template, patterns, input).unwrap()
}

#[test]
fn bare_reference_joins_every_match() {
    assert_eq!(render("{p}", &[pattern("p", r"\d+")], "a1b22"), "1, 22");
}

#[test]
fn indexed_reference_picks_one_match() {
    let p = [pattern("p", r"\d+")];
    assert_eq!(render("{p[1]}", &p, "a1b22"), "22");
    assert_eq!(render("{p[0]}-{p[1]}", &p, "a1b22"), "1-22");
}

#[test]
fn loop_renders_each_match_on_its_own_line() {
    let p = [pattern("p", r"(\w)(\d)")];
    assert_eq!(
        render("{for p}[{p.group(0)}]{/for}", &p, "a1 b2"),
        "[a1]\n[b2]"
    );
    assert_eq!(
        render("{for p}{p.group(2)}{p.group(1)}{/for}", &p, "a1 b2"),
        "1a\n2b"
    );
}

#[test]
fn multi_line_loop_body_is_trimmed_per_iteration() {
    let p = [pattern("m", r"\w+@\w+\.com")];
    let template = "Emails:\n{for m}\n  - {m.group(0)}\n\n{/for}\nDone";
    assert_eq!(
        render(template, &p, "a@b.com and c@d.com"),
        "Emails:\n- a@b.com\n- c@d.com\nDone"
    );
}

#[test]
fn loop_without_matches_renders_nothing() {
    let p = [pattern("m", r"\d+")];
    assert_eq!(render("A\n{for m}x{/for}\nB", &p, "no digits"), "A\n\nB");
}

#[test]
fn math_evaluates_and_degrades_to_zero() {
    assert_eq!(render("{MATH 5 + 8}", &[], ""), "13");
    assert_eq!(render("{MATH 10 / 4}", &[], ""), "2.5");
    assert_eq!(render("{MATH 5 / 0}", &[], ""), "0");
    assert_eq!(render("{MATH abc}", &[], ""), "0");
    assert_eq!(render("{MATH}", &[], ""), "0");
    assert_eq!(render("{MATH 2 * (3 + -1)}", &[], ""), "4");
}

#[test]
fn math_can_use_matched_numbers() {
    let p = [pattern("n", r"\d+")];
    assert_eq!(render("{MATH {n[0]} * {n[1]}}", &p, "3 x 4"), "12");
}

#[test]
fn unresolvable_commands_pass_through() {
    assert_eq!(render("{missing}", &[], "text"), "{missing}");
    let p = [pattern("p", r"\d")];
    assert_eq!(render("{p[5]}", &p, "1 2"), "{p[5]}");
    assert_eq!(render("{p.group(3)}", &p, "1 2"), "{p.group(3)}");
    assert_eq!(render("{not a command}", &p, "1"), "{not a command}");
}

#[test]
fn lone_brace_is_literal() {
    assert_eq!(render("a { b", &[], ""), "a { b");
    let p = [pattern("p", r"\d")];
    assert_eq!(render("{ {p}", &p, "7"), "{ 7");
}

#[test]
fn non_participating_group_renders_empty() {
    let p = [pattern("p", "(a)|(b)")];
    assert_eq!(render("[{p.group(1)}][{p.group(2)}]", &p, "b"), "[][b]");
}

#[test]
fn rendering_is_repeatable() {
    let p = [pattern("p", r"(\w)(\d)")];
    let template = "{p} / {for p}{p.group(1)}{/for} / {MATH 1 + 1}";
    let first = render(template, &p, "a1 b2");
    assert_eq!(first, render(template, &p, "a1 b2"));

    let matches = match_all(&p, "a1 b2").unwrap();
    assert_eq!(render_with(template, &matches), render_with(template, &matches));
    assert_eq!(render_with(template, &matches), first);
}

#[test]
fn bad_patterns_are_reported_not_rendered() {
    let err = render_template("{p}", &[pattern("p", "(")], "x").unwrap_err();
    assert!(matches!(err, TemplateError::InvalidPattern { ref name, .. } if name == "p"));

    let err = render_template("", &[pattern("9p", "x")], "x").unwrap_err();
    assert_eq!(err, TemplateError::InvalidName("9p".to_string()));

    let err = render_template("", &[pattern("p", "x"), pattern("p", "y")], "x").unwrap_err();
    assert_eq!(err, TemplateError::DuplicateName("p".to_string()));
}
