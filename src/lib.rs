// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - A keyboard-driven regex template processor TUI for Linux

//! Regex template engine.
//!
//! Named regular expressions are run against an input text and the matches
//! are rendered through a small template language:
//!
//! ```text
//! {name}                 all matches, comma-joined
//! {name[i]}              i-th match
//! {name.group(n)}        group n of the current (or first) match
//! {name[i].group(n)}     group n of the i-th match
//! {for name}...{/for}    body repeated per match
//! {MATH expr}            arithmetic, 0 on any error
//! ```

pub mod error;
pub mod highlight;
pub mod matcher;
pub mod math;
pub mod preset;
pub mod render;

pub use error::{MathError, PresetError, TemplateError};
pub use matcher::{match_all, MatchResult, MatchSet, PatternEntry};
pub use render::{render_template, render_with};
