// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Key helpers shared by the pane and popup handlers

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// True if `event` is one of the configured `bindings`. Only code and
/// modifiers are compared, so repeats and releases match too.
pub fn key_matches(event: KeyEvent, bindings: &[KeyEvent]) -> bool {
    bindings
        .iter()
        .any(|b| b.code == event.code && b.modifiers == event.modifiers)
}

/// Character to type into a popup text field. Keys chorded with Ctrl or
/// Alt are commands, not text.
pub fn text_char(event: KeyEvent) -> Option<char> {
    match event.code {
        KeyCode::Char(c) if (event.modifiers - KeyModifiers::SHIFT).is_empty() => Some(c),
        _ => None,
    }
}
