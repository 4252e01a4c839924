// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Fuzzy preset picker

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};
use rexpad::preset::PresetEntry;

/// Filter presets using fuzzy matching against name and pattern names.
/// Name matches rank higher (the name is first in the searchable string).
pub fn filter_presets(
    presets: &[PresetEntry],
    query: &str,
    matcher: &mut Matcher,
) -> Vec<PresetEntry> {
    let query = query.trim();
    if query.is_empty() {
        return presets.to_vec();
    }

    let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
    let matches = pattern.match_list(presets, matcher);

    matches.into_iter().map(|(entry, _)| entry.clone()).collect()
}

/// Character indices in `display` that match the query, for highlighting.
/// Empty vec if no match or no query.
pub fn get_match_indices(display: &str, query: &str, matcher: &mut Matcher) -> Vec<u32> {
    let query = query.trim();
    if query.is_empty() || display.is_empty() {
        return Vec::new();
    }

    let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
    let mut buf = Vec::new();
    let haystack = Utf32Str::new(display, &mut buf);
    let mut indices = Vec::new();
    if pattern.indices(haystack, matcher, &mut indices).is_some() {
        indices.sort_unstable();
        indices.dedup();
    }
    indices
}
