// Copyright 2025 dcomp-config contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/parser.rs
//!
//! Sectionless Java-properties parser
//!
//! This module parses the "sectionless" properties dialect used by
//! Drupal Computing agents, the flavour INI readers reject because it
//! has no `[sections]`. It handles:
//! - Separator ambiguity (`key=value`, `key: value`, `key value`)
//! - Whitespace padding on either side of `=`/`:`
//! - Escaped separators (`a\:b=c` keys, `a=b\=c` values)
//! - Multi-line records joined by trailing backslashes
//! - `#`/`;` comments, blank lines, duplicate keys (last one wins)
//!
//! # Architecture
//! Parsing is one pass over the input: an outer loop folds physical
//! lines into logical lines (comment skipping + continuation merging),
//! and each logical line is split exactly once using the escape-parity
//! scans in [`scan`](crate::core::scan). Malformed content never fails:
//! a line with no recognisable separator becomes a key with an empty
//! value, so only the caller-supplied I/O can produce an error.

use std::collections::HashMap;
use std::io::{self, BufRead};

use crate::core::scan;

/// Parse an ordered sequence of raw text lines into a property mapping.
///
/// This is the core entry point: the caller owns the I/O and hands over
/// the lines however it obtained them. Later definitions of a key
/// overwrite earlier ones; comment and blank lines contribute nothing.
///
/// # Example
/// ```
/// use dcomp_config::core::parser::parse_lines;
///
/// let props = parse_lines(["# agent settings", "dcomp.agent.name = myhost"]);
/// assert_eq!(props["dcomp.agent.name"], "myhost");
/// ```
pub fn parse_lines<I, S>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut properties = HashMap::new();
    let mut lines = lines.into_iter();

    while let Some(raw) = lines.next() {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Merge continuation lines into one logical line. Continued
        // segments are stripped but never re-checked against the
        // comment/blank rules; a trailing backslash at end of input is
        // simply dropped.
        let mut logical = trimmed.to_string();
        while scan::ends_with_unescaped_backslash(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.as_ref().trim()),
                None => break,
            }
        }

        let (key, value) = split_logical_line(&logical);
        properties.insert(key, value);
    }

    properties
}

/// Parse complete properties-file content.
///
/// Convenience wrapper over [`parse_lines`] for callers that already
/// hold the whole file in memory.
///
/// # Example
/// ```
/// use dcomp_config::core::parser::parse_str;
///
/// let props = parse_str("timeout: 5000\n# comment\ntimeout: 8000\n");
/// assert_eq!(props["timeout"], "8000");
/// ```
pub fn parse_str(content: &str) -> HashMap<String, String> {
    parse_lines(content.lines())
}

/// Parse properties from a buffered reader.
///
/// Lines are read up front; an I/O failure is surfaced unchanged before
/// any parsing happens, so a result is always complete, never partial.
///
/// # Errors
/// Returns the underlying [`io::Error`] when the reader fails.
pub fn parse_reader<R: BufRead>(reader: R) -> io::Result<HashMap<String, String>> {
    let lines = reader.lines().collect::<io::Result<Vec<String>>>()?;
    Ok(parse_lines(lines))
}

/// Split one logical line into its unescaped key and value.
///
/// A line with no separator at all is a key with an empty value; the
/// key unescaping rules still apply to it.
pub fn split_logical_line(line: &str) -> (String, String) {
    match separator_position(line) {
        Some(sep) => {
            let (key_raw, value_raw) = split_at_separator(line, sep);
            (unescape_key(key_raw), unescape_value(value_raw))
        }
        None => (unescape_key(line), String::new()),
    }
}

/// Byte position of the separator for this logical line, if any.
///
/// Two independent escape-aware scans, earliest match wins:
/// 1. The first unescaped `=` or `:`.
/// 2. If one exists, an unescaped whitespace character before it (not
///    counting the whitespace run that merely pads the separator)
///    takes precedence. Without any `=`/`:`, the first unescaped
///    whitespace anywhere is the separator.
///
/// This is what lets `key = value`, `key=value` and `key value` all
/// split on the same boundary, while `key\=value` falls through to
/// whitespace detection or whole-line-as-key.
pub fn separator_position(line: &str) -> Option<usize> {
    match scan::first_unescaped_separator(line) {
        Some(sep) => {
            let bound = scan::whitespace_run_start(line, sep);
            Some(scan::first_unescaped_whitespace(line, bound).unwrap_or(sep))
        }
        None => scan::first_unescaped_whitespace(line, line.len()),
    }
}

// The separator may be any Unicode whitespace character, so the value
// starts one full character past it, not one byte.
fn split_at_separator(line: &str, sep: usize) -> (&str, &str) {
    let sep_len = line[sep..].chars().next().map_or(1, char::len_utf8);
    (&line[..sep], &line[sep + sep_len..])
}

/// Unescape a raw key.
///
/// The key is split on backslashes and rejoined, which removes the
/// backslash from any escaped character (`a\:b` → `a:b`). One backslash
/// survives the split: a `\ ` escaping a whitespace character at the
/// very end of the key. When that happens the backslashes are removed
/// from the final fragment and the trailing space is kept verbatim;
/// when the key instead ends in a plain space, the rejoined key is
/// stripped of trailing whitespace.
///
/// The asymmetry with [`unescape_value`] is deliberate: keys go through
/// fragment splitting bound up with whitespace handling, values get a
/// literal two-sequence replace. Files in the wild depend on both
/// behaviours.
pub fn unescape_key(key_raw: &str) -> String {
    let mut fragments = split_key_fragments(key_raw);
    let last = fragments.pop().unwrap_or_default();

    let mut key = String::with_capacity(key_raw.len());
    for fragment in &fragments {
        key.push_str(fragment);
    }

    if last.contains("\\ ") {
        // Escaped trailing space: drop the backslashes, keep the space.
        key.extend(last.chars().filter(|&c| c != '\\'));
    } else {
        let strippable = last.ends_with(' ');
        key.push_str(last);
        if strippable {
            key.truncate(key.trim_end().len());
        }
    }

    key
}

/// Unescape a raw value: the two literal sequences `\:` and `\=` lose
/// their backslash, nothing else is rewritten, and surrounding
/// whitespace goes away.
pub fn unescape_value(value_raw: &str) -> String {
    value_raw
        .replace("\\:", ":")
        .replace("\\=", "=")
        .trim()
        .to_string()
}

// Split points are every backslash except one escaping a whitespace
// character that ends the key; that one is preserved for the
// trailing-space handling in `unescape_key`.
fn split_key_fragments(key_raw: &str) -> Vec<&str> {
    let mut fragments = Vec::new();
    let mut start = 0usize;
    for (idx, ch) in key_raw.char_indices() {
        if ch != '\\' || escapes_trailing_whitespace(key_raw, idx) {
            continue;
        }
        fragments.push(&key_raw[start..idx]);
        start = idx + 1;
    }
    fragments.push(&key_raw[start..]);
    fragments
}

// True for a backslash whose remainder is exactly one whitespace
// character, i.e. the end-of-key escaped space.
fn escapes_trailing_whitespace(key_raw: &str, backslash: usize) -> bool {
    let mut rest = key_raw[backslash + 1..].chars();
    matches!((rest.next(), rest.next()), (Some(ws), None) if ws.is_whitespace())
}
