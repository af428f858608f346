//! src/core/scan.rs
//!
//! Escape-aware character scanning for the properties grammar
//!
//! Java-style properties files escape characters with backslashes, and a
//! backslash can itself be escaped. Every rule in the parser therefore
//! hinges on one question: is this character preceded by an odd or an
//! even number of consecutive backslashes? These scans answer it in a
//! single left-to-right pass each, tracking the length of the current
//! backslash run instead of looking behind.
//!
//! All positions are byte offsets that fall on UTF-8 character
//! boundaries, so they can be used to slice the scanned line directly.
//! Whitespace means Unicode whitespace (`char::is_whitespace`).

/// Position of the first unescaped `=` or `:` in the line.
///
/// A separator is escaped when it is immediately preceded by an odd
/// number of consecutive backslashes (`a\=b` has no separator here,
/// `a\\=b` does).
pub fn first_unescaped_separator(line: &str) -> Option<usize> {
    let mut run = 0usize;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\\' => run += 1,
            '=' | ':' if run % 2 == 0 => return Some(idx),
            _ => run = 0,
        }
    }
    None
}

/// Position of the first unescaped whitespace character strictly before
/// byte offset `end`.
///
/// Used twice by separator detection: over the whole line when no
/// `=`/`:` exists, and over the region before the separator (minus its
/// padding) when one does.
pub fn first_unescaped_whitespace(line: &str, end: usize) -> Option<usize> {
    let mut run = 0usize;
    for (idx, ch) in line.char_indices() {
        if idx >= end {
            return None;
        }
        match ch {
            '\\' => run += 1,
            c if c.is_whitespace() && run % 2 == 0 => return Some(idx),
            _ => run = 0,
        }
    }
    None
}

/// Start of the contiguous whitespace run that immediately precedes
/// `pos`, or `pos` itself when the preceding character is not
/// whitespace.
///
/// Separator detection uses this to treat `key   =` and `key=` alike:
/// the padding in front of the `=` must not win the whitespace scan.
pub fn whitespace_run_start(line: &str, pos: usize) -> usize {
    let mut start = pos;
    for (idx, ch) in line[..pos].char_indices().rev() {
        if !ch.is_whitespace() {
            break;
        }
        start = idx;
    }
    start
}

/// Whether the line ends in an unescaped backslash, i.e. a trailing run
/// of an odd number of backslashes.
///
/// This is the line-continuation signal: `a=b\` continues, `a=b\\` is a
/// complete logical line whose value ends in a literal backslash.
pub fn ends_with_unescaped_backslash(line: &str) -> bool {
    let run = line.chars().rev().take_while(|&c| c == '\\').count();
    run % 2 == 1
}
