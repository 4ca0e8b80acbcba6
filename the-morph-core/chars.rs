//! Character predicates shared by the transformation passes.
//!
//! The case conversions and the slug/identifier cleanups all agree on the
//! same three questions about a character: does it separate words, does it
//! belong to an identifier, does it end a line. Keeping the answers here
//! keeps every pass consistent.

/// Whether `ch` splits words for the case conversions: `-`, `_`, or any
/// whitespace.
#[inline]
pub fn char_is_separator(ch: char) -> bool {
  matches!(ch, '-' | '_') || ch.is_whitespace()
}

/// Whether `ch` is an identifier character: ASCII alphanumeric or `_`.
///
/// ASCII-only. Accented letters are folded or dropped by the passes that
/// care about them before this predicate runs.
#[inline]
pub fn char_is_word(ch: char) -> bool {
  ch.is_ascii_alphanumeric() || ch == '_'
}

/// Whether `ch` terminates a line.
#[inline]
pub fn char_is_line_ending(ch: char) -> bool {
  matches!(ch, '\n' | '\r')
}
