//! Numeral transforms.
//!
//! Stepping and renumbering of the integer and decimal literals inside a
//! fragment. Every transform walks the fragment's tokens, copies the gaps
//! between them verbatim and rewrites the literals in place, so signs and
//! zero padding behave per [`the_morph_core::numerals`]. A literal whose
//! value does not fit `i128` is left untouched.
//!
//! [`sequence`] is the one transform that carries state: the dispatcher
//! threads a single [`SequenceState`] through all ranges of an invocation
//! in document order, so a multi-cursor renumbering continues across
//! selections instead of restarting at each one.

use the_morph_core::numerals::{
  decimal_tokens,
  format_decimal,
  format_sequenced,
  format_stepped,
  integer_tokens,
};

use crate::Tendril;

/// Counter threaded through one `sequence` invocation. `offset` holds the
/// last emitted value; the next literal becomes `offset + 1`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequenceState {
  pub offset: Option<i128>,
}

/// Steps every integer literal up by one.
pub fn increment(text: &str) -> Tendril {
  step_integers(text, 1)
}

/// Steps every integer literal down by one.
pub fn decrement(text: &str) -> Tendril {
  step_integers(text, -1)
}

/// Steps every decimal literal up by one unit of its last fraction digit.
pub fn increment_float(text: &str) -> Tendril {
  step_decimals(text, 1)
}

/// Steps every decimal literal down by one unit of its last fraction digit.
pub fn decrement_float(text: &str) -> Tendril {
  step_decimals(text, -1)
}

fn step_integers(text: &str, delta: i128) -> Tendril {
  let mut out = Tendril::new();
  let mut consumed = 0;

  for token in integer_tokens(text) {
    out.push_str(&text[consumed..token.start]);
    let literal = token.literal(text);
    match token.value(text).and_then(|value| value.checked_add(delta)) {
      Some(stepped) => out.push_str(&format_stepped(literal, stepped)),
      None => out.push_str(literal),
    }
    consumed = token.end;
  }
  out.push_str(&text[consumed..]);

  out
}

fn step_decimals(text: &str, delta: i128) -> Tendril {
  let mut out = Tendril::new();
  let mut consumed = 0;

  for token in decimal_tokens(text) {
    out.push_str(&text[consumed..token.start]);
    match token.value(text).and_then(|value| value.step(delta)) {
      Some(stepped) => {
        out.push_str(&format_decimal(token.integer_literal(text), stepped))
      },
      None => out.push_str(token.literal(text)),
    }
    consumed = token.end;
  }
  out.push_str(&text[consumed..]);

  out
}

/// Renumbers integer literals into a running sequence. The first literal
/// seen by a fresh state seeds the counter and stays as it is; every
/// literal after that emits the next value.
pub fn sequence(text: &str, state: &mut SequenceState) -> Tendril {
  let pad_target = sequence_pad_target(text);
  let mut out = Tendril::new();
  let mut consumed = 0;

  for token in integer_tokens(text) {
    out.push_str(&text[consumed..token.start]);
    let emitted = match (token.value(text), state.offset) {
      (Some(value), None) => {
        state.offset = Some(value);
        Some(value)
      },
      (Some(_), Some(prev)) => match prev.checked_add(1) {
        Some(next) => {
          state.offset = Some(next);
          Some(next)
        },
        None => None,
      },
      (None, _) => None,
    };
    match emitted {
      Some(value) => out.push_str(&format_sequenced(value, pad_target)),
      None => out.push_str(token.literal(text)),
    }
    consumed = token.end;
  }
  out.push_str(&text[consumed..]);

  out
}

/// Emissions pad to the widest zero-padded literal in the fragment,
/// measured with its sign included.
fn sequence_pad_target(text: &str) -> usize {
  integer_tokens(text)
    .filter_map(|token| {
      let literal = token.literal(text);
      let digits = literal.strip_prefix('-').unwrap_or(literal);
      (literal.len() > 1 && digits.starts_with('0')).then_some(literal.len())
    })
    .max()
    .unwrap_or(0)
}
