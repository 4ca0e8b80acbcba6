//! Identifier case conventions.
//!
//! Conversions between the conventions a programmer flips between all day:
//! `camelCase`, `ClassCase`, `dash-erized`, `under_scored`, `snake_case`
//! and `SCREAMING_SNAKE_CASE`. All of them trim the input first and treat a
//! run of separators as a single boundary, which makes each one idempotent
//! on its own output.

use the_morph_core::chars::char_is_separator;

use crate::{
  Tendril,
  shape::capitalize,
};

/// `moz-transform` to `mozTransform`; leading separators capitalize the
/// first word, so `-moz-transform` becomes `MozTransform`.
pub fn camelize(text: &str) -> Tendril {
  // All-caps input is lowered first so MOZ-TRANSFORM comes out as
  // mozTransform rather than MOZTRANSFORM.
  let lowered;
  let text = if text.chars().any(|ch| ch.is_ascii_lowercase()) {
    text
  } else {
    lowered = text.to_lowercase();
    &lowered
  };
  camelize_raw(text)
}

fn camelize_raw(text: &str) -> Tendril {
  let mut out = Tendril::new();
  // State: a pending separator run uppercases the next character.
  let mut sep_pending = false;

  for ch in text.trim().chars() {
    if char_is_separator(ch) {
      sep_pending = true;
    } else if sep_pending {
      for up in ch.to_uppercase() {
        out.push(up);
      }
      sep_pending = false;
    } else {
      out.push(ch);
    }
  }

  out
}

/// `some_class_name` to `SomeClassName`. Anything that is not an ASCII
/// letter or digit acts as a word boundary.
pub fn classify(text: &str) -> Tendril {
  let spaced: String = text
    .chars()
    .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { ' ' })
    .collect();
  capitalize(&camelize_raw(&spaced))
}

/// `MozTransform` to `-moz-transform`.
pub fn dasherize(text: &str) -> Tendril {
  let mut out = Tendril::new();
  // State: a pending separator run folds into a single dash.
  let mut sep_pending = false;

  for ch in text.trim().chars() {
    if char_is_separator(ch) {
      sep_pending = true;
    } else {
      if sep_pending || ch.is_ascii_uppercase() {
        out.push('-');
        sep_pending = false;
      }
      for low in ch.to_lowercase() {
        out.push(low);
      }
    }
  }
  if sep_pending {
    out.push('-');
  }

  out
}

/// `camelCase` and `dash-erized` input to `under_scored`. Underscores
/// already present pass through untouched.
pub fn underscored(text: &str) -> Tendril {
  let mut out = Tendril::new();
  // State: (sep_pending, prev). Dashes and whitespace become a pending
  // underscore; a case boundary after a lowercase letter or digit inserts
  // one of its own.
  let mut sep_pending = false;
  let mut prev: Option<char> = None;

  for ch in text.trim().chars() {
    if ch == '-' || ch.is_whitespace() {
      sep_pending = true;
      prev = Some(ch);
      continue;
    }
    if sep_pending {
      out.push('_');
      sep_pending = false;
    } else if let Some(p) = prev {
      if (p.is_ascii_lowercase() || p.is_ascii_digit()) && ch.is_ascii_uppercase() {
        out.push('_');
      }
    }
    for low in ch.to_lowercase() {
      out.push(low);
    }
    prev = Some(ch);
  }
  if sep_pending {
    out.push('_');
  }

  out
}

/// `under_scored` with every non-alphanumeric run collapsed to a single
/// underscore and stripped from the ends.
pub fn snake(text: &str) -> Tendril {
  let under = underscored(text);
  let mut out = Tendril::new();
  // State: boundary_pending collapses non-alphanumeric runs.
  let mut boundary_pending = false;

  for ch in under.chars() {
    if ch.is_ascii_alphanumeric() {
      if boundary_pending && !out.is_empty() {
        out.push('_');
      }
      boundary_pending = false;
      out.push(ch);
    } else {
      boundary_pending = true;
    }
  }

  out
}

/// [`snake`], uppercased.
pub fn screaming_snake(text: &str) -> Tendril {
  snake(text).to_uppercase().into()
}
