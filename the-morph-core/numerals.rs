//! Numeral token scanning and rewriting.
//!
//! # Token Model
//!
//! An integer token is a maximal ASCII digit run together with a directly
//! preceding `-`, when that `-` has not already been claimed by an earlier
//! token. The scan is leftmost and non-overlapping, so `"4-5"` yields `4`
//! and `-5`, while `"45"` yields a single `45`. A decimal token additionally
//! requires a `.` and at least one fraction digit right after the integer
//! digits; a bare digit run never counts as a decimal token.
//!
//! Token values are `i128`. A literal that does not fit is reported as
//! valueless and callers leave it untouched.
//!
//! # Zero Padding
//!
//! Rewritten literals keep their zero padding: when the digit part (sign
//! excluded) is wider than one and starts with `0`, the result is re-padded
//! to the same digit width. A sign-less padded literal that crosses below
//! zero gives one digit up to the new `-`, so the overall width holds:
//! `"000"` stepped down becomes `"-01"`.
//!
//! Sequence-style padding ([`format_sequenced`]) measures the literal with
//! its sign included and pads every emission to the widest qualifying
//! literal.

/// Byte span of one signed integer literal inside a scanned string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerToken {
  pub start: usize,
  pub end:   usize,
}

impl IntegerToken {
  pub fn literal<'a>(&self, text: &'a str) -> &'a str {
    &text[self.start..self.end]
  }

  /// Parsed value, `None` when the literal overflows `i128`.
  pub fn value(&self, text: &str) -> Option<i128> {
    self.literal(text).parse().ok()
  }
}

/// Byte span of one signed decimal literal; `point` is the byte offset of
/// the `.` between the integer and fraction digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalToken {
  pub start: usize,
  pub point: usize,
  pub end:   usize,
}

impl DecimalToken {
  pub fn literal<'a>(&self, text: &'a str) -> &'a str {
    &text[self.start..self.end]
  }

  /// Integer digits, sign included.
  pub fn integer_literal<'a>(&self, text: &'a str) -> &'a str {
    &text[self.start..self.point]
  }

  /// Fraction digits, `.` excluded.
  pub fn fraction_literal<'a>(&self, text: &'a str) -> &'a str {
    &text[self.point + 1..self.end]
  }

  /// Fixed-point value scaled by the fraction width, `None` on overflow.
  pub fn value(&self, text: &str) -> Option<ScaledDecimal> {
    scaled_value(self.integer_literal(text), self.fraction_literal(text))
  }
}

/// A decimal literal held in fixed point: `scaled` is the value multiplied
/// by `10^frac_digits`. Built through [`DecimalToken::value`], which only
/// succeeds when the scaling fits `i128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledDecimal {
  pub scaled:      i128,
  pub frac_digits: u32,
}

impl ScaledDecimal {
  /// Moves the value by `delta` units of the last fraction digit.
  pub fn step(self, delta: i128) -> Option<Self> {
    Some(Self {
      scaled: self.scaled.checked_add(delta)?,
      ..self
    })
  }
}

pub fn integer_tokens(text: &str) -> IntegerTokens<'_> {
  IntegerTokens { text, pos: 0 }
}

pub fn decimal_tokens(text: &str) -> DecimalTokens<'_> {
  DecimalTokens { text, pos: 0 }
}

#[derive(Debug, Clone)]
pub struct IntegerTokens<'a> {
  text: &'a str,
  pos:  usize,
}

impl Iterator for IntegerTokens<'_> {
  type Item = IntegerToken;

  fn next(&mut self) -> Option<IntegerToken> {
    let bytes = self.text.as_bytes();
    let mut i = self.pos;
    while i < bytes.len() {
      if bytes[i].is_ascii_digit() {
        // The sign belongs to this token only when it sits directly before
        // the digits and after the previous token's end.
        let start = if i > self.pos && bytes[i - 1] == b'-' {
          i - 1
        } else {
          i
        };
        let mut end = i + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
          end += 1;
        }
        self.pos = end;
        return Some(IntegerToken { start, end });
      }
      i += 1;
    }
    self.pos = bytes.len();
    None
  }
}

#[derive(Debug, Clone)]
pub struct DecimalTokens<'a> {
  text: &'a str,
  pos:  usize,
}

impl Iterator for DecimalTokens<'_> {
  type Item = DecimalToken;

  fn next(&mut self) -> Option<DecimalToken> {
    let bytes = self.text.as_bytes();
    let mut i = self.pos;
    while i < bytes.len() {
      if !bytes[i].is_ascii_digit() {
        i += 1;
        continue;
      }
      let digits_start = i;
      let mut point = i + 1;
      while point < bytes.len() && bytes[point].is_ascii_digit() {
        point += 1;
      }
      let has_fraction =
        point + 1 < bytes.len() && bytes[point] == b'.' && bytes[point + 1].is_ascii_digit();
      if has_fraction {
        let mut end = point + 2;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
          end += 1;
        }
        let start = if digits_start > self.pos && bytes[digits_start - 1] == b'-' {
          digits_start - 1
        } else {
          digits_start
        };
        self.pos = end;
        return Some(DecimalToken { start, point, end });
      }
      // A bare digit run is not a decimal token. Skip it locally; the
      // consumed cursor only moves past real tokens, so a `-` between this
      // run and the next token can still act as a sign.
      i = point;
    }
    self.pos = bytes.len();
    None
  }
}

/// Formats a stepped integer, re-padding per the literal it replaces.
pub fn format_stepped(literal: &str, value: i128) -> String {
  let digits = literal.strip_prefix('-').unwrap_or(literal);
  if !is_zero_padded(digits) {
    return value.to_string();
  }
  let width = digits.len();
  if value >= 0 {
    return format!("{value:0width$}");
  }
  let target = if literal.starts_with('-') { width } else { width - 1 };
  let abs = value.unsigned_abs();
  format!("-{abs:0target$}")
}

/// Formats one sequence emission. `pad_target` is the widest qualifying
/// literal (sign included) in the surrounding text, or 0 for no padding.
pub fn format_sequenced(value: i128, pad_target: usize) -> String {
  if pad_target == 0 {
    return value.to_string();
  }
  if value < 0 {
    let width = pad_target - 1;
    let abs = value.unsigned_abs();
    format!("-{abs:0width$}")
  } else {
    format!("{value:0pad_target$}")
  }
}

/// Formats a stepped decimal with the original fraction width, re-padding
/// the integer digits per the integer part of the literal it replaces.
pub fn format_decimal(int_literal: &str, value: ScaledDecimal) -> String {
  let frac_width = value.frac_digits as usize;
  let min_width = frac_width + 1;
  let abs = value.scaled.unsigned_abs();
  let all = format!("{abs:0min_width$}");
  let (int_digits, frac_digits) = all.split_at(all.len() - frac_width);

  let negative = value.scaled < 0;
  let digits = int_literal.strip_prefix('-').unwrap_or(int_literal);
  let int_str = if is_zero_padded(digits) {
    let width = digits.len();
    if negative {
      let target = if int_literal.starts_with('-') { width } else { width - 1 };
      format!("-{int_digits:0>target$}")
    } else {
      format!("{int_digits:0>width$}")
    }
  } else if negative {
    format!("-{int_digits}")
  } else {
    int_digits.to_string()
  };

  format!("{int_str}.{frac_digits}")
}

fn is_zero_padded(digits: &str) -> bool {
  digits.len() > 1 && digits.starts_with('0')
}

fn scaled_value(int_literal: &str, frac_literal: &str) -> Option<ScaledDecimal> {
  let frac_digits = frac_literal.len() as u32;
  let scale = 10i128.checked_pow(frac_digits)?;
  let int: i128 = int_literal.parse().ok()?;
  let frac: i128 = frac_literal.parse().ok()?;
  let magnitude = int.checked_mul(scale)?;
  let scaled = if int_literal.starts_with('-') {
    magnitude.checked_sub(frac)?
  } else {
    magnitude.checked_add(frac)?
  };
  Some(ScaledDecimal {
    scaled,
    frac_digits,
  })
}

#[cfg(test)]
mod test {
  use super::*;

  fn integers(text: &str) -> Vec<&str> {
    integer_tokens(text).map(|t| t.literal(text)).collect()
  }

  fn decimals(text: &str) -> Vec<&str> {
    decimal_tokens(text).map(|t| t.literal(text)).collect()
  }

  #[test]
  fn integer_scan() {
    assert_eq!(integers("a1 b2 c3"), ["1", "2", "3"]);
    assert_eq!(integers("12x y23 34z45"), ["12", "23", "34", "45"]);
    assert_eq!(integers("no numerals here"), Vec::<&str>::new());
    assert_eq!(integers(""), Vec::<&str>::new());
  }

  #[test]
  fn integer_scan_signs() {
    assert_eq!(integers("-4"), ["-4"]);
    assert_eq!(integers("a-4 b-3"), ["-4", "-3"]);
    // The dash between two runs signs the second run.
    assert_eq!(integers("4-5"), ["4", "-5"]);
    assert_eq!(integers("1-2-3"), ["1", "-2", "-3"]);
    // Only the dash directly before the digits counts.
    assert_eq!(integers("--5"), ["-5"]);
    assert_eq!(integers("- 5"), ["5"]);
  }

  #[test]
  fn integer_scan_multibyte_neighbors() {
    assert_eq!(integers("é12‑34"), ["12", "34"]);
    assert_eq!(integers("中-7文"), ["-7"]);
  }

  #[test]
  fn integer_values() {
    let text = "x-42";
    let token = integer_tokens(text).next().unwrap();
    assert_eq!(token.value(text), Some(-42));

    let wide = "170141183460469231731687303715884105728"; // i128::MAX + 1
    let token = integer_tokens(wide).next().unwrap();
    assert_eq!(token.value(wide), None);
  }

  #[test]
  fn decimal_scan() {
    assert_eq!(decimals("1.5"), ["1.5"]);
    assert_eq!(decimals("a1.25 b-0.5"), ["1.25", "-0.5"]);
    assert_eq!(decimals("1.2.3"), ["1.2"]);
    assert_eq!(decimals("5.5-6.6"), ["5.5", "-6.6"]);
    // Bare integers and trailing points are not decimal tokens.
    assert_eq!(decimals("12"), Vec::<&str>::new());
    assert_eq!(decimals("12."), Vec::<&str>::new());
    assert_eq!(decimals(".5"), Vec::<&str>::new());
  }

  #[test]
  fn decimal_parts() {
    let text = "v-03.140";
    let token = decimal_tokens(text).next().unwrap();
    assert_eq!(token.literal(text), "-03.140");
    assert_eq!(token.integer_literal(text), "-03");
    assert_eq!(token.fraction_literal(text), "140");
    assert_eq!(
      token.value(text),
      Some(ScaledDecimal {
        scaled:      -3140,
        frac_digits: 3,
      })
    );
  }

  #[test]
  fn decimal_value_overflow() {
    let text = "0.9999999999999999999999999999999999999999";
    let token = decimal_tokens(text).next().unwrap();
    assert_eq!(token.value(text), None);
  }

  #[test]
  fn stepped_formatting() {
    assert_eq!(format_stepped("7", 8), "8");
    assert_eq!(format_stepped("-1", 0), "0");
    assert_eq!(format_stepped("009", 10), "010");
    assert_eq!(format_stepped("099", 100), "100");
    assert_eq!(format_stepped("010", 9), "009");
    // Crossing zero inside a sign-less padded literal keeps the width.
    assert_eq!(format_stepped("000", -1), "-01");
    assert_eq!(format_stepped("-005", -4), "-004");
    assert_eq!(format_stepped("-001", 0), "000");
  }

  #[test]
  fn sequenced_formatting() {
    assert_eq!(format_sequenced(7, 0), "7");
    assert_eq!(format_sequenced(7, 3), "007");
    assert_eq!(format_sequenced(-7, 3), "-07");
    assert_eq!(format_sequenced(123, 2), "123");
  }

  #[test]
  fn decimal_formatting() {
    let value = |scaled, frac_digits| ScaledDecimal {
      scaled,
      frac_digits,
    };
    assert_eq!(format_decimal("1", value(16, 1)), "1.6");
    assert_eq!(format_decimal("0", value(100, 2)), "1.00");
    assert_eq!(format_decimal("0", value(-1, 1)), "-0.1");
    assert_eq!(format_decimal("007", value(76, 1)), "007.6");
    assert_eq!(format_decimal("00", value(-1, 1)), "-0.1");
    assert_eq!(format_decimal("-03", value(-3141, 3)), "-03.141");
  }

  #[test]
  fn step_saturates_to_identity() {
    let value = ScaledDecimal {
      scaled:      i128::MAX,
      frac_digits: 0,
    };
    assert_eq!(value.step(1), None);
    assert_eq!(value.step(-1).map(|v| v.scaled), Some(i128::MAX - 1));
  }
}
