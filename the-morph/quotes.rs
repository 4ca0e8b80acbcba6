//! Quote delimiter swapping.
//!
//! Rewrites a quoted fragment between single and double quote delimiters,
//! swapping the quotes inside it as well. An apostrophe buried in a word is
//! recognized by its letter neighbors and survives the swap, escaped when
//! the new delimiter is itself a single quote.

use crate::Tendril;

/// Swaps the quote style of a fragment that starts and ends with the same
/// quote character. Anything not shaped like a quoted string comes back
/// unchanged.
pub fn swap_quotes(text: &str) -> Tendril {
  let chars: Vec<char> = text.chars().collect();
  if chars.len() < 2 {
    return text.into();
  }
  let delimiter = chars[0];
  if !matches!(delimiter, '"' | '\'') || chars[chars.len() - 1] != delimiter {
    return text.into();
  }
  let swapped = if delimiter == '"' { '\'' } else { '"' };

  let mut out = Tendril::new();
  out.push(swapped);
  let inner = &chars[1..chars.len() - 1];
  for (i, &ch) in inner.iter().enumerate() {
    if !matches!(ch, '"' | '\'') {
      out.push(ch);
      continue;
    }
    let prev_alpha = i > 0 && inner[i - 1].is_ascii_alphabetic();
    let next_alpha = inner
      .get(i + 1)
      .is_some_and(|next| next.is_ascii_alphabetic());
    if ch == '\'' && prev_alpha && next_alpha {
      // An apostrophe inside a word, not a quote.
      if swapped == '\'' {
        out.push_str("\\'");
      } else {
        out.push('\'');
      }
    } else if ch == delimiter {
      out.push(swapped);
    } else {
      out.push(delimiter);
    }
  }
  out.push(swapped);

  out
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn swaps_delimiters() {
    assert_eq!(swap_quotes("'hello'"), "\"hello\"");
    assert_eq!(swap_quotes("\"hello\""), "'hello'");
    assert_eq!(swap_quotes("\"中文\""), "'中文'");
  }

  #[test]
  fn swaps_inner_quotes() {
    assert_eq!(swap_quotes("\"say 'hi'\""), "'say \"hi\"'");
    assert_eq!(swap_quotes("'say \"hi\"'"), "\"say 'hi'\"");
  }

  #[test]
  fn apostrophes_survive() {
    // Wrapping in single quotes escapes the apostrophe.
    assert_eq!(swap_quotes("\"I'm here\""), "'I\\'m here'");
    // Wrapping in double quotes keeps it as it is.
    assert_eq!(swap_quotes("'it's'"), "\"it's\"");
  }

  #[test]
  fn rejects_unquoted_fragments() {
    assert_eq!(swap_quotes("plain"), "plain");
    assert_eq!(swap_quotes("\"mismatched'"), "\"mismatched'");
    assert_eq!(swap_quotes("'"), "'");
    assert_eq!(swap_quotes(""), "");
  }
}
