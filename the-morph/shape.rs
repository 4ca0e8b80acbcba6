//! Shape transforms.
//!
//! Everything that reshapes a fragment without being an identifier case
//! convention, a quote swap or a numeral operation: capitalization,
//! whitespace cleanup, diacritic folding, three titleizing dialects,
//! reversal, slicing and escape-sequence conversion.
//!
//! The parameterized transforms (`chop`, `truncate`, `prune`, `repeat`)
//! take their argument as an `f64` straight from the prompt and truncate it
//! toward zero. Slicing is measured in characters, and a negative length
//! counts back from the end of the fragment.

use rand::Rng;
use the_morph_core::{
  chars::char_is_word,
  escape,
};

use crate::{
  Tendril,
  case_convention::{
    dasherize,
    underscored,
  },
};

/// Uppercases the first character and leaves the rest alone.
pub fn capitalize(text: &str) -> Tendril {
  let mut chars = text.chars();
  let Some(first) = chars.next() else {
    return Tendril::new();
  };
  let mut out = Tendril::new();
  for up in first.to_uppercase() {
    out.push(up);
  }
  out.push_str(chars.as_str());
  out
}

/// Lowercases the first character and leaves the rest alone.
pub fn decapitalize(text: &str) -> Tendril {
  let mut chars = text.chars();
  let Some(first) = chars.next() else {
    return Tendril::new();
  };
  let mut out = Tendril::new();
  for low in first.to_lowercase() {
    out.push(low);
  }
  out.push_str(chars.as_str());
  out
}

/// Sentence case: first character up, everything after it down.
pub fn sentence(text: &str) -> Tendril {
  let mut chars = text.chars();
  let Some(first) = chars.next() else {
    return Tendril::new();
  };
  let mut out = Tendril::new();
  for up in first.to_uppercase() {
    out.push(up);
  }
  out.push_str(&chars.as_str().to_lowercase());
  out
}

/// Trims the fragment and collapses every run of two or more whitespace
/// characters into a single space. A lone whitespace character is kept as
/// it is, so single tabs survive.
pub fn clean(text: &str) -> Tendril {
  let mut out = Tendril::new();
  // State: (run, first_ws) for the whitespace run being scanned.
  let mut run = 0usize;
  let mut first_ws = ' ';

  for ch in text.trim().chars() {
    if ch.is_whitespace() {
      if run == 0 {
        first_ws = ch;
      }
      run += 1;
    } else {
      match run {
        0 => {},
        1 => out.push(first_ws),
        _ => out.push(' '),
      }
      run = 0;
      out.push(ch);
    }
  }

  out
}

/// Folds accented Latin characters to their plain ASCII base letter.
pub fn clean_diacritics(text: &str) -> Tendril {
  let mut out = Tendril::new();
  for ch in text.chars() {
    match ch {
      'ą' | 'à' | 'á' | 'ä' | 'â' | 'ã' | 'å' | 'æ' | 'ă' => out.push('a'),
      'ć' | 'č' | 'ĉ' | 'ç' => out.push('c'),
      'ę' | 'è' | 'é' | 'ë' | 'ê' => out.push('e'),
      'ĝ' => out.push('g'),
      'ĥ' => out.push('h'),
      'ì' | 'í' | 'ï' | 'î' => out.push('i'),
      'ĵ' => out.push('j'),
      'ł' | 'ľ' => out.push('l'),
      'ń' | 'ň' | 'ñ' => out.push('n'),
      'ò' | 'ó' | 'ö' | 'ő' | 'ô' | 'õ' | 'ð' | 'ø' => out.push('o'),
      'ś' | 'ș' | 'ş' | 'š' | 'ŝ' => out.push('s'),
      'ť' | 'ț' | 'ţ' => out.push('t'),
      'ŭ' | 'ù' | 'ú' | 'ü' | 'ű' | 'û' => out.push('u'),
      'ÿ' | 'ý' => out.push('y'),
      'ż' | 'ź' | 'ž' => out.push('z'),
      'Ą' | 'À' | 'Á' | 'Ä' | 'Â' | 'Ã' | 'Å' | 'Æ' | 'Ă' => out.push('A'),
      'Ć' | 'Č' | 'Ĉ' | 'Ç' => out.push('C'),
      'Ę' | 'È' | 'É' | 'Ë' | 'Ê' => out.push('E'),
      'Ĝ' => out.push('G'),
      'Ĥ' => out.push('H'),
      'Ì' | 'Í' | 'Ï' | 'Î' => out.push('I'),
      'Ĵ' => out.push('J'),
      'Ł' | 'Ľ' => out.push('L'),
      'Ń' | 'Ň' | 'Ñ' => out.push('N'),
      'Ò' | 'Ó' | 'Ö' | 'Ő' | 'Ô' | 'Õ' | 'Ð' | 'Ø' => out.push('O'),
      'Ś' | 'Ș' | 'Ş' | 'Š' | 'Ŝ' => out.push('S'),
      'Ť' | 'Ț' | 'Ţ' => out.push('T'),
      'Ŭ' | 'Ù' | 'Ú' | 'Ü' | 'Ű' | 'Û' => out.push('U'),
      'Ÿ' | 'Ý' => out.push('Y'),
      'Ż' | 'Ź' | 'Ž' => out.push('Z'),
      'ß' => out.push_str("ss"),
      _ => out.push(ch),
    }
  }
  out
}

/// Lowercases the fragment and uppercases the first letter of each word.
/// Word starts are the first character and any character directly after
/// whitespace or a dash.
pub fn titleize(text: &str) -> Tendril {
  let lower = text.to_lowercase();
  let mut out = Tendril::new();
  let mut chars = lower.chars().peekable();
  let mut at_start = true;

  // The scan consumes the boundary character together with the letter it
  // uppercases, so one boundary character can not introduce two words and
  // a leading dash keeps the word after it lowercase.
  while let Some(ch) = chars.next() {
    if at_start {
      at_start = false;
      if !ch.is_whitespace() {
        for up in ch.to_uppercase() {
          out.push(up);
        }
        continue;
      }
    }
    let introduces_word = (ch.is_whitespace() || ch == '-')
      && chars.peek().is_some_and(|next| !next.is_whitespace());
    out.push(ch);
    if introduces_word {
      if let Some(next) = chars.next() {
        for up in next.to_uppercase() {
          out.push(up);
        }
      }
    }
  }

  out
}

/// One token of a title: a word, a whitespace run, or a punctuation
/// separator that passes through verbatim.
enum TitlePart {
  Word(String),
  Whitespace,
  Separator(char),
}

// ASCII hyphen, non-breaking hyphen, en dash, em dash, plus clause
// punctuation.
fn is_title_separator(ch: char) -> bool {
  matches!(
    ch,
    '-' | '‑' | '–' | '—' | ',' | ':' | ';' | '!' | '?' | '(' | ')'
  )
}

/// Splits into words and separators, keeping the empty words that appear
/// between adjacent separators and at the edges. Those empties count for
/// the first/last positions the stopword rule exempts.
fn split_title_parts(text: &str) -> Vec<TitlePart> {
  let mut parts = Vec::new();
  let mut word = String::new();
  let mut chars = text.chars().peekable();

  while let Some(ch) = chars.next() {
    if ch.is_whitespace() {
      parts.push(TitlePart::Word(std::mem::take(&mut word)));
      while chars.peek().is_some_and(|next| next.is_whitespace()) {
        chars.next();
      }
      parts.push(TitlePart::Whitespace);
    } else if is_title_separator(ch) {
      parts.push(TitlePart::Word(std::mem::take(&mut word)));
      parts.push(TitlePart::Separator(ch));
    } else {
      word.push(ch);
    }
  }
  parts.push(TitlePart::Word(word));

  parts
}

/// AP headline style: every word capitalized except a fixed stopword list,
/// which stays lowercase unless it opens or closes the title. Whitespace
/// runs collapse to a single space.
pub fn titleize_ap_style(text: &str) -> Tendril {
  const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "but", "by", "for", "in", "nor", "of", "on", "or", "so", "the",
    "to", "up", "yet",
  ];

  let parts = split_title_parts(text);
  let last = parts.len() - 1;
  let mut out = Tendril::new();

  for (index, part) in parts.iter().enumerate() {
    match part {
      TitlePart::Whitespace => out.push(' '),
      TitlePart::Separator(ch) => out.push(*ch),
      TitlePart::Word(word) => {
        let lower = word.to_lowercase();
        if index != 0 && index != last && STOPWORDS.contains(&lower.as_str()) {
          out.push_str(&lower);
        } else {
          out.push_str(&capitalize(word));
        }
      },
    }
  }

  out
}

/// Chicago Manual style: like AP but with its own small-word list, word
/// positions counted over words only, and the whitespace between words
/// kept verbatim.
pub fn titleize_chicago_style(text: &str) -> Tendril {
  const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "nor", "of", "on",
    "or", "per", "the", "to", "v", "v.", "vs", "vs.", "via",
  ];

  let word_count = text.split_whitespace().count();
  let mut out = Tendril::new();
  let mut word_index = 0;
  let mut chars = text.char_indices().peekable();

  while let Some((start, ch)) = chars.next() {
    if ch.is_whitespace() {
      out.push(ch);
      continue;
    }
    let mut end = start + ch.len_utf8();
    while let Some(&(i, next)) = chars.peek() {
      if next.is_whitespace() {
        break;
      }
      chars.next();
      end = i + next.len_utf8();
    }
    let word = &text[start..end];
    let lower = word.to_lowercase();
    if word_index != 0 && word_index + 1 != word_count && SMALL_WORDS.contains(&lower.as_str())
    {
      out.push_str(&lower);
    } else {
      out.push_str(&capitalize(word));
    }
    word_index += 1;
  }

  out
}

/// Turns an identifier into a label: underscores the fragment, strips a
/// trailing `_id`, spaces the underscores out and capitalizes the result.
pub fn humanize(text: &str) -> Tendril {
  let under = underscored(text);
  let stripped = under.strip_suffix("_id").unwrap_or(under.as_str());
  let spaced: String = stripped
    .chars()
    .map(|ch| if ch == '_' { ' ' } else { ch })
    .collect();
  capitalize(spaced.trim())
}

/// Reverses the fragment character by character.
pub fn reverse(text: &str) -> Tendril {
  text.chars().rev().collect()
}

/// Flips the case of every cased character; whitespace and caseless
/// characters pass through.
pub fn swap_case(text: &str) -> Tendril {
  let mut out = Tendril::new();
  for ch in text.chars() {
    if ch.is_whitespace() {
      out.push(ch);
    } else if ch.is_lowercase() {
      for up in ch.to_uppercase() {
        out.push(up);
      }
    } else {
      for low in ch.to_lowercase() {
        out.push(low);
      }
    }
  }
  out
}

/// Flips a coin per character and upper- or lowercases it accordingly.
pub fn random_case(text: &str) -> Tendril {
  let mut rng = rand::thread_rng();
  let mut out = Tendril::new();
  for ch in text.chars() {
    if rng.gen_bool(0.5) {
      for low in ch.to_lowercase() {
        out.push(low);
      }
    } else {
      for up in ch.to_uppercase() {
        out.push(up);
      }
    }
  }
  out
}

/// Splits the fragment into chunks of `step` characters joined by commas.
/// A step of zero or less leaves the fragment alone.
pub fn chop(text: &str, step: f64) -> Tendril {
  let step = step as i64;
  if step <= 0 || text.is_empty() {
    return text.into();
  }
  let mut out = Tendril::new();
  let mut count = 0;
  for ch in text.chars() {
    if count == step {
      out.push(',');
      count = 0;
    }
    out.push(ch);
    count += 1;
  }
  out
}

/// Cuts the fragment to `length` characters and marks the cut with `...`.
/// Fragments already within the limit come back unchanged.
pub fn truncate(text: &str, length: f64) -> Tendril {
  let length = length as i64;
  if text.chars().count() as i64 > length {
    let mut out = Tendril::from(slice_to(text, length));
    out.push_str("...");
    out
  } else {
    text.into()
  }
}

/// Cuts the fragment so the `...` fits inside the length budget, trimming
/// the stub before appending. The ellipsis is always appended.
pub fn prune(text: &str, length: f64) -> Tendril {
  let mut out = Tendril::from(slice_to(text, (length - 3.0) as i64).trim());
  out.push_str("...");
  out
}

/// Repeats the fragment `count` times; a count below one yields nothing.
pub fn repeat(text: &str, count: f64) -> Tendril {
  let count = count as i64;
  if count < 1 {
    return Tendril::new();
  }
  text.repeat(count as usize).into()
}

/// A URL-ready slug: diacritics folded, everything outside `[A-Za-z0-9]`
/// collapsed into dashes, lowercased, dashes trimmed from the ends.
pub fn slugify(text: &str) -> Tendril {
  let cleaned = clean_diacritics(text);
  let mapped: String = cleaned
    .chars()
    .map(|ch| {
      if char_is_word(ch) || ch.is_whitespace() || ch == '-' {
        ch
      } else {
        '-'
      }
    })
    .collect();
  let dashed = dasherize(&mapped.to_lowercase());
  dashed.trim_matches('-').into()
}

/// Decodes `\uXXXX` escape sequences into the characters they name.
pub fn utf8_to_char(text: &str) -> Tendril {
  escape::decode_escapes(text).into()
}

/// Encodes every character as `\uXXXX` escape sequences, one per UTF-16
/// unit.
pub fn char_to_utf8(text: &str) -> Tendril {
  escape::encode_escapes(text).into()
}

fn slice_to(text: &str, end: i64) -> &str {
  let char_len = text.chars().count() as i64;
  let end = if end < 0 {
    (char_len + end).max(0)
  } else {
    end.min(char_len)
  };
  match text.char_indices().nth(end as usize) {
    Some((byte, _)) => &text[..byte],
    None => text,
  }
}
