//! `\uXXXX` escape codec over UTF-16 code units.
//!
//! Encoding emits one lowercase four-digit escape per UTF-16 code unit, so
//! characters outside the basic plane produce a surrogate pair of escapes.
//! Decoding collects every well-formed escape, ignores everything between
//! them, and rebuilds characters from the unit sequence; an unpaired
//! surrogate decodes to U+FFFD.

/// Decodes every `\uXXXX` escape in `text`, dropping all other input.
/// Text without a single escape decodes to the empty string.
pub fn decode_escapes(text: &str) -> String {
  let bytes = text.as_bytes();
  let mut units: Vec<u16> = Vec::new();
  let mut i = 0;
  while i + 6 <= bytes.len() {
    let is_escape = bytes[i] == b'\\'
      && bytes[i + 1] == b'u'
      && bytes[i + 2..i + 6].iter().all(u8::is_ascii_hexdigit);
    if is_escape {
      if let Ok(unit) = u16::from_str_radix(&text[i + 2..i + 6], 16) {
        units.push(unit);
      }
      i += 6;
    } else {
      i += 1;
    }
  }
  char::decode_utf16(units)
    .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
    .collect()
}

/// Encodes `text` as one `\uXXXX` escape per UTF-16 code unit.
pub fn encode_escapes(text: &str) -> String {
  let mut out = String::with_capacity(text.len() * 6);
  for unit in text.encode_utf16() {
    out.push_str(&format!("\\u{unit:04x}"));
  }
  out
}
