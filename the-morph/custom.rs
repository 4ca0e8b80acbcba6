//! User-defined regex commands.
//!
//! Hosts can extend the builtin table with their own search and replace
//! transforms, declared in a TOML file under `custom-commands`:
//!
//! ```toml
//! [[custom-commands]]
//! name           = "Strip Trailing Commas"
//! search-pattern = ',\s*$'
//! replacement    = ""
//! multiline      = true
//! ```
//!
//! The optional boolean flags `global`, `ignore-case`, `multiline`,
//! `dot-all`, `unicode`, and `sticky` mirror the flag letters of a
//! `/pattern/gimsuy` regex. A command with no flag set at all replaces
//! globally.
//!
//! Entries are validated one by one. A malformed entry is skipped with a
//! diagnostic instead of failing the whole file, so one typo does not take
//! the rest of the configuration down with it.

use std::{
  fs,
  path::{
    Path,
    PathBuf,
  },
};

use regex::{
  Regex,
  RegexBuilder,
};
use serde::Deserialize;
use thiserror::Error;

use crate::Tendril;

pub type Result<T> = std::result::Result<T, CustomCommandError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CustomCommandError {
  #[error("command name must not be empty")]
  MissingName,

  #[error("command name must be 50 characters or less")]
  NameTooLong,

  #[error("command name may only contain letters, numbers, spaces, hyphens, and underscores")]
  NameCharset,

  #[error("search pattern must not be empty")]
  MissingPattern,

  #[error("invalid regex pattern: {0}")]
  InvalidPattern(String),

  #[error("malformed command entry: {0}")]
  Shape(String),

  #[error("failed to read {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    source: std::io::Error,
  },

  #[error("invalid command file: {0}")]
  Parse(#[from] toml::de::Error),
}

/// A search and replace command declared by the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CustomCommand {
  pub name:           String,
  pub search_pattern: String,
  pub replacement:    String,
  #[serde(default)]
  pub global:         bool,
  #[serde(default)]
  pub ignore_case:    bool,
  #[serde(default)]
  pub multiline:      bool,
  #[serde(default)]
  pub dot_all:        bool,
  #[serde(default)]
  pub unicode:        bool,
  #[serde(default)]
  pub sticky:         bool,
}

impl CustomCommand {
  /// The flag letters in `gimsuy` order. A command with no flag set
  /// defaults to `g`.
  pub fn flags_string(&self) -> String {
    let mut flags = String::new();
    if self.global {
      flags.push('g');
    }
    if self.ignore_case {
      flags.push('i');
    }
    if self.multiline {
      flags.push('m');
    }
    if self.dot_all {
      flags.push('s');
    }
    if self.unicode {
      flags.push('u');
    }
    if self.sticky {
      flags.push('y');
    }
    if flags.is_empty() {
      flags.push('g');
    }
    flags
  }

  /// Stable identifier used for repeat bookkeeping: lowercased, with every
  /// run of non-alphanumeric characters collapsed to a single hyphen.
  pub fn command_id(&self) -> String {
    let mut out = String::new();
    for ch in self.name.to_lowercase().chars() {
      if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
        out.push(ch);
      } else if !out.ends_with('-') {
        out.push('-');
      }
    }
    out.trim_matches('-').to_string()
  }

  /// Checks the declaration without keeping the compiled pattern.
  pub fn validate(&self) -> Result<()> {
    self.compile().map(|_| ())
  }

  /// Validates the declaration and builds the pattern.
  pub fn compile(&self) -> Result<CompiledCommand> {
    if self.name.trim().is_empty() {
      return Err(CustomCommandError::MissingName);
    }
    if self.name.chars().count() > 50 {
      return Err(CustomCommandError::NameTooLong);
    }
    let name_ok = self
      .name
      .chars()
      .all(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace() || matches!(ch, '-' | '_'));
    if !name_ok {
      return Err(CustomCommandError::NameCharset);
    }
    if self.search_pattern.is_empty() {
      return Err(CustomCommandError::MissingPattern);
    }

    let regex = RegexBuilder::new(&self.search_pattern)
      .case_insensitive(self.ignore_case)
      .multi_line(self.multiline)
      .dot_matches_new_line(self.dot_all)
      .unicode(true)
      .build()
      .map_err(|err| CustomCommandError::InvalidPattern(err.to_string()))?;

    let flags = self.flags_string();
    Ok(CompiledCommand {
      name: self.name.clone(),
      regex,
      replacement: self.replacement.clone(),
      global: flags.contains('g'),
      sticky: flags.contains('y'),
    })
  }
}

/// A validated command with its pattern built, ready to run.
#[derive(Debug, Clone)]
pub struct CompiledCommand {
  name:        String,
  regex:       Regex,
  replacement: String,
  global:      bool,
  sticky:      bool,
}

impl CompiledCommand {
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Runs the search and replace over one line of input. The replacement
  /// may reference capture groups as `$1` or `${name}`.
  pub fn apply(&self, text: &str) -> Tendril {
    if self.sticky {
      return self.apply_sticky(text);
    }
    if self.global {
      return self
        .regex
        .replace_all(text, self.replacement.as_str())
        .as_ref()
        .into();
    }
    self
      .regex
      .replace(text, self.replacement.as_str())
      .as_ref()
      .into()
  }

  // The sticky flag anchors every match attempt at the current position.
  // captures_at finds the next match at or after `pos`, so a match that
  // starts later counts as a failed anchored attempt.
  fn apply_sticky(&self, text: &str) -> Tendril {
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while pos <= text.len() {
      let Some(caps) = self.regex.captures_at(text, pos) else {
        break;
      };
      let Some(m) = caps.get(0) else {
        break;
      };
      if m.start() != pos {
        break;
      }
      caps.expand(&self.replacement, &mut out);
      if m.end() > pos {
        pos = m.end();
      } else {
        // Zero-length match: emit the next character and step over it so
        // the scan advances.
        match text[pos..].chars().next() {
          Some(ch) => {
            out.push(ch);
            pos += ch.len_utf8();
          },
          None => break,
        }
      }
      if !self.global {
        break;
      }
    }
    out.push_str(&text[pos..]);
    out.into()
  }
}

/// The outcome of loading a command file: every entry that validated, plus
/// one diagnostic line per entry that did not.
#[derive(Debug, Default)]
pub struct LoadedCommands {
  pub commands:    Vec<CustomCommand>,
  pub diagnostics: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct CommandFile {
  custom_commands: Vec<toml::Value>,
}

fn decode_entry(value: toml::Value) -> Result<CustomCommand> {
  let command: CustomCommand = value
    .try_into()
    .map_err(|err: toml::de::Error| CustomCommandError::Shape(err.to_string()))?;
  command.validate()?;
  Ok(command)
}

/// Parses a command file, keeping valid entries and collecting a
/// diagnostic for each entry that fails to decode or validate.
pub fn load_str(contents: &str) -> Result<LoadedCommands> {
  let file: CommandFile = toml::from_str(contents)?;
  let mut loaded = LoadedCommands::default();
  for (index, value) in file.custom_commands.into_iter().enumerate() {
    match decode_entry(value) {
      Ok(command) => loaded.commands.push(command),
      Err(reason) => {
        log::warn!("skipping custom command {}: {reason}", index + 1);
        loaded.diagnostics.push(format!("Command {}: {reason}", index + 1));
      },
    }
  }
  Ok(loaded)
}

/// Reads and parses a command file from disk.
pub fn load_path(path: &Path) -> Result<LoadedCommands> {
  let contents = fs::read_to_string(path).map_err(|source| CustomCommandError::Io {
    path: path.to_path_buf(),
    source,
  })?;
  load_str(&contents)
}

/// One row of the custom command picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerRow {
  pub label:   String,
  pub preview: Option<String>,
  pub detail:  String,
}

/// Builds picker rows for the configured commands, previewing each one
/// against the first line of the current selection. The preview is omitted
/// when the command leaves the line unchanged or fails to compile.
pub fn picker_rows(commands: &[CustomCommand], selected_text: &str) -> Vec<PickerRow> {
  let first_line = selected_text.split('\n').next().unwrap_or("");
  commands
    .iter()
    .map(|command| {
      let preview = command.compile().ok().and_then(|compiled| {
        let transformed = compiled.apply(first_line);
        if transformed.as_str() == first_line {
          return None;
        }
        if transformed.chars().count() > 50 {
          let head: String = transformed.chars().take(47).collect();
          Some(format!("{head}..."))
        } else {
          Some(transformed.to_string())
        }
      });
      let flags = command.flags_string();
      let detail = format!(
        "/{}/{} → \"{}\" ({})",
        command.search_pattern,
        flags,
        command.replacement,
        flags_description(&flags)
      );
      PickerRow {
        label: command.name.clone(),
        preview,
        detail,
      }
    })
    .collect()
}

fn flags_description(flags: &str) -> String {
  if flags == "g" {
    return "global".to_string();
  }
  let names: Vec<String> = flags
    .chars()
    .map(|flag| {
      match flag {
        'g' => "global".to_string(),
        'i' => "ignoreCase".to_string(),
        'm' => "multiline".to_string(),
        's' => "dotAll".to_string(),
        'u' => "unicode".to_string(),
        'y' => "sticky".to_string(),
        other => other.to_string(),
      }
    })
    .collect();
  names.join(", ")
}

#[cfg(test)]
mod test {
  use std::io::Write;

  use super::*;

  fn command(pattern: &str, replacement: &str) -> CustomCommand {
    CustomCommand {
      name:           "Test".to_string(),
      search_pattern: pattern.to_string(),
      replacement:    replacement.to_string(),
      global:         false,
      ignore_case:    false,
      multiline:      false,
      dot_all:        false,
      unicode:        false,
      sticky:         false,
    }
  }

  #[test]
  fn flags_default_to_global() {
    let mut cmd = command("a", "b");
    assert_eq!(cmd.flags_string(), "g");

    cmd.ignore_case = true;
    assert_eq!(cmd.flags_string(), "i");

    cmd.global = true;
    cmd.multiline = true;
    cmd.dot_all = true;
    cmd.unicode = true;
    cmd.sticky = true;
    assert_eq!(cmd.flags_string(), "gimsuy");
  }

  #[test]
  fn validate_checks_name_then_pattern() {
    let mut cmd = command("a", "b");
    cmd.name = "   ".to_string();
    assert!(matches!(cmd.validate(), Err(CustomCommandError::MissingName)));

    cmd.name = "x".repeat(51);
    assert!(matches!(cmd.validate(), Err(CustomCommandError::NameTooLong)));

    cmd.name = "naïve".to_string();
    assert!(matches!(cmd.validate(), Err(CustomCommandError::NameCharset)));

    cmd.name = "Fine Name-42_ok".to_string();
    cmd.search_pattern = String::new();
    assert!(matches!(
      cmd.validate(),
      Err(CustomCommandError::MissingPattern)
    ));

    cmd.search_pattern = "(".to_string();
    assert!(matches!(
      cmd.validate(),
      Err(CustomCommandError::InvalidPattern(_))
    ));

    cmd.search_pattern = "(a)".to_string();
    assert!(cmd.validate().is_ok());
  }

  #[test]
  fn apply_replaces_globally_by_default() {
    let compiled = command("a", "b").compile().unwrap();
    assert_eq!(compiled.apply("banana"), "bbnbnb");
  }

  #[test]
  fn apply_without_global_flag_replaces_first_match() {
    let mut cmd = command("A", "b");
    cmd.ignore_case = true;
    let compiled = cmd.compile().unwrap();
    assert_eq!(compiled.apply("banana"), "bbnana");
  }

  #[test]
  fn apply_expands_captures() {
    let mut cmd = command(r"(\w+)@(\w+)", "$2.$1");
    cmd.global = true;
    let compiled = cmd.compile().unwrap();
    assert_eq!(compiled.apply("user@host other@place"), "host.user place.other");
  }

  #[test]
  fn sticky_anchors_matches_at_the_scan_position() {
    let mut cmd = command("a", "b");
    cmd.global = true;
    cmd.sticky = true;
    let compiled = cmd.compile().unwrap();
    assert_eq!(compiled.apply("aaba"), "bbba");

    let mut first_only = command("a", "b");
    first_only.sticky = true;
    let compiled = first_only.compile().unwrap();
    assert_eq!(compiled.apply("aab"), "bab");
    assert_eq!(compiled.apply("xaa"), "xaa");
  }

  #[test]
  fn sticky_zero_length_matches_advance() {
    let mut cmd = command("x*", "-");
    cmd.global = true;
    cmd.sticky = true;
    let compiled = cmd.compile().unwrap();
    assert_eq!(compiled.apply("ab"), "-a-b-");
  }

  #[test]
  fn command_ids_are_slugs() {
    let mut cmd = command("a", "b");
    cmd.name = "My Cool Command 2".to_string();
    assert_eq!(cmd.command_id(), "my-cool-command-2");

    cmd.name = "--Weird   Name--".to_string();
    assert_eq!(cmd.command_id(), "weird-name");
  }

  #[test]
  fn load_str_skips_invalid_entries() {
    let contents = r#"
      [[custom-commands]]
      name           = "Emails"
      search-pattern = '(\w+)@(\w+)'
      replacement    = "$2.$1"
      global         = true

      [[custom-commands]]
      name           = "Broken"
      search-pattern = '('
      replacement    = ""

      [[custom-commands]]
      search-pattern = 'a'
      replacement    = "b"
    "#;
    let loaded = load_str(contents).unwrap();
    assert_eq!(loaded.commands.len(), 1);
    assert_eq!(loaded.commands[0].name, "Emails");
    assert_eq!(loaded.diagnostics.len(), 2);
    assert!(loaded.diagnostics[0].starts_with("Command 2:"));
    assert!(loaded.diagnostics[1].starts_with("Command 3:"));
  }

  #[test]
  fn load_str_accepts_an_empty_file() {
    let loaded = load_str("").unwrap();
    assert!(loaded.commands.is_empty());
    assert!(loaded.diagnostics.is_empty());
  }

  #[test]
  fn load_str_rejects_unparseable_files() {
    assert!(matches!(
      load_str("= not toml"),
      Err(CustomCommandError::Parse(_))
    ));
  }

  #[test]
  fn load_path_reads_the_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
      file,
      "[[custom-commands]]\nname = \"Caps\"\nsearch-pattern = 'b'\nreplacement = \"B\"\n"
    )
    .unwrap();

    let loaded = load_path(file.path()).unwrap();
    assert_eq!(loaded.commands.len(), 1);
    assert_eq!(loaded.commands[0].name, "Caps");

    assert!(matches!(
      load_path(Path::new("/definitely/not/here.toml")),
      Err(CustomCommandError::Io { .. })
    ));
  }

  #[test]
  fn picker_rows_preview_against_the_first_line() {
    let mut swap = command(r"(\w+)@(\w+)", "$2.$1");
    swap.name = "Emails".to_string();
    swap.global = true;
    let mut noop = command("zzz", "yyy");
    noop.name = "Noop".to_string();

    let rows = picker_rows(&[swap, noop], "user@host\nsecond@line");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "Emails");
    assert_eq!(rows[0].preview.as_deref(), Some("host.user"));
    assert_eq!(rows[0].detail, "/(\\w+)@(\\w+)/g → \"$2.$1\" (global)");
    assert_eq!(rows[1].preview, None);
  }

  #[test]
  fn picker_rows_truncate_long_previews() {
    let mut cmd = command("^", "................................................");
    cmd.name = "Pad".to_string();
    let rows = picker_rows(&[cmd], "abcdef");
    let preview = rows[0].preview.as_deref().unwrap();
    assert_eq!(preview.chars().count(), 50);
    assert!(preview.ends_with("..."));
  }

  #[test]
  fn picker_detail_spells_out_flags() {
    let mut cmd = command("a", "b");
    cmd.ignore_case = true;
    cmd.multiline = true;
    let rows = picker_rows(&[cmd], "");
    assert_eq!(rows[0].detail, "/a/im → \"b\" (ignoreCase, multiline)");
  }
}
