//! The builtin command table.
//!
//! Every transform the engine ships is registered here under the stable
//! name hosts and keybindings refer to. The table drives name lookup for
//! dispatch and enumeration for pickers, and [`CommandKind`] tells the
//! dispatcher how to feed each transform: line by line, with a numeric
//! argument, as a whole fragment with threaded state, or as a duplicating
//! append.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{
  Tendril,
  case_convention,
  numeric::{
    self,
    SequenceState,
  },
  quotes,
  shape,
};

#[derive(Debug, Clone, Copy)]
pub enum CommandKind {
  /// Applied to each line of a range fragment separately.
  Simple(fn(&str) -> Tendril),

  /// Applied per line with a numeric argument supplied by the host.
  Parameterized(fn(&str, f64) -> Tendril),

  /// Applied to the whole fragment, with one [`SequenceState`] threaded
  /// through every range of the invocation in document order.
  Numeral(fn(&str, &mut SequenceState) -> Tendril),

  /// Appends a transformed copy of the whole fragment after the original.
  Duplicating(fn(&str) -> Tendril),
}

/// A named transform in the builtin table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
  pub name: &'static str,
  pub kind: CommandKind,
}

impl Command {
  /// Whether the host must supply a numeric argument.
  pub fn takes_argument(&self) -> bool {
    matches!(self.kind, CommandKind::Parameterized(_))
  }
}

// The stepping transforms route through the numeral path for whole-fragment
// scanning but keep no state between ranges.
fn increment_fragment(text: &str, _state: &mut SequenceState) -> Tendril {
  numeric::increment(text)
}

fn decrement_fragment(text: &str, _state: &mut SequenceState) -> Tendril {
  numeric::decrement(text)
}

fn increment_float_fragment(text: &str, _state: &mut SequenceState) -> Tendril {
  numeric::increment_float(text)
}

fn decrement_float_fragment(text: &str, _state: &mut SequenceState) -> Tendril {
  numeric::decrement_float(text)
}

pub static COMMANDS: &[Command] = &[
  Command {
    name: "titleize",
    kind: CommandKind::Simple(shape::titleize),
  },
  Command {
    name: "chop",
    kind: CommandKind::Parameterized(shape::chop),
  },
  Command {
    name: "classify",
    kind: CommandKind::Simple(case_convention::classify),
  },
  Command {
    name: "clean",
    kind: CommandKind::Simple(shape::clean),
  },
  Command {
    name: "cleanDiacritics",
    kind: CommandKind::Simple(shape::clean_diacritics),
  },
  Command {
    // Names the same transform as snake. The plain underscored helper keeps
    // punctuation and edge underscores and only feeds snake and humanize.
    name: "underscored",
    kind: CommandKind::Simple(case_convention::snake),
  },
  Command {
    name: "dasherize",
    kind: CommandKind::Simple(case_convention::dasherize),
  },
  Command {
    name: "humanize",
    kind: CommandKind::Simple(shape::humanize),
  },
  Command {
    name: "reverse",
    kind: CommandKind::Simple(shape::reverse),
  },
  Command {
    name: "decapitalize",
    kind: CommandKind::Simple(shape::decapitalize),
  },
  Command {
    name: "capitalize",
    kind: CommandKind::Simple(shape::capitalize),
  },
  Command {
    name: "sentence",
    kind: CommandKind::Simple(shape::sentence),
  },
  Command {
    name: "camelize",
    kind: CommandKind::Simple(case_convention::camelize),
  },
  Command {
    name: "swapCase",
    kind: CommandKind::Simple(shape::swap_case),
  },
  Command {
    name: "snake",
    kind: CommandKind::Simple(case_convention::snake),
  },
  Command {
    name: "screamingSnake",
    kind: CommandKind::Simple(case_convention::screaming_snake),
  },
  Command {
    name: "truncate",
    kind: CommandKind::Parameterized(shape::truncate),
  },
  Command {
    name: "prune",
    kind: CommandKind::Parameterized(shape::prune),
  },
  Command {
    name: "repeat",
    kind: CommandKind::Parameterized(shape::repeat),
  },
  Command {
    name: "increment",
    kind: CommandKind::Numeral(increment_fragment),
  },
  Command {
    name: "decrement",
    kind: CommandKind::Numeral(decrement_fragment),
  },
  Command {
    name: "duplicateAndIncrement",
    kind: CommandKind::Duplicating(numeric::increment),
  },
  Command {
    name: "duplicateAndDecrement",
    kind: CommandKind::Duplicating(numeric::decrement),
  },
  Command {
    name: "incrementFloat",
    kind: CommandKind::Numeral(increment_float_fragment),
  },
  Command {
    name: "decrementFloat",
    kind: CommandKind::Numeral(decrement_float_fragment),
  },
  Command {
    name: "sequence",
    kind: CommandKind::Numeral(numeric::sequence),
  },
  Command {
    name: "utf8ToChar",
    kind: CommandKind::Simple(shape::utf8_to_char),
  },
  Command {
    name: "charToUtf8",
    kind: CommandKind::Simple(shape::char_to_utf8),
  },
  Command {
    name: "randomCase",
    kind: CommandKind::Simple(shape::random_case),
  },
  Command {
    name: "titleizeApStyle",
    kind: CommandKind::Simple(shape::titleize_ap_style),
  },
  Command {
    name: "titleizeChicagoStyle",
    kind: CommandKind::Simple(shape::titleize_chicago_style),
  },
  Command {
    name: "slugify",
    kind: CommandKind::Simple(shape::slugify),
  },
  Command {
    name: "swapQuotes",
    kind: CommandKind::Simple(quotes::swap_quotes),
  },
];

static INDEX: Lazy<HashMap<&'static str, &'static Command>> =
  Lazy::new(|| COMMANDS.iter().map(|command| (command.name, command)).collect());

/// Finds a builtin by its registry name.
pub fn lookup(name: &str) -> Option<&'static Command> {
  INDEX.get(name).copied()
}

/// Human-readable label for a registry name: a space before each capital
/// and the first letter uppercased, so `titleizeApStyle` reads
/// `Titleize Ap Style`.
pub fn display_name(name: &str) -> String {
  let mut out = String::new();
  for ch in name.chars() {
    if ch.is_ascii_uppercase() {
      out.push(' ');
    }
    out.push(ch);
  }
  shape::capitalize(&out).into()
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn lookup_finds_builtins() {
    assert!(lookup("camelize").is_some());
    assert!(lookup("swapQuotes").is_some());
    assert!(lookup("nope").is_none());
    assert!(lookup("Camelize").is_none());
  }

  #[test]
  fn table_names_are_unique() {
    let mut names: Vec<_> = COMMANDS.iter().map(|command| command.name).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), COMMANDS.len());
  }

  #[test]
  fn argument_commands() {
    let with_arg: Vec<_> = COMMANDS
      .iter()
      .filter(|command| command.takes_argument())
      .map(|command| command.name)
      .collect();
    assert_eq!(with_arg, ["chop", "truncate", "prune", "repeat"]);
  }

  #[test]
  fn underscored_binds_the_snake_transform() {
    let command = lookup("underscored").unwrap();
    let CommandKind::Simple(f) = command.kind else {
      panic!("underscored is a per-line transform");
    };
    assert_eq!(f("-moz-transform"), "moz_transform");
    assert_eq!(f("!!bang bang!!"), "bang_bang");
  }

  #[test]
  fn stepping_commands_ignore_state() {
    let command = lookup("increment").unwrap();
    let CommandKind::Numeral(f) = command.kind else {
      panic!("increment routes through the numeral path");
    };
    let mut state = SequenceState::default();
    assert_eq!(f("a1", &mut state), "a2");
    assert_eq!(state.offset, None);
  }

  #[test]
  fn display_names() {
    assert_eq!(display_name("camelize"), "Camelize");
    assert_eq!(display_name("titleizeApStyle"), "Titleize Ap Style");
    assert_eq!(display_name("utf8ToChar"), "Utf8 To Char");
  }
}
