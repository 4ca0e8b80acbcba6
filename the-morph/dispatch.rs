//! Command dispatch over multi-range selections.
//!
//! This is the seam between a host editor and the transform library. The
//! host hands over its document, the current [`Selection`], and a command
//! name; dispatch looks the command up, runs it over every range, applies
//! the rewrite through a [`Transaction`] as a single edit, and returns the
//! selection covering the replaced text.
//!
//! # Routing
//!
//! [`CommandKind`] decides how each range fragment is fed to a command:
//!
//! - `Simple` and `Parameterized` commands see one line at a time. A
//!   multi-line fragment is split on `\n`, transformed per line, and
//!   rejoined.
//! - `Numeral` commands see the whole fragment, and one [`SequenceState`]
//!   is threaded through every range in document order, so `sequence`
//!   keeps counting across ranges instead of restarting at each one.
//! - `Duplicating` commands append a transformed copy after the original
//!   fragment, and the returned selection covers only the copy.
//!
//! # Basic Usage
//!
//! ```ignore
//! use the_morph::{
//!   Rope,
//!   dispatch::{self, MemoryActionStore, NoPrompt, TransformRequest},
//!   selection::Selection,
//! };
//!
//! let mut doc = Rope::from("hello world");
//! let selection = Selection::single(0, doc.len_chars());
//! let mut store = MemoryActionStore::default();
//!
//! let request = TransformRequest::new("camelize");
//! dispatch::execute(&mut doc, &selection, &request, &mut NoPrompt, &mut store)?;
//! assert_eq!(doc, "helloWorld");
//! ```
//!
//! # Error Handling
//!
//! Dispatch refuses to touch the document on any failure: an unknown name,
//! an out of bounds selection, a dismissed or unparseable argument prompt.
//! The document is only written once every replacement has been computed.

use ropey::{
  Rope,
  RopeSlice,
};
use smallvec::SmallVec;
use the_morph_core::chars::char_is_line_ending;
use thiserror::Error;

use crate::{
  Tendril,
  custom::CustomCommand,
  numeric::SequenceState,
  registry::{
    self,
    Command,
    CommandKind,
  },
  selection::{
    Range,
    Selection,
    SelectionError,
  },
  transaction::{
    Transaction,
    TransactionError,
  },
};

pub type Result<T> = std::result::Result<T, DispatchError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum DispatchError {
  #[error("no action has been recorded yet")]
  NoActiveContext,

  #[error("input cancelled")]
  InputCancelled,

  #[error("invalid number: {0}")]
  InvalidArgument(String),

  #[error("unknown command: {0}")]
  UnknownCommand(String),

  #[error("invalid custom command {name}: {reason}")]
  InvalidCustomCommand { name: String, reason: String },

  #[error(transparent)]
  Selection(#[from] SelectionError),

  #[error(transparent)]
  Transaction(#[from] TransactionError),
}

/// Host hook for the numeric argument some commands need.
pub trait NumberPrompt {
  /// Returns the raw string the user entered, or `None` when the prompt
  /// was dismissed.
  fn prompt_number(&mut self) -> Option<String>;
}

/// A prompt that always reports dismissal. Useful for previews and for
/// requests that already carry their argument.
pub struct NoPrompt;

impl NumberPrompt for NoPrompt {
  fn prompt_number(&mut self) -> Option<String> {
    None
  }
}

/// Host hook for remembering the most recent command, so it can be rerun.
pub trait ActionStore {
  fn last_action(&self) -> Option<&str>;
  fn set_last_action(&mut self, action: &str);
}

/// An [`ActionStore`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryActionStore {
  last: Option<String>,
}

impl ActionStore for MemoryActionStore {
  fn last_action(&self) -> Option<&str> {
    self.last.as_deref()
  }

  fn set_last_action(&mut self, action: &str) {
    self.last = Some(action.to_string());
  }
}

/// A command invocation: the registry name plus an optional numeric
/// argument. When the command wants an argument and the request does not
/// carry one, the host prompt is asked for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformRequest<'a> {
  pub command:  &'a str,
  pub argument: Option<f64>,
}

impl<'a> TransformRequest<'a> {
  pub fn new(command: &'a str) -> Self {
    Self {
      command,
      argument: None,
    }
  }

  pub fn with_argument(command: &'a str, argument: f64) -> Self {
    Self {
      command,
      argument: Some(argument),
    }
  }
}

/// The replacement computed for each range, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
  pub replacements: Vec<Tendril>,
}

/// One row of the builtin transformation picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRow {
  /// Registry name to invoke.
  pub command: &'static str,
  /// Human-readable label.
  pub label:   String,
  /// First-line preview, when one is meaningful.
  pub preview: Option<Tendril>,
}

/// Runs a builtin command over every range of `selection`, applies the
/// rewrite to `doc`, records the command in `store`, and returns the
/// selection covering the replaced text.
pub fn execute(
  doc: &mut Rope,
  selection: &Selection,
  request: &TransformRequest,
  prompt: &mut dyn NumberPrompt,
  store: &mut dyn ActionStore,
) -> Result<Selection> {
  let command = registry::lookup(request.command)
    .ok_or_else(|| DispatchError::UnknownCommand(request.command.to_string()))?;
  selection.ensure_in_bounds(doc.len_chars())?;

  let argument = resolve_argument(command, request.argument, prompt)?;
  let replacements = compute_replacements(doc, selection, command, argument);

  log::debug!("applying {} over {} range(s)", command.name, selection.len());

  let new_selection = match command.kind {
    CommandKind::Duplicating(_) => apply_duplicates(doc, selection, &replacements)?,
    _ => apply_replacements(doc, selection, &replacements)?,
  };
  store.set_last_action(command.name);

  Ok(new_selection)
}

/// Computes the per-range replacements without touching the document or
/// the action store. A parameterized command must carry its argument in
/// the request, since no prompt is consulted.
pub fn preview(
  doc: &Rope,
  selection: &Selection,
  request: &TransformRequest,
) -> Result<TransformResult> {
  let command = registry::lookup(request.command)
    .ok_or_else(|| DispatchError::UnknownCommand(request.command.to_string()))?;
  selection.ensure_in_bounds(doc.len_chars())?;

  let argument = resolve_argument(command, request.argument, &mut NoPrompt)?;
  Ok(TransformResult {
    replacements: compute_replacements(doc, selection, command, argument),
  })
}

/// Reruns the most recent action. Builtins go back through [`execute`];
/// a custom command is resolved by its recorded `custom-{id}` tag against
/// the commands the host currently has configured.
pub fn repeat_last_action(
  doc: &mut Rope,
  selection: &Selection,
  custom_commands: &[CustomCommand],
  prompt: &mut dyn NumberPrompt,
  store: &mut dyn ActionStore,
) -> Result<Selection> {
  let Some(action) = store.last_action().map(str::to_string) else {
    return Err(DispatchError::NoActiveContext);
  };

  if let Some(id) = action.strip_prefix("custom-") {
    let command = custom_commands
      .iter()
      .find(|command| command.command_id() == id)
      .ok_or_else(|| DispatchError::UnknownCommand(action.clone()))?;
    return dispatch_custom(doc, selection, command, store);
  }

  execute(doc, selection, &TransformRequest::new(&action), prompt, store)
}

/// Runs a custom command over every range, line by line, and records it
/// under its `custom-{id}` tag for repeats.
pub fn dispatch_custom(
  doc: &mut Rope,
  selection: &Selection,
  command: &CustomCommand,
  store: &mut dyn ActionStore,
) -> Result<Selection> {
  let compiled = command
    .compile()
    .map_err(|err| DispatchError::InvalidCustomCommand {
      name:   command.name.clone(),
      reason: err.to_string(),
    })?;
  selection.ensure_in_bounds(doc.len_chars())?;

  let replacements: Vec<Tendril> = selection
    .ranges()
    .iter()
    .map(|range| {
      let fragment = range.fragment(doc.slice(..));
      each_line(&fragment, |line| compiled.apply(line))
    })
    .collect();

  log::debug!(
    "applying custom command {} over {} range(s)",
    compiled.name(),
    selection.len()
  );

  let new_selection = apply_replacements(doc, selection, &replacements)?;
  store.set_last_action(&format!("custom-{}", command.command_id()));

  Ok(new_selection)
}

const MAX_PREVIEW_CHARS: usize = 30;

/// Truncates preview text to at most 30 characters, ellipsis included.
pub fn truncate_for_preview(text: &str) -> Tendril {
  if text.chars().count() <= MAX_PREVIEW_CHARS {
    return text.into();
  }
  let mut out: Tendril = text.chars().take(MAX_PREVIEW_CHARS - 3).collect();
  out.push_str("...");
  out
}

/// The context-menu preview for one builtin: the first line of the
/// selection transformed, truncated for display. Returns `None` for an
/// empty selection and for commands whose preview would mislead, which
/// covers argument prompts, duplications, and `sequence`.
pub fn transformation_preview(command_name: &str, selected_text: &str) -> Option<Tendril> {
  if selected_text.trim().is_empty() {
    return None;
  }
  let command = registry::lookup(command_name)?;
  let first_line = selected_text.split('\n').next().unwrap_or("");

  let transformed = match command.kind {
    CommandKind::Simple(f) => f(first_line),
    CommandKind::Numeral(f) if command.name != "sequence" => {
      let mut state = SequenceState::default();
      f(first_line, &mut state)
    },
    _ => return None,
  };

  Some(truncate_for_preview(&transformed))
}

/// Rows for the builtin transformation picker, in table order.
pub fn preview_rows(selected_text: &str) -> Vec<CommandRow> {
  registry::COMMANDS
    .iter()
    .map(|command| {
      CommandRow {
        command: command.name,
        label:   registry::display_name(command.name),
        preview: transformation_preview(command.name, selected_text),
      }
    })
    .collect()
}

fn resolve_argument(
  command: &Command,
  given: Option<f64>,
  prompt: &mut dyn NumberPrompt,
) -> Result<Option<f64>> {
  if !command.takes_argument() {
    return Ok(None);
  }
  if let Some(value) = given {
    if !value.is_finite() {
      return Err(DispatchError::InvalidArgument(value.to_string()));
    }
    return Ok(Some(value));
  }

  let raw = prompt.prompt_number().ok_or(DispatchError::InputCancelled)?;
  let parsed = raw
    .trim()
    .parse::<f64>()
    .ok()
    .filter(|value| value.is_finite());
  match parsed {
    Some(value) => Ok(Some(value)),
    None => Err(DispatchError::InvalidArgument(raw)),
  }
}

fn compute_replacements(
  doc: &Rope,
  selection: &Selection,
  command: &Command,
  argument: Option<f64>,
) -> Vec<Tendril> {
  let mut state = SequenceState::default();

  selection
    .ranges()
    .iter()
    .map(|range| {
      let fragment = range.fragment(doc.slice(..));
      match command.kind {
        CommandKind::Simple(f) => each_line(&fragment, f),
        CommandKind::Parameterized(f) => {
          let value = argument.unwrap_or_default();
          each_line(&fragment, |line| f(line, value))
        },
        CommandKind::Numeral(f) => f(&fragment, &mut state),
        CommandKind::Duplicating(f) => {
          let mut out = Tendril::from(fragment.as_ref());
          out.push_str(&f(&fragment));
          out
        },
      }
    })
    .collect()
}

fn each_line(text: &str, f: impl Fn(&str) -> Tendril) -> Tendril {
  let mut out = Tendril::new();
  for (index, line) in text.split('\n').enumerate() {
    if index > 0 {
      out.push('\n');
    }
    out.push_str(&f(line));
  }
  out
}

fn apply_replacements(
  doc: &mut Rope,
  selection: &Selection,
  replacements: &[Tendril],
) -> Result<Selection> {
  let mut index = 0;
  let transaction = Transaction::change_by_selection(doc, selection, |range| {
    let replacement = replacements[index].clone();
    index += 1;
    (range.from(), range.to(), Some(replacement))
  })?;
  transaction.apply(doc)?;

  selection_after_replace(selection, replacements)
}

/// Maps each range onto its replacement text, accumulating the length
/// delta of the earlier replacements.
fn selection_after_replace(selection: &Selection, replacements: &[Tendril]) -> Result<Selection> {
  let mut ranges: SmallVec<[Range; 1]> = SmallVec::with_capacity(selection.len());
  let mut delta = 0isize;

  for (range, replacement) in selection.ranges().iter().zip(replacements) {
    let new_from = (range.from() as isize + delta) as usize;
    let new_len = replacement.chars().count();
    ranges.push(Range::new(new_from, new_from + new_len));
    delta += new_len as isize - range.len() as isize;
  }

  Ok(Selection::new(ranges, selection.primary_index())?)
}

// Geometry of an original fragment, captured before the edit so the
// selection can be moved onto the appended copy afterwards.
struct DuplicateShape {
  orig_chars:      usize,
  line_breaks:     usize,
  last_line_chars: usize,
}

impl DuplicateShape {
  fn capture(range: &Range, text: RopeSlice) -> Self {
    let fragment = range.fragment(text);
    let line_breaks = fragment.matches('\n').count();
    let last_line_chars = fragment.rsplit('\n').next().unwrap_or("").chars().count();
    Self {
      orig_chars: range.len(),
      line_breaks,
      last_line_chars,
    }
  }

  // The copy begins right after the original. Its end is clamped to real
  // line content, since a stepped copy can come out shorter than the
  // original.
  fn copy_range(&self, doc: &Rope, copy_start: usize) -> Range {
    if self.line_breaks == 0 {
      let line = doc.char_to_line(copy_start);
      let content_end = doc.line_to_char(line) + line_content_len(doc.line(line));
      return Range::new(copy_start, (copy_start + self.orig_chars).min(content_end));
    }

    let line = (doc.char_to_line(copy_start) + self.line_breaks).min(doc.len_lines() - 1);
    let content_len = line_content_len(doc.line(line));
    Range::new(
      copy_start,
      doc.line_to_char(line) + self.last_line_chars.min(content_len),
    )
  }
}

fn apply_duplicates(
  doc: &mut Rope,
  selection: &Selection,
  replacements: &[Tendril],
) -> Result<Selection> {
  let shapes: Vec<DuplicateShape> = selection
    .ranges()
    .iter()
    .map(|range| DuplicateShape::capture(range, doc.slice(..)))
    .collect();

  let mut index = 0;
  let transaction = Transaction::change_by_selection(doc, selection, |range| {
    let replacement = replacements[index].clone();
    index += 1;
    (range.from(), range.to(), Some(replacement))
  })?;
  transaction.apply(doc)?;

  let mut ranges: SmallVec<[Range; 1]> = SmallVec::with_capacity(selection.len());
  let mut delta = 0isize;
  for ((range, replacement), shape) in selection.ranges().iter().zip(replacements).zip(&shapes) {
    let new_from = (range.from() as isize + delta) as usize;
    delta += replacement.chars().count() as isize - range.len() as isize;
    ranges.push(shape.copy_range(doc, new_from + shape.orig_chars));
  }

  Ok(Selection::new(ranges, selection.primary_index())?)
}

/// Chars on the line before its line ending.
fn line_content_len(line: RopeSlice) -> usize {
  let mut len = line.len_chars();
  let mut chars = line.chars_at(len);
  while let Some(ch) = chars.prev() {
    if !char_is_line_ending(ch) {
      break;
    }
    len -= 1;
  }
  len
}
