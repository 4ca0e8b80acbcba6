//! Atomic multi-range document edits.
//!
//! # Architecture
//!
//! Changes are represented as a sequence of [`Operation`]s:
//!
//! - **Retain(n)** - Keep `n` characters unchanged
//! - **Delete(n)** - Remove `n` characters
//! - **Insert(s)** - Insert string `s`
//!
//! These operations are applied sequentially from the start of the document.
//! A [`ChangeSet`] is a list of operations that transforms a document of a
//! specific length into a new document. A [`Transaction`] is built from
//! `(from, to, replacement)` triples, one per selection range, and applies
//! them as a single edit so a host can treat the whole transformation as one
//! undo step.
//!
//! # Basic Usage
//!
//! ```ignore
//! use the_morph::transaction::Transaction;
//! use ropey::Rope;
//!
//! let mut doc = Rope::from("hello world");
//!
//! // Replace "world" with "rust"
//! let tx = Transaction::change(&doc, vec![
//!     (6, 11, Some("rust".into()))
//! ])?;
//!
//! tx.apply(&mut doc)?;
//! assert_eq!(doc.to_string(), "hello rust");
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TransactionError>`]:
//!
//! - **LengthMismatch** - Document length doesn't match changeset expectation
//! - **InvalidRange** - Change range has start > end
//! - **RangeOutOfBounds** - Change range extends past document end
//! - **OverlappingChange** - Changes overlap or are out of order

use ropey::{
  Rope,
  RopeSlice,
};
use thiserror::Error;

use crate::{
  Tendril,
  selection::{
    Range,
    Selection,
  },
};

pub type Result<T> = std::result::Result<T, TransactionError>;

/// (from, to) replacement.
pub type Change = (usize, usize, Option<Tendril>);

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransactionError {
  #[error("changeset length mismatch: expected {expected}, got {found}")]
  LengthMismatch { expected: usize, found: usize },
  #[error("invalid change range: start {from} is after end {to}")]
  InvalidRange { from: usize, to: usize },
  #[error("change range {from}..{to} is out of bounds for document length {len}")]
  RangeOutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
  #[error("change at {at} overlaps previous change ending at {prev_end}")]
  OverlappingChange { at: usize, prev_end: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
  /// Move cursor by n characters.
  Retain(usize),

  /// Delete n characters.
  Delete(usize),

  /// Insert text at position.
  Insert(Tendril),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
  pub(crate) changes: Vec<Operation>,
  /// The required document length. Will refuse to apply changes unless it
  /// matches.
  len:                usize,
  len_after:          usize,
}

impl ChangeSet {
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      changes:   Vec::with_capacity(capacity),
      len:       0,
      len_after: 0,
    }
  }

  #[must_use]
  pub fn new(doc: RopeSlice) -> Self {
    let len = doc.len_chars();
    Self {
      changes: Vec::new(),
      len,
      len_after: len,
    }
  }

  pub fn changes(&self) -> &[Operation] {
    &self.changes
  }

  /// Returns the expected document length for this changeset.
  pub fn len(&self) -> usize {
    self.len
  }

  /// Returns the document length after applying this changeset.
  pub fn len_after(&self) -> usize {
    self.len_after
  }

  // Changeset builder operations: delete/insert/retain.
  //

  pub fn delete(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;

    if let Some(Delete(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Delete(n))
    }
  }

  pub fn insert(&mut self, fragment: Tendril) {
    use Operation::*;

    if fragment.is_empty() {
      return;
    }

    self.len_after += fragment.chars().count();

    let new_last = match self.changes.as_mut_slice() {
      [.., Insert(prev)] | [.., Insert(prev), Delete(_)] => {
        prev.push_str(&fragment);
        return;
      },
      [.., last @ Delete(_)] => std::mem::replace(last, Insert(fragment)),
      _ => Insert(fragment),
    };

    self.changes.push(new_last);
  }

  pub fn retain(&mut self, n: usize) {
    use Operation::*;

    if n == 0 {
      return;
    }

    self.len += n;
    self.len_after += n;

    if let Some(Retain(count)) = self.changes.last_mut() {
      *count += n;
    } else {
      self.changes.push(Retain(n))
    }
  }

  fn ensure_len(&self, text_len: usize) -> Result<()> {
    if text_len != self.len {
      return Err(TransactionError::LengthMismatch {
        expected: self.len,
        found:    text_len,
      });
    }
    Ok(())
  }

  /// Apply this changeset in-place.
  pub fn apply(&self, text: &mut Rope) -> Result<()> {
    self.ensure_len(text.len_chars())?;
    let mut pos = 0;

    for change in &self.changes {
      use Operation::*;
      match change {
        Retain(n) => pos += n,
        Delete(n) => text.remove(pos..pos + *n),
        Insert(s) => {
          text.insert(pos, s);
          pos += s.chars().count();
        },
      }
    }

    Ok(())
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.changes.is_empty() || self.changes == [Operation::Retain(self.len)]
  }
}

fn validate_change_bounds(from: usize, to: usize, len: usize) -> Result<()> {
  if from > to {
    return Err(TransactionError::InvalidRange { from, to });
  }
  if to > len {
    return Err(TransactionError::RangeOutOfBounds { from, to, len });
  }
  Ok(())
}

impl From<ChangeSet> for Transaction {
  fn from(changes: ChangeSet) -> Self {
    Self { changes }
  }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Transaction {
  changes: ChangeSet,
}

impl Transaction {
  /// Changes made to the buffer.
  pub fn changes(&self) -> &ChangeSet {
    &self.changes
  }

  /// Apply this transaction in-place.
  pub fn apply(&self, doc: &mut Rope) -> Result<()> {
    self.changes.apply(doc)
  }

  /// Generate a transaction from a sorted set of non-overlapping changes.
  pub fn change<I>(doc: &Rope, changes: I) -> Result<Self>
  where
    I: IntoIterator<Item = Change>,
  {
    let len = doc.len_chars();
    let changes = changes.into_iter();
    let (lower, upper) = changes.size_hint();
    let size = upper.unwrap_or(lower);
    let mut changeset = ChangeSet::with_capacity(2 * size + 1); // rough estimate

    let mut last = 0;
    for (from, to, tendril) in changes {
      validate_change_bounds(from, to, len)?;
      if from < last {
        return Err(TransactionError::OverlappingChange {
          at:       from,
          prev_end: last,
        });
      }

      // Retain from last "to" to current "from"
      changeset.retain(from - last);
      let span = to - from;
      match tendril {
        Some(text) => {
          changeset.insert(text);
          changeset.delete(span);
        },
        None => changeset.delete(span),
      }
      last = to;
    }

    changeset.retain(len - last);

    Ok(Self::from(changeset))
  }

  /// Generate a transaction with a change per selection range.
  pub fn change_by_selection<F>(doc: &Rope, selection: &Selection, f: F) -> Result<Self>
  where
    F: FnMut(&Range) -> Change,
  {
    Self::change(doc, selection.ranges().iter().map(f))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn transaction_change() {
    let mut doc = Rope::from("hello world!\ntest 123");
    let transaction = Transaction::change(
      &doc,
      // (1, 1, None) is a useless 0-width delete that gets factored out
      vec![(1, 1, None), (6, 11, Some("void".into())), (12, 17, None)],
    )
    .unwrap();
    transaction.apply(&mut doc).unwrap();
    assert_eq!(doc, Rope::from_str("hello void! 123"));
  }

  #[test]
  fn change_by_selection_replaces_each_range() {
    let mut doc = Rope::from("one two three");
    let selection = Selection::single(0, 3).push(Range::new(8, 13));
    let replacements = ["ONE", "THREE"];
    let mut i = 0;

    let transaction = Transaction::change_by_selection(&doc, &selection, |range| {
      let text = replacements[i];
      i += 1;
      (range.from(), range.to(), Some(text.into()))
    })
    .unwrap();
    transaction.apply(&mut doc).unwrap();
    assert_eq!(doc, Rope::from_str("ONE two THREE"));
  }

  #[test]
  fn builder_merges_adjacent_operations() {
    use Operation::*;

    let mut changeset = ChangeSet::with_capacity(4);
    changeset.retain(2);
    changeset.retain(3);
    changeset.insert("ab".into());
    changeset.insert("cd".into());
    changeset.delete(1);
    changeset.delete(1);

    assert_eq!(changeset.changes(), &[
      Retain(5),
      Insert("abcd".into()),
      Delete(2)
    ]);
    assert_eq!(changeset.len(), 7);
    assert_eq!(changeset.len_after(), 9);
  }

  #[test]
  fn utf8_aware_lengths() {
    let mut doc = Rope::from("中文 text");
    let transaction =
      Transaction::change(&doc, vec![(0, 2, Some("汉字汉".into()))]).unwrap();
    transaction.apply(&mut doc).unwrap();
    assert_eq!(doc, Rope::from_str("汉字汉 text"));
  }

  #[test]
  fn rejects_invalid_ranges() {
    let doc = Rope::from("hello");

    let err = Transaction::change(&doc, vec![(4, 2, None)]).unwrap_err();
    assert_eq!(err, TransactionError::InvalidRange { from: 4, to: 2 });

    let err = Transaction::change(&doc, vec![(2, 9, None)]).unwrap_err();
    assert_eq!(err, TransactionError::RangeOutOfBounds {
      from: 2,
      to:   9,
      len:  5,
    });

    let err =
      Transaction::change(&doc, vec![(0, 3, None), (2, 4, None)]).unwrap_err();
    assert_eq!(err, TransactionError::OverlappingChange {
      at:       2,
      prev_end: 3,
    });
  }

  #[test]
  fn apply_errors_on_length_mismatch() {
    let doc = Rope::from("hello");
    let changes = ChangeSet::new(doc.slice(..));
    let mut other = Rope::from("nope");

    let err = changes.apply(&mut other).unwrap_err();
    assert_eq!(err, TransactionError::LengthMismatch {
      expected: 5,
      found:    4,
    });
    assert_eq!(other, Rope::from("nope"));
  }
}
