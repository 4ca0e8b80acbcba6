//! Multi-range selections over a rope.
//!
//! # Range Model
//!
//! A [`Range`] is a pair of char indices into the document: `anchor`, where
//! the selection started, and `head`, where it ends. The two may sit in
//! either order; `from()`/`to()` give the ordered bounds.
//!
//! ```text
//! "the quick brown fox"
//!       ^anchor    ^head      anchor=4, head=15: covers "quick brown"
//! ```
//!
//! # Multi-Range Selections
//!
//! A [`Selection`] is one or more ranges, always normalized: sorted by
//! `from`, overlapping ranges merged, never empty. One range is primary;
//! pickers preview against it. The transformation engine reads fragments
//! through a selection and produces one replacement per range, in order; it
//! never edits the document through a range directly.
//!
//! # Error Handling
//!
//! Constructors validate shape (a selection needs at least one range), and
//! [`Selection::ensure_in_bounds`] validates against a document length
//! before any fragment is read.

use std::borrow::Cow;

use ropey::RopeSlice;
use smallvec::{
  SmallVec,
  smallvec,
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SelectionError>;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
  #[error("selection must contain at least one range")]
  EmptySelection,
  #[error("range {from}..{to} is out of bounds for a document of length {len}")]
  OutOfBounds {
    from: usize,
    to:   usize,
    len:  usize,
  },
}

/// A single range as a pair of char indices into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub anchor: usize,
  pub head:   usize,
}

impl Range {
  pub fn new(anchor: usize, head: usize) -> Self {
    Self { anchor, head }
  }

  /// A zero-width range: a bare cursor.
  pub fn point(head: usize) -> Self {
    Self { anchor: head, head }
  }

  /// The smaller bound.
  #[inline]
  pub fn from(&self) -> usize {
    self.anchor.min(self.head)
  }

  /// The larger bound.
  #[inline]
  pub fn to(&self) -> usize {
    self.anchor.max(self.head)
  }

  /// Covered width in chars.
  #[inline]
  pub fn len(&self) -> usize {
    self.to() - self.from()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.anchor == self.head
  }

  /// Whether the two ranges share at least one position.
  pub fn overlaps(&self, other: &Self) -> bool {
    self.from() == other.from() || (self.to() > other.from() && other.to() > self.from())
  }

  /// The smallest range covering both, keeping `self`'s direction.
  #[must_use]
  pub fn merge(&self, other: Self) -> Self {
    if self.anchor > self.head {
      Self {
        anchor: self.anchor.max(other.anchor),
        head:   self.head.min(other.head),
      }
    } else {
      Self {
        anchor: self.anchor.min(other.anchor),
        head:   self.head.max(other.head),
      }
    }
  }

  /// The covered text as a rope slice.
  pub fn slice<'a>(&self, text: RopeSlice<'a>) -> RopeSlice<'a> {
    text.slice(self.from()..self.to())
  }

  /// The covered text, materialized only when it crosses rope chunks.
  pub fn fragment<'a>(&self, text: RopeSlice<'a>) -> Cow<'a, str> {
    self.slice(text).into()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
  ranges:        SmallVec<[Range; 1]>,
  primary_index: usize,
}

impl Selection {
  pub fn new(ranges: SmallVec<[Range; 1]>, primary_index: usize) -> Result<Self> {
    if ranges.is_empty() {
      return Err(SelectionError::EmptySelection);
    }
    let primary_index = primary_index.min(ranges.len() - 1);
    let mut selection = Self {
      ranges,
      primary_index,
    };
    selection.normalize();
    Ok(selection)
  }

  /// A single-range selection.
  pub fn single(anchor: usize, head: usize) -> Self {
    Self {
      ranges:        smallvec![Range::new(anchor, head)],
      primary_index: 0,
    }
  }

  /// A bare cursor.
  pub fn point(pos: usize) -> Self {
    Self::single(pos, pos)
  }

  pub fn ranges(&self) -> &[Range] {
    &self.ranges
  }

  pub fn primary(&self) -> Range {
    self.ranges[self.primary_index]
  }

  pub fn primary_index(&self) -> usize {
    self.primary_index
  }

  pub fn len(&self) -> usize {
    self.ranges.len()
  }

  /// Adds a range and renormalizes; the new range becomes primary.
  #[must_use]
  pub fn push(mut self, range: Range) -> Self {
    self.ranges.push(range);
    self.primary_index = self.ranges.len() - 1;
    self.normalize();
    self
  }

  /// Validates every range against a document of `len` chars.
  pub fn ensure_in_bounds(&self, len: usize) -> Result<()> {
    for range in &self.ranges {
      if range.to() > len {
        return Err(SelectionError::OutOfBounds {
          from: range.from(),
          to: range.to(),
          len,
        });
      }
    }
    Ok(())
  }

  /// Sorts ranges by `from` and merges overlapping neighbors, tracking
  /// which range stays primary.
  fn normalize(&mut self) {
    if self.ranges.len() < 2 {
      self.primary_index = self.primary_index.min(self.ranges.len() - 1);
      return;
    }
    let mut primary = self.ranges[self.primary_index];
    self.ranges.sort_unstable_by_key(Range::from);
    self.ranges.dedup_by(|curr, prev| {
      if prev.overlaps(curr) {
        let merged = prev.merge(*curr);
        if *prev == primary || *curr == primary {
          primary = merged;
        }
        *prev = merged;
        true
      } else {
        false
      }
    });
    self.primary_index = self
      .ranges
      .iter()
      .position(|range| *range == primary)
      .unwrap_or(0);
  }
}

#[cfg(test)]
mod test {
  use ropey::Rope;

  use super::*;

  #[test]
  fn range_bounds() {
    let forward = Range::new(2, 7);
    let backward = Range::new(7, 2);
    assert_eq!(forward.from(), 2);
    assert_eq!(forward.to(), 7);
    assert_eq!(backward.from(), 2);
    assert_eq!(backward.to(), 7);
    assert_eq!(forward.len(), 5);
    assert!(Range::point(3).is_empty());
  }

  #[test]
  fn range_overlaps() {
    assert!(Range::new(0, 5).overlaps(&Range::new(3, 8)));
    assert!(Range::new(3, 8).overlaps(&Range::new(0, 5)));
    assert!(Range::new(2, 2).overlaps(&Range::new(2, 4)));
    assert!(!Range::new(0, 2).overlaps(&Range::new(2, 4)));
    assert!(!Range::new(0, 2).overlaps(&Range::new(5, 9)));
  }

  #[test]
  fn range_fragment() {
    let doc = Rope::from_str("the quick brown fox");
    assert_eq!(Range::new(4, 9).fragment(doc.slice(..)), "quick");
    assert_eq!(Range::new(9, 4).fragment(doc.slice(..)), "quick");
  }

  #[test]
  fn selection_rejects_empty() {
    assert_eq!(
      Selection::new(SmallVec::new(), 0),
      Err(SelectionError::EmptySelection)
    );
  }

  #[test]
  fn selection_normalizes_order() {
    let selection = Selection::new(smallvec![Range::new(10, 12), Range::new(0, 2)], 0)
      .unwrap();
    assert_eq!(
      selection.ranges(),
      [Range::new(0, 2), Range::new(10, 12)]
    );
    // The primary followed its range through the sort.
    assert_eq!(selection.primary(), Range::new(10, 12));
  }

  #[test]
  fn selection_merges_overlaps() {
    let selection = Selection::new(
      smallvec![Range::new(0, 5), Range::new(3, 8), Range::new(10, 12)],
      2,
    )
    .unwrap();
    assert_eq!(
      selection.ranges(),
      [Range::new(0, 8), Range::new(10, 12)]
    );
    assert_eq!(selection.primary(), Range::new(10, 12));
  }

  #[test]
  fn push_renormalizes() {
    let selection = Selection::single(5, 9).push(Range::new(0, 2));
    assert_eq!(selection.ranges(), [Range::new(0, 2), Range::new(5, 9)]);
    assert_eq!(selection.primary(), Range::new(0, 2));
  }

  #[test]
  fn bounds_check() {
    let selection = Selection::single(0, 4);
    assert!(selection.ensure_in_bounds(4).is_ok());
    assert_eq!(
      selection.ensure_in_bounds(3),
      Err(SelectionError::OutOfBounds {
        from: 0,
        to:   4,
        len:  3,
      })
    );
  }
}
