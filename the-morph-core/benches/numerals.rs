//! Benchmarks for numeral token scanning and formatting.
//!
//! Run with: cargo bench -p the-morph-core --bench numerals

use divan::{
  Bencher,
  black_box,
};
use the_morph_core::numerals::{
  decimal_tokens,
  format_stepped,
  integer_tokens,
};

fn main() {
  divan::main();
}

const MIXED: &str = "a1 b2 c3 4d 5e 6f 12x y23 34z45 a-4 b-3 c-2 -1d 0e";
const DECIMALS: &str = "x1.25 y-0.5 z3.14159 w007.500 v99.99";

mod scan {
  use super::*;

  #[divan::bench]
  fn integers(bencher: Bencher) {
    bencher.bench(|| integer_tokens(black_box(MIXED)).count())
  }

  #[divan::bench]
  fn decimals(bencher: Bencher) {
    bencher.bench(|| decimal_tokens(black_box(DECIMALS)).count())
  }

  #[divan::bench]
  fn integers_in_prose(bencher: Bencher) {
    bencher.bench(|| {
      integer_tokens(black_box("no numerals anywhere in this line of text")).count()
    })
  }
}

mod format {
  use super::*;

  #[divan::bench]
  fn plain(bencher: Bencher) {
    bencher.bench(|| format_stepped(black_box("41"), black_box(42)))
  }

  #[divan::bench]
  fn padded(bencher: Bencher) {
    bencher.bench(|| format_stepped(black_box("009"), black_box(10)))
  }
}
