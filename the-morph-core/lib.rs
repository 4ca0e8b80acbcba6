pub mod chars;
pub mod escape;
pub mod numerals;
