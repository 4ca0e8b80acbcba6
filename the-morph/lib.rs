use smartstring::{
  LazyCompact,
  SmartString,
};

pub mod case_convention;
pub mod custom;
pub mod dispatch;
pub mod numeric;
pub mod quotes;
pub mod registry;
pub mod selection;
pub mod shape;
pub mod transaction;

pub use ropey::{
  Rope,
  RopeBuilder,
  RopeSlice,
};

pub type Tendril = SmartString<LazyCompact>;
