//! Internal utilities

pub mod text;

pub use text::{locale_compare, remove_accents};
