//! CLI command implementations

pub mod convert;

pub use convert::{ConvertOptions, handle_convert};
