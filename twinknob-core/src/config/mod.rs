//! Configuration types
//!
//! The firmware's TOML config is deserialized into these types on the host
//! at build time and compiled in as a constant.

pub mod report;
pub mod types;

pub use report::truncate_chars;
pub use types::*;
