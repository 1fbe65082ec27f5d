//! Rotary encoder drivers

pub mod seesaw;

pub use seesaw::{SeesawEncoder, SeesawError};
