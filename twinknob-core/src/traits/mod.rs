//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and the input drivers.

pub mod encoder;

pub use encoder::PositionSource;
