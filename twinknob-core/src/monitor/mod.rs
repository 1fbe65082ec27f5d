//! Encoder position monitoring

pub mod tracker;

pub use tracker::ChangeTracker;
