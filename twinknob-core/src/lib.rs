//! Board-agnostic application logic for the twinknob panel
//!
//! This crate contains everything between the drivers and the board:
//!
//! - Position source trait implemented by the encoder drivers
//! - Configuration types and validation
//! - Change tracking for encoder positions
//! - Dashboard rendering into the display framebuffer

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dashboard;
pub mod monitor;
pub mod traits;
