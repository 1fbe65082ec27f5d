//! SH1106 OLED driver and monochrome framebuffer
//!
//! This crate provides:
//! - [`FrameBuffer`] - 1-bit-per-pixel bitmap in the controller's page layout
//!   with drawing primitives (pixels, lines, rectangles, text, blit, scroll)
//! - [`DisplayInterface`] - command/data transport with scoped bus locking,
//!   implemented for I2C by [`I2cInterface`]
//! - [`Sh1106`] - the controller driver: power sequencing, the init command
//!   sequence, and full-frame page transfers
//!
//! # Memory layout
//!
//! The panel is split into pages of 8 pixel rows. Byte `page * width + x`
//! holds column `x` of that page, bit 0 being the top row:
//!
//! ```text
//!          x=0      x=1            x=W-1
//! page 0 ┌────────┬────────┬ ... ┬────────┐  rows 0..7
//! page 1 ├────────┼────────┼ ... ┼────────┤  rows 8..15
//!   ...
//! ```
//!
//! The controller's display RAM uses the same layout, so a page of the
//! framebuffer is sent to the panel unchanged.

#![no_std]
#![deny(unsafe_code)]

pub mod error;
pub mod font;
pub mod framebuffer;
pub mod interface;
pub mod sh1106;

// Re-export key types
pub use error::{ConfigError, DisplayError};
pub use framebuffer::FrameBuffer;
pub use interface::{CommandSink, DisplayInterface, I2cInterface};
pub use sh1106::{NoReset, PageWindow, PowerState, ResetControl, ResetLine, Sh1106, Sh1106Config};
