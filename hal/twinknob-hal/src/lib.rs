//! Twinknob Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the display and
//! encoder drivers are written against, so the same driver code runs on
//! the RP2040 firmware and in host tests.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  twinknob-display (SH1106)  twinknob-drivers │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  twinknob-hal (this crate)                   │
//! │    I2cBus / OutputPin / DelayUs / SharedI2c  │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  any embedded-hal 1.0 implementation         │
//! │  (embassy-rp blocking I2C, GPIO, Delay)      │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cBus`] - blocking I2C master operations
//! - [`shared::SharedI2c`] - one physical bus shared by several devices
//! - [`gpio::OutputPin`] - digital output (display reset line)
//! - [`delay::DelayUs`] - blocking delays

#![no_std]
#![deny(unsafe_code)]

pub mod adapter;
pub mod delay;
pub mod gpio;
pub mod i2c;
pub mod shared;

// Re-export key traits at crate root for convenience
pub use adapter::{EhDelay, EhI2c, EhOutput};
pub use delay::DelayUs;
pub use gpio::OutputPin;
pub use i2c::{BusError, I2cBus, I2cConfig};
pub use shared::SharedI2c;
