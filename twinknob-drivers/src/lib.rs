//! Input driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in twinknob-core:
//!
//! - Rotary encoders behind an Adafruit seesaw co-processor

#![no_std]
#![deny(unsafe_code)]

pub mod encoder;
