//! Panel configuration
//!
//! Generated from knobs.toml by the build script, which has already run
//! `AppConfig::validate` on it.

use twinknob_core::config::{AppConfig, DisplaySettings, EncoderSettings};

include!(concat!(env!("OUT_DIR"), "/app_config.rs"));

/// Framebuffer bytes for the configured panel
pub const FRAME_BUFFER_LEN: usize = APP_CONFIG.display.panel().buffer_len();
