//! Configuration type definitions
//!
//! Every type has a `const` default so generated configuration can be built
//! in a `const` context.

use twinknob_display::{ConfigError as PanelError, Sh1106Config};
use twinknob_hal::i2c::is_valid_address;
use twinknob_hal::I2cConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest bus clock the RP2040 I2C block supports (fast mode plus)
pub const MAX_I2C_FREQUENCY_HZ: u32 = 1_000_000;

/// Default seesaw address of the right-hand encoder
pub const DEFAULT_RIGHT_ENCODER_ADDRESS: u8 = 0x37;

/// Default seesaw address of the left-hand encoder
pub const DEFAULT_LEFT_ENCODER_ADDRESS: u8 = 0x38;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Panel geometry rejected by the display driver
    Panel(PanelError),
    /// Address outside the 7-bit range
    InvalidAddress(u8),
    /// Two devices share an address
    DuplicateAddress(u8),
    /// Bus clock is zero or above fast mode plus
    InvalidFrequency(u32),
    /// Polling interval of zero
    ZeroPollInterval,
}

impl From<PanelError> for ConfigError {
    fn from(e: PanelError) -> Self {
        ConfigError::Panel(e)
    }
}

/// Display settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct DisplaySettings {
    /// I2C address
    pub address: u8,
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels
    pub height: u16,
    /// Panel has its own high-voltage supply
    pub external_vcc: bool,
    /// First RAM column wired to the glass
    pub column_offset: u8,
    /// Contrast applied after init; `None` keeps the init default
    pub contrast: Option<u8>,
    /// Start with inverted pixels
    pub invert: bool,
}

impl DisplaySettings {
    /// 1.3" 128x64 module at 0x3C
    pub const DEFAULT: Self = Self {
        address: 0x3C,
        width: 128,
        height: 64,
        external_vcc: false,
        column_offset: 2,
        contrast: None,
        invert: false,
    };

    /// Driver configuration for this panel
    pub const fn panel(&self) -> Sh1106Config {
        Sh1106Config {
            width: self.width,
            height: self.height,
            external_vcc: self.external_vcc,
            column_offset: self.column_offset,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Encoder settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct EncoderSettings {
    /// Right-hand encoder address
    pub right: u8,
    /// Left-hand encoder address
    pub left: u8,
    /// Report clockwise rotation as negative
    pub invert: bool,
}

impl EncoderSettings {
    pub const DEFAULT: Self = Self {
        right: DEFAULT_RIGHT_ENCODER_ADDRESS,
        left: DEFAULT_LEFT_ENCODER_ADDRESS,
        invert: false,
    };

    /// Addresses in display order (right first)
    pub const fn addresses(&self) -> [u8; 2] {
        [self.right, self.left]
    }
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AppConfig {
    /// Shared bus clock
    pub i2c_frequency_hz: u32,
    /// OLED display
    pub display: DisplaySettings,
    /// Rotary encoders
    pub encoders: EncoderSettings,
    /// Time between encoder polls
    pub poll_interval_ms: u32,
}

impl AppConfig {
    pub const DEFAULT: Self = Self {
        i2c_frequency_hz: I2cConfig::FAST.frequency,
        display: DisplaySettings::DEFAULT,
        encoders: EncoderSettings::DEFAULT,
        poll_interval_ms: 10,
    };

    /// Bus configuration
    pub const fn i2c(&self) -> I2cConfig {
        I2cConfig {
            frequency: self.i2c_frequency_hz,
        }
    }

    /// Check the configuration for errors
    ///
    /// Returns the first error found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.i2c_frequency_hz == 0 || self.i2c_frequency_hz > MAX_I2C_FREQUENCY_HZ {
            return Err(ConfigError::InvalidFrequency(self.i2c_frequency_hz));
        }

        self.display.panel().validate()?;

        let [right, left] = self.encoders.addresses();
        let addresses = [self.display.address, right, left];
        for (i, &address) in addresses.iter().enumerate() {
            if !is_valid_address(address) {
                return Err(ConfigError::InvalidAddress(address));
            }
            if addresses[..i].contains(&address) {
                return Err(ConfigError::DuplicateAddress(address));
            }
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
