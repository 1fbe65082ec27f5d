//! Display errors

use twinknob_hal::BusError;

/// Invalid panel or bus configuration
///
/// Raised before any bus traffic; the caller must not proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width is zero, not a multiple of 8, or wider than the controller
    InvalidWidth(u16),
    /// Height is zero or not a multiple of 8
    InvalidHeight(u16),
    /// Height is valid for a framebuffer but not driven by the controller
    UnsupportedHeight(u16),
    /// Column offset pushes the panel past the controller's RAM
    ColumnOffsetOutOfRange(u8),
    /// Backing storage is shorter than `width * height / 8`
    BufferTooSmall { required: usize, actual: usize },
    /// Bus address does not fit in 7 bits
    InvalidAddress(u8),
}

/// Display driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Invalid configuration (fatal)
    Config(ConfigError),
    /// Transport fault; the operation was abandoned, not retried
    Bus(BusError),
    /// Operation issued before the init sequence completed
    NotInitialized,
}

impl From<ConfigError> for DisplayError {
    fn from(e: ConfigError) -> Self {
        DisplayError::Config(e)
    }
}

impl From<BusError> for DisplayError {
    fn from(e: BusError) -> Self {
        DisplayError::Bus(e)
    }
}
