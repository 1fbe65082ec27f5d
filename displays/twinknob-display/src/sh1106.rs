//! SH1106 OLED controller driver
//!
//! Owns the controller's power state and pushes the [`FrameBuffer`] to the
//! panel one page at a time.
//!
//! # State machine
//!
//! ```text
//!        power_on            init_display
//! Off ─────────────▶ Initializing ─────────────▶ On
//!  ▲                                             │
//!  │                 power_off                   │
//!  └─────────────────────────────────────────────┘
//!  Off (after init) ── power_on ──▶ On
//! ```
//!
//! `show`, `set_contrast` and `set_invert` are accepted while On or Off once
//! the first init sequence has completed; while Off they update controller
//! RAM and registers without a visible effect.

use twinknob_hal::{BusError, DelayUs, OutputPin};

use crate::error::{ConfigError, DisplayError};
use crate::framebuffer::{FrameBuffer, PAGE_HEIGHT};
use crate::interface::DisplayInterface;

/// SH1106 commands
pub mod cmd {
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_MEM_ADDR_MODE: u8 = 0x20;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
}

/// Columns of display RAM in the controller
pub const RAM_COLUMNS: u16 = 132;

/// Widest panel one data transaction can carry
pub const MAX_WIDTH: u16 = 128;

/// Panel heights the controller is configured for
pub const SUPPORTED_HEIGHTS: [u16; 2] = [32, 64];

/// Number of command bytes in the init sequence
pub const INIT_SEQUENCE_LEN: usize = 28;

/// Panel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sh1106Config {
    /// Visible width in pixels
    pub width: u16,
    /// Visible height in pixels (32 or 64)
    pub height: u16,
    /// Panel has its own high-voltage supply (charge pump off)
    pub external_vcc: bool,
    /// First RAM column wired to the glass
    pub column_offset: u8,
}

impl Default for Sh1106Config {
    /// The common 1.3" 128x64 module
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            external_vcc: false,
            column_offset: 2,
        }
    }
}

impl Sh1106Config {
    /// Check the panel geometry against the controller's limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.width % 8 != 0 || self.width > MAX_WIDTH {
            return Err(ConfigError::InvalidWidth(self.width));
        }
        if self.height == 0 || self.height % PAGE_HEIGHT != 0 {
            return Err(ConfigError::InvalidHeight(self.height));
        }
        if !SUPPORTED_HEIGHTS.contains(&self.height) {
            return Err(ConfigError::UnsupportedHeight(self.height));
        }
        if self.width + self.column_offset as u16 > RAM_COLUMNS {
            return Err(ConfigError::ColumnOffsetOutOfRange(self.column_offset));
        }
        Ok(())
    }

    /// Number of 8-row pages
    pub const fn pages(&self) -> u16 {
        self.height / PAGE_HEIGHT
    }

    /// Framebuffer bytes required for this panel
    pub const fn buffer_len(&self) -> usize {
        crate::framebuffer::buffer_len(self.width, self.height)
    }

    /// The init sequence, one command or argument byte per entry
    pub fn init_sequence(&self) -> [u8; INIT_SEQUENCE_LEN] {
        let ext = self.external_vcc;
        [
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0xF0,
            cmd::SET_MUX_RATIO,
            (self.height - 1) as u8,
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            if ext { 0x10 } else { 0x14 },
            cmd::SET_MEM_ADDR_MODE,
            0x00, // horizontal
            cmd::SET_PAGE_ADDR,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_LOW_COLUMN,
            cmd::SET_HIGH_COLUMN,
            cmd::SET_COM_PINS,
            if self.height == 32 { 0x02 } else { 0x12 },
            cmd::SET_CONTRAST,
            if ext { 0x9F } else { 0xCF },
            cmd::SET_SEG_REMAP,
            cmd::SET_PRECHARGE,
            if ext { 0x22 } else { 0xF1 },
            cmd::SET_VCOM_DETECT,
            0x20, // 0.77 x Vcc
            cmd::ENTIRE_DISPLAY_RESUME,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ]
    }
}

/// Controller power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    /// Display off (initial state, and after `power_off`)
    Off,
    /// Powered, init sequence not yet sent
    Initializing,
    /// Initialized and showing RAM contents
    On,
}

/// Controller RAM cursor for one page transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Page index
    pub page: u8,
    /// First RAM column
    pub column: u8,
}

impl PageWindow {
    /// Cursor at the start of `page`
    pub const fn new(page: u8, column: u8) -> Self {
        Self { page, column }
    }

    /// Page address, low column nibble, high column nibble
    pub const fn commands(&self) -> [u8; 3] {
        [
            cmd::SET_PAGE_ADDR | self.page,
            cmd::SET_LOW_COLUMN | (self.column & 0x0F),
            cmd::SET_HIGH_COLUMN | (self.column >> 4),
        ]
    }
}

/// Hardware reset before power-up
pub trait ResetControl {
    /// Pulse the controller's reset input and wait for it to recover
    fn hard_reset(&mut self);
}

/// Panel without a reset line
pub struct NoReset;

impl ResetControl for NoReset {
    fn hard_reset(&mut self) {}
}

impl<T: ResetControl> ResetControl for Option<T> {
    fn hard_reset(&mut self) {
        if let Some(reset) = self {
            reset.hard_reset();
        }
    }
}

/// Reset line driven from a GPIO
///
/// The pin idles low from construction until the first reset pulse.
pub struct ResetLine<P, D> {
    pin: P,
    delay: D,
}

impl<P: OutputPin, D: DelayUs> ResetLine<P, D> {
    /// Take the pin and drive it low
    pub fn new(mut pin: P, delay: D) -> Self {
        pin.set_low();
        Self { pin, delay }
    }
}

impl<P: OutputPin, D: DelayUs> ResetControl for ResetLine<P, D> {
    fn hard_reset(&mut self) {
        self.pin.set_high();
        self.delay.delay_ms(1);
        // Reset is active low; hold well past the 10 us minimum
        self.pin.set_low();
        self.delay.delay_ms(10);
        self.pin.set_high();
        self.delay.delay_ms(10);
    }
}

/// SH1106 driver
pub struct Sh1106<'a, DI, RST = NoReset> {
    interface: DI,
    framebuffer: FrameBuffer<'a>,
    config: Sh1106Config,
    reset: RST,
    state: PowerState,
    /// Set once the init sequence has been sent
    initialized: bool,
}

impl<'a, DI, RST> Sh1106<'a, DI, RST>
where
    DI: DisplayInterface,
    RST: ResetControl,
{
    /// Create the driver, power up the panel and run the init sequence
    ///
    /// `buffer` backs the framebuffer and must hold at least
    /// `config.buffer_len()` bytes. Geometry errors are reported before
    /// anything is sent on the bus.
    pub fn new(
        interface: DI,
        buffer: &'a mut [u8],
        config: Sh1106Config,
        reset: RST,
    ) -> Result<Self, DisplayError> {
        let mut display = Self::configure(interface, buffer, config, reset)?;
        display.power_on()?;
        display.init_display()?;
        Ok(display)
    }

    /// Create the driver without touching the bus
    ///
    /// The display starts in [`PowerState::Off`]; call [`power_on`] and
    /// [`init_display`] before drawing.
    ///
    /// [`power_on`]: Self::power_on
    /// [`init_display`]: Self::init_display
    pub fn configure(
        interface: DI,
        buffer: &'a mut [u8],
        config: Sh1106Config,
        reset: RST,
    ) -> Result<Self, DisplayError> {
        config.validate()?;
        let framebuffer = FrameBuffer::new(buffer, config.width, config.height)?;

        Ok(Self {
            interface,
            framebuffer,
            config,
            reset,
            state: PowerState::Off,
            initialized: false,
        })
    }

    /// Reset the controller (if a reset line is present) and turn it on
    pub fn power_on(&mut self) -> Result<(), DisplayError> {
        self.reset.hard_reset();
        self.interface.write_command(cmd::DISPLAY_ON)?;
        self.state = if self.initialized {
            PowerState::On
        } else {
            PowerState::Initializing
        };
        Ok(())
    }

    /// Send the init sequence, then clear the panel
    ///
    /// Each byte goes out as its own command transaction. After the
    /// sequence the framebuffer is cleared and pushed with [`show`].
    ///
    /// [`show`]: Self::show
    pub fn init_display(&mut self) -> Result<(), DisplayError> {
        if self.state == PowerState::Off && !self.initialized {
            return Err(DisplayError::NotInitialized);
        }

        for byte in self.config.init_sequence() {
            self.interface.write_command(byte)?;
        }

        self.initialized = true;
        self.state = PowerState::On;
        self.framebuffer.fill(false);
        self.show()
    }

    /// Turn the panel off; RAM and framebuffer are kept
    pub fn power_off(&mut self) -> Result<(), DisplayError> {
        self.interface.write_command(cmd::DISPLAY_OFF)?;
        self.state = PowerState::Off;
        Ok(())
    }

    /// Set contrast (0-255)
    pub fn set_contrast(&mut self, level: u8) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        self.interface.with_bus(|bus| {
            bus.write_command(cmd::SET_CONTRAST)?;
            bus.write_command(level)
        })?;
        Ok(())
    }

    /// Invert all pixels in hardware
    pub fn set_invert(&mut self, invert: bool) -> Result<(), DisplayError> {
        self.ensure_initialized()?;
        let command = if invert {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        };
        self.interface.write_command(command)?;
        Ok(())
    }

    /// Push the whole framebuffer to the panel
    ///
    /// Pages go out in ascending order, each as a page/column address
    /// triple followed by one `width`-byte data transaction. The bus is
    /// held for the whole frame. On a bus error the remaining pages are
    /// skipped and the error returned; the next call starts again at
    /// page 0.
    pub fn show(&mut self) -> Result<(), DisplayError> {
        self.ensure_initialized()?;

        let framebuffer = &self.framebuffer;
        let column = self.config.column_offset;

        self.interface.with_bus(|bus| {
            for (page, data) in framebuffer.page_slices().enumerate() {
                for command in PageWindow::new(page as u8, column).commands() {
                    bus.write_command(command)?;
                }
                bus.write_data(data)?;
            }
            Ok::<(), BusError>(())
        })?;
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), DisplayError> {
        if self.initialized {
            Ok(())
        } else {
            Err(DisplayError::NotInitialized)
        }
    }
}

impl<'a, DI, RST> Sh1106<'a, DI, RST> {
    /// Drawing surface
    pub fn framebuffer(&self) -> &FrameBuffer<'a> {
        &self.framebuffer
    }

    /// Mutable drawing surface
    pub fn framebuffer_mut(&mut self) -> &mut FrameBuffer<'a> {
        &mut self.framebuffer
    }

    /// Current power state
    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Whether the init sequence has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Panel configuration
    pub fn config(&self) -> &Sh1106Config {
        &self.config
    }

    /// Give back the interface and reset control
    pub fn release(self) -> (DI, RST) {
        (self.interface, self.reset)
    }
}
