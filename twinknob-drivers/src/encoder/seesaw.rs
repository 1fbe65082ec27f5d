//! Adafruit seesaw rotary encoder
//!
//! The seesaw is a small co-processor that counts encoder detents in
//! hardware. Registers are addressed by a (module, function) byte pair:
//! a read writes the pair, waits for the chip to prepare the reply, then
//! reads the value back. Multi-byte values are big-endian.
//!
//! Each register access holds the shared bus for the whole
//! write/wait/read cycle so another device cannot slip in between.

use embassy_sync::blocking_mutex::raw::RawMutex;
use twinknob_core::traits::PositionSource;
use twinknob_hal::{BusError, DelayUs, I2cBus, SharedI2c};

/// Seesaw register map (module base, function)
pub mod reg {
    pub const STATUS_BASE: u8 = 0x00;
    pub const STATUS_HW_ID: u8 = 0x01;
    pub const STATUS_SWRST: u8 = 0x7F;

    pub const ENCODER_BASE: u8 = 0x11;
    pub const ENCODER_POSITION: u8 = 0x30;
    pub const ENCODER_DELTA: u8 = 0x40;
}

/// Value written to the reset register
pub const SOFTWARE_RESET: u8 = 0xFF;

/// Time for the chip to restart after a software reset
pub const RESET_DELAY_MS: u32 = 500;

/// Time between a register select and the read
pub const READ_DELAY_US: u32 = 8_000;

/// Hardware id of the SAMD09 based boards
pub const HW_ID_SAMD09: u8 = 0x55;

/// Hardware ids of the ATtiny8x7 / ATtiny16x7 based boards
pub const HW_ID_ATTINY: core::ops::RangeInclusive<u8> = 0x84..=0x89;

/// Seesaw errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SeesawError {
    /// Bus transaction failed
    Bus(BusError),
    /// Device answered with an unexpected hardware id
    UnknownChip(u8),
}

impl From<BusError> for SeesawError {
    fn from(e: BusError) -> Self {
        SeesawError::Bus(e)
    }
}

/// Check a hardware id against the known seesaw chips
pub fn is_known_chip(id: u8) -> bool {
    id == HW_ID_SAMD09 || HW_ID_ATTINY.contains(&id)
}

/// Rotary encoder on a seesaw breakout
pub struct SeesawEncoder<'b, M: RawMutex, B, D> {
    bus: &'b SharedI2c<M, B>,
    address: u8,
    /// Encoder number on the chip
    encoder: u8,
    invert: bool,
    delay: D,
}

impl<'b, M, B, D> SeesawEncoder<'b, M, B, D>
where
    M: RawMutex,
    B: I2cBus,
    D: DelayUs,
{
    /// Create a driver for encoder 0 at `address`
    pub fn new(bus: &'b SharedI2c<M, B>, address: u8, delay: D) -> Self {
        Self {
            bus,
            address,
            encoder: 0,
            invert: false,
            delay,
        }
    }

    /// Select another encoder on a multi-encoder board
    pub fn with_encoder(mut self, encoder: u8) -> Self {
        self.encoder = encoder;
        self
    }

    /// Report positions and deltas with the sign flipped
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Bus address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Reset the chip and check its hardware id
    ///
    /// Returns the hardware id. Resetting also zeroes the position counter.
    pub fn begin(&mut self) -> Result<u8, SeesawError> {
        self.bus.write(
            self.address,
            &[reg::STATUS_BASE, reg::STATUS_SWRST, SOFTWARE_RESET],
        )?;
        self.delay.delay_ms(RESET_DELAY_MS);

        let mut id = [0u8; 1];
        self.read_register(reg::STATUS_BASE, reg::STATUS_HW_ID, &mut id)?;

        if is_known_chip(id[0]) {
            Ok(id[0])
        } else {
            Err(SeesawError::UnknownChip(id[0]))
        }
    }

    /// Absolute position in detents since reset
    pub fn position(&mut self) -> Result<i32, SeesawError> {
        self.read_i32(reg::ENCODER_POSITION + self.encoder)
    }

    /// Detents since the previous delta read
    pub fn delta(&mut self) -> Result<i32, SeesawError> {
        self.read_i32(reg::ENCODER_DELTA + self.encoder)
    }

    fn read_i32(&mut self, function: u8) -> Result<i32, SeesawError> {
        let mut buf = [0u8; 4];
        self.read_register(reg::ENCODER_BASE, function, &mut buf)?;

        let value = i32::from_be_bytes(buf);
        Ok(if self.invert {
            value.wrapping_neg()
        } else {
            value
        })
    }

    fn read_register(&mut self, base: u8, function: u8, buf: &mut [u8]) -> Result<(), BusError> {
        let address = self.address;
        let delay = &mut self.delay;

        self.bus.lock(|bus| {
            bus.write(address, &[base, function])?;
            delay.delay_us(READ_DELAY_US);
            bus.read(address, buf)
        })
    }
}

impl<M, B, D> PositionSource for SeesawEncoder<'_, M, B, D>
where
    M: RawMutex,
    B: I2cBus,
    D: DelayUs,
{
    type Error = SeesawError;

    fn position(&mut self) -> Result<i32, SeesawError> {
        SeesawEncoder::position(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use heapless::Vec;

    /// Seesaw register file on a fake bus
    struct MockSeesaw {
        address: u8,
        hw_id: u8,
        positions: [i32; 2],
        deltas: [i32; 2],
        selected: Option<(u8, u8)>,
        writes: Vec<Vec<u8, 4>, 16>,
        fail_reads: bool,
    }

    impl MockSeesaw {
        fn new(address: u8) -> Self {
            Self {
                address,
                hw_id: HW_ID_SAMD09,
                positions: [0; 2],
                deltas: [0; 2],
                selected: None,
                writes: Vec::new(),
                fail_reads: false,
            }
        }
    }

    impl I2cBus for MockSeesaw {
        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
            if address != self.address {
                return Err(BusError::Nack);
            }
            self.writes
                .push(Vec::from_slice(data).map_err(|_| BusError::Overrun)?)
                .map_err(|_| BusError::Overrun)?;
            match data {
                [reg::STATUS_BASE, reg::STATUS_SWRST, SOFTWARE_RESET] => self.positions = [0; 2],
                [base, function] => self.selected = Some((*base, *function)),
                _ => {}
            }
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
            if address != self.address || self.fail_reads {
                return Err(BusError::Nack);
            }
            match self.selected.take() {
                Some((reg::STATUS_BASE, reg::STATUS_HW_ID)) => buf[0] = self.hw_id,
                Some((reg::ENCODER_BASE, f @ 0x30..=0x31)) => {
                    let n = (f - reg::ENCODER_POSITION) as usize;
                    buf.copy_from_slice(&self.positions[n].to_be_bytes());
                }
                Some((reg::ENCODER_BASE, f @ 0x40..=0x41)) => {
                    let n = (f - reg::ENCODER_DELTA) as usize;
                    buf.copy_from_slice(&core::mem::take(&mut self.deltas[n]).to_be_bytes());
                }
                _ => return Err(BusError::Other),
            }
            Ok(())
        }

        fn write_read(&mut self, _: u8, _: &[u8], _: &mut [u8]) -> Result<(), BusError> {
            Err(BusError::Other)
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_us: u64,
    }

    impl DelayUs for MockDelay {
        fn delay_us(&mut self, us: u32) {
            self.total_us += us as u64;
        }
    }

    #[test]
    fn test_begin_resets_and_identifies() {
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(MockSeesaw::new(0x37));
        let mut enc = SeesawEncoder::new(&shared, 0x37, MockDelay::default());

        assert_eq!(enc.begin(), Ok(HW_ID_SAMD09));
        assert_eq!(enc.delay.total_us, 500_000 + 8_000);

        let bus = shared.into_inner();
        assert_eq!(&bus.writes[0][..], &[0x00, 0x7F, 0xFF]);
        assert_eq!(&bus.writes[1][..], &[0x00, 0x01]);
    }

    #[test]
    fn test_begin_rejects_unknown_chip() {
        let mut seesaw = MockSeesaw::new(0x37);
        seesaw.hw_id = 0x42;
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(seesaw);
        let mut enc = SeesawEncoder::new(&shared, 0x37, MockDelay::default());

        assert_eq!(enc.begin(), Err(SeesawError::UnknownChip(0x42)));
    }

    #[test]
    fn test_known_chips() {
        assert!(is_known_chip(0x55));
        assert!(is_known_chip(0x84));
        assert!(is_known_chip(0x87));
        assert!(is_known_chip(0x89));
        assert!(!is_known_chip(0x83));
        assert!(!is_known_chip(0x8A));
    }

    #[test]
    fn test_position_is_big_endian() {
        let mut seesaw = MockSeesaw::new(0x38);
        seesaw.positions = [-3, 0x0102_0304];
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(seesaw);

        let mut first = SeesawEncoder::new(&shared, 0x38, MockDelay::default());
        assert_eq!(first.position(), Ok(-3));

        let mut second = SeesawEncoder::new(&shared, 0x38, MockDelay::default()).with_encoder(1);
        assert_eq!(second.position(), Ok(0x0102_0304));

        let bus = shared.into_inner();
        assert_eq!(&bus.writes[0][..], &[0x11, 0x30]);
        assert_eq!(&bus.writes[1][..], &[0x11, 0x31]);
    }

    #[test]
    fn test_invert() {
        let mut seesaw = MockSeesaw::new(0x37);
        seesaw.positions[0] = 5;
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(seesaw);
        let mut enc = SeesawEncoder::new(&shared, 0x37, MockDelay::default()).with_invert(true);

        assert_eq!(PositionSource::position(&mut enc), Ok(-5));
    }

    #[test]
    fn test_delta_register() {
        let mut seesaw = MockSeesaw::new(0x37);
        seesaw.deltas[0] = 2;
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(seesaw);
        let mut enc = SeesawEncoder::new(&shared, 0x37, MockDelay::default());

        assert_eq!(enc.delta(), Ok(2));
        assert_eq!(enc.delta(), Ok(0));
        assert_eq!(&shared.into_inner().writes[0][..], &[0x11, 0x40]);
    }

    #[test]
    fn test_bus_errors_propagate() {
        let mut seesaw = MockSeesaw::new(0x37);
        seesaw.fail_reads = true;
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(seesaw);
        let mut enc = SeesawEncoder::new(&shared, 0x37, MockDelay::default());

        assert_eq!(enc.position(), Err(SeesawError::Bus(BusError::Nack)));

        let mut absent = SeesawEncoder::new(&shared, 0x40, MockDelay::default());
        assert_eq!(absent.begin(), Err(SeesawError::Bus(BusError::Nack)));
    }
}
