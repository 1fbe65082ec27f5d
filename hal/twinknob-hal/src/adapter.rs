//! Adapters from `embedded-hal` 1.0 traits
//!
//! Chip HALs (embassy-rp here) implement the `embedded-hal` traits; these
//! newtypes expose them through the twinknob traits.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;
use embedded_hal::i2c::{self, ErrorKind};

use crate::delay::DelayUs;
use crate::gpio::OutputPin;
use crate::i2c::{BusError, I2cBus};

impl From<ErrorKind> for BusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => BusError::Nack,
            ErrorKind::ArbitrationLoss => BusError::ArbitrationLost,
            ErrorKind::Bus => BusError::Bus,
            ErrorKind::Overrun => BusError::Overrun,
            _ => BusError::Other,
        }
    }
}

fn bus_error<E: i2c::Error>(e: E) -> BusError {
    e.kind().into()
}

/// Blocking `embedded-hal` I2C master as an [`I2cBus`]
pub struct EhI2c<I> {
    i2c: I,
}

impl<I> EhI2c<I> {
    /// Wrap an `embedded-hal` I2C master
    pub const fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Get the wrapped master back
    pub fn into_inner(self) -> I {
        self.i2c
    }
}

impl<I: i2c::I2c> I2cBus for EhI2c<I> {
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.i2c.write(address, data).map_err(bus_error)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.i2c.read(address, buf).map_err(bus_error)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), BusError> {
        self.i2c
            .write_read(address, write_data, read_buf)
            .map_err(bus_error)
    }
}

/// `embedded-hal` output pin as an [`OutputPin`]
///
/// Pin errors are dropped; GPIO outputs on the supported chips are
/// infallible.
pub struct EhOutput<P> {
    pin: P,
}

impl<P> EhOutput<P> {
    /// Wrap an `embedded-hal` output pin
    pub const fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: digital::OutputPin> OutputPin for EhOutput<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
    }
}

/// `embedded-hal` delay as a [`DelayUs`]
pub struct EhDelay<D> {
    delay: D,
}

impl<D> EhDelay<D> {
    /// Wrap an `embedded-hal` delay
    pub const fn new(delay: D) -> Self {
        Self { delay }
    }
}

impl<D: DelayNs> DelayUs for EhDelay<D> {
    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::i2c::{NoAcknowledgeSource, Operation};

    /// I2C master that fails with a fixed error kind
    struct FailingI2c {
        kind: Option<ErrorKind>,
        last_address: u8,
        written: usize,
    }

    impl i2c::ErrorType for FailingI2c {
        type Error = ErrorKind;
    }

    impl i2c::I2c for FailingI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if let Some(kind) = self.kind {
                return Err(kind);
            }
            self.last_address = address;
            for op in operations {
                match op {
                    Operation::Write(data) => self.written += data.len(),
                    Operation::Read(buf) => buf.fill(0x42),
                }
            }
            Ok(())
        }
    }

    struct MockPin {
        high: bool,
    }

    impl digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl digital::OutputPin for MockPin {
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }
    }

    #[test]
    fn test_error_kind_mapping() {
        let cases = [
            (
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
                BusError::Nack,
            ),
            (
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
                BusError::Nack,
            ),
            (ErrorKind::ArbitrationLoss, BusError::ArbitrationLost),
            (ErrorKind::Bus, BusError::Bus),
            (ErrorKind::Overrun, BusError::Overrun),
            (ErrorKind::Other, BusError::Other),
        ];

        for (kind, expected) in cases {
            let mut bus = EhI2c::new(FailingI2c {
                kind: Some(kind),
                last_address: 0,
                written: 0,
            });
            assert_eq!(bus.write(0x3C, &[0x00, 0xAF]), Err(expected));
        }
    }

    #[test]
    fn test_write_and_read_pass_through() {
        let mut bus = EhI2c::new(FailingI2c {
            kind: None,
            last_address: 0,
            written: 0,
        });

        bus.write(0x3C, &[0x40, 1, 2, 3]).unwrap();
        let mut buf = [0u8; 4];
        bus.write_read(0x37, &[0x11, 0x30], &mut buf).unwrap();

        let inner = bus.into_inner();
        assert_eq!(inner.last_address, 0x37);
        assert_eq!(inner.written, 6);
        assert_eq!(buf, [0x42; 4]);
    }

    #[test]
    fn test_output_pin_state() {
        let mut pin = EhOutput::new(MockPin { high: false });
        pin.set_state(true);
        assert!(pin.pin.high);
        pin.set_state(false);
        assert!(!pin.pin.high);
    }
}
