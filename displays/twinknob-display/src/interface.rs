//! Command/data transport
//!
//! The controller tells commands from pixel data by a control byte at the
//! start of every bus transaction:
//!
//! ```text
//! ┌──────┬─────────┐        ┌──────┬──────────────────┐
//! │ 0x00 │ command │        │ 0x40 │ pixel bytes ...  │
//! └──────┴─────────┘        └──────┴──────────────────┘
//!   command transaction        data transaction
//! ```
//!
//! The control byte and its payload always travel in one transaction.

use embassy_sync::blocking_mutex::raw::RawMutex;
use twinknob_hal::i2c::is_valid_address;
use twinknob_hal::{BusError, I2cBus, SharedI2c};

use crate::error::ConfigError;

/// Control byte: the following byte is a command (Co = 0, D/C = 0)
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte: the following bytes are display RAM data (Co = 0, D/C = 1)
pub const CONTROL_DATA: u8 = 0x40;

/// Largest data payload sent as a single transaction (one RAM row)
pub const MAX_DATA_LEN: usize = 132;

/// Default SH1106 I2C address (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Writes made while the bus is held
pub trait CommandSink {
    /// Send one command byte as its own transaction
    fn write_command(&mut self, cmd: u8) -> Result<(), BusError>;

    /// Send display RAM data
    fn write_data(&mut self, data: &[u8]) -> Result<(), BusError>;
}

/// Transport between the driver and the controller
pub trait DisplayInterface {
    /// Run `f` with the bus held for the whole closure
    ///
    /// Use this to group the transactions of one logical operation so no
    /// other device on the bus can interleave with them.
    fn with_bus<R>(&mut self, f: impl FnOnce(&mut dyn CommandSink) -> R) -> R;

    /// Send one command byte under its own lock
    fn write_command(&mut self, cmd: u8) -> Result<(), BusError> {
        self.with_bus(|sink| sink.write_command(cmd))
    }

    /// Send display RAM data under its own lock
    fn write_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        self.with_bus(|sink| sink.write_data(data))
    }
}

/// SH1106 on a shared I2C bus
pub struct I2cInterface<'b, M: RawMutex, B> {
    bus: &'b SharedI2c<M, B>,
    address: u8,
}

impl<'b, M: RawMutex, B: I2cBus> I2cInterface<'b, M, B> {
    /// Create an interface for the controller at `address`
    pub fn new(bus: &'b SharedI2c<M, B>, address: u8) -> Result<Self, ConfigError> {
        if !is_valid_address(address) {
            return Err(ConfigError::InvalidAddress(address));
        }
        Ok(Self { bus, address })
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }
}

impl<M: RawMutex, B: I2cBus> DisplayInterface for I2cInterface<'_, M, B> {
    fn with_bus<R>(&mut self, f: impl FnOnce(&mut dyn CommandSink) -> R) -> R {
        let address = self.address;
        self.bus.lock(|bus| {
            let mut session = I2cSession { bus, address };
            f(&mut session)
        })
    }
}

/// Bus held by an [`I2cInterface`]
struct I2cSession<'s, B> {
    bus: &'s mut B,
    address: u8,
}

impl<B: I2cBus> CommandSink for I2cSession<'_, B> {
    fn write_command(&mut self, cmd: u8) -> Result<(), BusError> {
        self.bus.write(self.address, &[CONTROL_COMMAND, cmd])
    }

    /// Payloads longer than [`MAX_DATA_LEN`] are rejected without touching
    /// the bus.
    fn write_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        if data.len() > MAX_DATA_LEN {
            return Err(BusError::PayloadTooLong);
        }

        let mut frame = [0u8; MAX_DATA_LEN + 1];
        frame[0] = CONTROL_DATA;
        frame[1..=data.len()].copy_from_slice(data);
        self.bus.write(self.address, &frame[..=data.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    /// Keeps the first bytes of every transaction
    struct LogBus {
        transactions: [(u8, usize, [u8; 4]); 8],
        count: usize,
    }

    impl LogBus {
        fn new() -> Self {
            Self {
                transactions: [(0, 0, [0; 4]); 8],
                count: 0,
            }
        }
    }

    impl I2cBus for LogBus {
        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), BusError> {
            let mut head = [0u8; 4];
            let n = data.len().min(4);
            head[..n].copy_from_slice(&data[..n]);
            self.transactions[self.count] = (address, data.len(), head);
            self.count += 1;
            Ok(())
        }

        fn read(&mut self, _address: u8, _buf: &mut [u8]) -> Result<(), BusError> {
            Err(BusError::Other)
        }

        fn write_read(&mut self, _: u8, _: &[u8], _: &mut [u8]) -> Result<(), BusError> {
            Err(BusError::Other)
        }
    }

    #[test]
    fn test_rejects_ten_bit_address() {
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(LogBus::new());
        assert_eq!(
            I2cInterface::new(&shared, 0x80).err(),
            Some(ConfigError::InvalidAddress(0x80))
        );
    }

    #[test]
    fn test_command_framing() {
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(LogBus::new());
        let mut iface = I2cInterface::new(&shared, DEFAULT_ADDRESS).unwrap();

        iface.write_command(0xAF).unwrap();

        let bus = shared.into_inner();
        assert_eq!(bus.count, 1);
        assert_eq!(bus.transactions[0], (0x3C, 2, [0x00, 0xAF, 0, 0]));
    }

    #[test]
    fn test_data_framing() {
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(LogBus::new());
        let mut iface = I2cInterface::new(&shared, 0x3D).unwrap();

        iface.write_data(&[0x11, 0x22, 0x33]).unwrap();
        iface.write_data(&[0xAA; 128]).unwrap();

        let bus = shared.into_inner();
        assert_eq!(bus.count, 2);
        assert_eq!(bus.transactions[0], (0x3D, 4, [0x40, 0x11, 0x22, 0x33]));
        assert_eq!(bus.transactions[1], (0x3D, 129, [0x40, 0xAA, 0xAA, 0xAA]));
    }

    #[test]
    fn test_oversized_data_is_rejected() {
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(LogBus::new());
        let mut iface = I2cInterface::new(&shared, 0x3C).unwrap();

        assert_eq!(
            iface.write_data(&[0x01; MAX_DATA_LEN + 1]),
            Err(BusError::PayloadTooLong)
        );
        // A full RAM row still fits one transaction
        iface.write_data(&[0x02; MAX_DATA_LEN]).unwrap();

        let bus = shared.into_inner();
        assert_eq!(bus.count, 1);
        assert_eq!(bus.transactions[0].1, MAX_DATA_LEN + 1);
        assert_eq!(bus.transactions[0].2[..2], [CONTROL_DATA, 0x02]);
    }

    #[test]
    fn test_with_bus_groups_writes() {
        let shared: SharedI2c<NoopRawMutex, _> = SharedI2c::new(LogBus::new());
        let mut iface = I2cInterface::new(&shared, 0x3C).unwrap();

        iface
            .with_bus(|sink| {
                sink.write_command(0xB0)?;
                sink.write_command(0x02)?;
                sink.write_command(0x10)?;
                sink.write_data(&[0xFF; 4])
            })
            .unwrap();

        let bus = shared.into_inner();
        assert_eq!(bus.count, 4);
        assert_eq!(bus.transactions[2].2[..2], [0x00, 0x10]);
    }
}
