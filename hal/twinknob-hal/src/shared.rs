//! Shared I2C bus
//!
//! One physical I2C master is used by the display controller and both
//! encoder peripherals. Each device keeps a `&SharedI2c` and takes the bus
//! for exactly one logical operation (a command, a full frame, a register
//! read) through [`SharedI2c::lock`]. The bus is released when the closure
//! returns, on every path including early `?` returns inside it.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::i2c::{BusError, I2cBus};

/// I2C master shared between several devices
pub struct SharedI2c<M: RawMutex, B> {
    bus: Mutex<M, RefCell<B>>,
}

impl<M: RawMutex, B> SharedI2c<M, B> {
    /// Wrap a bus master for sharing
    pub const fn new(bus: B) -> Self {
        Self {
            bus: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Run `f` with exclusive access to the bus
    ///
    /// No other device can issue a transaction until `f` returns.
    ///
    /// # Panics
    ///
    /// Panics if called again from inside `f` on the same bus.
    pub fn lock<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        self.bus.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Take the bus master back
    pub fn into_inner(self) -> B {
        self.bus.into_inner().into_inner()
    }
}

impl<M: RawMutex, B: I2cBus> SharedI2c<M, B> {
    /// Single write transaction under its own lock
    pub fn write(&self, address: u8, data: &[u8]) -> Result<(), BusError> {
        self.lock(|bus| bus.write(address, data))
    }

    /// Single read transaction under its own lock
    pub fn read(&self, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.lock(|bus| bus.read(address, buf))
    }
}
