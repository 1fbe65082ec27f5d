//! Rotary encoder traits

/// Absolute position of a rotary encoder
///
/// Positions are signed detent counts since the encoder was reset.
/// Implementations that talk to a bus return the bus error unchanged.
pub trait PositionSource {
    /// Error returned when the position cannot be read
    type Error;

    /// Read the current position
    fn position(&mut self) -> Result<i32, Self::Error>;
}

impl<T: PositionSource> PositionSource for &mut T {
    type Error = T::Error;

    fn position(&mut self) -> Result<i32, Self::Error> {
        T::position(self)
    }
}
