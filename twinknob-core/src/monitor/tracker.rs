//! Change tracking for encoder positions
//!
//! The panel only redraws when a knob has moved. The tracker remembers the
//! last positions it has seen and reports whether a new sample differs.

use crate::traits::PositionSource;

/// Last seen positions of `N` encoders
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChangeTracker<const N: usize> {
    last: [i32; N],
}

impl<const N: usize> Default for ChangeTracker<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ChangeTracker<N> {
    /// Create a tracker with every position at zero
    pub const fn new() -> Self {
        Self { last: [0; N] }
    }

    /// Record a sample, returning true if any position changed
    pub fn update(&mut self, positions: [i32; N]) -> bool {
        let dirty = positions != self.last;
        self.last = positions;
        dirty
    }

    /// Read every source and record the sample
    ///
    /// Sources are read in order. The first error is returned and the
    /// tracker keeps its previous positions.
    pub fn poll<S: PositionSource>(&mut self, sources: &mut [S; N]) -> Result<bool, S::Error> {
        let mut positions = [0; N];
        for (slot, source) in positions.iter_mut().zip(sources.iter_mut()) {
            *slot = source.position()?;
        }
        Ok(self.update(positions))
    }

    /// Positions from the last update
    pub fn positions(&self) -> &[i32; N] {
        &self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_starts_at_zero() {
        let mut tracker = ChangeTracker::<2>::new();
        assert_eq!(tracker.positions(), &[0, 0]);
        assert!(!tracker.update([0, 0]));
    }

    #[test]
    fn test_reports_change_once() {
        let mut tracker = ChangeTracker::<2>::new();
        assert!(tracker.update([3, 0]));
        assert!(!tracker.update([3, 0]));
        assert!(tracker.update([3, -1]));
        assert_eq!(tracker.positions(), &[3, -1]);
    }

    struct Knob {
        position: Result<i32, ()>,
        reads: u32,
    }

    impl Knob {
        fn at(position: i32) -> Self {
            Self {
                position: Ok(position),
                reads: 0,
            }
        }
    }

    impl PositionSource for Knob {
        type Error = ();

        fn position(&mut self) -> Result<i32, ()> {
            self.reads += 1;
            self.position
        }
    }

    #[test]
    fn test_poll_sources() {
        let mut tracker = ChangeTracker::<2>::new();
        let mut knobs = [Knob::at(0), Knob::at(0)];
        assert_eq!(tracker.poll(&mut knobs), Ok(false));

        knobs[1].position = Ok(4);
        assert_eq!(tracker.poll(&mut knobs), Ok(true));
        assert_eq!(tracker.positions(), &[0, 4]);
        assert_eq!(knobs[0].reads, 2);
    }

    #[test]
    fn test_poll_error_keeps_positions() {
        let mut tracker = ChangeTracker::<2>::new();
        let mut knobs = [Knob::at(1), Knob::at(2)];
        assert_eq!(tracker.poll(&mut knobs), Ok(true));

        knobs[0].position = Err(());
        knobs[1].position = Ok(9);
        assert_eq!(tracker.poll(&mut knobs), Err(()));
        assert_eq!(tracker.positions(), &[1, 2]);
        // Reading stops at the first failure
        assert_eq!(knobs[1].reads, 1);
    }

    proptest! {
        #[test]
        fn prop_repeat_sample_is_clean(a in any::<i32>(), b in any::<i32>()) {
            let mut tracker = ChangeTracker::<2>::new();
            let first = tracker.update([a, b]);
            prop_assert_eq!(first, a != 0 || b != 0);
            prop_assert!(!tracker.update([a, b]));
        }
    }
}
