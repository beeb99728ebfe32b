//! Fixed-capacity tick history: the record the client rewinds into.

use glam::{Quat, Vec3};

/// Default ring capacity in ticks. Power of two, so indexing is a mask.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

/// Snapshot of the client's pose taken *before* a tick's step is applied.
///
/// Used only to detect prediction error against authoritative snapshots,
/// never fed back into physics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientState {
    /// Pre-step position.
    pub position: Vec3,
    /// Pre-step orientation.
    pub rotation: Quat,
}

/// History buffer failure: the requested tick's slot has been overwritten.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// The lag between the requested tick and the newest tick reaches the
    /// buffer capacity, so the slot now holds a newer tick's data.
    #[error("tick lag {lag} reaches history capacity {capacity}; slot has been overwritten")]
    LagExceedsCapacity {
        /// Distance in ticks between newest and requested.
        lag: u64,
        /// Ring capacity in ticks.
        capacity: usize,
    },
}

/// Fixed-capacity arena indexed by `tick & (capacity - 1)`.
///
/// A slot is valid only for the most recent `capacity` ticks; writing tick
/// `t + capacity` reuses tick `t`'s slot. The operating constraint for the
/// simulation is `latency / tick_duration < capacity` — callers replaying
/// history should verify it with [`check_lag`](Self::check_lag) rather than
/// read an aliased slot.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    slots: Box<[T]>,
    mask: u64,
}

impl<T: Clone + Default> HistoryBuffer<T> {
    /// Creates a buffer of `capacity` slots. `capacity` must be a nonzero
    /// power of two.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "history capacity must be a nonzero power of two, got {capacity}"
        );
        Self {
            slots: vec![T::default(); capacity].into_boxed_slice(),
            mask: capacity as u64 - 1,
        }
    }

    /// Ring capacity in ticks.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Stores `value` in the slot for `tick`, overwriting whatever tick
    /// previously aliased there.
    pub fn set(&mut self, tick: u64, value: T) {
        self.slots[(tick & self.mask) as usize] = value;
    }

    /// Reads the slot for `tick`. The caller is responsible for the lag
    /// precondition; see [`check_lag`](Self::check_lag).
    pub fn get(&self, tick: u64) -> &T {
        &self.slots[(tick & self.mask) as usize]
    }

    /// Verifies that the slot for `oldest` still holds `oldest`'s data when
    /// the newest written tick is `newest`.
    pub fn check_lag(&self, oldest: u64, newest: u64) -> Result<(), HistoryError> {
        let lag = newest.saturating_sub(oldest);
        if lag >= self.capacity() as u64 {
            Err(HistoryError::LagExceedsCapacity {
                lag,
                capacity: self.capacity(),
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let mut buffer: HistoryBuffer<u64> = HistoryBuffer::new(8);
        for tick in 0..8 {
            buffer.set(tick, tick * 10);
        }
        for tick in 0..8 {
            assert_eq!(*buffer.get(tick), tick * 10);
        }
    }

    #[test]
    fn test_slots_alias_modulo_capacity() {
        let mut buffer: HistoryBuffer<u64> = HistoryBuffer::new(8);
        buffer.set(3, 30);
        buffer.set(11, 110); // 11 & 7 == 3
        assert_eq!(*buffer.get(3), 110);
    }

    #[test]
    fn test_check_lag_within_capacity() {
        let buffer: HistoryBuffer<u64> = HistoryBuffer::new(8);
        assert!(buffer.check_lag(100, 107).is_ok());
        assert!(buffer.check_lag(100, 100).is_ok());
    }

    #[test]
    fn test_check_lag_at_capacity_fails() {
        let buffer: HistoryBuffer<u64> = HistoryBuffer::new(8);
        let err = buffer.check_lag(100, 108).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::LagExceedsCapacity {
                lag: 8,
                capacity: 8
            }
        ));
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_non_power_of_two_capacity_panics() {
        let _buffer: HistoryBuffer<u64> = HistoryBuffer::new(100);
    }

    #[test]
    fn test_default_capacity_is_power_of_two() {
        assert!(DEFAULT_HISTORY_CAPACITY.is_power_of_two());
        assert_eq!(DEFAULT_HISTORY_CAPACITY, 1024);
    }
}
