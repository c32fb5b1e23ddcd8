//! Signal storage, write ownership and the deferred-update model.
//!
//! Every wire in a simulation lives in one [`SignalTable`] and is addressed
//! by a [`SignalId`]. Writes come in two flavors:
//!
//! - [`SignalTable::set`] updates a value immediately. Combinational logic
//!   and the test harness use it between clock edges.
//! - [`SignalTable::schedule`] queues a value that only becomes visible on
//!   [`SignalTable::commit`]. Everything that reacts to a clock edge uses
//!   it, so all readers at that edge observe the same pre-edge state.
//!
//! Each signal has at most one writer, recorded as an [`Owner`].

use std::fmt;

use relay_common::Bits;
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::task::TaskId;

/// Opaque handle to a signal in a [`SignalTable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// The single writer a signal belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Owner {
    /// The test orchestrator (clock, reset, and other top-level inputs).
    Harness,
    /// The component under test.
    Component,
    /// A spawned driver task.
    Task(TaskId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Harness => write!(f, "the harness"),
            Owner::Component => write!(f, "the component"),
            Owner::Task(id) => write!(f, "task {}", id.as_raw()),
        }
    }
}

/// The runtime state of one signal.
#[derive(Clone, Debug)]
pub struct SignalState {
    /// Name used for lookups and waveform output.
    pub name: String,
    /// Current value.
    pub value: Bits,
    /// Value the owning component restores on reset.
    pub reset: Bits,
    /// Current writer, if claimed.
    pub owner: Option<Owner>,
}

impl SignalState {
    /// Bit width of this signal.
    pub fn width(&self) -> u32 {
        self.value.width()
    }
}

/// Flat storage for all signals of a simulation.
#[derive(Clone, Debug, Default)]
pub struct SignalTable {
    signals: Vec<SignalState>,
    pending: Vec<(SignalId, Bits)>,
}

impl SignalTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a signal whose initial and reset value is zero.
    pub fn alloc(&mut self, name: impl Into<String>, width: u32) -> SignalId {
        self.alloc_with_reset(name, Bits::zero(width))
    }

    /// Allocates a signal with the given reset value, which is also its
    /// initial value.
    fn alloc_with_reset(&mut self, name: impl Into<String>, reset: Bits) -> SignalId {
        let id = SignalId(self.signals.len() as u32);
        self.signals.push(SignalState {
            name: name.into(),
            value: reset,
            reset,
            owner: None,
        });
        id
    }

    /// Returns the current value of a signal.
    pub fn get(&self, id: SignalId) -> Bits {
        self.state(id).value
    }

    /// Returns true if bit 0 of the signal is set.
    pub fn is_high(&self, id: SignalId) -> bool {
        self.get(id).to_bool()
    }

    /// Returns the signal's name.
    pub fn name(&self, id: SignalId) -> &str {
        &self.state(id).name
    }

    /// Returns the signal's width.
    pub fn width(&self, id: SignalId) -> u32 {
        self.state(id).width()
    }

    /// Returns the signal's current writer.
    pub fn owner(&self, id: SignalId) -> Option<Owner> {
        self.state(id).owner
    }

    /// Returns the value a signal takes when its writer is reset.
    pub fn reset_value(&self, id: SignalId) -> Bits {
        self.state(id).reset
    }

    /// Returns the full state of a signal.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this table.
    pub fn state(&self, id: SignalId) -> &SignalState {
        &self.signals[id.0 as usize]
    }

    /// Writes a value immediately.
    ///
    /// # Panics
    ///
    /// Panics if the value's width differs from the signal's width.
    pub fn set(&mut self, id: SignalId, value: Bits) {
        let state = &mut self.signals[id.0 as usize];
        assert_eq!(
            state.width(),
            value.width(),
            "width mismatch writing signal '{}'",
            state.name
        );
        state.value = value;
    }

    /// Writes a single-bit value immediately.
    pub fn set_bool(&mut self, id: SignalId, value: bool) {
        self.set(id, Bits::from_bool(value));
    }

    /// Queues a write that becomes visible at the next [`commit`](Self::commit).
    ///
    /// # Panics
    ///
    /// Panics if the value's width differs from the signal's width.
    pub fn schedule(&mut self, id: SignalId, value: Bits) {
        assert_eq!(
            self.width(id),
            value.width(),
            "width mismatch scheduling signal '{}'",
            self.name(id)
        );
        self.pending.push((id, value));
    }

    /// Queues a single-bit write.
    pub fn schedule_bool(&mut self, id: SignalId, value: bool) {
        self.schedule(id, Bits::from_bool(value));
    }

    /// Applies every queued write in the order it was scheduled.
    pub fn commit(&mut self) {
        for (id, value) in std::mem::take(&mut self.pending) {
            self.signals[id.0 as usize].value = value;
        }
    }

    /// Records `owner` as the only writer of `id`.
    ///
    /// Claiming a signal again for its current owner is a no-op.
    pub fn claim(&mut self, id: SignalId, owner: Owner) -> Result<(), SimError> {
        let state = &mut self.signals[id.0 as usize];
        match state.owner {
            Some(current) if current != owner => Err(SimError::MultipleDrivers {
                signal: state.name.clone(),
                owner: current.to_string(),
            }),
            _ => {
                state.owner = Some(owner);
                Ok(())
            }
        }
    }

    /// Releases every signal held by `owner`.
    pub fn release(&mut self, owner: Owner) {
        for state in &mut self.signals {
            if state.owner == Some(owner) {
                state.owner = None;
            }
        }
    }

    /// Iterates over all signals in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &SignalState)> {
        self.signals
            .iter()
            .enumerate()
            .map(|(i, s)| (SignalId(i as u32), s))
    }

    /// Returns the number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Returns true if no signal has been allocated.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_id_roundtrip() {
        assert_eq!(SignalId::from_raw(42).as_raw(), 42);
    }

    #[test]
    fn alloc_starts_at_reset_value() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 4);
        let b = t.alloc_with_reset("b", Bits::from_u128(5, 4));
        assert_eq!(t.get(a), Bits::zero(4));
        assert_eq!(t.get(b).to_u128(), 5);
        assert_eq!(t.width(b), 4);
        assert_eq!(t.name(b), "b");
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn reset_value_survives_writes() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 4);
        let b = t.alloc_with_reset("b", Bits::from_u128(5, 4));
        t.set(b, Bits::from_u128(9, 4));
        t.schedule(a, Bits::from_u128(1, 4));
        t.commit();
        assert_eq!(t.reset_value(a), Bits::zero(4));
        assert_eq!(t.reset_value(b).to_u128(), 5);
        assert_eq!(t.get(b).to_u128(), 9);
    }

    #[test]
    fn set_is_immediate() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 1);
        t.set_bool(a, true);
        assert!(t.is_high(a));
    }

    #[test]
    fn schedule_waits_for_commit() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 8);
        t.schedule(a, Bits::from_u128(7, 8));
        assert_eq!(t.get(a), Bits::zero(8));
        t.commit();
        assert_eq!(t.get(a).to_u128(), 7);
        t.commit();
        assert_eq!(t.get(a).to_u128(), 7);
    }

    #[test]
    fn later_schedule_wins() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 8);
        t.schedule(a, Bits::from_u128(1, 8));
        t.schedule(a, Bits::from_u128(2, 8));
        t.commit();
        assert_eq!(t.get(a).to_u128(), 2);
    }

    #[test]
    #[should_panic(expected = "width mismatch")]
    fn set_width_mismatch_panics() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 4);
        t.set(a, Bits::zero(5));
    }

    #[test]
    fn claim_rejects_second_owner() {
        let mut t = SignalTable::new();
        let a = t.alloc("a_valid", 1);
        t.claim(a, Owner::Task(TaskId::from_raw(0))).unwrap();
        t.claim(a, Owner::Task(TaskId::from_raw(0))).unwrap();
        let err = t.claim(a, Owner::Task(TaskId::from_raw(1))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "signal 'a_valid' is already driven by task 0"
        );
    }

    #[test]
    fn release_frees_claims() {
        let mut t = SignalTable::new();
        let a = t.alloc("a", 1);
        let owner = Owner::Task(TaskId::from_raw(3));
        t.claim(a, owner).unwrap();
        t.release(owner);
        assert_eq!(t.owner(a), None);
        t.claim(a, Owner::Harness).unwrap();
        assert_eq!(t.owner(a), Some(Owner::Harness));
    }
}
