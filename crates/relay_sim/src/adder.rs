//! Synchronous two's-complement adder with ready/valid ports.
//!
//! The adder takes one operand pair from streams `a` and `b` and offers the
//! sum on stream `r`. It has a single result register: a pair accepted while
//! a result is still pending replaces that result.
//!
//! ```text
//!            a.valid & b.valid
//!   +------+ -----------------> +------+
//!   | Idle |                    | Hold | --+ a.valid & b.valid
//!   +------+ <----------------- +------+ <-+ (overwrite)
//!            r.valid & r.ready
//! ```
//!
//! Reset sends the machine to `Idle` from either state.

use crate::component::Component;
use crate::error::SimError;
use crate::signal::{SignalId, SignalTable};
use crate::stream::Stream;

/// Largest supported operand width. The result is one bit wider and must
/// fit in 128 bits.
pub const MAX_OPERAND_WIDTH: u32 = 127;

/// Whether a computed result is waiting on `r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdderState {
    /// No result pending.
    Idle,
    /// A result is on `r` with `valid` high.
    Hold,
}

/// The adder component.
#[derive(Debug)]
pub struct Adder {
    width: u32,
    a: Stream,
    b: Stream,
    r: Stream,
    rst: SignalId,
    state: AdderState,
}

impl Adder {
    /// Allocates the adder's ports in `signals`.
    ///
    /// Fails with [`SimError::Configuration`] when `width` is outside
    /// `1..=127`, in which case nothing is allocated.
    pub fn new(signals: &mut SignalTable, width: u32) -> Result<Self, SimError> {
        if !(1..=MAX_OPERAND_WIDTH).contains(&width) {
            return Err(SimError::Configuration {
                reason: format!(
                    "adder width must be between 1 and {MAX_OPERAND_WIDTH}, got {width}"
                ),
            });
        }
        Ok(Self {
            width,
            a: Stream::alloc(signals, "a", width),
            b: Stream::alloc(signals, "b", width),
            r: Stream::alloc(signals, "r", width + 1),
            rst: signals.alloc("rst", 1),
            state: AdderState::Idle,
        })
    }

    /// First operand stream.
    pub fn a(&self) -> &Stream {
        &self.a
    }

    /// Second operand stream.
    pub fn b(&self) -> &Stream {
        &self.b
    }

    /// Result stream.
    pub fn r(&self) -> &Stream {
        &self.r
    }

    /// Synchronous reset input, active high.
    pub fn rst(&self) -> SignalId {
        self.rst
    }

    /// Operand width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Result width, always one more than the operand width.
    pub fn output_width(&self) -> u32 {
        self.width + 1
    }

    /// Current state of the result register.
    pub fn state(&self) -> AdderState {
        self.state
    }
}

impl Component for Adder {
    fn name(&self) -> &str {
        "adder"
    }

    fn outputs(&self) -> Vec<SignalId> {
        vec![
            self.a.ready,
            self.b.ready,
            self.r.data,
            self.r.valid,
        ]
    }

    fn settle(&mut self, signals: &mut SignalTable) {
        let pair = self.a.valid(signals) && self.b.valid(signals);
        signals.set_bool(self.a.ready, pair);
        signals.set_bool(self.b.ready, pair);
    }

    fn clock_edge(&mut self, signals: &mut SignalTable) {
        let out = self.output_width();
        if signals.is_high(self.rst) {
            let (data, valid) = (
                signals.reset_value(self.r.data),
                signals.reset_value(self.r.valid),
            );
            signals.schedule(self.r.data, data);
            signals.schedule(self.r.valid, valid);
            self.state = AdderState::Idle;
        } else if self.a.valid(signals) && self.b.valid(signals) {
            let x = self.a.data(signals).sign_extend(out);
            let y = self.b.data(signals).sign_extend(out);
            let sum = x.wrapping_add(&y);
            log::debug!(
                "adder: {} + {} = {}",
                x.to_i128(),
                y.to_i128(),
                sum.to_i128()
            );
            signals.schedule(self.r.data, sum);
            signals.schedule_bool(self.r.valid, true);
            self.state = AdderState::Hold;
        } else if self.r.accepted(signals) {
            signals.schedule_bool(self.r.valid, false);
            self.state = AdderState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_common::Bits;

    // Drives one edge by hand: sequential update, commit, settle.
    fn edge(adder: &mut Adder, t: &mut SignalTable) {
        adder.clock_edge(t);
        t.commit();
        adder.settle(t);
    }

    fn present(adder: &Adder, t: &mut SignalTable, x: i128, y: i128) {
        let w = adder.width();
        t.set(adder.a().data, Bits::from_i128(x, w));
        t.set(adder.b().data, Bits::from_i128(y, w));
        t.set_bool(adder.a().valid, true);
        t.set_bool(adder.b().valid, true);
    }

    #[test]
    fn rejects_zero_width_without_allocating() {
        let mut t = SignalTable::new();
        let err = Adder::new(&mut t, 0).unwrap_err();
        assert!(matches!(err, SimError::Configuration { .. }));
        assert!(t.is_empty());
    }

    #[test]
    fn rejects_width_too_large() {
        let mut t = SignalTable::new();
        assert!(Adder::new(&mut t, 128).is_err());
        assert!(t.is_empty());
        assert!(Adder::new(&mut t, 127).is_ok());
    }

    #[test]
    fn output_is_one_bit_wider() {
        for n in [1, 4, 8, 63, 127] {
            let mut t = SignalTable::new();
            let adder = Adder::new(&mut t, n).unwrap();
            assert_eq!(t.width(adder.r().data), n + 1);
            assert_eq!(adder.output_width(), n + 1);
        }
    }

    #[test]
    fn initial_state_is_idle() {
        let mut t = SignalTable::new();
        let mut adder = Adder::new(&mut t, 4).unwrap();
        adder.settle(&mut t);
        assert_eq!(adder.state(), AdderState::Idle);
        assert!(!adder.a().ready(&t));
        assert!(!adder.b().ready(&t));
        assert!(!adder.r().valid(&t));
    }

    #[test]
    fn ready_only_for_complete_pair() {
        let mut t = SignalTable::new();
        let mut adder = Adder::new(&mut t, 4).unwrap();
        t.set_bool(adder.a().valid, true);
        adder.settle(&mut t);
        assert!(!adder.a().ready(&t));
        assert!(!adder.b().ready(&t));
        edge(&mut adder, &mut t);
        assert!(!adder.r().valid(&t));

        t.set_bool(adder.b().valid, true);
        adder.settle(&mut t);
        assert!(adder.a().ready(&t));
        assert!(adder.b().ready(&t));
    }

    #[test]
    fn latches_sign_extended_sum() {
        let mut t = SignalTable::new();
        let mut adder = Adder::new(&mut t, 4).unwrap();
        present(&adder, &mut t, -8, -8);
        adder.settle(&mut t);
        edge(&mut adder, &mut t);
        assert_eq!(adder.state(), AdderState::Hold);
        assert!(adder.r().valid(&t));
        assert_eq!(adder.r().data(&t).to_i128(), -16);
    }

    #[test]
    fn consumed_result_returns_to_idle() {
        let mut t = SignalTable::new();
        let mut adder = Adder::new(&mut t, 4).unwrap();
        present(&adder, &mut t, 1, 2);
        adder.settle(&mut t);
        edge(&mut adder, &mut t);
        t.set_bool(adder.a().valid, false);
        t.set_bool(adder.b().valid, false);
        t.set_bool(adder.r().ready, true);
        adder.settle(&mut t);
        edge(&mut adder, &mut t);
        assert_eq!(adder.state(), AdderState::Idle);
        assert!(!adder.r().valid(&t));
        assert_eq!(adder.r().data(&t).to_i128(), 3);
    }

    #[test]
    fn reset_has_priority_over_new_pair() {
        let mut t = SignalTable::new();
        let mut adder = Adder::new(&mut t, 4).unwrap();
        present(&adder, &mut t, 1, 2);
        adder.settle(&mut t);
        edge(&mut adder, &mut t);
        t.set_bool(adder.rst(), true);
        adder.settle(&mut t);
        assert!(adder.a().ready(&t));
        edge(&mut adder, &mut t);
        assert_eq!(adder.state(), AdderState::Idle);
        assert!(!adder.r().valid(&t));
        assert_eq!(adder.r().data(&t), t.reset_value(adder.r().data));
        assert_eq!(adder.r().data(&t), Bits::zero(5));
    }

    #[test]
    fn new_pair_overrides_consumption() {
        let mut t = SignalTable::new();
        let mut adder = Adder::new(&mut t, 4).unwrap();
        present(&adder, &mut t, 1, 2);
        adder.settle(&mut t);
        edge(&mut adder, &mut t);
        t.set_bool(adder.r().ready, true);
        present(&adder, &mut t, 4, 5);
        adder.settle(&mut t);
        edge(&mut adder, &mut t);
        assert_eq!(adder.state(), AdderState::Hold);
        assert!(adder.r().valid(&t));
        assert_eq!(adder.r().data(&t).to_i128(), 9);
    }
}
