//! Passive checker for the producer side of the handshake.

use relay_common::Bits;

use crate::error::SimError;
use crate::signal::{SignalId, SignalTable};
use crate::stream::Stream;
use crate::time::SimTime;

/// Watches one [`Stream`] and reports producers that break the hold rule.
///
/// Once an edge sees `valid` high and `ready` low, the producer owes the
/// consumer the same item at the next edge: `valid` must still be high and
/// `data` must be unchanged. An asserted reset line cancels the obligation.
#[derive(Debug)]
pub struct ProtocolMonitor {
    stream: Stream,
    reset: Option<SignalId>,
    held: Option<Bits>,
}

impl ProtocolMonitor {
    /// Creates a monitor for `stream`, optionally exempting edges where
    /// `reset` is high.
    pub fn new(stream: &Stream, reset: Option<SignalId>) -> Self {
        Self {
            stream: stream.clone(),
            reset,
            held: None,
        }
    }

    /// Checks the settled state at a rising edge and updates the pending
    /// obligation.
    pub fn check(&mut self, signals: &SignalTable, time: SimTime) -> Result<(), SimError> {
        let in_reset = self.reset.is_some_and(|rst| signals.is_high(rst));
        let valid = self.stream.valid(signals);
        let data = self.stream.data(signals);

        let verdict = match self.held {
            Some(_) if in_reset => Ok(()),
            Some(_) if !valid => Err("valid deasserted before transfer"),
            Some(held) if held != data => Err("data changed while transfer pending"),
            _ => Ok(()),
        };

        self.held = if valid && !self.stream.ready(signals) && !in_reset {
            Some(data)
        } else {
            None
        };

        verdict.map_err(|reason| {
            log::warn!(
                "protocol violation on '{}' at {}: {}",
                self.stream.name(),
                time,
                reason
            );
            SimError::ProtocolViolation {
                time_fs: time.fs,
                stream: self.stream.name().to_string(),
                reason: reason.to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SignalTable, Stream, SignalId) {
        let mut t = SignalTable::new();
        let s = Stream::alloc(&mut t, "r", 5);
        let rst = t.alloc("rst", 1);
        (t, s, rst)
    }

    #[test]
    fn stable_hold_is_legal() {
        let (mut t, s, _) = setup();
        let mut m = ProtocolMonitor::new(&s, None);
        t.set_bool(s.valid, true);
        t.set(s.data, Bits::from_i128(7, 5));
        for ns in 0..4 {
            m.check(&t, SimTime::from_ns(ns)).unwrap();
        }
        t.set_bool(s.ready, true);
        m.check(&t, SimTime::from_ns(5)).unwrap();
        // Transfer done; the producer may now drop valid.
        t.set_bool(s.valid, false);
        m.check(&t, SimTime::from_ns(6)).unwrap();
    }

    #[test]
    fn dropping_valid_is_flagged() {
        let (mut t, s, _) = setup();
        let mut m = ProtocolMonitor::new(&s, None);
        t.set_bool(s.valid, true);
        m.check(&t, SimTime::from_ns(5)).unwrap();
        t.set_bool(s.valid, false);
        let err = m.check(&t, SimTime::from_ns(15)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "protocol violation on 'r' at 15000000 fs: valid deasserted before transfer"
        );
    }

    #[test]
    fn changing_data_is_flagged() {
        let (mut t, s, _) = setup();
        let mut m = ProtocolMonitor::new(&s, None);
        t.set_bool(s.valid, true);
        t.set(s.data, Bits::from_i128(1, 5));
        m.check(&t, SimTime::from_ns(5)).unwrap();
        t.set(s.data, Bits::from_i128(2, 5));
        let err = m.check(&t, SimTime::from_ns(15)).unwrap_err();
        assert!(matches!(
            err,
            SimError::ProtocolViolation { ref reason, .. } if reason == "data changed while transfer pending"
        ));
    }

    #[test]
    fn reset_clears_obligation() {
        let (mut t, s, rst) = setup();
        let mut m = ProtocolMonitor::new(&s, Some(rst));
        t.set_bool(s.valid, true);
        m.check(&t, SimTime::from_ns(5)).unwrap();
        t.set_bool(rst, true);
        t.set_bool(s.valid, false);
        m.check(&t, SimTime::from_ns(15)).unwrap();
        t.set_bool(rst, false);
        m.check(&t, SimTime::from_ns(25)).unwrap();
    }

    #[test]
    fn data_changes_without_valid_are_ignored() {
        let (mut t, s, _) = setup();
        let mut m = ProtocolMonitor::new(&s, None);
        for v in 0..4 {
            t.set(s.data, Bits::from_i128(v, 5));
            m.check(&t, SimTime::from_ns(v as u64)).unwrap();
        }
    }
}
