//! The discrete time base driving every simulation.

use crate::error::SimError;
use crate::time::{SimTime, FS_PER_NS};

/// Clock period used when none is configured (10 ns, 100 MHz).
pub const DEFAULT_PERIOD_FS: u64 = 10 * FS_PER_NS;

/// Direction of a clock transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Low to high.
    Rising,
    /// High to low.
    Falling,
}

/// A single clock transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockEdge {
    /// When the transition happens.
    pub time: SimTime,
    /// Which way the clock moves.
    pub kind: EdgeKind,
}

/// A free-running clock with a fixed period and 50% duty cycle.
///
/// The clock is low at time zero. Rising edges happen at
/// `k * period + period / 2` and falling edges at `(k + 1) * period`. The
/// clock never stops: iterating it yields an unbounded edge sequence.
#[derive(Clone, Debug)]
pub struct Clock {
    period_fs: u64,
    next: ClockEdge,
}

impl Clock {
    /// Creates a clock with the given period in femtoseconds.
    ///
    /// The period must be positive and even so both half-periods are whole
    /// femtoseconds.
    pub fn new(period_fs: u64) -> Result<Self, SimError> {
        if period_fs == 0 || period_fs % 2 != 0 {
            return Err(SimError::Configuration {
                reason: format!("clock period must be a positive even number of fs, got {period_fs}"),
            });
        }
        Ok(Self {
            period_fs,
            next: ClockEdge {
                time: SimTime::from_fs(period_fs / 2),
                kind: EdgeKind::Rising,
            },
        })
    }

    /// Returns the clock period in femtoseconds.
    pub fn period_fs(&self) -> u64 {
        self.period_fs
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self {
            period_fs: DEFAULT_PERIOD_FS,
            next: ClockEdge {
                time: SimTime::from_fs(DEFAULT_PERIOD_FS / 2),
                kind: EdgeKind::Rising,
            },
        }
    }
}

impl Iterator for Clock {
    type Item = ClockEdge;

    fn next(&mut self) -> Option<ClockEdge> {
        let edge = self.next;
        let half = self.period_fs / 2;
        self.next = ClockEdge {
            time: edge.time.after(half),
            kind: match edge.kind {
                EdgeKind::Rising => EdgeKind::Falling,
                EdgeKind::Falling => EdgeKind::Rising,
            },
        };
        Some(edge)
    }
}
