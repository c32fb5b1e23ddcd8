//! Ready/valid handshake channels.
//!
//! A [`Stream`] groups a data bus with its `valid` and `ready` control lines.
//! One item moves across the stream at exactly the rising edge where both
//! control lines are high; the transferred value is `data` as sampled at
//! that edge. There is no storage in the channel itself: the producer holds
//! an unaccepted item on the bus until the consumer takes it.

use relay_common::Bits;

use crate::signal::{SignalId, SignalTable};

/// Typed port handle for one handshake channel.
///
/// The handle only names signals; their values live in a [`SignalTable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stream {
    name: String,
    width: u32,
    /// The data bus.
    pub data: SignalId,
    /// Producer-driven "data is meaningful" line.
    pub valid: SignalId,
    /// Consumer-driven "I can take data" line.
    pub ready: SignalId,
}

impl Stream {
    /// Allocates `{prefix}_data`, `{prefix}_valid` and `{prefix}_ready` in
    /// `signals`, all resetting to zero.
    pub fn alloc(signals: &mut SignalTable, prefix: &str, width: u32) -> Self {
        Self {
            name: prefix.to_string(),
            width,
            data: signals.alloc(format!("{prefix}_data"), width),
            valid: signals.alloc(format!("{prefix}_valid"), 1),
            ready: signals.alloc(format!("{prefix}_ready"), 1),
        }
    }

    /// The channel prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width of the data bus.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current value of the data bus.
    pub fn data(&self, signals: &SignalTable) -> Bits {
        signals.get(self.data)
    }

    /// Current level of `valid`.
    pub fn valid(&self, signals: &SignalTable) -> bool {
        signals.is_high(self.valid)
    }

    /// Current level of `ready`.
    pub fn ready(&self, signals: &SignalTable) -> bool {
        signals.is_high(self.ready)
    }

    /// True when a transfer happens at the current edge.
    pub fn accepted(&self, signals: &SignalTable) -> bool {
        self.valid(signals) && self.ready(signals)
    }
}
