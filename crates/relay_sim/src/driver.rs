//! Stimulus and response drivers for handshake streams.
//!
//! [`Sender`] plays the producer side of a [`Stream`]: it holds each item on
//! the bus with `valid` high until an edge sees `ready`, then moves on.
//! [`Receiver`] plays the consumer side: it keeps `ready` high and records
//! `data` at every edge where `valid` is high. Both are [`Task`]s and hold
//! no state beyond a single run.

use relay_common::Bits;

use crate::error::SimError;
use crate::signal::{SignalId, SignalTable};
use crate::stream::Stream;
use crate::task::{Task, TaskState};

/// Producer task: delivers a sequence of items in order, one per accepted
/// edge.
#[derive(Debug)]
pub struct Sender {
    name: String,
    stream: Stream,
    items: Vec<Bits>,
    cursor: usize,
}

impl Sender {
    /// Creates a sender for raw bus values.
    ///
    /// Every item must have the stream's data width.
    pub fn new(stream: &Stream, items: Vec<Bits>) -> Result<Self, SimError> {
        if let Some(bad) = items.iter().find(|b| b.width() != stream.width()) {
            return Err(SimError::Configuration {
                reason: format!(
                    "item of width {} sent on {}-bit stream '{}'",
                    bad.width(),
                    stream.width(),
                    stream.name()
                ),
            });
        }
        Ok(Self {
            name: format!("send {}", stream.name()),
            stream: stream.clone(),
            items,
            cursor: 0,
        })
    }

    /// Creates a sender for signed integers, encoded in two's complement.
    pub fn signed(stream: &Stream, values: &[i128]) -> Result<Self, SimError> {
        let items = values
            .iter()
            .map(|&value| {
                Bits::checked_from_i128(value, stream.width()).ok_or_else(|| {
                    SimError::ValueOutOfRange {
                        value,
                        width: stream.width(),
                        stream: stream.name().to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stream, items)
    }
}

impl Task for Sender {
    fn name(&self) -> &str {
        &self.name
    }

    fn drives(&self) -> Vec<SignalId> {
        vec![self.stream.data, self.stream.valid]
    }

    fn start(&mut self, signals: &mut SignalTable) -> Result<TaskState, SimError> {
        let Some(&first) = self.items.first() else {
            return Ok(TaskState::Done(Vec::new()));
        };
        signals.schedule(self.stream.data, first);
        signals.schedule_bool(self.stream.valid, true);
        Ok(TaskState::Pending)
    }

    fn on_rising_edge(&mut self, signals: &mut SignalTable) -> Result<TaskState, SimError> {
        if !self.stream.accepted(signals) {
            return Ok(TaskState::Pending);
        }
        log::debug!(
            "{}: item {} accepted ({})",
            self.name,
            self.cursor,
            self.items[self.cursor].to_i128()
        );
        self.cursor += 1;
        match self.items.get(self.cursor) {
            Some(&next) => {
                signals.schedule(self.stream.data, next);
                Ok(TaskState::Pending)
            }
            None => {
                signals.schedule_bool(self.stream.valid, false);
                Ok(TaskState::Done(Vec::new()))
            }
        }
    }
}

/// Consumer task: collects a fixed number of items.
#[derive(Debug)]
pub struct Receiver {
    name: String,
    stream: Stream,
    count: usize,
    received: Vec<Bits>,
}

impl Receiver {
    /// Creates a receiver that stops after `count` items.
    pub fn new(stream: &Stream, count: usize) -> Self {
        Self {
            name: format!("recv {}", stream.name()),
            stream: stream.clone(),
            count,
            received: Vec::with_capacity(count),
        }
    }
}

impl Task for Receiver {
    fn name(&self) -> &str {
        &self.name
    }

    fn drives(&self) -> Vec<SignalId> {
        vec![self.stream.ready]
    }

    fn start(&mut self, signals: &mut SignalTable) -> Result<TaskState, SimError> {
        if self.count == 0 {
            return Ok(TaskState::Done(Vec::new()));
        }
        signals.schedule_bool(self.stream.ready, true);
        Ok(TaskState::Pending)
    }

    fn on_rising_edge(&mut self, signals: &mut SignalTable) -> Result<TaskState, SimError> {
        if !self.stream.accepted(signals) {
            return Ok(TaskState::Pending);
        }
        let data = self.stream.data(signals);
        log::debug!(
            "{}: item {} received ({})",
            self.name,
            self.received.len(),
            data.to_i128()
        );
        self.received.push(data);
        if self.received.len() < self.count {
            return Ok(TaskState::Pending);
        }
        signals.schedule_bool(self.stream.ready, false);
        Ok(TaskState::Done(std::mem::take(&mut self.received)))
    }
}

/// Reads collected bus values as two's-complement integers.
pub fn to_signed(samples: &[Bits]) -> Vec<i128> {
    samples.iter().map(Bits::to_i128).collect()
}
