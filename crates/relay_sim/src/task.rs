//! Cooperative routines resumed by the scheduler at every rising edge.
//!
//! A [`Task`] is the explicit form of a testbench coroutine that loops on
//! "wait for the next rising edge". Instead of suspending, it keeps its
//! cursor in its own fields and the [`Scheduler`](crate::Scheduler) calls
//! [`Task::on_rising_edge`] once per edge, in spawn order, until it reports
//! [`TaskState::Done`].

use relay_common::Bits;

use crate::error::SimError;
use crate::signal::{SignalId, SignalTable};

/// Identifier assigned to a task when it is spawned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u32);

impl TaskId {
    /// Creates a `TaskId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Progress reported by a task after it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// The task wants to be resumed at the next rising edge.
    Pending,
    /// The task finished, yielding the values it collected (possibly none).
    Done(Vec<Bits>),
}

/// A cooperative stimulus or response routine bound to a set of signals.
///
/// Tasks must only write through [`SignalTable::schedule`]; the scheduler
/// commits the queued writes once every participant has sampled the edge.
pub trait Task {
    /// A short label used in logs.
    fn name(&self) -> &str;

    /// The signals this task writes. The scheduler claims them on spawn
    /// and releases them when the task finishes.
    fn drives(&self) -> Vec<SignalId>;

    /// Runs once when the task is spawned, before the first awaited edge.
    fn start(&mut self, signals: &mut SignalTable) -> Result<TaskState, SimError>;

    /// Runs at every rising edge while the task is pending. `signals`
    /// holds the settled values sampled at the edge.
    fn on_rising_edge(&mut self, signals: &mut SignalTable) -> Result<TaskState, SimError>;
}
