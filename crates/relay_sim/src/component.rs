//! The seam between the scheduler and the design under test.

use crate::signal::{SignalId, SignalTable};

/// A synchronous design driven by a single clock.
///
/// The scheduler calls [`settle`](Component::settle) whenever inputs may
/// have changed and [`clock_edge`](Component::clock_edge) once per rising
/// edge, before any task samples that edge.
pub trait Component {
    /// Scope name used in waveform output.
    fn name(&self) -> &str;

    /// Signals written by this component. The scheduler claims them when
    /// the component is installed.
    fn outputs(&self) -> Vec<SignalId>;

    /// Recomputes combinational outputs from the current signal values.
    /// Writes are immediate.
    fn settle(&mut self, signals: &mut SignalTable);

    /// Computes the sequential update for a rising edge from the settled
    /// pre-edge values. Writes must be scheduled, not set.
    fn clock_edge(&mut self, signals: &mut SignalTable);
}
