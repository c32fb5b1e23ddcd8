//! Deterministic edge-by-edge execution.
//!
//! The [`Scheduler`] owns every piece of simulation state and advances it one
//! clock period at a time. Each rising edge runs in a fixed order:
//!
//! 1. `clk` goes high.
//! 2. Protocol monitors check the settled pre-edge state.
//! 3. The component computes its sequential update (deferred).
//! 4. Tasks run in spawn order against the same pre-edge state (deferred).
//! 5. All deferred writes commit.
//! 6. The component settles its combinational outputs.
//! 7. Changed signals go to the waveform recorder.
//!
//! The falling edge only drops `clk`. Nothing observes a half-updated cycle
//! because every edge-triggered write waits for step 5.
//!
//! A monitor violation does not cut the edge short: the whole period still
//! runs, and [`Scheduler::step`] reports the first violation afterwards.

use std::collections::HashMap;

use relay_common::Bits;

use crate::clock::{Clock, ClockEdge, EdgeKind};
use crate::component::Component;
use crate::error::SimError;
use crate::monitor::ProtocolMonitor;
use crate::signal::{Owner, SignalId, SignalTable};
use crate::stream::Stream;
use crate::task::{Task, TaskId, TaskState};
use crate::time::SimTime;
use crate::waveform::WaveformRecorder;

/// Cycles a single [`Scheduler::join`] or [`Scheduler::run_until`] may
/// take before giving up.
pub const DEFAULT_CYCLE_LIMIT: u64 = 100_000;

struct TaskSlot {
    id: TaskId,
    task: Box<dyn Task>,
}

/// Runs one component and its driver tasks against a single clock.
pub struct Scheduler<C: Component> {
    signals: SignalTable,
    dut: C,
    clock: Clock,
    clk: SignalId,
    time: SimTime,
    cycle: u64,
    tasks: Vec<TaskSlot>,
    finished: HashMap<TaskId, Vec<Bits>>,
    next_task: u32,
    monitors: Vec<ProtocolMonitor>,
    recorder: Option<Box<dyn WaveformRecorder>>,
    recorded: Vec<Option<Bits>>,
    cycle_limit: u64,
}

impl<C: Component> Scheduler<C> {
    /// Takes ownership of the signal table and component, adds the `clk`
    /// line and settles the component's initial outputs.
    ///
    /// Fails with [`SimError::MultipleDrivers`] if the component's outputs
    /// are already claimed.
    pub fn new(mut signals: SignalTable, mut dut: C, clock: Clock) -> Result<Self, SimError> {
        let clk = signals.alloc("clk", 1);
        signals.claim(clk, Owner::Harness)?;
        for id in dut.outputs() {
            signals.claim(id, Owner::Component)?;
        }
        dut.settle(&mut signals);
        Ok(Self {
            signals,
            dut,
            clock,
            clk,
            time: SimTime::zero(),
            cycle: 0,
            tasks: Vec::new(),
            finished: HashMap::new(),
            next_task: 0,
            monitors: Vec::new(),
            recorder: None,
            recorded: Vec::new(),
            cycle_limit: DEFAULT_CYCLE_LIMIT,
        })
    }

    /// Current signal values.
    pub fn signals(&self) -> &SignalTable {
        &self.signals
    }

    /// The component under test.
    pub fn dut(&self) -> &C {
        &self.dut
    }

    /// The clock line.
    pub fn clk(&self) -> SignalId {
        self.clk
    }

    /// Time of the last processed edge.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Number of rising edges processed so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Clock period in femtoseconds.
    pub fn period_fs(&self) -> u64 {
        self.clock.period_fs()
    }

    /// Sets how many cycles one `join` or `run_until` call may take.
    pub fn set_cycle_limit(&mut self, limit: u64) {
        self.cycle_limit = limit;
    }

    /// Registers a task, claims the signals it drives and runs its
    /// [`start`](Task::start) hook.
    ///
    /// The task's initial writes are committed and the component settled
    /// before this returns, so they are visible at the next rising edge.
    pub fn spawn(&mut self, mut task: impl Task + 'static) -> Result<TaskId, SimError> {
        let id = TaskId::from_raw(self.next_task);
        self.next_task += 1;

        let owner = Owner::Task(id);
        for signal in task.drives() {
            if let Err(e) = self.signals.claim(signal, owner) {
                self.signals.release(owner);
                return Err(e);
            }
        }

        let state = match task.start(&mut self.signals) {
            Ok(state) => state,
            Err(e) => {
                self.signals.release(owner);
                return Err(e);
            }
        };
        self.signals.commit();
        self.dut.settle(&mut self.signals);
        self.record()?;

        log::debug!("spawned task {} '{}'", id.as_raw(), task.name());
        match state {
            TaskState::Pending => self.tasks.push(TaskSlot {
                id,
                task: Box::new(task),
            }),
            TaskState::Done(samples) => {
                self.signals.release(owner);
                self.finished.insert(id, samples);
            }
        }
        Ok(id)
    }

    /// Writes a top-level input immediately and settles the component.
    ///
    /// The first write claims the signal for the harness. Signals driven by
    /// the component or by a task are refused.
    pub fn drive(&mut self, id: SignalId, value: Bits) -> Result<(), SimError> {
        match self.signals.owner(id) {
            None | Some(Owner::Harness) => {}
            Some(_) => {
                return Err(SimError::NotHarnessDriven {
                    signal: self.signals.name(id).to_string(),
                })
            }
        }
        self.signals.claim(id, Owner::Harness)?;
        self.signals.set(id, value);
        self.dut.settle(&mut self.signals);
        self.record()
    }

    /// Single-bit form of [`drive`](Self::drive).
    pub fn drive_bool(&mut self, id: SignalId, value: bool) -> Result<(), SimError> {
        self.drive(id, Bits::from_bool(value))
    }

    /// Attaches a protocol checker to `stream`. Edges where `reset` is high
    /// are exempt.
    pub fn monitor(&mut self, stream: &Stream, reset: Option<SignalId>) {
        self.monitors.push(ProtocolMonitor::new(stream, reset));
    }

    /// Attaches a waveform recorder, declares every signal under the
    /// component's scope and dumps the current values.
    pub fn set_recorder(&mut self, mut recorder: Box<dyn WaveformRecorder>) -> Result<(), SimError> {
        recorder.begin_scope(self.dut.name())?;
        for (id, state) in self.signals.iter() {
            recorder.register_signal(id, &state.name, state.width())?;
        }
        recorder.end_scope()?;
        self.recorder = Some(recorder);
        self.recorded = vec![None; self.signals.len()];
        self.record()
    }

    /// Flushes the waveform recorder, if any.
    pub fn finalize(&mut self) -> Result<(), SimError> {
        match self.recorder.as_mut() {
            Some(recorder) => recorder.finalize(),
            None => Ok(()),
        }
    }

    /// Advances one full clock period: a rising edge, then a falling edge.
    ///
    /// A protocol violation is returned only after the period completes, so
    /// the scheduler is left on a committed cycle boundary.
    pub fn step(&mut self) -> Result<(), SimError> {
        let edges: Vec<ClockEdge> = self.clock.by_ref().take(2).collect();
        let mut violation = None;
        for edge in edges {
            self.time = edge.time;
            match edge.kind {
                EdgeKind::Rising => violation = self.rising_edge()?,
                EdgeKind::Falling => {
                    self.signals.set_bool(self.clk, false);
                    self.record()?;
                }
            }
        }
        match violation {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Advances `cycles` clock periods.
    pub fn run_cycles(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Steps until `done` holds for the current signal values and returns
    /// the number of cycles taken. `done` is checked before each step.
    pub fn run_until<F>(&mut self, mut done: F) -> Result<u64, SimError>
    where
        F: FnMut(&SignalTable) -> bool,
    {
        let start = self.cycle;
        while !done(&self.signals) {
            if self.cycle - start >= self.cycle_limit {
                return Err(SimError::CycleLimitExceeded {
                    limit: self.cycle_limit,
                });
            }
            self.step()?;
        }
        Ok(self.cycle - start)
    }

    /// Steps until the task finishes and returns the values it collected.
    ///
    /// Each task's result can be taken once.
    pub fn join(&mut self, id: TaskId) -> Result<Vec<Bits>, SimError> {
        if id.as_raw() >= self.next_task {
            return Err(SimError::Configuration {
                reason: format!("task {} was never spawned", id.as_raw()),
            });
        }
        let start = self.cycle;
        loop {
            if let Some(samples) = self.finished.remove(&id) {
                return Ok(samples);
            }
            if !self.tasks.iter().any(|slot| slot.id == id) {
                return Err(SimError::Configuration {
                    reason: format!("task {} was already joined", id.as_raw()),
                });
            }
            if self.cycle - start >= self.cycle_limit {
                return Err(SimError::CycleLimitExceeded {
                    limit: self.cycle_limit,
                });
            }
            self.step()?;
        }
    }

    /// Returns true once the task has finished.
    pub fn is_done(&self, id: TaskId) -> bool {
        id.as_raw() < self.next_task && !self.tasks.iter().any(|slot| slot.id == id)
    }

    /// Runs one rising edge and returns the first monitor violation seen.
    fn rising_edge(&mut self) -> Result<Option<SimError>, SimError> {
        self.signals.set_bool(self.clk, true);
        let mut violation = None;
        for monitor in &mut self.monitors {
            if let Err(e) = monitor.check(&self.signals, self.time) {
                violation.get_or_insert(e);
            }
        }

        self.dut.clock_edge(&mut self.signals);

        let mut done = Vec::new();
        for slot in &mut self.tasks {
            if let TaskState::Done(samples) = slot.task.on_rising_edge(&mut self.signals)? {
                log::debug!(
                    "task {} '{}' finished at cycle {}",
                    slot.id.as_raw(),
                    slot.task.name(),
                    self.cycle
                );
                done.push((slot.id, samples));
            }
        }
        self.tasks
            .retain(|slot| !done.iter().any(|(id, _)| *id == slot.id));
        for (id, samples) in done {
            self.signals.release(Owner::Task(id));
            self.finished.insert(id, samples);
        }

        self.signals.commit();
        self.dut.settle(&mut self.signals);
        self.cycle += 1;
        log::trace!("cycle {} at {}", self.cycle, self.time);
        self.record()?;
        Ok(violation)
    }

    fn record(&mut self) -> Result<(), SimError> {
        let Some(recorder) = self.recorder.as_mut() else {
            return Ok(());
        };
        for (id, state) in self.signals.iter() {
            let last = &mut self.recorded[id.as_raw() as usize];
            if *last != Some(state.value) {
                recorder.record_change(self.time.fs, id, &state.value)?;
                *last = Some(state.value);
            }
        }
        Ok(())
    }
}
