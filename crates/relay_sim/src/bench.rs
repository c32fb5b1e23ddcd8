//! Test orchestration for the adder.
//!
//! [`AdderBench`] wires an [`Adder`] into a [`Scheduler`] with protocol
//! monitors on all three streams, and offers the two moves every adder test
//! is made of: [`reset`](AdderBench::reset) and
//! [`transfer`](AdderBench::transfer). [`run_scenario`] strings them together
//! and compares the results against a [`Scenario`]'s expected sums.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use relay_common::signed_range;

use crate::adder::{Adder, MAX_OPERAND_WIDTH};
use crate::clock::{Clock, DEFAULT_PERIOD_FS};
use crate::driver::{to_signed, Receiver, Sender};
use crate::error::SimError;
use crate::scheduler::Scheduler;
use crate::signal::SignalTable;
use crate::time::SimTime;
use crate::waveform::VcdRecorder;

/// Settings shared by every scenario of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BenchOptions {
    /// Clock period in femtoseconds.
    pub period_fs: u64,
    /// Rising edges to hold reset before the transfer.
    pub reset_cycles: u64,
    /// Where to write a VCD trace, if anywhere.
    pub waveform: Option<PathBuf>,
}

impl Default for BenchOptions {
    fn default() -> Self {
        Self {
            period_fs: DEFAULT_PERIOD_FS,
            reset_cycles: 2,
            waveform: None,
        }
    }
}

/// An adder in a monitored simulation.
pub struct AdderBench {
    sched: Scheduler<Adder>,
}

impl AdderBench {
    /// Builds a bench for a `width`-bit adder with the default 10 ns clock.
    pub fn new(width: u32) -> Result<Self, SimError> {
        Self::with_period(width, DEFAULT_PERIOD_FS)
    }

    /// Builds a bench with an explicit clock period in femtoseconds.
    pub fn with_period(width: u32, period_fs: u64) -> Result<Self, SimError> {
        let mut signals = SignalTable::new();
        let adder = Adder::new(&mut signals, width)?;
        let clock = Clock::new(period_fs)?;
        let (a, b, r, rst) = (
            adder.a().clone(),
            adder.b().clone(),
            adder.r().clone(),
            adder.rst(),
        );
        let mut sched = Scheduler::new(signals, adder, clock)?;
        sched.monitor(&a, Some(rst));
        sched.monitor(&b, Some(rst));
        sched.monitor(&r, Some(rst));
        Ok(Self { sched })
    }

    /// The adder under test.
    pub fn adder(&self) -> &Adder {
        self.sched.dut()
    }

    /// The underlying scheduler.
    pub fn scheduler(&self) -> &Scheduler<Adder> {
        &self.sched
    }

    /// Mutable access for tests that drive the streams by hand.
    pub fn scheduler_mut(&mut self) -> &mut Scheduler<Adder> {
        &mut self.sched
    }

    /// Starts writing a VCD trace to `path`.
    pub fn record_vcd(&mut self, path: &Path) -> Result<(), SimError> {
        let writer = BufWriter::new(File::create(path)?);
        self.sched.set_recorder(Box::new(VcdRecorder::new(writer)))
    }

    /// Holds `rst` high for `cycles` rising edges, then releases it.
    pub fn reset(&mut self, cycles: u64) -> Result<(), SimError> {
        let rst = self.sched.dut().rst();
        self.sched.drive_bool(rst, true)?;
        self.sched.run_cycles(cycles)?;
        self.sched.drive_bool(rst, false)
    }

    /// Sends `a` and `b` pairwise and collects one result per pair.
    pub fn transfer(&mut self, a: &[i128], b: &[i128]) -> Result<Vec<i128>, SimError> {
        if a.len() != b.len() {
            return Err(SimError::UnequalOperands {
                a: a.len(),
                b: b.len(),
            });
        }
        let adder = self.sched.dut();
        let tx_a = Sender::signed(adder.a(), a)?;
        let tx_b = Sender::signed(adder.b(), b)?;
        let rx = Receiver::new(adder.r(), a.len());

        self.sched.spawn(tx_a)?;
        self.sched.spawn(tx_b)?;
        let rx = self.sched.spawn(rx)?;
        let samples = self.sched.join(rx)?;
        Ok(to_signed(&samples))
    }

    /// Flushes the trace, if one is being recorded.
    pub fn finish(mut self) -> Result<(), SimError> {
        self.sched.finalize()
    }
}

/// A named set of operand pairs with the sums they should produce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scenario {
    /// Label used in reports and trace file names.
    pub name: String,
    /// Operand width.
    pub width: u32,
    /// Values for stream `a`.
    pub a: Vec<i128>,
    /// Values for stream `b`.
    pub b: Vec<i128>,
    /// Results expected on stream `r`, in order.
    pub expected: Vec<i128>,
}

impl Scenario {
    /// Creates a scenario expecting the element-wise sums of `a` and `b`.
    pub fn new(name: impl Into<String>, width: u32, a: Vec<i128>, b: Vec<i128>) -> Self {
        let expected = a.iter().zip(&b).map(|(x, y)| x + y).collect();
        Self {
            name: name.into(),
            width,
            a,
            b,
            expected,
        }
    }

    /// Replaces the expected results.
    pub fn with_expected(mut self, expected: Vec<i128>) -> Self {
        self.expected = expected;
        self
    }

    /// Creates `count` operand pairs drawn uniformly from the signed
    /// `width`-bit range. The same seed always yields the same scenario.
    pub fn random(
        name: impl Into<String>,
        width: u32,
        count: usize,
        seed: u64,
    ) -> Result<Self, SimError> {
        if !(1..=MAX_OPERAND_WIDTH).contains(&width) {
            return Err(SimError::Configuration {
                reason: format!(
                    "adder width must be between 1 and {MAX_OPERAND_WIDTH}, got {width}"
                ),
            });
        }
        let (lo, hi) = signed_range(width);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut draw = || -> Vec<i128> { (0..count).map(|_| rng.gen_range(lo..=hi)).collect() };
        let a = draw();
        let b = draw();
        Ok(Self::new(name, width, a, b))
    }
}

/// Outcome of a passing scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Results observed on `r`.
    pub results: Vec<i128>,
    /// Rising edges simulated, including reset.
    pub cycles: u64,
    /// Simulation time at the end of the run.
    pub end_time: SimTime,
}

/// Resets a fresh bench, runs the scenario's transfer and checks every
/// result.
pub fn run_scenario(scenario: &Scenario, options: &BenchOptions) -> Result<ScenarioReport, SimError> {
    log::info!(
        "scenario '{}': {} pairs at width {}",
        scenario.name,
        scenario.a.len(),
        scenario.width
    );
    let mut bench = AdderBench::with_period(scenario.width, options.period_fs)?;
    if let Some(path) = &options.waveform {
        bench.record_vcd(path)?;
    }
    bench.reset(options.reset_cycles)?;
    let outcome = bench.transfer(&scenario.a, &scenario.b);
    let cycles = bench.scheduler().cycle();
    let end_time = bench.scheduler().time();
    // Keep the trace even when the transfer failed.
    bench.finish()?;
    let results = outcome?;

    if let Some((index, (&expected, &actual))) = scenario
        .expected
        .iter()
        .zip(&results)
        .enumerate()
        .find(|(_, (e, a))| e != a)
    {
        return Err(SimError::Mismatch {
            index,
            expected,
            actual,
        });
    }
    if results.len() != scenario.expected.len() {
        return Err(SimError::LengthMismatch {
            expected: scenario.expected.len(),
            actual: results.len(),
        });
    }

    log::info!(
        "scenario '{}' passed after {} cycles ({})",
        scenario.name,
        cycles,
        end_time
    );
    Ok(ScenarioReport {
        name: scenario.name.clone(),
        results,
        cycles,
        end_time,
    })
}
