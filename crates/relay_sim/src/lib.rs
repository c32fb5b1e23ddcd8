//! Cycle-level simulation of ready/valid handshake streams.
//!
//! This crate models a single-clock synchronous system with a zero-delay
//! evaluation model: combinational logic settles instantly, and every
//! edge-triggered write is deferred until all participants have sampled the
//! edge. On top of that it provides handshake streams, the driver tasks that
//! produce and consume them, and a two's-complement adder that speaks the
//! protocol on all of its ports.
//!
//! # Usage
//!
//! ```
//! use relay_sim::AdderBench;
//!
//! let mut bench = AdderBench::new(4)?;
//! bench.reset(2)?;
//! let sums = bench.transfer(&[3, -2], &[2, 3])?;
//! assert_eq!(sums, vec![5, 1]);
//! # Ok::<(), relay_sim::SimError>(())
//! ```
//!
//! # Modules
//!
//! - `signal`: Signal storage, single-writer ownership, deferred updates
//! - `time` / `clock`: Femtosecond time base and edge sequence
//! - `stream`: Ready/valid port handles
//! - `task` / `driver`: Cooperative sender and receiver routines
//! - `component` / `adder`: The component seam and the adder itself
//! - `monitor`: Handshake rule checking
//! - `scheduler`: Edge-by-edge execution
//! - `waveform`: VCD trace output
//! - `bench`: Reset, transfer and scenario checking for the adder

#![warn(missing_docs)]

pub mod adder;
pub mod bench;
pub mod clock;
pub mod component;
pub mod driver;
pub mod error;
pub mod monitor;
pub mod scheduler;
pub mod signal;
pub mod stream;
pub mod task;
pub mod time;
pub mod waveform;

pub use adder::{Adder, AdderState};
pub use bench::{run_scenario, AdderBench, BenchOptions, Scenario, ScenarioReport};
pub use clock::Clock;
pub use component::Component;
pub use driver::{Receiver, Sender};
pub use error::SimError;
pub use monitor::ProtocolMonitor;
pub use scheduler::Scheduler;
pub use signal::{Owner, SignalId, SignalTable};
pub use stream::Stream;
pub use task::{Task, TaskId, TaskState};
pub use time::{parse_duration, SimTime};
pub use waveform::{VcdRecorder, WaveformRecorder};
