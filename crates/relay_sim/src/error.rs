//! Simulation error types for the handshake simulator.
//!
//! All errors that can occur while building a bench or running a scenario
//! are represented as variants of [`SimError`]. Every error is local to the
//! scenario that raised it; nothing is retried.

use std::io;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A component was constructed with an invalid parameter.
    #[error("configuration error: {reason}")]
    Configuration {
        /// Description of the rejected parameter.
        reason: String,
    },

    /// A stimulus value does not fit the signed width of the bus it targets.
    #[error("value {value} does not fit in {width}-bit stream '{stream}'")]
    ValueOutOfRange {
        /// The rejected value.
        value: i128,
        /// The data width of the stream.
        width: u32,
        /// The stream the value was destined for.
        stream: String,
    },

    /// Two writers tried to claim the same signal.
    #[error("signal '{signal}' is already driven by {owner}")]
    MultipleDrivers {
        /// Name of the contested signal.
        signal: String,
        /// Description of the current owner.
        owner: String,
    },

    /// The harness tried to write a signal it does not own.
    #[error("signal '{signal}' is not a harness-driven input")]
    NotHarnessDriven {
        /// Name of the signal.
        signal: String,
    },

    /// A producer broke the ready/valid handshake contract.
    #[error("protocol violation on '{stream}' at {time_fs} fs: {reason}")]
    ProtocolViolation {
        /// Simulation time of the offending edge in femtoseconds.
        time_fs: u64,
        /// Name of the stream.
        stream: String,
        /// What the producer did wrong.
        reason: String,
    },

    /// An observed result differs from the expected one.
    #[error("mismatch at result {index}: expected {expected}, got {actual}")]
    Mismatch {
        /// Position of the first differing result.
        index: usize,
        /// The expected value.
        expected: i128,
        /// The observed value.
        actual: i128,
    },

    /// The number of observed results differs from the expected count.
    #[error("expected {expected} results, got {actual}")]
    LengthMismatch {
        /// Expected number of results.
        expected: usize,
        /// Observed number of results.
        actual: usize,
    },

    /// The two operand sequences of a transfer have different lengths.
    #[error("operand sequences differ in length: a has {a}, b has {b}")]
    UnequalOperands {
        /// Length of the `a` sequence.
        a: usize,
        /// Length of the `b` sequence.
        b: usize,
    },

    /// A run did not reach its goal within the allowed number of cycles.
    #[error("cycle limit exceeded: {limit} cycles")]
    CycleLimitExceeded {
        /// The cycle limit that was hit.
        limit: u64,
    },

    /// A duration string could not be parsed.
    #[error("invalid duration '{input}': {reason}")]
    InvalidDuration {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An I/O error occurred while writing waveform data.
    #[error("waveform I/O error: {0}")]
    WaveformIo(#[from] io::Error),
}
