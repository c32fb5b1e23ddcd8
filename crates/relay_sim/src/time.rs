//! Simulation time with femtosecond precision.
//!
//! [`SimTime`] is the timestamp attached to every clock edge and every
//! recorded waveform change. There are no delta cycles: the simulator uses a
//! zero-delay synchronous model in which combinational logic settles
//! instantly between edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SimError;

/// Femtoseconds per picosecond.
pub const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;
/// Femtoseconds per millisecond.
pub const FS_PER_MS: u64 = 1_000_000_000_000;
/// Femtoseconds per second.
pub const FS_PER_S: u64 = 1_000_000_000_000_000;

/// A simulation time point with femtosecond resolution.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime {
    /// Simulation time in femtoseconds.
    pub fs: u64,
}

impl SimTime {
    /// Time zero.
    pub fn zero() -> Self {
        Self { fs: 0 }
    }

    /// Creates a time from a nanosecond value.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Creates a time from a femtosecond value.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Returns this time advanced by `fs` femtoseconds.
    pub fn after(&self, fs: u64) -> Self {
        Self { fs: self.fs + fs }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")
        } else if fs >= FS_PER_MS && fs % FS_PER_MS == 0 {
            write!(f, "{} ms", fs / FS_PER_MS)
        } else if fs >= FS_PER_US && fs % FS_PER_US == 0 {
            write!(f, "{} us", fs / FS_PER_US)
        } else if fs >= FS_PER_NS && fs % FS_PER_NS == 0 {
            write!(f, "{} ns", fs / FS_PER_NS)
        } else if fs >= FS_PER_PS && fs % FS_PER_PS == 0 {
            write!(f, "{} ps", fs / FS_PER_PS)
        } else {
            write!(f, "{fs} fs")
        }
    }
}

/// Parses a duration string such as `"10ns"` or `"250 ps"` into femtoseconds.
///
/// Accepted units are `fs`, `ps`, `ns`, `us`, `ms` and `s`. The unit is
/// mandatory.
pub fn parse_duration(s: &str) -> Result<u64, SimError> {
    let s = s.trim();
    let err = |reason: &str| SimError::InvalidDuration {
        input: s.to_string(),
        reason: reason.to_string(),
    };
    if s.is_empty() {
        return Err(err("empty duration string"));
    }

    let digit_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if digit_end == 0 {
        return Err(err("no numeric value"));
    }

    let number: u64 = s[..digit_end]
        .parse()
        .map_err(|_| err("number out of range"))?;

    let multiplier = match s[digit_end..].trim() {
        "fs" => 1,
        "ps" => FS_PER_PS,
        "ns" => FS_PER_NS,
        "us" => FS_PER_US,
        "ms" => FS_PER_MS,
        "s" => FS_PER_S,
        "" => return Err(err("missing unit (use fs, ps, ns, us, ms, or s)")),
        _ => return Err(err("unknown unit (use fs, ps, ns, us, ms, or s)")),
    };

    number
        .checked_mul(multiplier)
        .ok_or_else(|| err("number out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ns() {
        assert_eq!(SimTime::from_ns(10).fs, 10_000_000);
    }

    #[test]
    fn after_adds() {
        let t = SimTime::from_ns(5).after(FS_PER_NS);
        assert_eq!(t, SimTime::from_ns(6));
    }

    #[test]
    fn ordering() {
        assert!(SimTime::from_ns(1) < SimTime::from_ns(2));
    }

    #[test]
    fn display_units() {
        assert_eq!(SimTime::zero().to_string(), "0 fs");
        assert_eq!(SimTime::from_ns(10).to_string(), "10 ns");
        assert_eq!(SimTime::from_fs(500 * FS_PER_PS).to_string(), "500 ps");
        assert_eq!(SimTime::from_fs(5 * FS_PER_US).to_string(), "5 us");
        assert_eq!(SimTime::from_fs(2 * FS_PER_MS).to_string(), "2 ms");
        assert_eq!(SimTime::from_fs(1500).to_string(), "1500 fs");
    }

    #[test]
    fn parse_duration_units() {
        assert_eq!(parse_duration("10ns").unwrap(), 10 * FS_PER_NS);
        assert_eq!(parse_duration("250ps").unwrap(), 250 * FS_PER_PS);
        assert_eq!(parse_duration("5us").unwrap(), 5 * FS_PER_US);
        assert_eq!(parse_duration("42fs").unwrap(), 42);
        assert_eq!(parse_duration("1s").unwrap(), FS_PER_S);
    }

    #[test]
    fn parse_duration_with_whitespace() {
        assert_eq!(parse_duration("  50 ns ").unwrap(), 50 * FS_PER_NS);
    }

    #[test]
    fn parse_duration_errors() {
        let e = parse_duration("").unwrap_err();
        assert!(e.to_string().contains("empty"));
        let e = parse_duration("ns").unwrap_err();
        assert!(e.to_string().contains("no numeric value"));
        let e = parse_duration("100").unwrap_err();
        assert!(e.to_string().contains("missing unit"));
        let e = parse_duration("100xyz").unwrap_err();
        assert!(e.to_string().contains("unknown unit"));
    }

    #[test]
    fn parse_duration_overflow() {
        assert!(parse_duration("99999999s").is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let t = SimTime::from_fs(12345);
        let json = serde_json::to_string(&t).unwrap();
        let back: SimTime = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
