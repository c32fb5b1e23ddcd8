//! Shared foundational types used across the relay workspace.
//!
//! This crate provides [`Bits`], the fixed-width two-state value carried by
//! every simulated signal and bus, along with its two's-complement helpers.

#![warn(missing_docs)]

pub mod bits;

pub use bits::{signed_range, Bits, MAX_WIDTH};
