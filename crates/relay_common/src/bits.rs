//! Fixed-width two-state bit vectors for signal and bus values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The widest vector a [`Bits`] value can hold.
pub const MAX_WIDTH: u32 = 128;

/// A fixed-width vector of two-state bits.
///
/// The value is stored right-aligned in a `u128` and is always masked to
/// `width` bits, so two vectors compare equal exactly when their widths and
/// their bit patterns match. Whether the pattern is read as unsigned or as
/// two's complement is up to the caller ([`to_u128`](Bits::to_u128) vs
/// [`to_i128`](Bits::to_i128)).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBits")]
pub struct Bits {
    width: u32,
    value: u128,
}

impl Bits {
    /// Creates an all-zero vector of the given width.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or greater than [`MAX_WIDTH`].
    pub fn zero(width: u32) -> Self {
        assert!(
            (1..=MAX_WIDTH).contains(&width),
            "bit width {width} out of range 1..={MAX_WIDTH}"
        );
        Self { width, value: 0 }
    }

    /// Creates a vector from an unsigned value, discarding bits above `width`.
    pub fn from_u128(value: u128, width: u32) -> Self {
        let mut bits = Self::zero(width);
        bits.value = value & mask(width);
        bits
    }

    /// Creates a vector holding the two's-complement encoding of `value`,
    /// wrapped to `width` bits.
    pub fn from_i128(value: i128, width: u32) -> Self {
        Self::from_u128(value as u128, width)
    }

    /// Like [`from_i128`](Bits::from_i128), but returns `None` when `value`
    /// is not representable as a `width`-bit signed integer.
    pub fn checked_from_i128(value: i128, width: u32) -> Option<Self> {
        let bits = Self::from_i128(value, width);
        (bits.to_i128() == value).then_some(bits)
    }

    /// Creates a single-bit vector from a boolean.
    pub fn from_bool(value: bool) -> Self {
        Self::from_u128(u128::from(value), 1)
    }

    /// Returns the number of bits in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bit pattern as an unsigned integer.
    pub fn to_u128(&self) -> u128 {
        self.value
    }

    /// Returns the bit pattern read as a two's-complement signed integer.
    pub fn to_i128(&self) -> i128 {
        let shift = MAX_WIDTH - self.width;
        ((self.value << shift) as i128) >> shift
    }

    /// Returns true if bit 0 is set. Intended for 1-bit control lines.
    pub fn to_bool(&self) -> bool {
        self.value & 1 != 0
    }

    /// Returns the bit at `index` (0 is the least significant bit).
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn bit(&self, index: u32) -> bool {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        (self.value >> index) & 1 != 0
    }

    /// Widens (or truncates) to `width` bits, replicating the sign bit.
    pub fn sign_extend(&self, width: u32) -> Self {
        Self::from_i128(self.to_i128(), width)
    }

    /// Adds two vectors of equal width, discarding the carry out.
    ///
    /// # Panics
    ///
    /// Panics if the widths differ.
    pub fn wrapping_add(&self, rhs: &Self) -> Self {
        assert_eq!(self.width, rhs.width, "Bits width mismatch in add");
        Self::from_u128(self.value.wrapping_add(rhs.value), self.width)
    }
}

/// Returns the inclusive `(min, max)` range of a `width`-bit signed integer.
///
/// # Panics
///
/// Panics if `width` is zero or greater than [`MAX_WIDTH`].
pub fn signed_range(width: u32) -> (i128, i128) {
    let min = Bits::from_u128(1 << (width - 1), width).to_i128();
    let max = Bits::from_u128(mask(width) >> 1, width).to_i128();
    (min, max)
}

/// Unchecked wire form of [`Bits`]; deserialization goes through it so
/// decoded vectors keep the width range and masking guarantees.
#[derive(Deserialize)]
struct RawBits {
    width: u32,
    value: u128,
}

impl TryFrom<RawBits> for Bits {
    type Error = String;

    fn try_from(raw: RawBits) -> Result<Self, String> {
        if !(1..=MAX_WIDTH).contains(&raw.width) {
            return Err(format!(
                "bit width {} out of range 1..={MAX_WIDTH}",
                raw.width
            ));
        }
        if raw.value & !mask(raw.width) != 0 {
            return Err(format!(
                "value {:#x} does not fit in {} bits",
                raw.value, raw.width
            ));
        }
        Ok(Self {
            width: raw.width,
            value: raw.value,
        })
    }
}

fn mask(width: u32) -> u128 {
    if width >= MAX_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", u8::from(self.bit(i)))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bits({self})")
    }
}
