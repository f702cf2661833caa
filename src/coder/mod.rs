//! Binary arithmetic coder.
//!
//! Converts cumulative-frequency intervals to and from a bit stream using
//! the carry-counting renormalization of Witten, Neal and Cleary (1987).
//! The working interval `[low, high]` lives in a 27-bit code space; bits
//! whose value is not yet determined are deferred as "bits to follow"
//! instead of propagating carries.
//!
//! ## Pipeline
//!
//! ```text
//!  model interval ──→ ArithEncoder ──→ BitOutput ──→ bytes
//!  bytes ──→ BitInput ──→ ArithDecoder ──→ count ──→ model symbol
//! ```
//!
//! Both halves share `Bounds`: the same narrowing arithmetic and the same
//! renormalization decisions, so an encoder and decoder fed the same
//! intervals walk through identical states.

mod bit_io;
mod decoder;
mod encoder;

pub use bit_io::{BitInput, BitOutput};
pub use decoder::ArithDecoder;
pub use encoder::ArithEncoder;

use crate::model::Interval;

/// Precision of the code registers in bits.
pub const CODE_VALUE_BITS: u32 = 27;

/// Largest representable code value, `2^27 - 1`.
pub const TOP_VALUE: u64 = (1 << CODE_VALUE_BITS) - 1;

/// Start of the second quarter of the code range.
pub const FIRST_QUARTER: u64 = TOP_VALUE / 4 + 1;

/// Midpoint of the code range.
pub const HALF: u64 = 2 * FIRST_QUARTER;

/// Start of the fourth quarter of the code range.
pub const THIRD_QUARTER: u64 = 3 * FIRST_QUARTER;

/// Outcome of one renormalization step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Renorm {
    /// Interval is in the lower half: the next bit is 0.
    Lower,
    /// Interval is in the upper half: the next bit is 1.
    Upper,
    /// Interval straddles the midpoint inside the middle half: the
    /// next bit is unknown and its complement follows it.
    Straddle,
}

/// Shared `[low, high]` interval bounds, `low <= high <= TOP_VALUE`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    pub(crate) low: u64,
    pub(crate) high: u64,
}

impl Bounds {
    pub(crate) const fn new() -> Self {
        Self {
            low: 0,
            high: TOP_VALUE,
        }
    }

    /// Width of the current interval.
    #[inline]
    pub(crate) fn range(&self) -> u64 {
        self.high - self.low + 1
    }

    /// Narrow to the sub-interval `[low/total, high/total)` of the current one.
    #[inline]
    pub(crate) fn narrow(&mut self, interval: Interval) {
        debug_assert!(
            interval.is_valid(),
            "model produced invalid interval {:?}",
            interval
        );
        let range = self.range();
        let total = u64::from(interval.total);
        self.high = self.low + range * u64::from(interval.high) / total - 1;
        self.low += range * u64::from(interval.low) / total;
    }

    /// Perform one renormalization step if the interval allows it.
    ///
    /// Applies the quarter shift and the doubling, and reports which case
    /// matched so the caller can emit (or consume) the matching bit.
    #[inline]
    pub(crate) fn step(&mut self) -> Option<Renorm> {
        let case = if self.high < HALF {
            Renorm::Lower
        } else if self.low >= HALF {
            self.low -= HALF;
            self.high -= HALF;
            Renorm::Upper
        } else if self.low >= FIRST_QUARTER && self.high < THIRD_QUARTER {
            self.low -= FIRST_QUARTER;
            self.high -= FIRST_QUARTER;
            Renorm::Straddle
        } else {
            return None;
        };
        self.low <<= 1;
        self.high = (self.high << 1) | 1;
        Some(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_constants() {
        assert_eq!(TOP_VALUE, 134_217_727);
        assert_eq!(FIRST_QUARTER, 1 << 25);
        assert_eq!(HALF, 1 << 26);
        assert_eq!(THIRD_QUARTER, 3 << 25);
    }

    #[test]
    fn test_narrow_full_interval_is_identity() {
        let mut bounds = Bounds::new();
        bounds.narrow(Interval::new(0, 7, 7));
        assert_eq!(bounds.low, 0);
        assert_eq!(bounds.high, TOP_VALUE);
        assert_eq!(bounds.step(), None);
    }

    #[test]
    fn test_lower_half_step() {
        let mut bounds = Bounds::new();
        bounds.narrow(Interval::new(0, 1, 2));
        assert_eq!(bounds.high, HALF - 1);
        assert_eq!(bounds.step(), Some(Renorm::Lower));
        assert_eq!((bounds.low, bounds.high), (0, TOP_VALUE));
    }

    #[test]
    fn test_upper_half_step() {
        let mut bounds = Bounds::new();
        bounds.narrow(Interval::new(1, 2, 2));
        assert_eq!(bounds.low, HALF);
        assert_eq!(bounds.step(), Some(Renorm::Upper));
        assert_eq!((bounds.low, bounds.high), (0, TOP_VALUE));
    }

    #[test]
    fn test_straddle_step() {
        let mut bounds = Bounds::new();
        bounds.narrow(Interval::new(1, 3, 4));
        assert_eq!(bounds.step(), Some(Renorm::Straddle));
        assert_eq!((bounds.low, bounds.high), (0, TOP_VALUE));
    }
}
