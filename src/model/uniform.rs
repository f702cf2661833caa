//! Uniform distribution over bytes and EOF.

use super::{ArithCodeModel, Interval, Symbol, NUM_BYTES};

/// Number of outcomes: every byte plus EOF.
const NUM_OUTCOMES: u32 = NUM_BYTES as u32 + 1;

/// Stateless model assigning every byte and EOF the interval width 1/257.
///
/// Costs `log2(257)` ≈ 8.006 bits per symbol regardless of input, which makes
/// it the baseline adaptive models are measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformModel;

impl UniformModel {
    /// The model. It has no state, so any instance is interchangeable.
    pub const MODEL: UniformModel = UniformModel;
}

impl ArithCodeModel for UniformModel {
    fn total_count(&self) -> u32 {
        NUM_OUTCOMES
    }

    fn point_to_symbol(&self, count: u32) -> Symbol {
        Symbol::from_order0_index(count as usize)
    }

    fn interval(&mut self, symbol: Symbol) -> Interval {
        let low = symbol.order0_index() as u32;
        Interval::new(low, low + 1, NUM_OUTCOMES)
    }

    fn escaped(&self, _symbol: Symbol) -> bool {
        false
    }

    fn exclude(&mut self, _byte: u8) {}

    fn increment(&mut self, _byte: u8) {}
}
