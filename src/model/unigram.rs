//! Adaptive order-0 model over a cumulative frequency table.

use tracing::trace;

use super::{ArithCodeModel, Interval, Symbol, EOF_INDEX, NUM_BYTES};

/// Slot holding the grand total.
const TOTAL_INDEX: usize = EOF_INDEX + 1;

/// Grand total at which all counts are halved.
pub const MAX_COUNT: u32 = 64 * 1024;

/// Adaptive unigram model: byte frequencies with no context.
///
/// `cumulative[i]` is the low count of symbol `i` and the high count of
/// symbol `i - 1`; slot 256 is EOF and slot 257 the total. Every symbol
/// starts with count 1.
#[derive(Clone)]
pub struct AdaptiveUnigramModel {
    cumulative: [u32; TOTAL_INDEX + 1],
}

impl AdaptiveUnigramModel {
    /// Create a model with every count at 1.
    pub fn new() -> Self {
        let mut cumulative = [0u32; TOTAL_INDEX + 1];
        for (i, slot) in cumulative.iter_mut().enumerate() {
            *slot = i as u32;
        }
        Self { cumulative }
    }

    /// Current (non-cumulative) count of `symbol`.
    pub fn count(&self, symbol: Symbol) -> u32 {
        let i = symbol.order0_index();
        self.cumulative[i + 1] - self.cumulative[i]
    }

    fn increment_index(&mut self, index: usize) {
        for slot in &mut self.cumulative[index + 1..] {
            *slot += 1;
        }
        if self.cumulative[TOTAL_INDEX] >= MAX_COUNT {
            self.rescale();
        }
    }

    /// Halve every count, rounding up so none reaches zero.
    fn rescale(&mut self) {
        let before = self.cumulative[TOTAL_INDEX];
        let mut running = 0;
        let mut previous = 0;
        for slot in &mut self.cumulative[1..] {
            let count = *slot - previous;
            previous = *slot;
            running += count.div_ceil(2);
            *slot = running;
        }
        trace!(before, after = running, "unigram rescale");
    }
}

impl Default for AdaptiveUnigramModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ArithCodeModel for AdaptiveUnigramModel {
    fn total_count(&self) -> u32 {
        self.cumulative[TOTAL_INDEX]
    }

    fn point_to_symbol(&self, count: u32) -> Symbol {
        debug_assert!(count < self.total_count());
        let index = self.cumulative[1..].partition_point(|&high| high <= count);
        Symbol::from_order0_index(index)
    }

    fn interval(&mut self, symbol: Symbol) -> Interval {
        let i = symbol.order0_index();
        let interval = Interval::new(
            self.cumulative[i],
            self.cumulative[i + 1],
            self.cumulative[TOTAL_INDEX],
        );
        self.increment_index(i);
        interval
    }

    fn escaped(&self, _symbol: Symbol) -> bool {
        false
    }

    fn exclude(&mut self, _byte: u8) {}

    fn increment(&mut self, byte: u8) {
        self.increment_index(byte as usize);
    }
}

impl std::fmt::Debug for AdaptiveUnigramModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveUnigramModel")
            .field("total", &self.cumulative[TOTAL_INDEX])
            .field("symbols", &(NUM_BYTES + 1))
            .finish()
    }
}
