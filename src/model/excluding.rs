//! Order-0 backoff model supporting exclusions.

use tracing::trace;

use super::{ByteSet, Interval, Symbol, EOF_INDEX, NUM_BYTES};

/// Individual count above which all counts are halved.
pub const MAX_INDIVIDUAL_COUNT: u32 = 8 * 1024;

/// Adaptive unigram model whose outcomes can be restricted by a [`ByteSet`]
/// of excluded bytes. EOF is never excluded.
///
/// Counts are kept non-cumulative so exclusions can be skipped with a
/// linear scan; this is the bottom layer of [`PpmModel`](super::PpmModel).
#[derive(Debug, Clone)]
pub struct ExcludingAdaptiveUnigramModel {
    counts: [u32; NUM_BYTES + 1],
}

impl ExcludingAdaptiveUnigramModel {
    /// Create a model with every count at 1.
    pub fn new() -> Self {
        Self {
            counts: [1; NUM_BYTES + 1],
        }
    }

    #[inline]
    fn is_live(index: usize, exclusions: &ByteSet) -> bool {
        index == EOF_INDEX || !exclusions.contains(index as u8)
    }

    /// Interval of `symbol` among the non-excluded outcomes, then count it.
    pub fn interval(&mut self, symbol: Symbol, exclusions: &ByteSet) -> Interval {
        let index = symbol.order0_index();
        let low: u32 = (0..index)
            .filter(|&i| Self::is_live(i, exclusions))
            .map(|i| self.counts[i])
            .sum();
        let high = low + self.counts[index];
        let above: u32 = (index + 1..=EOF_INDEX)
            .filter(|&i| Self::is_live(i, exclusions))
            .map(|i| self.counts[i])
            .sum();
        self.increment(index);
        Interval::new(low, high, high + above)
    }

    /// Symbol whose interval among the non-excluded outcomes contains `count`.
    pub fn point_to_symbol(&self, count: u32, exclusions: &ByteSet) -> Symbol {
        let mut high = 0;
        for i in 0..EOF_INDEX {
            if exclusions.contains(i as u8) {
                continue;
            }
            high += self.counts[i];
            if high > count {
                return Symbol::Byte(i as u8);
            }
        }
        Symbol::Eof
    }

    /// Total count of the non-excluded outcomes.
    pub fn total_count(&self, exclusions: &ByteSet) -> u32 {
        (0..=EOF_INDEX)
            .filter(|&i| Self::is_live(i, exclusions))
            .map(|i| self.counts[i])
            .sum()
    }

    /// Count one more occurrence of the outcome at `index` (256 is EOF).
    pub fn increment(&mut self, index: usize) {
        self.counts[index] += 1;
        if self.counts[index] > MAX_INDIVIDUAL_COUNT {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        for count in &mut self.counts {
            *count = count.div_ceil(2);
        }
        trace!("backoff unigram rescale");
    }
}

impl Default for ExcludingAdaptiveUnigramModel {
    fn default() -> Self {
        Self::new()
    }
}
