//! Arithmetic decoder.

use std::io::{self, Read};

use super::{BitInput, Bounds, Renorm, CODE_VALUE_BITS, FIRST_QUARTER, HALF, TOP_VALUE};
use crate::model::Interval;

/// Arithmetic decoder reading from a [`BitInput`].
///
/// Mirrors [`ArithEncoder`](super::ArithEncoder): the model maps
/// [`current_symbol_count`](Self::current_symbol_count) to a symbol, supplies
/// that symbol's interval, and [`remove_symbol_from_stream`](Self::remove_symbol_from_stream)
/// narrows exactly as the encoder did, reading a bit wherever the encoder
/// wrote one.
pub struct ArithDecoder<R: Read> {
    input: BitInput<R>,
    bounds: Bounds,
    /// Code bits currently buffered, always within the 27-bit code range
    value: u64,
    /// Virtual zero bits still available once the source is exhausted
    buffered_bits: u32,
    end_of_stream: bool,
}

impl<R: Read> ArithDecoder<R> {
    /// Create a decoder reading bits from `inner`.
    pub fn new(inner: R) -> io::Result<Self> {
        Self::with_bit_input(BitInput::new(inner)?)
    }

    /// Create a decoder over an existing bit reader, priming the value
    /// register with [`CODE_VALUE_BITS`] bits.
    pub fn with_bit_input(input: BitInput<R>) -> io::Result<Self> {
        let mut decoder = Self {
            input,
            bounds: Bounds::new(),
            value: 0,
            buffered_bits: 0,
            end_of_stream: false,
        };
        for _ in 0..CODE_VALUE_BITS {
            decoder.buffer_bit()?;
            decoder.buffered_bits += 1;
        }
        Ok(decoder)
    }

    /// True once the source and the virtual padding bits are exhausted.
    ///
    /// The driving loop must stop requesting symbols at this point.
    #[inline]
    pub fn end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Map the buffered code value to a count in `[0, total)`.
    ///
    /// The model resolves this count to the symbol whose interval contains it.
    #[inline]
    pub fn current_symbol_count(&self, total: u32) -> u32 {
        debug_assert!(total > 0);
        let total = u64::from(total);
        // Well-formed streams keep low <= value <= high; clamp so that
        // arbitrary input decodes to garbage rather than panicking.
        let offset = self.value.saturating_sub(self.bounds.low) + 1;
        let count = (offset * total - 1) / self.bounds.range();
        count.min(total - 1) as u32
    }

    /// Narrow to the decoded symbol's interval and pull in the bits it frees.
    pub fn remove_symbol_from_stream(&mut self, interval: Interval) -> io::Result<()> {
        self.bounds.narrow(interval);
        while let Some(case) = self.bounds.step() {
            match case {
                Renorm::Lower => {}
                Renorm::Upper => self.value = self.value.wrapping_sub(HALF) & TOP_VALUE,
                Renorm::Straddle => {
                    self.value = self.value.wrapping_sub(FIRST_QUARTER) & TOP_VALUE
                }
            }
            self.buffer_bit()?;
        }
        Ok(())
    }

    fn buffer_bit(&mut self) -> io::Result<()> {
        if self.input.end_of_stream() {
            if self.buffered_bits == 0 {
                self.end_of_stream = true;
                return Ok(());
            }
            self.value = (self.value << 1) & TOP_VALUE;
            self.buffered_bits -= 1;
        } else {
            let bit = self.input.read_bit()?;
            self.value = ((self.value << 1) | u64::from(bit)) & TOP_VALUE;
        }
        Ok(())
    }

    /// Consume the decoder, returning the bit reader.
    pub fn into_inner(self) -> BitInput<R> {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::super::ArithEncoder;
    use super::*;

    fn encode_all(intervals: &[Interval]) -> Vec<u8> {
        let mut encoder = ArithEncoder::new(Vec::new());
        for &iv in intervals {
            encoder.encode(iv).unwrap();
        }
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decodes_fixed_distribution() {
        // Three symbols with counts 5, 2, 1
        let table = [Interval::new(0, 5, 8), Interval::new(5, 7, 8), Interval::new(7, 8, 8)];
        let message = [0usize, 1, 0, 2, 2, 0, 0, 1, 0, 2, 1, 1, 0];
        let intervals: Vec<_> = message.iter().map(|&s| table[s]).collect();
        let bytes = encode_all(&intervals);

        let mut decoder = ArithDecoder::new(&bytes[..]).unwrap();
        for &expected in &message {
            let count = decoder.current_symbol_count(8);
            let symbol = table.iter().position(|iv| count < iv.high).unwrap();
            assert_eq!(symbol, expected);
            decoder.remove_symbol_from_stream(table[symbol]).unwrap();
        }
    }

    #[test]
    fn test_empty_input_is_end_of_stream() {
        let decoder = ArithDecoder::new(&[][..]).unwrap();
        assert!(decoder.end_of_stream());
    }

    #[test]
    fn test_garbage_count_stays_in_range() {
        let garbage = [0xFFu8; 64];
        let mut decoder = ArithDecoder::new(&garbage[..]).unwrap();
        for _ in 0..200 {
            let count = decoder.current_symbol_count(3);
            assert!(count < 3);
            decoder
                .remove_symbol_from_stream(Interval::new(count, count + 1, 3))
                .unwrap();
            if decoder.end_of_stream() {
                break;
            }
        }
    }
}
