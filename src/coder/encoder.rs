//! Arithmetic encoder.

use std::io::{self, Write};

use super::{BitOutput, Bounds, Renorm, FIRST_QUARTER};
use crate::model::Interval;

/// Arithmetic encoder writing to a [`BitOutput`].
pub struct ArithEncoder<W: Write> {
    out: BitOutput<W>,
    bounds: Bounds,
    /// Opposite bits owed after the next determined bit
    bits_to_follow: u64,
}

impl<W: Write> ArithEncoder<W> {
    /// Create an encoder writing bits to `inner`.
    pub fn new(inner: W) -> Self {
        Self::with_bit_output(BitOutput::new(inner))
    }

    /// Create an encoder over an existing bit writer.
    pub fn with_bit_output(out: BitOutput<W>) -> Self {
        Self {
            out,
            bounds: Bounds::new(),
            bits_to_follow: 0,
        }
    }

    /// Code one interval, emitting every bit it determines.
    pub fn encode(&mut self, interval: Interval) -> io::Result<()> {
        self.bounds.narrow(interval);
        while let Some(case) = self.bounds.step() {
            match case {
                Renorm::Lower => self.bit_plus_follow(false)?,
                Renorm::Upper => self.bit_plus_follow(true)?,
                Renorm::Straddle => self.bits_to_follow += 1,
            }
        }
        Ok(())
    }

    #[inline]
    fn bit_plus_follow(&mut self, bit: bool) -> io::Result<()> {
        self.out.write_bit(bit)?;
        while self.bits_to_follow > 0 {
            self.out.write_bit(!bit)?;
            self.bits_to_follow -= 1;
        }
        Ok(())
    }

    /// Bits emitted so far (padding excluded).
    pub fn bits_written(&self) -> u64 {
        self.out.bits_written()
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Emit the disambiguating final bits and return the underlying writer.
    ///
    /// One more bit (plus pending follow bits) selects the quarter that lies
    /// entirely inside `[low, high]`; the decoder fills the rest with zeros.
    pub fn finish(mut self) -> io::Result<W> {
        self.bits_to_follow += 1;
        let bit = self.bounds.low >= FIRST_QUARTER;
        self.bit_plus_follow(bit)?;
        self.out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stream_emits_final_bits() {
        let encoder = ArithEncoder::new(Vec::new());
        // low = 0 < FIRST_QUARTER: bit 0 then one follow bit 1
        assert_eq!(encoder.finish().unwrap(), vec![0b0100_0000]);
    }

    #[test]
    fn test_even_split_emits_one_bit_per_symbol() {
        let mut encoder = ArithEncoder::new(Vec::new());
        for _ in 0..8 {
            encoder.encode(Interval::new(1, 2, 2)).unwrap();
        }
        assert_eq!(encoder.bits_written(), 8);
        let bytes = encoder.finish().unwrap();
        assert_eq!(bytes[0], 0xFF);
    }

    #[test]
    fn test_straddle_bits_are_deferred() {
        let mut encoder = ArithEncoder::new(Vec::new());
        encoder.encode(Interval::new(1, 3, 4)).unwrap();
        assert_eq!(encoder.bits_written(), 0);
        encoder.encode(Interval::new(0, 1, 2)).unwrap();
        // lower half resolves the pending bit: 0 followed by 1
        assert_eq!(encoder.bits_written(), 2);
    }
}
