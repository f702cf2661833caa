//! Bit-level stream primitives.
//!
//! Bits are packed most-significant-bit first within each byte. The final
//! partial byte of an output stream is padded with zero bits.

use std::io::{self, Bytes, Read, Write};

/// Writes individual bits to an underlying byte sink.
pub struct BitOutput<W: Write> {
    inner: W,
    /// Bits accumulated for the byte being assembled
    next_byte: u8,
    /// Bit slots still free in `next_byte`
    free_bits: u32,
    /// Total bits written, padding excluded
    bits_written: u64,
}

impl<W: Write> BitOutput<W> {
    /// Create a bit writer over `inner`.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            next_byte: 0,
            free_bits: 8,
            bits_written: 0,
        }
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.next_byte = (self.next_byte << 1) | u8::from(bit);
        self.free_bits -= 1;
        self.bits_written += 1;
        if self.free_bits == 0 {
            self.inner.write_all(&[self.next_byte])?;
            self.next_byte = 0;
            self.free_bits = 8;
        }
        Ok(())
    }

    /// Number of bits written so far, not counting padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    /// Flush the underlying writer. A partially assembled byte is kept.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    /// Pad the last partial byte with zeros, flush, and return the writer.
    pub fn finish(mut self) -> io::Result<W> {
        if self.free_bits < 8 {
            let last = self.next_byte << self.free_bits;
            self.inner.write_all(&[last])?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads individual bits from an underlying byte source.
///
/// One byte is read ahead so that [`end_of_stream`](Self::end_of_stream)
/// becomes true as soon as the last real bit has been consumed. Wrap
/// unbuffered sources in a [`std::io::BufReader`].
pub struct BitInput<R: Read> {
    bytes: Bytes<R>,
    /// Byte currently being consumed
    current: u8,
    /// Bits of `current` not yet returned
    remaining: u32,
    end_of_stream: bool,
}

impl<R: Read> BitInput<R> {
    /// Create a bit reader over `inner`, reading the first byte ahead.
    pub fn new(inner: R) -> io::Result<Self> {
        let mut input = Self {
            bytes: inner.bytes(),
            current: 0,
            remaining: 0,
            end_of_stream: false,
        };
        input.read_ahead()?;
        Ok(input)
    }

    fn read_ahead(&mut self) -> io::Result<()> {
        match self.bytes.next() {
            Some(byte) => {
                self.current = byte?;
                self.remaining = 8;
            }
            None => {
                self.end_of_stream = true;
                self.remaining = 0;
            }
        }
        Ok(())
    }

    /// True once every bit of the underlying source has been read.
    #[inline]
    pub fn end_of_stream(&self) -> bool {
        self.end_of_stream
    }

    /// Read the next bit. Past the end of the stream this returns `false`.
    #[inline]
    pub fn read_bit(&mut self) -> io::Result<bool> {
        if self.end_of_stream {
            return Ok(false);
        }
        self.remaining -= 1;
        let bit = (self.current >> self.remaining) & 1 != 0;
        if self.remaining == 0 {
            self.read_ahead()?;
        }
        Ok(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_msb_first() {
        let mut out = BitOutput::new(Vec::new());
        for bit in [true, false, true, true, false, true, false, false] {
            out.write_bit(bit).unwrap();
        }
        assert_eq!(out.bits_written(), 8);
        assert_eq!(out.finish().unwrap(), vec![0b1011_0100]);
    }

    #[test]
    fn test_partial_byte_zero_padded() {
        let mut out = BitOutput::new(Vec::new());
        for bit in [true, true, false, true] {
            out.write_bit(bit).unwrap();
        }
        assert_eq!(out.finish().unwrap(), vec![0b1101_0000]);
    }

    #[test]
    fn test_empty_output() {
        let out = BitOutput::new(Vec::new());
        assert!(out.finish().unwrap().is_empty());
    }

    #[test]
    fn test_read_bits() {
        let data = [0b1011_0100u8, 0b1100_1010];
        let mut input = BitInput::new(&data[..]).unwrap();

        let mut bits = Vec::new();
        while !input.end_of_stream() {
            bits.push(u8::from(input.read_bit().unwrap()));
        }
        assert_eq!(bits, [1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn test_eof() {
        let data = [0xFF];
        let mut input = BitInput::new(&data[..]).unwrap();

        assert!(!input.end_of_stream());
        for _ in 0..8 {
            assert!(input.read_bit().unwrap());
        }
        assert!(input.end_of_stream());
        assert!(!input.read_bit().unwrap());
    }

    #[test]
    fn test_empty_input_is_eof() {
        let input = BitInput::new(&[][..]).unwrap();
        assert!(input.end_of_stream());
    }
}
