//! `std::io` adapters that drive a model through the arithmetic coder.
//!
//! [`ArithCodeWriter`] codes every byte written to it; [`ArithCodeReader`]
//! decodes bytes until the coded EOF. Both sides must use models built the
//! same way. Coded streams are forward-only: seeking fails with
//! [`io::ErrorKind::Unsupported`].
//!
//! ## Example
//!
//! ```
//! use std::io::{Read, Write};
//! use arithcode::{ArithCodeReader, ArithCodeWriter, PpmModel};
//!
//! let mut writer = ArithCodeWriter::new(Vec::new(), PpmModel::new(3));
//! writer.write_all(b"banana bandana").unwrap();
//! let coded = writer.finish().unwrap();
//!
//! let mut reader = ArithCodeReader::new(&coded[..], PpmModel::new(3)).unwrap();
//! let mut text = String::new();
//! reader.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "banana bandana");
//! ```

use std::io::{self, Read, Seek, SeekFrom, Write};

use tracing::debug;

use crate::coder::{ArithDecoder, ArithEncoder};
use crate::error::{ArithError, Result};
use crate::model::{ArithCodeModel, Symbol};

/// Code `symbol`, preceded by as many escapes as the model requires.
pub fn encode_symbol<W: Write, M: ArithCodeModel + ?Sized>(
    encoder: &mut ArithEncoder<W>,
    model: &mut M,
    symbol: Symbol,
) -> io::Result<()> {
    while model.escaped(symbol) {
        encoder.encode(model.interval(Symbol::Escape))?;
    }
    encoder.encode(model.interval(symbol))
}

/// Decode the next symbol other than an escape.
pub fn decode_symbol<R: Read, M: ArithCodeModel + ?Sized>(
    decoder: &mut ArithDecoder<R>,
    model: &mut M,
) -> io::Result<Symbol> {
    loop {
        let count = decoder.current_symbol_count(model.total_count());
        let symbol = model.point_to_symbol(count);
        let interval = model.interval(symbol);
        decoder.remove_symbol_from_stream(interval)?;
        if symbol != Symbol::Escape {
            return Ok(symbol);
        }
    }
}

/// Writer that arithmetic-codes its input into `W`.
///
/// Call [`finish`](Self::finish) to code EOF and get the inner writer back.
/// A writer dropped without finishing is finished on drop, ignoring errors.
///
/// After a write error the model has already moved past the failed byte, so
/// the coded stream cannot be continued; [`bytes_in`](Self::bytes_in) then
/// reports how many bytes were coded before the failure.
pub struct ArithCodeWriter<W: Write, M: ArithCodeModel> {
    /// `None` once finished
    encoder: Option<ArithEncoder<W>>,
    model: M,
    bytes_in: u64,
}

impl<W: Write, M: ArithCodeModel> ArithCodeWriter<W, M> {
    /// Create a writer coding into `inner` with `model`.
    pub fn new(inner: W, model: M) -> Self {
        Self::with_encoder(ArithEncoder::new(inner), model)
    }

    /// Create a writer over an existing encoder.
    pub fn with_encoder(encoder: ArithEncoder<W>, model: M) -> Self {
        Self {
            encoder: Some(encoder),
            model,
            bytes_in: 0,
        }
    }

    /// The model driving the coder.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Bytes coded so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Code EOF, flush the final bits and return the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.finish_encoder()?
            .ok_or_else(|| io::Error::other("coded stream already finished"))
    }

    fn finish_encoder(&mut self) -> io::Result<Option<W>> {
        let Some(mut encoder) = self.encoder.take() else {
            return Ok(None);
        };
        encode_symbol(&mut encoder, &mut self.model, Symbol::Eof)?;
        let coded_bits = encoder.bits_written();
        let inner = encoder.finish()?;
        debug!(
            bytes_in = self.bytes_in,
            bytes_out = coded_bits.div_ceil(8),
            "finished coded stream"
        );
        Ok(Some(inner))
    }
}

impl<W: Write, M: ArithCodeModel> Write for ArithCodeWriter<W, M> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(encoder) = self.encoder.as_mut() else {
            return Err(io::Error::other("coded stream already finished"));
        };
        for &byte in buf {
            encode_symbol(encoder, &mut self.model, Symbol::Byte(byte))?;
            self.bytes_in += 1;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.encoder.as_mut() {
            Some(encoder) => encoder.flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write, M: ArithCodeModel> Seek for ArithCodeWriter<W, M> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(ArithError::Unsupported("seek on an arithmetic-coded output stream").into())
    }
}

impl<W: Write, M: ArithCodeModel> Drop for ArithCodeWriter<W, M> {
    fn drop(&mut self) {
        if self.encoder.is_some() {
            let _ = self.finish_encoder();
        }
    }
}

/// Reader that decodes an arithmetic-coded stream from `R`.
///
/// Reads return 0 once the coded EOF is reached, or once the source runs
/// dry on a truncated stream.
pub struct ArithCodeReader<R: Read, M: ArithCodeModel> {
    decoder: ArithDecoder<R>,
    model: M,
    done: bool,
    bytes_out: u64,
}

impl<R: Read, M: ArithCodeModel> ArithCodeReader<R, M> {
    /// Create a reader decoding `inner` with `model`. Reads the first
    /// 27 code bits.
    pub fn new(inner: R, model: M) -> io::Result<Self> {
        Ok(Self::with_decoder(ArithDecoder::new(inner)?, model))
    }

    /// Create a reader over an existing decoder.
    pub fn with_decoder(decoder: ArithDecoder<R>, model: M) -> Self {
        Self {
            decoder,
            model,
            done: false,
            bytes_out: 0,
        }
    }

    /// The model driving the decoder.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Decode one byte; `None` at end of stream.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.done {
            return Ok(None);
        }
        if !self.decoder.end_of_stream() {
            if let Symbol::Byte(byte) = decode_symbol(&mut self.decoder, &mut self.model)? {
                self.bytes_out += 1;
                return Ok(Some(byte));
            }
        }
        self.done = true;
        debug!(
            bytes_out = self.bytes_out,
            truncated = self.decoder.end_of_stream(),
            "reached end of coded stream"
        );
        Ok(None)
    }
}

impl<R: Read, M: ArithCodeModel> Read for ArithCodeReader<R, M> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.next_byte()? {
                Some(byte) => *slot = byte,
                None => return Ok(i),
            }
        }
        Ok(buf.len())
    }
}

impl<R: Read, M: ArithCodeModel> Seek for ArithCodeReader<R, M> {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(ArithError::Unsupported("seek on an arithmetic-coded input stream").into())
    }
}

/// Code `data` with `model`, returning the coded bytes.
pub fn compress<M: ArithCodeModel>(data: &[u8], model: M) -> Result<Vec<u8>> {
    let mut writer = ArithCodeWriter::new(Vec::with_capacity(data.len() / 2), model);
    writer.write_all(data)?;
    Ok(writer.finish()?)
}

/// Decode a stream produced by [`compress`] with an identically built model.
pub fn decompress<M: ArithCodeModel>(data: &[u8], model: M) -> Result<Vec<u8>> {
    let mut reader = ArithCodeReader::new(data, model)?;
    let mut out = Vec::with_capacity(data.len() * 2);
    reader.read_to_end(&mut out)?;
    Ok(out)
}
