//! Statistical models that drive the arithmetic coder.
//!
//! Every model implements [`ArithCodeModel`]: it maps symbols to
//! cumulative-frequency [`Interval`]s in its *current* context and back, and
//! adapts its statistics as symbols are coded.
//!
//! ## Models
//!
//! | Model | Order | Escapes | Notes |
//! |-------|-------|---------|-------|
//! | [`UniformModel`] | - | no | Every byte and EOF has width 1 of 257 |
//! | [`AdaptiveUnigramModel`] | 0 | no | Cumulative table, binary search decode |
//! | [`PpmModel`] | N | yes | Context trie with exclusions, order-0 backoff |
//!
//! ## Driving protocol
//!
//! To encode a symbol, code [`Symbol::Escape`] intervals while
//! [`escaped`](ArithCodeModel::escaped) reports true, then code the symbol:
//!
//! ```text
//! while model.escaped(sym) { encoder.encode(model.interval(Escape)) }
//! encoder.encode(model.interval(sym))
//! ```
//!
//! To decode, repeat `point_to_symbol` → `interval` → `remove_symbol_from_stream`
//! until a symbol other than [`Symbol::Escape`] comes out.
//!
//! ## Lock-step invariant
//!
//! The encoder-side and decoder-side models are separate instances that must
//! receive identical call sequences. Nothing checks this: a divergence (for
//! example two PPM models of different order) silently produces garbage.

mod byte_buffer;
mod byte_set;
mod excluding;
pub mod ppm;
mod uniform;
mod unigram;

pub use byte_buffer::ByteBuffer;
pub use byte_set::ByteSet;
pub use excluding::ExcludingAdaptiveUnigramModel;
pub use ppm::PpmModel;
pub use uniform::UniformModel;
pub use unigram::{AdaptiveUnigramModel, MAX_COUNT};

/// Integer code of the end-of-stream symbol.
pub const EOF: i32 = -1;

/// Integer code of the escape symbol.
pub const ESCAPE: i32 = -2;

/// Number of byte values.
pub(crate) const NUM_BYTES: usize = 256;

/// Table index used for EOF in order-0 models.
pub(crate) const EOF_INDEX: usize = 256;

/// A coded symbol: a byte or one of the two out-of-band markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A data byte.
    Byte(u8),
    /// End of stream. Coded exactly once, as the last symbol.
    Eof,
    /// Fall back to a shorter context.
    Escape,
}

impl Symbol {
    /// Integer form: the byte value in `0..=255`, [`EOF`] or [`ESCAPE`].
    pub const fn to_i32(self) -> i32 {
        match self {
            Self::Byte(b) => b as i32,
            Self::Eof => EOF,
            Self::Escape => ESCAPE,
        }
    }

    /// Parse the integer form; `None` for values outside `-2..=255`.
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            EOF => Some(Self::Eof),
            ESCAPE => Some(Self::Escape),
            0..=255 => Some(Self::Byte(value as u8)),
            _ => None,
        }
    }

    /// Index into a 257-slot order-0 table (bytes then EOF).
    ///
    /// Escapes have no slot in an order-0 table.
    #[inline]
    pub(crate) fn order0_index(self) -> usize {
        match self {
            Self::Byte(b) => b as usize,
            Self::Eof => EOF_INDEX,
            Self::Escape => unreachable!("escape has no order-0 slot"),
        }
    }

    #[inline]
    pub(crate) fn from_order0_index(index: usize) -> Self {
        if index == EOF_INDEX {
            Self::Eof
        } else {
            Self::Byte(index as u8)
        }
    }
}

impl From<u8> for Symbol {
    fn from(b: u8) -> Self {
        Self::Byte(b)
    }
}

/// Half-open range `[low/total, high/total)` assigned to one symbol in the
/// current context, with `low < high <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    /// Cumulative count below the symbol.
    pub low: u32,
    /// Cumulative count through the symbol.
    pub high: u32,
    /// Total count of the context.
    pub total: u32,
}

impl Interval {
    /// Create an interval.
    #[inline]
    pub const fn new(low: u32, high: u32, total: u32) -> Self {
        Self { low, high, total }
    }

    /// Whether `low < high <= total` holds.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.low < self.high && self.high <= self.total
    }

    /// Probability width of the interval.
    pub fn probability(&self) -> f64 {
        f64::from(self.high - self.low) / f64::from(self.total)
    }
}

/// Contract between a statistical model and the arithmetic coder.
pub trait ArithCodeModel {
    /// Total count of the current context's cumulative frequencies.
    fn total_count(&self) -> u32;

    /// Symbol whose interval in the current context contains `count`,
    /// which lies in `[0, total_count())`. May be [`Symbol::Escape`].
    fn point_to_symbol(&self, count: u32) -> Symbol;

    /// Interval of `symbol` in the current context.
    ///
    /// Also applies the state update implied by coding `symbol`: adaptive
    /// models count it, PPM moves to the next context (or, for an escape,
    /// to a shorter one).
    fn interval(&mut self, symbol: Symbol) -> Interval;

    /// True if the current context cannot code `symbol` directly and an
    /// escape must be coded first.
    fn escaped(&self, symbol: Symbol) -> bool;

    /// Exclude `byte` as an outcome until the next symbol is coded.
    fn exclude(&mut self, byte: u8);

    /// Count `byte` as seen without coding it.
    fn increment(&mut self, byte: u8);
}

impl<M: ArithCodeModel + ?Sized> ArithCodeModel for &mut M {
    fn total_count(&self) -> u32 {
        (**self).total_count()
    }

    fn point_to_symbol(&self, count: u32) -> Symbol {
        (**self).point_to_symbol(count)
    }

    fn interval(&mut self, symbol: Symbol) -> Interval {
        (**self).interval(symbol)
    }

    fn escaped(&self, symbol: Symbol) -> bool {
        (**self).escaped(symbol)
    }

    fn exclude(&mut self, byte: u8) {
        (**self).exclude(byte);
    }

    fn increment(&mut self, byte: u8) {
        (**self).increment(byte);
    }
}

impl<M: ArithCodeModel + ?Sized> ArithCodeModel for Box<M> {
    fn total_count(&self) -> u32 {
        (**self).total_count()
    }

    fn point_to_symbol(&self, count: u32) -> Symbol {
        (**self).point_to_symbol(count)
    }

    fn interval(&mut self, symbol: Symbol) -> Interval {
        (**self).interval(symbol)
    }

    fn escaped(&self, symbol: Symbol) -> bool {
        (**self).escaped(symbol)
    }

    fn exclude(&mut self, byte: u8) {
        (**self).exclude(byte);
    }

    fn increment(&mut self, byte: u8) {
        (**self).increment(byte);
    }
}
