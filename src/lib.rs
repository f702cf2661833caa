//! Adaptive arithmetic coding with PPM byte models.
//!
//! A binary arithmetic coder (Witten–Neal–Cleary carry counting over a
//! 27-bit code space) paired with adaptive statistical models, the strongest
//! being PPM: a bounded-depth trie of byte contexts with escapes and
//! exclusions.
//!
//! ## Features
//! - Core library depends only on `thiserror` and `tracing`
//! - `parallel` - Evaluate model suites concurrently with rayon
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`coder`] | Bit I/O, [`ArithEncoder`], [`ArithDecoder`] |
//! | [`model`] | [`ArithCodeModel`] protocol, uniform, unigram and [`PpmModel`] |
//! | [`stream`] | `std::io` adapters, [`compress`] / [`decompress`] |
//! | [`token`] | Token sequence coding over two PPM models |
//! | [`config`] | [`ModelSpec`] model selection |
//! | [`stats`] | Compression statistics and suite evaluation |
//!
//! ## Example
//!
//! ```
//! use arithcode::{compress, decompress, ModelSpec};
//!
//! let spec: ModelSpec = "ppm:6".parse().unwrap();
//! let text = b"she sells sea shells by the sea shore";
//! let coded = compress(text, spec.build()).unwrap();
//! assert_eq!(decompress(&coded, spec.build()).unwrap(), text);
//! ```
//!
//! ## Lock-step
//!
//! There is no header, length or checksum in a coded stream. The decoder
//! must use a model built exactly like the encoder's; anything else decodes
//! to garbage without an error.

pub mod coder;
pub mod config;
pub mod error;
pub mod model;
pub mod stats;
pub mod stream;
pub mod token;

pub use coder::{ArithDecoder, ArithEncoder, BitInput, BitOutput};
pub use config::ModelSpec;
pub use error::{ArithError, Result};
pub use model::{
    AdaptiveUnigramModel, ArithCodeModel, ByteSet, Interval, PpmModel, Symbol, UniformModel,
};
pub use stats::{evaluate, CompressionStats, Evaluation, StatsTable};
pub use stream::{compress, decompress, ArithCodeReader, ArithCodeWriter};
pub use token::{TokenStreamDecoder, TokenStreamEncoder};
