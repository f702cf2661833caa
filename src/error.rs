//! Error types for arithmetic coding streams.
//!
//! This module provides the [`ArithError`] type which covers everything that
//! can go wrong around the coder. The coder and models themselves cannot fail:
//! an encoder/decoder pair driven with mismatched call sequences produces
//! garbage, not an error.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | I/O | [`Io`] | Underlying read/write failed |
//! | Stream | [`Unsupported`] | Seek/reset on a forward-only coded stream |
//! | Configuration | [`InvalidModelSpec`] | Unparseable model description |
//! | Tokens | [`TokenContainsNul`], [`TooManyTokens`], [`UnknownToken`] | Token stream misuse |
//!
//! [`Io`]: ArithError::Io
//! [`Unsupported`]: ArithError::Unsupported
//! [`InvalidModelSpec`]: ArithError::InvalidModelSpec
//! [`TokenContainsNul`]: ArithError::TokenContainsNul
//! [`TooManyTokens`]: ArithError::TooManyTokens
//! [`UnknownToken`]: ArithError::UnknownToken

use std::io;

use thiserror::Error;

/// Error type for arithmetic coding operations.
#[derive(Debug, Error)]
pub enum ArithError {
    /// An I/O error occurred on the underlying byte stream.
    ///
    /// Propagated unchanged; nothing in this crate retries.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The operation is not supported on a coded stream.
    ///
    /// Coded streams are strictly sequential; seeking or resetting
    /// would desynchronize the adaptive model.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// A model description could not be parsed.
    ///
    /// The `String` holds the rejected input. Accepted forms are
    /// `uniform`, `unigram`, `ppm5`, `ppm:5` and `ppm(5)`.
    #[error("invalid model spec: {0:?}")]
    InvalidModelSpec(String),

    /// A token passed to the token stream encoder contains a NUL byte,
    /// which is reserved as the spelling terminator.
    #[error("token contains a NUL byte")]
    TokenContainsNul,

    /// The token dictionary is full (256 distinct tokens).
    #[error("token dictionary is full")]
    TooManyTokens,

    /// A decoded token index was never defined.
    ///
    /// Only reachable from corrupt or mismatched input.
    #[error("unknown token index: {0}")]
    UnknownToken(u8),
}

impl From<ArithError> for io::Error {
    fn from(e: ArithError) -> Self {
        match e {
            ArithError::Io(inner) => inner,
            ArithError::Unsupported(what) => io::Error::new(io::ErrorKind::Unsupported, what),
            other => io::Error::new(io::ErrorKind::InvalidData, other.to_string()),
        }
    }
}

/// A specialized Result type for arithmetic coding operations.
pub type Result<T> = std::result::Result<T, ArithError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_round_trips() {
        let err = ArithError::from(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_unsupported_maps_to_unsupported_kind() {
        let back: io::Error = ArithError::Unsupported("seek").into();
        assert_eq!(back.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ArithError::InvalidModelSpec("ppmx".into()).to_string(),
            "invalid model spec: \"ppmx\""
        );
        assert_eq!(ArithError::UnknownToken(7).to_string(), "unknown token index: 7");
    }
}
