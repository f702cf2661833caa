//! Model selection.
//!
//! A [`ModelSpec`] names a model and its single parameter. Encoder and
//! decoder must build their models from equal specs.
//!
//! | Form | Model |
//! |------|-------|
//! | `uniform` | [`UniformModel`] |
//! | `unigram` | [`AdaptiveUnigramModel`] |
//! | `ppm5`, `ppm:5`, `ppm(5)` | [`PpmModel`] of order 5 |

use std::fmt;
use std::str::FromStr;

use crate::error::{ArithError, Result};
use crate::model::{AdaptiveUnigramModel, ArithCodeModel, PpmModel, UniformModel};

/// PPM order used when none is given.
pub const DEFAULT_PPM_ORDER: usize = 5;

/// Description of a model that can be built fresh on either side of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelSpec {
    /// Every byte and EOF equally likely.
    Uniform,
    /// Adaptive order-0 frequencies.
    Unigram,
    /// PPM with contexts of up to `order` bytes.
    Ppm {
        /// Maximum context length.
        order: usize,
    },
}

impl ModelSpec {
    /// Build a fresh model.
    pub fn build(&self) -> Box<dyn ArithCodeModel + Send> {
        match *self {
            Self::Uniform => Box::new(UniformModel),
            Self::Unigram => Box::new(AdaptiveUnigramModel::new()),
            Self::Ppm { order } => Box::new(PpmModel::new(order)),
        }
    }

    /// Uniform, unigram, then PPM of orders 0 to 8, 10, 12 and 16.
    pub fn standard_suite() -> Vec<ModelSpec> {
        let mut suite = vec![Self::Uniform, Self::Unigram];
        suite.extend(
            (0..=8)
                .chain([10, 12, 16])
                .map(|order| Self::Ppm { order }),
        );
        suite
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self::Ppm {
            order: DEFAULT_PPM_ORDER,
        }
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform => f.write_str("uniform"),
            Self::Unigram => f.write_str("unigram"),
            Self::Ppm { order } => write!(f, "ppm{order}"),
        }
    }
}

impl FromStr for ModelSpec {
    type Err = ArithError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ArithError::InvalidModelSpec(s.to_string());
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "uniform" => return Ok(Self::Uniform),
            "unigram" => return Ok(Self::Unigram),
            "ppm" => return Ok(Self::default()),
            _ => {}
        }
        let rest = name.strip_prefix("ppm").ok_or_else(invalid)?;
        let digits = if let Some(inner) = rest.strip_prefix('(') {
            inner.strip_suffix(')').ok_or_else(invalid)?
        } else {
            rest.strip_prefix(':').unwrap_or(rest)
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let order = digits.parse().map_err(|_| invalid())?;
        Ok(Self::Ppm { order })
    }
}
