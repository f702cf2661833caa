//! PPM (Prediction by Partial Matching) byte model.
//!
//! Predicts each byte from the bytes before it, using a trie of every
//! context up to the configured order. When the chosen context has never
//! seen the next byte, an escape is coded and the model retries at a
//! shorter context, excluding the bytes the longer context already offered.
//! Below order 1 it falls back to an order-0 model with exclusions.
//!
//! ## Context selection
//!
//! | Situation | Search | Picks |
//! |-----------|--------|-------|
//! | After a byte is coded | binary search over lengths | shortest deterministic context, else longest usable |
//! | After an escape | shorter lengths one by one | next usable context, walked down to the shortest deterministic one |
//!
//! A context is *usable* when it exists and has an unexcluded child, and
//! *deterministic* when it has exactly one child.

mod model;
mod node;

pub use model::PpmModel;
pub use node::{MAX_INDIVIDUAL_COUNT, MIN_COUNT};

/// Shortest context consulted in the trie; shorter ones use the order-0
/// backoff model.
pub const MIN_CONTEXT_LENGTH: usize = 1;
