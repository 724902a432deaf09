//! Cherry Core
//!
//! Types shared across the Cherry crates.
//!
//! This crate provides:
//! - The error type and result alias used by loaders, vectorizers and classifiers
//! - Input normalization for single texts and batches
//! - Output types for classification (word lists and class probabilities)

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Probabilities, TextInput, WeightedToken, WordList};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Probabilities, TextInput, WeightedToken, WordList};
}
