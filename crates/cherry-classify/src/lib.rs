//! Cherry Classify
//!
//! Inference over pre-trained text classifiers stored in a model cache.
//!
//! A cached model is a pair of artifacts:
//! - a fitted vectorizer turning text into sparse feature vectors
//! - a fitted probabilistic classifier turning vectors into class probabilities
//!
//! [`Classify`] loads a pair, vectorizes the input and reports both the class
//! probabilities and the weighted vocabulary tokens found in every text.

pub mod cache;
pub mod classifier;
pub mod classify;
pub mod config;
pub mod model_loader;
pub mod sparse;
pub mod vectorizer;

pub use cache::{load_cache, CacheLoader, FsCache, CLASSIFIER_FILE, VECTORIZER_FILE};
pub use classifier::{ClassifierArtifact, LogisticRegression, MultinomialNb, ProbabilisticClassifier};
pub use classify::Classify;
pub use config::CherryConfig;
pub use model_loader::{ModelArtifacts, ModelRegistry, SharedRegistry};
pub use sparse::SparseMatrix;
pub use vectorizer::{Norm, TextVectorizer, Transformed, Vectorizer, VectorizerSpec, Weighting};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::cache::{CacheLoader, FsCache};
    pub use crate::classifier::ProbabilisticClassifier;
    pub use crate::classify::Classify;
    pub use crate::vectorizer::{Transformed, Vectorizer};
    pub use cherry_core::prelude::*;
}
