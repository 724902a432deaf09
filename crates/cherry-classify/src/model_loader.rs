//! Loaded model artifacts and a registry for sharing them

use crate::cache::CacheLoader;
use crate::classifier::{ClassifierArtifact, ProbabilisticClassifier};
use crate::vectorizer::{TextVectorizer, Vectorizer};
use cherry_core::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A fitted vectorizer and classifier pair loaded for one model
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    name: String,
    vectorizer: TextVectorizer,
    classifier: ClassifierArtifact,
}

impl ModelArtifacts {
    /// Pair a vectorizer with a classifier, checking that their widths agree
    pub fn new(
        name: impl Into<String>,
        vectorizer: TextVectorizer,
        classifier: ClassifierArtifact,
    ) -> Result<Self> {
        let name = name.into();
        if vectorizer.n_features() != classifier.n_features() {
            return Err(Error::artifact(format!(
                "model {}: vectorizer yields {} features but classifier expects {}",
                name,
                vectorizer.n_features(),
                classifier.n_features()
            )));
        }

        Ok(Self {
            name,
            vectorizer,
            classifier,
        })
    }

    /// Load both artifacts of `model` from a cache
    pub fn load<L: CacheLoader + ?Sized>(loader: &L, model: &str) -> Result<Self> {
        let classifier = loader.load_classifier(model)?;
        let vectorizer = loader.load_vectorizer(model)?;

        info!(
            model,
            kind = classifier.kind(),
            classes = classifier.classes().len(),
            features = vectorizer.n_features(),
            "loaded model"
        );
        Self::new(model, vectorizer, classifier)
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fitted vectorizer
    pub fn vectorizer(&self) -> &TextVectorizer {
        &self.vectorizer
    }

    /// Fitted classifier
    pub fn classifier(&self) -> &ClassifierArtifact {
        &self.classifier
    }

    /// Class labels of the classifier
    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }
}

/// Registry sharing loaded models across classifications
///
/// Loading is not deduplicated: two threads missing the same model at once
/// may both read it, and the last one wins.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<String, Arc<ModelArtifacts>>>,
}

/// Registry handle shared between threads
pub type SharedRegistry = Arc<ModelRegistry>;

impl ModelRegistry {
    /// Create a new model registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its own name
    pub fn register(&self, model: ModelArtifacts) -> Arc<ModelArtifacts> {
        let model = Arc::new(model);
        self.models
            .write()
            .insert(model.name().to_string(), Arc::clone(&model));
        model
    }

    /// Get a model by name
    pub fn get(&self, name: &str) -> Option<Arc<ModelArtifacts>> {
        self.models.read().get(name).cloned()
    }

    /// Get a registered model or load it from `loader`
    pub fn get_or_load<L: CacheLoader + ?Sized>(
        &self,
        loader: &L,
        name: &str,
    ) -> Result<Arc<ModelArtifacts>> {
        if let Some(model) = self.get(name) {
            debug!(model = name, "model registry hit");
            return Ok(model);
        }

        let model = ModelArtifacts::load(loader, name)?;
        Ok(self.register(model))
    }

    /// Check if a model is registered
    pub fn has_model(&self, name: &str) -> bool {
        self.models.read().contains_key(name)
    }

    /// Get list of registered model names, sorted
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove a model, returning it if present
    pub fn remove(&self, name: &str) -> Option<Arc<ModelArtifacts>> {
        self.models.write().remove(name)
    }

    /// Clear all models from registry
    pub fn clear(&self) {
        self.models.write().clear();
    }
}
