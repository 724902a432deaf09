//! Classification facade over a cached vectorizer and classifier

use crate::cache::CacheLoader;
use crate::classifier::ProbabilisticClassifier;
use crate::model_loader::ModelArtifacts;
use crate::sparse::SparseMatrix;
use crate::vectorizer::{Transformed, Vectorizer};
use cherry_core::{Error, Probabilities, Result, TextInput, WeightedToken, WordList};
use std::sync::Arc;
use tracing::debug;

/// Classification of one text or a batch of texts.
///
/// All work happens at construction: the texts are vectorized, the non-zero
/// features of every text are collected into a word list and the classifier
/// produces class probabilities. Either everything succeeds or no value is
/// returned.
///
/// ```rust,no_run
/// use cherry_classify::{Classify, FsCache};
///
/// let cache = FsCache::new("/var/cache/cherry");
/// let result = Classify::new(&cache, "spam", "win a free cruise")?;
/// println!("{:?}", result.probability());
/// # Ok::<(), cherry_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Classify {
    model: Option<Arc<ModelArtifacts>>,
    classes: Vec<String>,
    word_list: WordList,
    probability: Probabilities,
}

impl Classify {
    /// Load `model` from the cache and classify `text`
    pub fn new<L>(loader: &L, model: &str, text: impl Into<TextInput>) -> Result<Self>
    where
        L: CacheLoader + ?Sized,
    {
        let artifacts = ModelArtifacts::load(loader, model)?;
        Self::from_artifacts(Arc::new(artifacts), text)
    }

    /// Classify `text` with an already loaded model
    pub fn from_artifacts(model: Arc<ModelArtifacts>, text: impl Into<TextInput>) -> Result<Self> {
        let mut result = Self::with_parts(model.vectorizer(), model.classifier(), text)?;
        result.model = Some(model);
        Ok(result)
    }

    /// Classify `text` with any vectorizer and classifier pair
    pub fn with_parts(
        vectorizer: &dyn Vectorizer,
        classifier: &dyn ProbabilisticClassifier,
        text: impl Into<TextInput>,
    ) -> Result<Self> {
        let texts = text.into().into_texts();
        if texts.is_empty() {
            return Err(Error::vectorizer("no text to classify"));
        }

        let matrix = match vectorizer.transform(&texts)? {
            Transformed::Matrix(matrix) => matrix,
            Transformed::NoVocabularyOverlap { row } => {
                debug!("text {} shares no token with the vocabulary", row);
                return Err(Error::TokenNotFound);
            }
        };
        if matrix.n_rows() != texts.len() {
            return Err(Error::vectorizer(format!(
                "vectorizer returned {} rows for {} texts",
                matrix.n_rows(),
                texts.len()
            )));
        }

        let word_list = word_list(&matrix, vectorizer.feature_names())?;

        let probability = classifier.predict_proba(&matrix)?;
        if probability.n_rows() != texts.len() {
            return Err(Error::classifier(format!(
                "classifier returned {} rows for {} texts",
                probability.n_rows(),
                texts.len()
            )));
        }

        Ok(Self {
            model: None,
            classes: classifier.classes().to_vec(),
            word_list,
            probability,
        })
    }

    /// Non-zero weighted tokens of each text, heaviest first
    pub fn word_list(&self) -> &WordList {
        &self.word_list
    }

    /// Class probabilities of each text, columns aligned to [`Classify::classes`]
    pub fn probability(&self) -> &Probabilities {
        &self.probability
    }

    /// Class labels of the classifier
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Most probable class of each text
    pub fn predictions(&self) -> Vec<&str> {
        (0..self.probability.n_rows())
            .filter_map(|row| self.probability.argmax(row))
            .filter_map(|i| self.classes.get(i).map(String::as_str))
            .collect()
    }

    /// The model used, when classification went through a loaded model
    pub fn model(&self) -> Option<&Arc<ModelArtifacts>> {
        self.model.as_ref()
    }

    /// Number of classified texts
    pub fn len(&self) -> usize {
        self.word_list.len()
    }

    /// Always false for a constructed value
    pub fn is_empty(&self) -> bool {
        self.word_list.is_empty()
    }

    /// Split into word list and probabilities
    pub fn into_parts(self) -> (WordList, Probabilities) {
        (self.word_list, self.probability)
    }
}

/// Pair every non-zero feature of each row with its label, sorted descending
fn word_list(matrix: &SparseMatrix, feature_names: &[String]) -> Result<WordList> {
    (0..matrix.n_rows())
        .map(|row| {
            let mut words = matrix
                .row(row)
                .filter(|(_, weight)| *weight != 0.0)
                .map(|(col, weight)| {
                    feature_names
                        .get(col)
                        .map(|token| WeightedToken::new(weight, token.as_str()))
                        .ok_or_else(|| {
                            Error::vectorizer(format!("no feature name for column {}", col))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            words.sort_by(WeightedToken::cmp_desc);
            Ok(words)
        })
        .collect()
}
