//! Vectorizer capability and the bag-of-words implementation
//!
//! A vectorizer turns raw documents into rows of a [`SparseMatrix`] whose
//! columns are the learned vocabulary. Transform never fails because of an
//! unknown word; instead it reports [`Transformed::NoVocabularyOverlap`] when a
//! document contains no known token at all, and the caller decides what that
//! means.

use crate::sparse::SparseMatrix;
use cherry_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Outcome of a vectorizer transform
#[derive(Debug, Clone, PartialEq)]
pub enum Transformed {
    /// One row per input document
    Matrix(SparseMatrix),

    /// The document at `row` shares no token with the vocabulary
    NoVocabularyOverlap { row: usize },
}

/// Trait for all fitted vectorizers
pub trait Vectorizer: Send + Sync {
    /// Transform documents into feature vectors
    fn transform(&self, texts: &[String]) -> Result<Transformed>;

    /// Feature labels, aligned to matrix columns
    fn feature_names(&self) -> &[String];

    /// Number of features (matrix columns)
    fn n_features(&self) -> usize {
        self.feature_names().len()
    }
}

/// Term weighting applied to raw counts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Weighting {
    /// Raw term counts
    #[default]
    Count,

    /// Counts scaled by inverse document frequency
    Tfidf {
        /// One idf value per vocabulary column
        idf: Vec<f64>,

        /// Replace tf with 1 + ln(tf)
        #[serde(default)]
        sublinear_tf: bool,
    },
}

/// Row normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    /// Sum of absolute values is 1
    L1,
    /// Euclidean length is 1
    L2,
}

/// Serialized form of a fitted [`TextVectorizer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerSpec {
    /// Token (or n-gram) to column index
    pub vocabulary: BTreeMap<String, usize>,

    /// Lowercase documents before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Regex selecting tokens
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    /// Tokens dropped before building n-grams
    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Inclusive word n-gram range
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Clamp counts to 1
    #[serde(default)]
    pub binary: bool,

    /// Term weighting
    #[serde(default)]
    pub weighting: Weighting,

    /// Row normalization
    #[serde(default)]
    pub norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    r"(?u)\b\w\w+\b".to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

impl VectorizerSpec {
    /// Create a spec whose columns follow the order of `tokens`
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = BTreeMap::new();
        for token in tokens {
            let next = vocabulary.len();
            vocabulary.entry(token.into()).or_insert(next);
        }

        Self {
            vocabulary,
            lowercase: true,
            token_pattern: default_token_pattern(),
            stop_words: Vec::new(),
            ngram_range: default_ngram_range(),
            binary: false,
            weighting: Weighting::Count,
            norm: None,
        }
    }

    /// Use tf-idf weighting
    pub fn with_tfidf(mut self, idf: Vec<f64>, sublinear_tf: bool) -> Self {
        self.weighting = Weighting::Tfidf { idf, sublinear_tf };
        self
    }

    /// Set row normalization
    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = Some(norm);
        self
    }

    /// Set the word n-gram range
    pub fn with_ngram_range(mut self, min: usize, max: usize) -> Self {
        self.ngram_range = (min, max);
        self
    }

    /// Set stop words
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Clamp counts to 1
    pub fn with_binary(mut self, binary: bool) -> Self {
        self.binary = binary;
        self
    }

    /// Toggle lowercasing
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Set the token regex
    pub fn with_token_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.token_pattern = pattern.into();
        self
    }

    /// Validate and compile into a usable vectorizer
    pub fn build(self) -> Result<TextVectorizer> {
        TextVectorizer::try_from(self)
    }
}

/// Fitted bag-of-words vectorizer (counts or tf-idf)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "VectorizerSpec", into = "VectorizerSpec")]
pub struct TextVectorizer {
    spec: VectorizerSpec,
    token_regex: Regex,
    stop_words: HashSet<String>,
    feature_names: Vec<String>,
}

impl TryFrom<VectorizerSpec> for TextVectorizer {
    type Error = Error;

    fn try_from(spec: VectorizerSpec) -> Result<Self> {
        let n_features = spec.vocabulary.len();
        if n_features == 0 {
            return Err(Error::artifact("vectorizer has an empty vocabulary"));
        }

        let mut feature_names = vec![String::new(); n_features];
        let mut seen = vec![false; n_features];
        for (token, &col) in &spec.vocabulary {
            if col >= n_features || seen[col] {
                return Err(Error::artifact(format!(
                    "vocabulary column {} for {:?} is duplicated or out of range",
                    col, token
                )));
            }
            seen[col] = true;
            feature_names[col] = token.clone();
        }

        if let Weighting::Tfidf { idf, .. } = &spec.weighting {
            if idf.len() != n_features {
                return Err(Error::artifact(format!(
                    "idf has {} values but vocabulary has {} features",
                    idf.len(),
                    n_features
                )));
            }
            if idf.iter().any(|v| !v.is_finite()) {
                return Err(Error::artifact("idf contains non-finite values"));
            }
        }

        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::artifact(format!(
                "invalid ngram range ({}, {})",
                min_n, max_n
            )));
        }

        let token_regex = Regex::new(&spec.token_pattern).map_err(|e| {
            Error::artifact(format!("invalid token pattern {:?}: {}", spec.token_pattern, e))
        })?;

        let stop_words = spec.stop_words.iter().cloned().collect();

        Ok(Self {
            spec,
            token_regex,
            stop_words,
            feature_names,
        })
    }
}

impl From<TextVectorizer> for VectorizerSpec {
    fn from(vectorizer: TextVectorizer) -> Self {
        vectorizer.spec
    }
}

impl TextVectorizer {
    /// The serialized form of this vectorizer
    pub fn spec(&self) -> &VectorizerSpec {
        &self.spec
    }

    /// Split a document into the terms looked up in the vocabulary
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.spec.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let words: Vec<&str> = self
            .token_regex
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|w| !self.stop_words.contains(*w))
            .collect();

        let (min_n, max_n) = self.spec.ngram_range;
        if (min_n, max_n) == (1, 1) {
            return words.into_iter().map(str::to_string).collect();
        }

        let mut terms = Vec::new();
        for n in min_n..=max_n.min(words.len()) {
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn count_terms(&self, text: &str) -> HashMap<usize, f64> {
        let mut counts = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&col) = self.spec.vocabulary.get(&term) {
                *counts.entry(col).or_insert(0.0) += 1.0;
            }
        }
        counts
    }

    fn weigh(&self, counts: HashMap<usize, f64>) -> Vec<(usize, f64)> {
        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(col, tf)| {
                let tf = if self.spec.binary { 1.0 } else { tf };
                let value = match &self.spec.weighting {
                    Weighting::Count => tf,
                    Weighting::Tfidf { idf, sublinear_tf } => {
                        let tf = if *sublinear_tf { 1.0 + tf.ln() } else { tf };
                        tf * idf[col]
                    }
                };
                (col, value)
            })
            .collect();

        if let Some(norm) = self.spec.norm {
            let length = match norm {
                Norm::L1 => row.iter().map(|(_, v)| v.abs()).sum::<f64>(),
                Norm::L2 => row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt(),
            };
            if length > 0.0 {
                for (_, v) in row.iter_mut() {
                    *v /= length;
                }
            }
        }
        row
    }
}

impl Vectorizer for TextVectorizer {
    fn transform(&self, texts: &[String]) -> Result<Transformed> {
        let mut matrix = SparseMatrix::new(self.feature_names.len());

        for (row, text) in texts.iter().enumerate() {
            let counts = self.count_terms(text);
            if counts.is_empty() {
                warn!(row, "document has no token in the vocabulary");
                return Ok(Transformed::NoVocabularyOverlap { row });
            }
            matrix.push_row(self.weigh(counts))?;
        }

        debug!(
            documents = matrix.n_rows(),
            nnz = matrix.nnz(),
            "vectorized documents"
        );
        Ok(Transformed::Matrix(matrix))
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
