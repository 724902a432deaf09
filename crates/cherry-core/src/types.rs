//! Core types for Cherry

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Text handed to a classifier: one document or an ordered batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextInput {
    /// A single document
    Single(String),

    /// An ordered batch of documents
    Batch(Vec<String>),
}

impl TextInput {
    /// Normalize into a sequence of documents, wrapping a single text
    pub fn into_texts(self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text],
            Self::Batch(texts) => texts,
        }
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(texts) => texts.len(),
        }
    }

    /// Whether the input holds no document at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for TextInput {
    fn from(text: &str) -> Self {
        Self::Single(text.to_string())
    }
}

impl From<String> for TextInput {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<Vec<String>> for TextInput {
    fn from(texts: Vec<String>) -> Self {
        Self::Batch(texts)
    }
}

impl From<Vec<&str>> for TextInput {
    fn from(texts: Vec<&str>) -> Self {
        Self::Batch(texts.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for TextInput {
    fn from(texts: &[&str]) -> Self {
        Self::Batch(texts.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TextInput {
    fn from(texts: [&str; N]) -> Self {
        Self::Batch(texts.iter().map(|t| t.to_string()).collect())
    }
}

/// A vocabulary token paired with its feature weight in one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedToken {
    /// Feature weight (count, tf-idf, ...) in the document vector
    pub weight: f64,

    /// Vocabulary entry
    pub token: String,
}

impl WeightedToken {
    /// Create a new weighted token
    pub fn new(weight: f64, token: impl Into<String>) -> Self {
        Self {
            weight,
            token: token.into(),
        }
    }

    /// Descending order: weight first, token second
    pub fn cmp_desc(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.token.cmp(&self.token))
    }
}

/// Per-document lists of non-zero weighted tokens
pub type WordList = Vec<Vec<WeightedToken>>;

/// Per-document class probabilities, columns aligned to the classifier's classes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Probabilities(Vec<Vec<f64>>);

impl Probabilities {
    /// Wrap probability rows
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }

    /// Number of rows (documents)
    pub fn n_rows(&self) -> usize {
        self.0.len()
    }

    /// Number of columns (classes), zero when there are no rows
    pub fn n_classes(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    /// Probability row for one document
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.0.get(index).map(Vec::as_slice)
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    /// Column index of the most probable class for one document.
    ///
    /// Ties resolve to the lowest column.
    pub fn argmax(&self, index: usize) -> Option<usize> {
        let row = self.row(index)?;
        let mut best = None;
        for (i, p) in row.iter().enumerate() {
            match best {
                Some(b) if row[b] >= *p => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// Unwrap into the raw rows
    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.0
    }
}

impl From<Vec<Vec<f64>>> for Probabilities {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }
}
