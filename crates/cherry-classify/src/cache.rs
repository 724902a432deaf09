//! Loading pre-trained artifacts from the model cache
//!
//! A model is a directory under the cache root holding two artifacts:
//!
//! ```text
//! <root>/<model>/clf.pkz   fitted classifier
//! <root>/<model>/ve.pkz    fitted vectorizer
//! ```
//!
//! Artifacts are JSON documents. Decoded artifacts are validated before they
//! are handed out, so a loaded model is always internally consistent.

use crate::classifier::ClassifierArtifact;
use crate::vectorizer::{TextVectorizer, VectorizerSpec};
use cherry_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Artifact filename of the fitted classifier
pub const CLASSIFIER_FILE: &str = "clf.pkz";

/// Artifact filename of the fitted vectorizer
pub const VECTORIZER_FILE: &str = "ve.pkz";

/// Source of pre-trained artifacts keyed by model name
pub trait CacheLoader: Send + Sync {
    /// Read the raw bytes of one artifact
    fn read_artifact(&self, model: &str, filename: &str) -> Result<Vec<u8>>;

    /// Load the fitted classifier of `model`
    fn load_classifier(&self, model: &str) -> Result<ClassifierArtifact> {
        let classifier: ClassifierArtifact = load_cache(self, model, CLASSIFIER_FILE)?;
        classifier.validate()?;
        Ok(classifier)
    }

    /// Load the fitted vectorizer of `model`
    fn load_vectorizer(&self, model: &str) -> Result<TextVectorizer> {
        let spec: VectorizerSpec = load_cache(self, model, VECTORIZER_FILE)?;
        spec.build()
    }
}

/// Deserialize one named artifact of `model`
pub fn load_cache<L, T>(loader: &L, model: &str, filename: &str) -> Result<T>
where
    L: CacheLoader + ?Sized,
    T: DeserializeOwned,
{
    let bytes = loader.read_artifact(model, filename)?;
    let artifact = serde_json::from_slice(&bytes)?;
    debug!(model, filename, bytes = bytes.len(), "loaded cache artifact");
    Ok(artifact)
}

/// Filesystem cache rooted at a directory
#[derive(Debug, Clone)]
pub struct FsCache {
    root: PathBuf,
}

impl FsCache {
    /// Create a cache rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one model. The name must be a single plain path component.
    pub fn model_dir(&self, model: &str) -> Result<PathBuf> {
        let mut components = Path::new(model).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if name == model => Ok(self.root.join(name)),
            _ => Err(Error::config(format!("invalid model name {:?}", model))),
        }
    }

    /// Location of one artifact
    pub fn artifact_path(&self, model: &str, filename: &str) -> Result<PathBuf> {
        Ok(self.model_dir(model)?.join(filename))
    }

    /// Whether both artifacts of `model` exist
    pub fn contains(&self, model: &str) -> bool {
        [CLASSIFIER_FILE, VECTORIZER_FILE].iter().all(|filename| {
            self.artifact_path(model, filename)
                .map_or(false, |path| path.is_file())
        })
    }

    /// Write one artifact, creating the model directory if needed
    pub fn store<T: Serialize>(&self, model: &str, filename: &str, artifact: &T) -> Result<PathBuf> {
        let dir = self.model_dir(model)?;
        fs::create_dir_all(&dir)?;

        let path = dir.join(filename);
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        serde_json::to_writer(&mut writer, artifact)?;
        writer.flush()?;

        debug!(model, filename, path = %path.display(), "stored cache artifact");
        Ok(path)
    }

    /// Write both artifacts of a model
    pub fn store_model(
        &self,
        model: &str,
        vectorizer: &TextVectorizer,
        classifier: &ClassifierArtifact,
    ) -> Result<()> {
        self.store(model, VECTORIZER_FILE, vectorizer)?;
        self.store(model, CLASSIFIER_FILE, classifier)?;
        Ok(())
    }

    /// Names of all models holding both artifacts, sorted
    pub fn models(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut models = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if self.contains(name) {
                    models.push(name.to_string());
                }
            }
        }
        models.sort();
        Ok(models)
    }
}

impl CacheLoader for FsCache {
    fn read_artifact(&self, model: &str, filename: &str) -> Result<Vec<u8>> {
        let path = self.artifact_path(model, filename)?;
        debug!(model, filename, path = %path.display(), "reading cache artifact");

        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::CacheNotFound { path }),
            Err(e) => Err(e.into()),
        }
    }
}
