//! JSON documents printed by the CLI

use cherry_classify::{Classify, ModelArtifacts, ProbabilisticClassifier, Vectorizer};
use cherry_core::WeightedToken;
use serde::Serialize;

/// Classification output for a batch of texts
#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    pub model: String,
    pub classes: Vec<String>,
    pub rows: Vec<ClassifyRow>,
}

/// Classification output for one text
#[derive(Debug, Serialize)]
pub struct ClassifyRow {
    pub text: String,
    pub prediction: Option<String>,
    pub probability: Vec<f64>,
    pub words: Vec<WeightedToken>,
}

impl ClassifyReport {
    pub fn new(model: &str, texts: &[String], result: &Classify) -> Self {
        let rows = texts
            .iter()
            .zip(result.word_list())
            .zip(result.probability().rows())
            .enumerate()
            .map(|(i, ((text, words), probability))| ClassifyRow {
                text: text.clone(),
                prediction: result
                    .probability()
                    .argmax(i)
                    .and_then(|c| result.classes().get(c).cloned()),
                probability: probability.clone(),
                words: words.clone(),
            })
            .collect();

        Self {
            model: model.to_string(),
            classes: result.classes().to_vec(),
            rows,
        }
    }
}

/// Summary of one cached model
#[derive(Debug, Serialize)]
pub struct ModelReport {
    pub model: String,
    pub kind: &'static str,
    pub classes: Vec<String>,
    pub features: usize,
}

impl From<&ModelArtifacts> for ModelReport {
    fn from(model: &ModelArtifacts) -> Self {
        Self {
            model: model.name().to_string(),
            kind: model.classifier().kind(),
            classes: model.classifier().classes().to_vec(),
            features: model.vectorizer().n_features(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cherry_classify::{ClassifierArtifact, MultinomialNb, VectorizerSpec};
    use std::sync::Arc;

    fn model() -> ModelArtifacts {
        let vectorizer = VectorizerSpec::new(["rain", "sun"]).build().unwrap();
        let classifier: ClassifierArtifact = MultinomialNb {
            classes: vec!["wet".to_string(), "dry".to_string()],
            class_log_prior: vec![0.5f64.ln(), 0.5f64.ln()],
            feature_log_prob: vec![vec![0.9f64.ln(), 0.1f64.ln()], vec![0.1f64.ln(), 0.9f64.ln()]],
        }
        .into();
        ModelArtifacts::new("weather", vectorizer, classifier).unwrap()
    }

    #[test]
    fn test_classify_report() {
        let texts = vec!["rain rain sun".to_string(), "sun".to_string()];
        let result = Classify::from_artifacts(Arc::new(model()), texts.clone()).unwrap();

        let report = ClassifyReport::new("weather", &texts, &result);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["model"], "weather");
        assert_eq!(json["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["rows"][0]["prediction"], "wet");
        assert_eq!(json["rows"][0]["words"][0]["token"], "rain");
        assert_eq!(json["rows"][0]["words"][0]["weight"], 2.0);
        assert_eq!(json["rows"][1]["prediction"], "dry");
    }

    #[test]
    fn test_model_report() {
        let report = ModelReport::from(&model());

        assert_eq!(report.kind, "multinomial_nb");
        assert_eq!(report.features, 2);
        assert_eq!(report.classes, vec!["wet", "dry"]);
    }
}
