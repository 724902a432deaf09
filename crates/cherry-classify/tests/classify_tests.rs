//! End-to-end classification tests
//!
//! Models are written to a temporary cache directory and loaded back through
//! `FsCache`, the same way a deployed cache is read.

use cherry_classify::{
    CacheLoader, ClassifierArtifact, Classify, FsCache, LogisticRegression, ModelRegistry,
    MultinomialNb, Norm, TextVectorizer, VectorizerSpec, CLASSIFIER_FILE, VECTORIZER_FILE,
};
use cherry_core::{Error, WeightedToken};
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;

const TOKEN_NOT_FOUND: &str = "Some of the tokens in text never appear in training data";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Two-word vocabulary {cat, dog} with a naive Bayes classifier
fn pets_model() -> (TextVectorizer, ClassifierArtifact) {
    let vectorizer = VectorizerSpec::new(["cat", "dog"]).build().unwrap();
    let classifier = MultinomialNb {
        classes: vec!["cats".to_string(), "dogs".to_string()],
        class_log_prior: vec![0.6f64.ln(), 0.4f64.ln()],
        feature_log_prob: vec![
            vec![0.75f64.ln(), 0.25f64.ln()],
            vec![0.2f64.ln(), 0.8f64.ln()],
        ],
    }
    .into();
    (vectorizer, classifier)
}

/// Tf-idf spam filter with a logistic regression classifier
fn spam_model() -> (TextVectorizer, ClassifierArtifact) {
    let vectorizer = VectorizerSpec::new(["free", "meeting", "money", "tomorrow", "win"])
        .with_tfidf(vec![1.2, 1.9, 1.4, 2.1, 1.6], false)
        .with_norm(Norm::L2)
        .build()
        .unwrap();
    let classifier = LogisticRegression {
        classes: vec!["ham".to_string(), "spam".to_string()],
        coef: vec![vec![2.0, -1.5, 1.8, -1.2, 2.4]],
        intercept: vec![-0.3],
    }
    .into();
    (vectorizer, classifier)
}

fn cache_with_models() -> (TempDir, FsCache) {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let cache = FsCache::new(temp_dir.path());

    let (vectorizer, classifier) = pets_model();
    cache.store_model("pets", &vectorizer, &classifier).unwrap();
    let (vectorizer, classifier) = spam_model();
    cache.store_model("spam", &vectorizer, &classifier).unwrap();

    (temp_dir, cache)
}

fn assert_rows_sum_to_one(result: &Classify) {
    for row in result.probability().rows() {
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "row sums to {}", total);
    }
}

#[test]
fn test_single_text_has_one_row() {
    let (_dir, cache) = cache_with_models();

    let result = Classify::new(&cache, "pets", "cat cat dog").unwrap();

    assert_eq!(result.word_list().len(), 1);
    assert_eq!(result.probability().n_rows(), 1);
    assert_eq!(
        result.word_list()[0],
        vec![WeightedToken::new(2.0, "cat"), WeightedToken::new(1.0, "dog")]
    );
    assert_eq!(result.probability().n_classes(), 2);
    assert_rows_sum_to_one(&result);
}

#[test]
fn test_batch_rows_follow_input_order() {
    let (_dir, cache) = cache_with_models();

    let texts = vec![
        "win free money now",
        "meeting tomorrow",
        "free meeting tomorrow",
    ];
    let result = Classify::new(&cache, "spam", texts).unwrap();

    assert_eq!(result.word_list().len(), 3);
    assert_eq!(result.probability().n_rows(), 3);
    assert_eq!(result.predictions(), vec!["spam", "ham", "ham"]);
    assert_rows_sum_to_one(&result);

    let tokens: Vec<&str> = result.word_list()[1].iter().map(|w| w.token.as_str()).collect();
    assert_eq!(tokens, vec!["tomorrow", "meeting"]);
}

#[test]
fn test_tfidf_weights_are_normalized() {
    let (_dir, cache) = cache_with_models();

    let result = Classify::new(&cache, "spam", "win free money").unwrap();

    let words = &result.word_list()[0];
    let length: f64 = words.iter().map(|w| w.weight * w.weight).sum::<f64>().sqrt();
    assert!((length - 1.0).abs() < 1e-9);
    assert_eq!(words[0].token, "win");
    assert!(words.windows(2).all(|w| w[0].weight >= w[1].weight));
}

#[test]
fn test_unseen_tokens_raise_token_not_found() {
    let (_dir, cache) = cache_with_models();

    let err = Classify::new(&cache, "pets", "zzz_unseen_token").unwrap_err();

    assert!(matches!(err, Error::TokenNotFound));
    assert_eq!(err.to_string(), TOKEN_NOT_FOUND);
}

#[test]
fn test_missing_model_propagates_cache_error() {
    let (_dir, cache) = cache_with_models();

    let err = Classify::new(&cache, "weather", "sunny").unwrap_err();
    assert!(matches!(err, Error::CacheNotFound { .. }));
}

#[test]
fn test_missing_vectorizer_propagates_cache_error() {
    let (dir, cache) = cache_with_models();
    std::fs::remove_file(dir.path().join("pets").join(VECTORIZER_FILE)).unwrap();

    let err = Classify::new(&cache, "pets", "cat").unwrap_err();
    match err {
        Error::CacheNotFound { path } => assert!(path.ends_with(VECTORIZER_FILE)),
        other => panic!("Expected CacheNotFound, got {:?}", other),
    }
}

#[test]
fn test_mismatched_artifacts_rejected() {
    let (_dir, cache) = cache_with_models();
    let (_, spam_classifier) = spam_model();
    cache.store("pets", CLASSIFIER_FILE, &spam_classifier).unwrap();

    let err = Classify::new(&cache, "pets", "cat").unwrap_err();
    assert!(matches!(err, Error::Artifact(_)));
}

#[test]
fn test_hand_written_artifacts() {
    init_tracing();
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("news");
    std::fs::create_dir_all(&model_dir).unwrap();
    std::fs::write(
        model_dir.join(VECTORIZER_FILE),
        r#"{"vocabulary": {"election": 0, "goal": 1, "vote": 2}}"#,
    )
    .unwrap();
    std::fs::write(
        model_dir.join(CLASSIFIER_FILE),
        r#"{
            "kind": "multinomial_nb",
            "classes": ["politics", "sports"],
            "class_log_prior": [-0.6931471805599453, -0.6931471805599453],
            "feature_log_prob": [
                [-0.916290731874155, -2.302585092994046, -0.916290731874155],
                [-2.302585092994046, -0.2231435513142097, -2.302585092994046]
            ]
        }"#,
    )
    .unwrap();

    let cache = FsCache::new(temp_dir.path());
    let result = Classify::new(&cache, "news", vec!["Vote in the election", "What a goal!"]).unwrap();

    assert_eq!(result.predictions(), vec!["politics", "sports"]);
    assert_eq!(cache.models().unwrap(), vec!["news"]);
}

#[test]
fn test_registry_shares_artifacts_across_classifications() {
    let (dir, cache) = cache_with_models();
    let registry = ModelRegistry::new();

    let model = registry.get_or_load(&cache, "pets").unwrap();
    std::fs::remove_dir_all(dir.path().join("pets")).unwrap();

    let first = Classify::from_artifacts(Arc::clone(&model), "dog").unwrap();
    let second =
        Classify::from_artifacts(registry.get_or_load(&cache, "pets").unwrap(), "cat").unwrap();

    assert_eq!(first.predictions(), vec!["dogs"]);
    assert_eq!(second.predictions(), vec!["cats"]);
    assert!(Arc::ptr_eq(first.model().unwrap(), second.model().unwrap()));
}

#[test]
fn test_classify_through_dyn_loader() {
    let (_dir, cache) = cache_with_models();
    let loader: Box<dyn CacheLoader> = Box::new(cache);

    let result = Classify::new(loader.as_ref(), "pets", "dog").unwrap();
    assert_eq!(result.classes(), &["cats".to_string(), "dogs".to_string()]);
}

#[test]
fn test_malformed_classifier_fails_with_error() {
    init_tracing();
    let (vectorizer, _) = pets_model();

    let ragged = MultinomialNb {
        classes: vec!["cats".to_string(), "dogs".to_string()],
        class_log_prior: vec![0.5f64.ln(), 0.5f64.ln()],
        feature_log_prob: vec![vec![-1.0, -1.0], vec![-1.0]],
    };
    let err = Classify::with_parts(&vectorizer, &ragged, "cat dog").unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));

    let no_intercept = LogisticRegression {
        classes: vec!["cats".to_string(), "dogs".to_string()],
        coef: vec![vec![1.0, 1.0]],
        intercept: vec![],
    };
    let err = Classify::with_parts(&vectorizer, &no_intercept, "cat dog").unwrap_err();
    assert!(matches!(err, Error::Classifier(_)));
}

const WORDS: &[&str] = &["cat", "dog", "bird", "fish", "zzz", "Cat", "DOG"];

fn text_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..12).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn prop_outputs_match_inputs(texts in prop::collection::vec(text_strategy(), 1..6)) {
        let (vectorizer, classifier) = pets_model();
        let known = |t: &String| {
            t.split_whitespace()
                .any(|w| matches!(w.to_lowercase().as_str(), "cat" | "dog"))
        };
        let all_known = texts.iter().all(known);

        let outcome = Classify::with_parts(&vectorizer, &classifier, texts.clone());

        if !all_known {
            prop_assert!(matches!(outcome, Err(Error::TokenNotFound)));
            return Ok(());
        }

        let result = outcome.unwrap();
        prop_assert_eq!(result.word_list().len(), texts.len());
        prop_assert_eq!(result.probability().n_rows(), texts.len());

        for words in result.word_list() {
            prop_assert!(!words.is_empty());
            prop_assert!(words.iter().all(|w| w.weight != 0.0));
            prop_assert!(words.windows(2).all(|pair| pair[0].weight >= pair[1].weight));
        }
        for row in result.probability().rows() {
            let total: f64 = row.iter().sum();
            prop_assert!((total - 1.0).abs() < 1e-9);
        }
    }
}
