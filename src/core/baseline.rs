use std::collections::HashMap;
use tracing::{debug, warn};

use super::error::{HeartbridgeError, Result};
use super::lexicon::BaselineSamples;

/// Anything that can estimate how positive a text is, as a probability in [0, 1].
pub trait PolarityEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> Result<f64>;
}

impl<F> PolarityEstimator for F
where
    F: Fn(&str) -> Result<f64> + Send + Sync,
{
    fn estimate(&self, text: &str) -> Result<f64> {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Polarity {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Default)]
struct ClassModel {
    log_prior: f64,
    log_likelihood: HashMap<String, f64>,
}

/// Multinomial naive Bayes over character unigrams and bigrams.
///
/// Character n-grams keep it script-agnostic: no segmenter is needed for
/// Han text, and latin text still yields useful bigrams.
#[derive(Debug, Clone)]
pub struct NaiveBayesPolarity {
    alpha: f64,
    positive: ClassModel,
    negative: ClassModel,
    trained: bool,
}

impl Default for NaiveBayesPolarity {
    fn default() -> Self {
        Self::new()
    }
}

impl NaiveBayesPolarity {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            positive: ClassModel::default(),
            negative: ClassModel::default(),
            trained: false,
        }
    }

    /// Train from the lexicon's labelled sentences. With either class empty
    /// the model stays untrained and every estimate fails.
    pub fn from_samples(samples: &BaselineSamples) -> Self {
        let mut model = Self::new();
        if samples.positive.is_empty() || samples.negative.is_empty() {
            warn!("baseline samples incomplete, neutral fallback will be used for unmatched posts");
            return model;
        }
        model.fit(&samples.positive, &samples.negative);
        model
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    pub fn fit(&mut self, positive: &[String], negative: &[String]) {
        let labelled = positive
            .iter()
            .map(|t| (t, Polarity::Positive))
            .chain(negative.iter().map(|t| (t, Polarity::Negative)));

        let mut counts: HashMap<Polarity, HashMap<String, usize>> = HashMap::new();
        let mut totals: HashMap<Polarity, usize> = HashMap::new();
        let mut vocabulary: std::collections::HashSet<String> = std::collections::HashSet::new();

        for (text, polarity) in labelled {
            let class_counts = counts.entry(polarity).or_default();
            for feature in features(text) {
                *class_counts.entry(feature.clone()).or_insert(0) += 1;
                *totals.entry(polarity).or_insert(0) += 1;
                vocabulary.insert(feature);
            }
        }

        let doc_total = (positive.len() + negative.len()) as f64;
        let vocab_size = vocabulary.len() as f64;

        for (polarity, docs) in [
            (Polarity::Positive, positive.len()),
            (Polarity::Negative, negative.len()),
        ] {
            let class_counts = counts.remove(&polarity).unwrap_or_default();
            let total = *totals.get(&polarity).unwrap_or(&0) as f64;
            let denominator = total + self.alpha * vocab_size;

            let log_likelihood = vocabulary
                .iter()
                .map(|feature| {
                    let count = *class_counts.get(feature).unwrap_or(&0) as f64;
                    (feature.clone(), ((count + self.alpha) / denominator).ln())
                })
                .collect();

            let model = ClassModel {
                log_prior: (docs as f64 / doc_total).ln(),
                log_likelihood,
            };
            match polarity {
                Polarity::Positive => self.positive = model,
                Polarity::Negative => self.negative = model,
            }
        }

        self.trained = true;
        debug!(vocabulary = vocabulary.len(), "baseline polarity model trained");
    }

    fn log_score(model: &ClassModel, features: &[String]) -> f64 {
        // Unseen features carry no evidence either way
        features
            .iter()
            .filter_map(|f| model.log_likelihood.get(f))
            .fold(model.log_prior, |acc, lp| acc + lp)
    }
}

impl PolarityEstimator for NaiveBayesPolarity {
    fn estimate(&self, text: &str) -> Result<f64> {
        if !self.trained {
            return Err(HeartbridgeError::Estimator("model not trained".to_string()));
        }

        let features = features(text);
        if features.is_empty() {
            return Err(HeartbridgeError::Estimator(
                "no usable characters in text".to_string(),
            ));
        }

        let pos = Self::log_score(&self.positive, &features);
        let neg = Self::log_score(&self.negative, &features);

        // Two-class softmax
        let max = pos.max(neg);
        let pos_exp = (pos - max).exp();
        let neg_exp = (neg - max).exp();
        Ok(pos_exp / (pos_exp + neg_exp))
    }
}

/// Lower-cased alphanumeric character unigrams and bigrams
fn features(text: &str) -> Vec<String> {
    let chars: Vec<char> = text
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    let mut out: Vec<String> = chars.iter().map(|c| c.to_string()).collect();
    out.extend(chars.windows(2).map(|w| w.iter().collect::<String>()));
    out
}
