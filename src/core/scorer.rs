use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::baseline::{NaiveBayesPolarity, PolarityEstimator};
use super::lexicon::{Lexicon, ValenceTier, AROUSAL_DEFAULT_BAND};

/// Low-arousal triggers are only consulted while arousal is below this
const LOW_AROUSAL_CEILING: f64 = 0.7;

/// Value used when the baseline estimator cannot score a text
pub const NEUTRAL_VALENCE: f64 = 0.5;

const EXCERPT_CHARS: usize = 20;

/// Winning valence tier and the trigger that selected it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValenceMatch {
    pub tier: ValenceTier,
    pub trigger: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArousalLevel {
    High,
    Moderate,
    Low,
}

/// One point of the valence/arousal scatter
#[derive(Debug, Clone, Serialize)]
pub struct ScoreSample {
    pub valence: f64,
    pub arousal: f64,
    pub excerpt: String,
}

/// Full breakdown of how a single text was scored
#[derive(Debug, Clone, Serialize)]
pub struct AffectExplanation {
    pub valence: f64,
    pub valence_tier: ValenceTier,
    pub valence_trigger: Option<String>,
    pub arousal: f64,
    pub arousal_level: ArousalLevel,
    pub arousal_trigger: Option<String>,
}

/// Scores each post on valence and arousal, jittered inside fixed bands.
/// The random source is always supplied by the caller.
pub struct AffectScorer {
    lexicon: Lexicon,
    estimator: Box<dyn PolarityEstimator>,
}

impl AffectScorer {
    pub fn new(lexicon: Lexicon, estimator: Box<dyn PolarityEstimator>) -> Self {
        Self { lexicon, estimator }
    }

    /// Scorer whose fallback is a naive Bayes model trained on the
    /// lexicon's baseline sentences
    pub fn with_baseline(lexicon: Lexicon) -> Self {
        let estimator = NaiveBayesPolarity::from_samples(lexicon.baseline());
        Self::new(lexicon, Box::new(estimator))
    }

    /// Walk the valence rules in priority order; first hit wins
    pub fn classify_valence(&self, text: &str) -> ValenceMatch {
        let lowered = text.to_lowercase();
        self.lexicon
            .valence_rules()
            .iter()
            .find_map(|rule| {
                rule.category.first_match(&lowered).map(|t| ValenceMatch {
                    tier: rule.tier,
                    trigger: Some(t.to_string()),
                })
            })
            .unwrap_or(ValenceMatch {
                tier: ValenceTier::Neutral,
                trigger: None,
            })
    }

    pub fn score_valence<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> f64 {
        let tier = self.classify_valence(text).tier;
        self.draw_valence(tier, text, rng)
    }

    fn draw_valence<R: Rng + ?Sized>(&self, tier: ValenceTier, text: &str, rng: &mut R) -> f64 {
        match tier {
            ValenceTier::Neutral => self.baseline_valence(text),
            tier => tier.band().sample(rng),
        }
    }

    /// Baseline estimate squeezed into the neutral band
    fn baseline_valence(&self, text: &str) -> f64 {
        match self.estimator.estimate(text) {
            Ok(raw) if raw.is_finite() => ValenceTier::Neutral.band().compress(raw),
            Ok(raw) => {
                debug!(raw, "baseline returned a non-finite score, using neutral");
                NEUTRAL_VALENCE
            }
            Err(e) => {
                debug!(error = %e, "baseline failed, using neutral");
                NEUTRAL_VALENCE
            }
        }
    }

    pub fn score_arousal<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> f64 {
        self.arousal_with_trigger(text, rng).0
    }

    fn arousal_with_trigger<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> (f64, ArousalLevel, Option<String>) {
        let lowered = text.to_lowercase();
        let high = self.lexicon.high_arousal();
        let low = self.lexicon.low_arousal();

        let mut arousal = AROUSAL_DEFAULT_BAND.sample(rng);
        let mut level = ArousalLevel::Moderate;
        let mut trigger = None;

        if let Some(t) = high.first_match(&lowered) {
            arousal = high.band.sample(rng);
            level = ArousalLevel::High;
            trigger = Some(t.to_string());
        }

        // A high match can never be overridden by a low one
        if arousal < LOW_AROUSAL_CEILING {
            if let Some(t) = low.first_match(&lowered) {
                arousal = low.band.sample(rng);
                level = ArousalLevel::Low;
                trigger = Some(t.to_string());
            }
        }

        (arousal, level, trigger)
    }

    pub fn sample<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> ScoreSample {
        ScoreSample {
            valence: self.score_valence(text, rng),
            arousal: self.score_arousal(text, rng),
            excerpt: excerpt(text),
        }
    }

    pub fn explain<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> AffectExplanation {
        let matched = self.classify_valence(text);
        let valence = self.draw_valence(matched.tier, text, rng);
        let (arousal, arousal_level, arousal_trigger) = self.arousal_with_trigger(text, rng);

        AffectExplanation {
            valence,
            valence_tier: matched.tier,
            valence_trigger: matched.trigger,
            arousal,
            arousal_level,
            arousal_trigger,
        }
    }
}

/// Leading characters of a post for hover labels
pub fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
