use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use super::error::{HeartbridgeError, Result};

const BUILTIN_LEXICON: &str = include_str!("../../assets/lexicon.json");

const DEFAULT_STOP_WORDS: &[&str] = &[
    "的", "了", "在", "是", "我", "你", "他", "它", "们", "这", "那", "都", "就", "也", "不",
];

/// Closed sub-range of [0, 1] a score is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

impl Band {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Uniform draw inside the band
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.low..=self.high)
    }

    /// Map a raw value in [0, 1] linearly onto the band
    pub fn compress(&self, raw: f64) -> f64 {
        (self.low + raw.clamp(0.0, 1.0) * (self.high - self.low)).min(self.high)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

pub const AROUSAL_DEFAULT_BAND: Band = Band::new(0.4, 0.6);
pub const AROUSAL_HIGH_BAND: Band = Band::new(0.75, 0.95);
pub const AROUSAL_LOW_BAND: Band = Band::new(0.1, 0.3);

/// Valence category. The first four carry triggers; `Neutral` is the
/// fallback when none of them match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValenceTier {
    ExtremeNegative,
    ExtremePositive,
    MildNegative,
    MildPositive,
    Neutral,
}

impl ValenceTier {
    /// Evaluation order of the trigger tiers. First match wins.
    pub const PRIORITY: [ValenceTier; 4] = [
        ValenceTier::ExtremeNegative,
        ValenceTier::ExtremePositive,
        ValenceTier::MildNegative,
        ValenceTier::MildPositive,
    ];

    pub fn band(&self) -> Band {
        match self {
            ValenceTier::ExtremeNegative => Band::new(0.05, 0.15),
            ValenceTier::ExtremePositive => Band::new(0.85, 0.95),
            ValenceTier::MildNegative => Band::new(0.25, 0.35),
            ValenceTier::MildPositive => Band::new(0.65, 0.75),
            ValenceTier::Neutral => Band::new(0.4, 0.6),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValenceTier::ExtremeNegative => "extreme_negative",
            ValenceTier::ExtremePositive => "extreme_positive",
            ValenceTier::MildNegative => "mild_negative",
            ValenceTier::MildPositive => "mild_positive",
            ValenceTier::Neutral => "neutral",
        }
    }
}

/// A named trigger list with the band it maps to
#[derive(Debug, Clone)]
pub struct LexiconCategory {
    pub name: String,
    triggers: Vec<String>,
    pub band: Band,
}

impl LexiconCategory {
    fn new(name: &str, triggers: Vec<String>, band: Band) -> Result<Self> {
        if triggers.is_empty() {
            return Err(HeartbridgeError::Lexicon(format!(
                "category '{}' has no triggers",
                name
            )));
        }

        let mut normalized = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            let trigger = trigger.trim().to_lowercase();
            if trigger.is_empty() {
                return Err(HeartbridgeError::Lexicon(format!(
                    "category '{}' contains a blank trigger",
                    name
                )));
            }
            normalized.push(trigger);
        }

        Ok(Self {
            name: name.to_string(),
            triggers: normalized,
            band,
        })
    }

    /// First trigger contained in `lowered` (already lower-cased text)
    pub fn first_match(&self, lowered: &str) -> Option<&str> {
        self.triggers
            .iter()
            .find(|t| lowered.contains(t.as_str()))
            .map(String::as_str)
    }
}

/// One entry of the valence priority chain
#[derive(Debug, Clone)]
pub struct ValenceRule {
    pub tier: ValenceTier,
    pub category: LexiconCategory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValenceTables {
    #[serde(default)]
    pub extreme_negative: Vec<String>,
    #[serde(default)]
    pub extreme_positive: Vec<String>,
    #[serde(default)]
    pub mild_negative: Vec<String>,
    #[serde(default)]
    pub mild_positive: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArousalTables {
    #[serde(default)]
    pub high: Vec<String>,
    #[serde(default)]
    pub low: Vec<String>,
}

/// Labelled sentences the baseline estimator is trained on
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineSamples {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
}

/// On-disk shape of a lexicon file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconTables {
    pub valence: ValenceTables,
    pub arousal: ArousalTables,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_words: Option<Vec<String>>,
    #[serde(default)]
    pub baseline: BaselineSamples,
}

/// Validated, immutable lexicon
#[derive(Debug, Clone)]
pub struct Lexicon {
    valence_rules: Vec<ValenceRule>,
    high_arousal: LexiconCategory,
    low_arousal: LexiconCategory,
    stop_words: HashSet<String>,
    baseline: BaselineSamples,
}

impl Lexicon {
    /// The lexicon compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LEXICON)
    }

    /// Load a lexicon file. Any problem here is fatal for the caller.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeartbridgeError::Lexicon(format!("cannot read {}: {}", path.display(), e))
        })?;
        let lexicon = Self::from_json(&content)?;
        debug!(path = %path.display(), "loaded lexicon");
        Ok(lexicon)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let tables: LexiconTables = serde_json::from_str(content)
            .map_err(|e| HeartbridgeError::Lexicon(format!("malformed lexicon: {}", e)))?;
        Self::from_tables(tables)
    }

    pub fn from_tables(tables: LexiconTables) -> Result<Self> {
        let LexiconTables {
            valence,
            arousal,
            stop_words,
            baseline,
        } = tables;

        // Same order as ValenceTier::PRIORITY
        let tiers = [
            (ValenceTier::ExtremeNegative, valence.extreme_negative),
            (ValenceTier::ExtremePositive, valence.extreme_positive),
            (ValenceTier::MildNegative, valence.mild_negative),
            (ValenceTier::MildPositive, valence.mild_positive),
        ];

        let mut valence_rules = Vec::with_capacity(tiers.len());
        for (tier, triggers) in tiers {
            valence_rules.push(ValenceRule {
                tier,
                category: LexiconCategory::new(tier.name(), triggers, tier.band())?,
            });
        }

        let high_arousal = LexiconCategory::new("high_arousal", arousal.high, AROUSAL_HIGH_BAND)?;
        let low_arousal = LexiconCategory::new("low_arousal", arousal.low, AROUSAL_LOW_BAND)?;

        let stop_words = match stop_words {
            Some(words) => words.into_iter().map(|w| w.trim().to_lowercase()).collect(),
            None => DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
        };

        Ok(Self {
            valence_rules,
            high_arousal,
            low_arousal,
            stop_words,
            baseline,
        })
    }

    /// Valence rules in priority order
    pub fn valence_rules(&self) -> &[ValenceRule] {
        &self.valence_rules
    }

    pub fn high_arousal(&self) -> &LexiconCategory {
        &self.high_arousal
    }

    pub fn low_arousal(&self) -> &LexiconCategory {
        &self.low_arousal
    }

    pub fn stop_words(&self) -> &HashSet<String> {
        &self.stop_words
    }

    pub fn baseline(&self) -> &BaselineSamples {
        &self.baseline
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Small English lexicon: awful / wonderful / tired / hope, "!" / sleep
    pub(crate) fn synthetic_tables() -> LexiconTables {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();
        LexiconTables {
            valence: ValenceTables {
                extreme_negative: words(&["awful"]),
                extreme_positive: words(&["wonderful"]),
                mild_negative: words(&["tired"]),
                mild_positive: words(&["hope"]),
            },
            arousal: ArousalTables {
                high: words(&["!"]),
                low: words(&["sleep"]),
            },
            stop_words: None,
            baseline: BaselineSamples::default(),
        }
    }

    pub(crate) fn synthetic_lexicon() -> Lexicon {
        Lexicon::from_tables(synthetic_tables()).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::synthetic_tables;
    use super::*;

    #[test]
    fn test_builtin_lexicon_loads() {
        let lexicon = Lexicon::builtin().unwrap();
        let tiers: Vec<_> = lexicon.valence_rules().iter().map(|r| r.tier).collect();
        assert_eq!(tiers, ValenceTier::PRIORITY.to_vec());
        assert!(lexicon.stop_words().contains("的"));
        assert!(!lexicon.baseline().positive.is_empty());
    }

    #[test]
    fn test_missing_category_is_fatal() {
        let mut tables = synthetic_tables();
        tables.valence.mild_positive.clear();
        let err = Lexicon::from_tables(tables).unwrap_err();
        assert!(matches!(err, HeartbridgeError::Lexicon(msg) if msg.contains("mild_positive")));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        assert!(matches!(
            Lexicon::from_json("{\"valence\": 3}"),
            Err(HeartbridgeError::Lexicon(_))
        ));
        assert!(matches!(
            Lexicon::from_json("not json"),
            Err(HeartbridgeError::Lexicon(_))
        ));
    }

    #[test]
    fn test_blank_trigger_rejected() {
        let mut tables = synthetic_tables();
        tables.arousal.low.push("   ".to_string());
        assert!(Lexicon::from_tables(tables).is_err());
    }

    #[test]
    fn test_triggers_are_lowercased() {
        let mut tables = synthetic_tables();
        tables.valence.extreme_positive = vec!["Wonderful".to_string()];
        let lexicon = Lexicon::from_tables(tables).unwrap();
        let rule = &lexicon.valence_rules()[1];
        assert_eq!(rule.category.first_match("a wonderful day"), Some("wonderful"));
    }

    #[test]
    fn test_band_compress() {
        let band = ValenceTier::Neutral.band();
        assert_eq!(band.compress(0.0), 0.4);
        assert_eq!(band.compress(1.0), 0.6);
        assert!((band.compress(0.5) - 0.5).abs() < 1e-12);
        assert_eq!(band.compress(7.0), band.high);
    }
}
