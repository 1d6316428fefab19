use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::error::Result;
use super::lexicon::Lexicon;
use super::post::{Post, Role};
use super::scorer::{AffectScorer, ScoreSample};
use super::store::PostSource;
use super::tokenizer::{top_words, Tokenizer};

/// Posts scoring below this count towards the anxiety rate
pub const ANXIETY_THRESHOLD: f64 = 0.4;

/// Mean valence reported for an empty corpus
pub const EMPTY_MEAN_VALENCE: f64 = 0.5;

pub const DEFAULT_TOP_WORDS: usize = 100;

pub const BUCKET_LABELS: [&str; 5] = ["anxious", "troubled", "neutral", "hopeful", "warm"];

/// Axis split used for quadrant counts
const QUADRANT_SPLIT: f64 = 0.5;

/// One bar of the valence histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: &'static str,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl Bucket {
    pub fn range_label(&self) -> String {
        format!("{:.1}-{:.1}", self.lower, self.upper)
    }
}

/// Posts per region of the valence/arousal plane
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuadrantCounts {
    /// negative and agitated: anxious, angry
    pub tense: usize,
    /// positive and agitated: excited, happy
    pub excited: usize,
    /// negative and calm: low, tired
    pub weary: usize,
    /// positive and calm: relaxed, at ease
    pub calm: usize,
}

impl QuadrantCounts {
    fn record(&mut self, sample: &ScoreSample) {
        let positive = sample.valence >= QUADRANT_SPLIT;
        let agitated = sample.arousal >= QUADRANT_SPLIT;
        match (positive, agitated) {
            (false, true) => self.tense += 1,
            (true, true) => self.excited += 1,
            (false, false) => self.weary += 1,
            (true, false) => self.calm += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateReport {
    pub post_count: usize,
    pub mean_valence: f64,
    pub anxiety_rate: f64,
    pub histogram: Vec<Bucket>,
    pub word_frequencies: Vec<(String, usize)>,
    pub samples: Vec<ScoreSample>,
    pub quadrants: QuadrantCounts,
}

impl AggregateReport {
    /// Report for a corpus with no posts
    pub fn empty() -> Self {
        Self {
            post_count: 0,
            mean_valence: EMPTY_MEAN_VALENCE,
            anxiety_rate: 0.0,
            histogram: histogram(&[]),
            word_frequencies: Vec::new(),
            samples: Vec::new(),
            quadrants: QuadrantCounts::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.post_count == 0
    }

    /// Mean valence as a whole percentage (truncated)
    pub fn warmth_index(&self) -> i64 {
        (self.mean_valence * 100.0).trunc() as i64
    }

    /// Warmth relative to a neutral 50%
    pub fn warmth_delta(&self) -> i64 {
        self.warmth_index() - 50
    }

    pub fn anxiety_percent(&self) -> i64 {
        (self.anxiety_rate * 100.0).trunc() as i64
    }
}

/// Overall report plus one report per cohort
#[derive(Debug, Clone, Serialize)]
pub struct CohortComparison {
    pub overall: AggregateReport,
    pub by_role: BTreeMap<Role, AggregateReport>,
}

impl CohortComparison {
    /// Report for a role given by name; unknown names get an empty report
    pub fn for_role(&self, name: &str) -> AggregateReport {
        name.parse::<Role>()
            .ok()
            .and_then(|role| self.by_role.get(&role).cloned())
            .unwrap_or_else(AggregateReport::empty)
    }
}

/// Five equal-width bins over [0, 1], always all five
pub fn histogram(valences: &[f64]) -> Vec<Bucket> {
    let width = 1.0 / BUCKET_LABELS.len() as f64;
    let mut buckets: Vec<Bucket> = BUCKET_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| Bucket {
            label: *label,
            lower: i as f64 * width,
            upper: (i + 1) as f64 * width,
            count: 0,
        })
        .collect();

    let last = buckets.len() - 1;
    for v in valences {
        let idx = ((v.clamp(0.0, 1.0) / width).floor() as usize).min(last);
        buckets[idx].count += 1;
    }
    buckets
}

/// Scores posts and derives the dashboard metrics
pub struct CommunityAnalyzer {
    scorer: AffectScorer,
    tokenizer: Tokenizer,
    top_words: usize,
}

impl CommunityAnalyzer {
    pub fn new(scorer: AffectScorer, tokenizer: Tokenizer) -> Self {
        Self {
            scorer,
            tokenizer,
            top_words: DEFAULT_TOP_WORDS,
        }
    }

    /// Analyzer with the naive Bayes fallback and the lexicon's stop words
    pub fn from_lexicon(lexicon: Lexicon) -> Self {
        let tokenizer = Tokenizer::from_lexicon(&lexicon);
        Self::new(AffectScorer::with_baseline(lexicon), tokenizer)
    }

    pub fn with_top_words(mut self, n: usize) -> Self {
        self.top_words = n;
        self
    }

    pub fn scorer(&self) -> &AffectScorer {
        &self.scorer
    }

    pub fn aggregate<R: Rng + ?Sized>(&self, posts: &[Post], rng: &mut R) -> AggregateReport {
        if posts.is_empty() {
            debug!("empty corpus, returning empty report");
            return AggregateReport::empty();
        }

        let samples: Vec<ScoreSample> = posts
            .iter()
            .map(|p| self.scorer.sample(&p.content, rng))
            .collect();

        let valences: Vec<f64> = samples.iter().map(|s| s.valence).collect();
        let total = valences.len() as f64;
        let mean_valence = valences.iter().sum::<f64>() / total;
        let anxious = valences.iter().filter(|v| **v < ANXIETY_THRESHOLD).count();

        let mut quadrants = QuadrantCounts::default();
        for sample in &samples {
            quadrants.record(sample);
        }

        let freqs = self
            .tokenizer
            .word_frequencies(posts.iter().map(|p| p.content.as_str()));

        let report = AggregateReport {
            post_count: posts.len(),
            mean_valence,
            anxiety_rate: anxious as f64 / total,
            histogram: histogram(&valences),
            word_frequencies: top_words(&freqs, self.top_words),
            samples,
            quadrants,
        };

        debug!(
            posts = report.post_count,
            mean_valence = report.mean_valence,
            anxiety_rate = report.anxiety_rate,
            "aggregated corpus"
        );
        report
    }

    /// Aggregate overall and per cohort; each partition is scored on its own
    pub fn compare<R: Rng + ?Sized>(&self, posts: &[Post], rng: &mut R) -> CohortComparison {
        let overall = self.aggregate(posts, rng);

        let by_role = Role::ALL
            .iter()
            .map(|role| {
                let subset: Vec<Post> = posts
                    .iter()
                    .filter(|p| p.author_role == *role)
                    .cloned()
                    .collect();
                (*role, self.aggregate(&subset, rng))
            })
            .collect();

        CohortComparison { overall, by_role }
    }

    /// Fetch a fresh snapshot and aggregate it, optionally for one cohort
    pub fn report<S, R>(&self, source: &S, role: Option<Role>, rng: &mut R) -> Result<AggregateReport>
    where
        S: PostSource + ?Sized,
        R: Rng + ?Sized,
    {
        let posts = match role {
            Some(role) => source.list_posts_by_role(role)?,
            None => source.list_posts()?,
        };
        info!(posts = posts.len(), role = ?role, "building report");
        Ok(self.aggregate(&posts, rng))
    }

    pub fn compare_source<S, R>(&self, source: &S, rng: &mut R) -> Result<CohortComparison>
    where
        S: PostSource + ?Sized,
        R: Rng + ?Sized,
    {
        let posts = source.list_posts()?;
        info!(posts = posts.len(), "building cohort comparison");
        Ok(self.compare(&posts, rng))
    }
}
