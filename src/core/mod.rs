pub mod baseline;
pub mod error;
pub mod lexicon;
pub mod nickname;
pub mod post;
pub mod report;
pub mod scorer;
pub mod seed;
pub mod store;
pub mod tokenizer;

pub use baseline::{NaiveBayesPolarity, PolarityEstimator};
pub use error::{HeartbridgeError, Result};
pub use lexicon::{Band, Lexicon, LexiconCategory, LexiconTables, ValenceTier};
pub use post::{NewPost, Post, Role};
pub use report::{AggregateReport, Bucket, CohortComparison, CommunityAnalyzer, QuadrantCounts};
pub use scorer::{AffectExplanation, AffectScorer, ArousalLevel, ScoreSample};
pub use store::{PostSource, PostStore};
pub use tokenizer::Tokenizer;
