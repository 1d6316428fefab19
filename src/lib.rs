pub mod core;

pub use crate::core::{
    AffectScorer, AggregateReport, CohortComparison, CommunityAnalyzer, HeartbridgeError, Lexicon,
    NewPost, Post, PostSource, PostStore, Result, Role,
};
