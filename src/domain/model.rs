use crate::sentiment::Sentiment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as returned by the search API, stored in `whoosh_raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub tweet_id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub lang: String,
}

/// Row of `whoosh_clean`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanPost {
    pub tweet_id: String,
    pub text_original: String,
    pub text_clean: String,
    pub text_hash: String,
    pub lang: String,
    pub created_at: DateTime<Utc>,
}

/// Row of `whoosh_analysis`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPost {
    pub tweet_id: String,
    pub text_clean: String,
    pub sentiment: Sentiment,
    pub score: f64,
    pub lang: String,
    pub created_at: DateTime<Utc>,
}

/// Row of `kaggle_whoosh`, the imported external dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPost {
    pub created_at: DateTime<Utc>,
    pub text: String,
    pub lang: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentSummary {
    pub fn from_posts(posts: &[AnalyzedPost]) -> Self {
        posts.iter().fold(Self::default(), |mut summary, post| {
            summary.record(post.sentiment);
            summary
        })
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectReport {
    pub posts_fetched: usize,
    pub requests_made: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessReport {
    pub kept: usize,
    pub duplicates_removed: usize,
}

/// Output of the transform step: cleaned and scored posts.
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub clean_posts: Vec<CleanPost>,
    pub analyzed_posts: Vec<AnalyzedPost>,
    pub preprocess: PreprocessReport,
    pub summary: SentimentSummary,
}
