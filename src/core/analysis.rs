use crate::domain::model::{AnalyzedPost, CleanPost, SentimentSummary};
use crate::sentiment::SentimentScorer;

/// Scores every cleaned post. Calls are independent, so order only matters
/// for the order of the output rows.
pub fn analyze_posts(scorer: &SentimentScorer<'_>, posts: &[CleanPost]) -> Vec<AnalyzedPost> {
    posts
        .iter()
        .map(|post| {
            let result = scorer.score(&post.text_clean);
            tracing::debug!(
                "Post {} scored {:.2} ({})",
                post.tweet_id,
                result.score,
                result.label
            );
            AnalyzedPost {
                tweet_id: post.tweet_id.clone(),
                text_clean: post.text_clean.clone(),
                sentiment: result.label,
                score: result.score,
                lang: post.lang.clone(),
                created_at: post.created_at,
            }
        })
        .collect()
}

pub fn summarize(posts: &[AnalyzedPost]) -> SentimentSummary {
    let summary = SentimentSummary::from_posts(posts);
    tracing::info!(
        "📊 Sentiment summary: {} positive, {} negative, {} neutral",
        summary.positive,
        summary.negative,
        summary.neutral
    );
    summary
}
