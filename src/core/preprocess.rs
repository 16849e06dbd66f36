use crate::domain::model::{CleanPost, PreprocessReport, RawPost};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").expect("valid url pattern"));
static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\w+").expect("valid mention pattern"));
static WHITESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Strips URLs, @-mentions and `#`, collapses whitespace and lower-cases.
pub fn clean_text(text: &str) -> String {
    let text = URL_PATTERN.replace_all(text, "");
    let text = MENTION_PATTERN.replace_all(&text, "");
    let text = text.replace('#', "");
    let text = WHITESPACE_PATTERN.replace_all(&text, " ");
    text.trim().to_lowercase()
}

/// Hex MD5 of the cleaned text, used as the duplicate key.
pub fn text_hash(text_clean: &str) -> String {
    format!("{:x}", md5::compute(text_clean.as_bytes()))
}

/// 清理並以雜湊去重，保留第一次出現的貼文
pub fn clean_and_dedup(posts: Vec<RawPost>) -> (Vec<CleanPost>, PreprocessReport) {
    let total = posts.len();
    let mut seen = HashSet::new();
    let mut clean_posts = Vec::with_capacity(total);

    for post in posts {
        let text_clean = clean_text(&post.text);
        let text_hash = text_hash(&text_clean);

        if !seen.insert(text_hash.clone()) {
            tracing::debug!("Dropping duplicate post {}", post.tweet_id);
            continue;
        }

        clean_posts.push(CleanPost {
            tweet_id: post.tweet_id,
            text_original: post.text,
            text_clean,
            text_hash,
            lang: post.lang,
            created_at: post.created_at,
        });
    }

    let report = PreprocessReport {
        kept: clean_posts.len(),
        duplicates_removed: total - clean_posts.len(),
    };
    tracing::info!(
        "🧹 Preprocessed {} posts. Removed {} duplicates.",
        report.kept,
        report.duplicates_removed
    );

    (clean_posts, report)
}
