// Rule-based sentiment scoring: lexicon tables, tokenizer and scorer.

pub mod lexicon;
pub mod scorer;
pub mod tokenizer;

pub use lexicon::{Lexicon, LexiconConfig, DEFAULT_LEXICON};
pub use scorer::{score_sentiment, Sentiment, SentimentScore, SentimentScorer};
