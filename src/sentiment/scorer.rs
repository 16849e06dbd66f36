use crate::sentiment::lexicon::{Lexicon, DEFAULT_LEXICON};
use crate::sentiment::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::fmt;

const POSITIVE_WEIGHT: f64 = 0.8;
const NEGATIVE_WEIGHT: f64 = -1.5;

// 否定正面詞會「過度修正」，否定負面詞只是翻轉符號
const NEGATED_POSITIVE_FACTOR: f64 = -1.5;
const NEGATED_NEGATIVE_FACTOR: f64 = -1.0;

const POSITIVE_INTENSIFIER_FACTOR: f64 = 1.4;
const NEGATIVE_INTENSIFIER_FACTOR: f64 = 1.5;

const SARCASM_PENALTY: f64 = 1.0;
const CONTRASTIVE_POSITIVE_BONUS: f64 = 0.5;
const CONTRASTIVE_NEGATIVE_PENALTY: f64 = 1.0;

pub const POSITIVE_THRESHOLD: f64 = 0.5;
pub const NEGATIVE_THRESHOLD: f64 = -0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// `score > 0.5` is positive, `score < -0.3` is negative, anything in
    /// between is neutral.
    pub fn from_score(score: f64) -> Self {
        if score > POSITIVE_THRESHOLD {
            Sentiment::Positive
        } else if score < NEGATIVE_THRESHOLD {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: Sentiment,
    pub score: f64,
}

/// Rule-based scorer over a borrowed, immutable [`Lexicon`].
#[derive(Debug, Clone, Copy)]
pub struct SentimentScorer<'a> {
    lexicon: &'a Lexicon,
}

impl Default for SentimentScorer<'static> {
    fn default() -> Self {
        Self::new(&DEFAULT_LEXICON)
    }
}

impl<'a> SentimentScorer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn score(&self, text: &str) -> SentimentScore {
        let raw = text.to_lowercase();
        let tokens = tokenize(&raw);

        let mut score = self.token_score(&tokens);

        if self.lexicon.has_sarcasm_marker(&raw) && self.lexicon.has_negative_substring(&raw) {
            score -= SARCASM_PENALTY;
        }

        score += self.contrastive_score(&tokens);

        SentimentScore {
            label: Sentiment::from_score(score),
            score,
        }
    }

    fn token_score(&self, tokens: &[String]) -> f64 {
        let mut score = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let prev = i.checked_sub(1).and_then(|p| tokens.get(p));
            let next = tokens.get(i + 1);
            let negated = prev.is_some_and(|t| self.lexicon.is_negation(t));
            let intensified = next.is_some_and(|t| self.lexicon.is_intensifier(t));

            if self.lexicon.is_positive(token) {
                let mut local = POSITIVE_WEIGHT;
                if negated {
                    local *= NEGATED_POSITIVE_FACTOR;
                }
                if intensified {
                    local *= POSITIVE_INTENSIFIER_FACTOR;
                }
                score += local;
            } else if self.lexicon.is_negative(token) {
                let mut local = NEGATIVE_WEIGHT;
                if negated {
                    local *= NEGATED_NEGATIVE_FACTOR;
                }
                if intensified {
                    local *= NEGATIVE_INTENSIFIER_FACTOR;
                }
                score += local;
            }
        }

        score
    }

    // 每遇到一個轉折詞，就從該詞「第一次出現」的位置之後重新掃描；
    // 重複出現的轉折詞會重複計分
    fn contrastive_score(&self, tokens: &[String]) -> f64 {
        let mut adjustment = 0.0;

        for token in tokens.iter().filter(|t| self.lexicon.is_contrastive(t)) {
            let Some(first) = tokens.iter().position(|t| t == token) else {
                continue;
            };

            for after in &tokens[first + 1..] {
                if self.lexicon.is_positive(after) {
                    adjustment += CONTRASTIVE_POSITIVE_BONUS;
                } else if self.lexicon.is_negative(after) {
                    adjustment -= CONTRASTIVE_NEGATIVE_PENALTY;
                }
            }
        }

        adjustment
    }
}

/// Scores `text` against the default lexicon.
pub fn score_sentiment(text: &str) -> SentimentScore {
    SentimentScorer::default().score(text)
}
