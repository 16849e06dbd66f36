use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// 正面詞彙（印尼文 + 英文）
const POSITIVE_WORDS: &[&str] = &[
    "bagus", "cepat", "nyaman", "canggih", "modern", "hebat", "keren", "mantap", "good", "great",
    "amazing", "excellent",
];

// 負面詞彙
const NEGATIVE_WORDS: &[&str] = &[
    "lambat", "buruk", "jelek", "mahal", "rugi", "bad", "slow", "expensive", "poor", "terrible",
];

// 強化詞：出現在情緒詞「之後」才生效
const INTENSIFIERS: &[&str] = &[
    "banget", "bgt", "sekali", "amat", "parah", "very", "really", "so", "extremely",
];

// 否定詞：出現在情緒詞「之前」才生效
const NEGATIONS: &[&str] = &[
    "tidak", "tak", "gak", "ga", "nggak", "enggak", "bukan", "belum", "not", "no", "never",
];

const CONTRASTIVE_WORDS: &[&str] = &["tapi", "tetapi", "namun", "but", "however"];

// 反諷標記以子字串比對，不是 token 比對
const SARCASM_MARKERS: &[&str] = &["?", "!", "wow", "katanya", "yeah right", "seriously"];

/// Process-wide default lexicon, built on first use and never mutated.
pub static DEFAULT_LEXICON: Lazy<Lexicon> = Lazy::new(Lexicon::default);

/// Extra words merged on top of the built-in tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconConfig {
    pub extra_positive: Option<Vec<String>>,
    pub extra_negative: Option<Vec<String>>,
    pub extra_intensifiers: Option<Vec<String>>,
    pub extra_negations: Option<Vec<String>>,
    pub extra_contrastive: Option<Vec<String>>,
    pub extra_sarcasm_markers: Option<Vec<String>>,
}

/// Word tables consulted by the scorer.
///
/// All entries are stored lowercase. Sarcasm markers keep insertion order
/// because they are matched as substrings of the raw text rather than looked
/// up as tokens.
#[derive(Debug, Clone)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    intensifiers: HashSet<String>,
    negations: HashSet<String>,
    contrastive: HashSet<String>,
    sarcasm_markers: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            positive: to_set(POSITIVE_WORDS),
            negative: to_set(NEGATIVE_WORDS),
            intensifiers: to_set(INTENSIFIERS),
            negations: to_set(NEGATIONS),
            contrastive: to_set(CONTRASTIVE_WORDS),
            sarcasm_markers: SARCASM_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl Lexicon {
    /// 以預設詞庫為基礎，加入設定檔提供的額外詞彙
    pub fn with_additions(config: &LexiconConfig) -> Self {
        let mut lexicon = Self::default();

        extend(&mut lexicon.positive, config.extra_positive.as_deref());
        extend(&mut lexicon.negative, config.extra_negative.as_deref());
        extend(&mut lexicon.intensifiers, config.extra_intensifiers.as_deref());
        extend(&mut lexicon.negations, config.extra_negations.as_deref());
        extend(&mut lexicon.contrastive, config.extra_contrastive.as_deref());

        for marker in config.extra_sarcasm_markers.iter().flatten() {
            let marker = marker.trim().to_lowercase();
            if !marker.is_empty() && !lexicon.sarcasm_markers.contains(&marker) {
                lexicon.sarcasm_markers.push(marker);
            }
        }

        tracing::debug!(
            "Lexicon built: {} positive, {} negative, {} intensifiers, {} negations",
            lexicon.positive.len(),
            lexicon.negative.len(),
            lexicon.intensifiers.len(),
            lexicon.negations.len()
        );

        lexicon
    }

    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.contains(token)
    }

    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.contains(token)
    }

    pub fn is_intensifier(&self, token: &str) -> bool {
        self.intensifiers.contains(token)
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    pub fn is_contrastive(&self, token: &str) -> bool {
        self.contrastive.contains(token)
    }

    /// True when any sarcasm marker occurs anywhere in `text`.
    pub fn has_sarcasm_marker(&self, text: &str) -> bool {
        self.sarcasm_markers.iter().any(|m| text.contains(m.as_str()))
    }

    /// True when any negative word occurs anywhere in `text`, even inside a
    /// longer word.
    pub fn has_negative_substring(&self, text: &str) -> bool {
        self.negative.iter().any(|w| text.contains(w.as_str()))
    }
}

fn to_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn extend(set: &mut HashSet<String>, extra: Option<&[String]>) {
    for word in extra.unwrap_or_default() {
        let word = word.trim().to_lowercase();
        if !word.is_empty() {
            set.insert(word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let lexicon = Lexicon::default();
        assert!(lexicon.is_positive("bagus"));
        assert!(lexicon.is_positive("excellent"));
        assert!(lexicon.is_negative("lambat"));
        assert!(lexicon.is_negative("terrible"));
        assert!(lexicon.is_negation("tidak"));
        assert!(lexicon.is_intensifier("banget"));
        assert!(lexicon.is_contrastive("tapi"));
        assert!(!lexicon.is_positive("whoosh"));
    }

    #[test]
    fn test_positive_and_negative_are_disjoint() {
        let lexicon = Lexicon::default();
        for word in POSITIVE_WORDS {
            assert!(!lexicon.is_negative(word), "{} is in both tables", word);
        }
    }

    #[test]
    fn test_sarcasm_marker_is_substring_match() {
        let lexicon = Lexicon::default();
        assert!(lexicon.has_sarcasm_marker("keren?"));
        assert!(lexicon.has_sarcasm_marker("wowww"));
        assert!(lexicon.has_sarcasm_marker("oh yeah right"));
        assert!(!lexicon.has_sarcasm_marker("biasa saja"));
    }

    #[test]
    fn test_negative_substring_inside_longer_word() {
        let lexicon = Lexicon::default();
        assert!(lexicon.has_negative_substring("main badminton"));
        assert!(!lexicon.has_negative_substring("keren banget"));
    }

    #[test]
    fn test_with_additions_lowercases_and_merges() {
        let config = LexiconConfig {
            extra_positive: Some(vec!["Mantul".to_string(), "  ".to_string()]),
            extra_negative: Some(vec!["telat".to_string()]),
            extra_sarcasm_markers: Some(vec!["wkwk".to_string(), "?".to_string()]),
            ..Default::default()
        };

        let lexicon = Lexicon::with_additions(&config);
        assert!(lexicon.is_positive("mantul"));
        assert!(lexicon.is_positive("bagus"));
        assert!(lexicon.is_negative("telat"));
        assert!(!lexicon.is_positive(""));
        assert!(lexicon.has_sarcasm_marker("wkwk"));
        assert_eq!(
            lexicon.sarcasm_markers.iter().filter(|m| m.as_str() == "?").count(),
            1
        );
    }

    #[test]
    fn test_blank_sarcasm_markers_are_ignored() {
        let config = LexiconConfig {
            extra_sarcasm_markers: Some(vec![" ".to_string(), " ! ".to_string()]),
            ..Default::default()
        };

        let lexicon = Lexicon::with_additions(&config);
        assert!(!lexicon.has_sarcasm_marker("biasa saja"));
        assert!(lexicon.sarcasm_markers.iter().all(|m| m.trim() == m.as_str()));
        assert_eq!(
            lexicon.sarcasm_markers.iter().filter(|m| m.as_str() == "!").count(),
            1
        );
    }

    #[test]
    fn test_default_lexicon_static() {
        assert!(DEFAULT_LEXICON.is_positive("keren"));
    }
}
