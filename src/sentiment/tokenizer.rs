/// Splits already-cleaned text into lowercase whitespace tokens.
///
/// No stemming and no punctuation stripping: `"banget?"` stays a single token
/// distinct from `"banget"`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
