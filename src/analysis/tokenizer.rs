use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use crate::analysis::token::Token;
use crate::core::error::Result;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;

    fn name(&self) -> &str;
}

/// Everything that is neither a letter nor whitespace: digits, punctuation,
/// and the combining marks left behind by NFD decomposition.
const CLEAN_PATTERN: &str = r"[^\p{Alphabetic}\p{White_Space}]+";

/// Splits text into alphabetic words, keeping their case.
///
/// The text is decomposed (NFD) so accented letters lose their diacritics,
/// stripped of non-alphabetic characters, and split on Unicode whitespace.
/// Positions start at 1. Case folding is left to [`LowercaseFilter`].
///
/// [`LowercaseFilter`]: crate::analysis::filters::lowercase::LowercaseFilter
#[derive(Debug, Clone)]
pub struct RegexTokenizer {
    clean: Regex,
}

impl RegexTokenizer {
    pub fn new() -> Result<Self> {
        Ok(RegexTokenizer {
            clean: Regex::new(CLEAN_PATTERN)?,
        })
    }

    /// Cleaned words without positions
    pub fn words(&self, text: &str) -> Vec<String> {
        let decomposed: String = text.nfd().collect();
        let cleaned = self.clean.replace_all(&decomposed, "");

        cleaned
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

impl Tokenizer for RegexTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.words(text)
            .into_iter()
            .enumerate()
            .map(|(i, word)| Token::new(word, i + 1))
            .collect()
    }

    fn name(&self) -> &str {
        "regex"
    }
}
