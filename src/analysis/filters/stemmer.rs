use rust_stemmers::{Algorithm, Stemmer};
use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;

/// Reduces every token to its Snowball stem; positions are untouched.
pub struct StemmerFilter {
    pub algorithm: Algorithm,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter { algorithm }
    }
}

impl TokenFilter for StemmerFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        let stemmer = Stemmer::create(self.algorithm);

        tokens.into_iter()
            .map(|mut token| {
                token.text = stemmer.stem(&token.text).into_owned();
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "stemmer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem_all(words: &[&str]) -> Vec<String> {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| Token::new(w.to_string(), i + 1))
            .collect();
        StemmerFilter::new(Algorithm::English)
            .filter(tokens)
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn english_stems() {
        assert_eq!(stem_all(&["jumps", "jumping", "runs"]), vec!["jump", "jump", "run"]);
    }

    #[test]
    fn keeps_positions() {
        let tokens = vec![Token::new("jumps".to_string(), 7)];
        let stemmed = StemmerFilter::new(Algorithm::English).filter(tokens);
        assert_eq!(stemmed[0], Token::new("jump".to_string(), 7));
    }
}
