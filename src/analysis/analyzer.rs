use std::collections::BTreeSet;
use rust_stemmers::Algorithm;
use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{RegexTokenizer, Tokenizer};
use crate::core::error::Result;

/// Text analysis pipeline
///
/// The same analyzer must be used to build an index and to query it,
/// otherwise stems will not line up.
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: String, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name,
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Distinct stems of a query line, sorted
    pub fn query_words(&self, text: &str) -> BTreeSet<String> {
        self.analyze(text)
            .into_iter()
            .map(|token| token.text)
            .collect()
    }

    /// Regex word splitting, lowercasing and Snowball stemming
    pub fn standard(algorithm: Algorithm) -> Result<Self> {
        Ok(Analyzer::new(format!("standard_{:?}", algorithm).to_lowercase(),
                         Box::new(RegexTokenizer::new()?))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StemmerFilter::new(algorithm))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_stems_and_numbers() {
        let analyzer = Analyzer::standard(Algorithm::English).unwrap();
        let tokens = analyzer.analyze("The Foxes kept JUMPING!");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["the", "fox", "kept", "jump"]);
        assert_eq!(tokens.last().map(|t| t.position), Some(4));
    }

    #[test]
    fn case_folding_happens_in_the_lowercase_stage() {
        let tokenizer_only = Analyzer::new("raw".to_string(), Box::new(RegexTokenizer::new().unwrap()));
        let texts: Vec<String> = tokenizer_only.analyze("Fox RUNS").into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["Fox", "RUNS"]);

        let lowered = tokenizer_only.add_filter(Box::new(LowercaseFilter));
        let texts: Vec<String> = lowered.analyze("Fox RUNS").into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["fox", "runs"]);
    }

    #[test]
    fn query_words_are_sorted_and_unique() {
        let analyzer = Analyzer::standard(Algorithm::English).unwrap();
        let words: Vec<String> = analyzer.query_words("jumps fox jumping").into_iter().collect();
        assert_eq!(words, vec!["fox", "jump"]);
    }

    #[test]
    fn name_reflects_algorithm() {
        let analyzer = Analyzer::standard(Algorithm::English).unwrap();
        assert_eq!(analyzer.name, "standard_english");
    }
}
