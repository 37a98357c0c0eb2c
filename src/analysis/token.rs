/// Token representation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,      // Normalised (and, after filtering, stemmed) word
    pub position: usize,   // 1-based position within the analysed text
}

impl Token {
    pub fn new(text: String, position: usize) -> Self {
        Token { text, position }
    }
}
