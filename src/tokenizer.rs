/// Longest token, in characters, that may enter the index
pub const MAX_TOKEN_LENGTH: usize = 255;

/// An accepted token in its original case, with its word offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub surface: &'a str,
    pub position: u32,
}

impl Token<'_> {
    /// The index term for this token
    pub fn term(&self) -> String {
        self.surface.to_lowercase()
    }
}

pub struct Tokenizer {
    max_token_length: usize,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::with_max_token_length(MAX_TOKEN_LENGTH)
    }

    pub fn with_max_token_length(max_token_length: usize) -> Self {
        Self { max_token_length }
    }

    /// Split on runs of whitespace and ASCII punctuation
    fn split<'a>(&self, text: &'a str) -> impl Iterator<Item = &'a str> {
        text.split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|s| !s.is_empty())
    }

    /// Whether a token is short enough to be indexed. Both the token and its
    /// lower-cased term must fit, since lower-casing can add characters
    /// (`İ` becomes `i̇`).
    pub fn accepts(&self, token: &str) -> bool {
        token.chars().count() <= self.max_token_length
            && token.chars().flat_map(char::to_lowercase).count() <= self.max_token_length
    }

    /// Accepted tokens with their offsets.
    ///
    /// Over-length tokens are dropped without consuming an offset, so positions
    /// count indexed words only.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        self.split(text)
            .filter(|token| self.accepts(token))
            .zip(0u32..)
            .map(|(surface, position)| Token { surface, position })
            .collect()
    }

    /// Lower-cased terms with offsets
    pub fn analyze(&self, text: &str) -> Vec<(String, u32)> {
        self.tokenize(text)
            .into_iter()
            .map(|token| (token.term(), token.position))
            .collect()
    }

    /// Longest raw token and its length, counting discarded ones.
    /// Ties keep the first token seen.
    pub fn longest_token<'a>(&self, text: &'a str) -> Option<(&'a str, usize)> {
        self.split(text)
            .map(|token| (token, token.chars().count()))
            .fold(None, |best, (token, len)| match best {
                Some((_, best_len)) if best_len >= len => best,
                _ => Some((token, len)),
            })
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}
