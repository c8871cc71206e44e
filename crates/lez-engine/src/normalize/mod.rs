//! Free-text normalisation into the token sequence the grammar consumes.
//!
//! Normalisation is deliberately lossy: case is folded, the noise
//! characters `?`, `,` and `.` are removed wherever they occur, and runs of
//! whitespace collapse into token boundaries. What remains is an ordered
//! sequence of [`Token`]s whose order carries the sentence structure.

use std::fmt;
use std::slice;

/// Characters removed from the input wherever they appear.
pub const NOISE_CHARACTERS: [char; 3] = ['?', ',', '.'];

/// A single lowercase word with no whitespace and no noise characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the token consists only of ASCII digits.
    ///
    /// Numeric tokens are still treated as text downstream; the grammar
    /// matches on the literal spelling of a year, not its value.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|byte| byte.is_ascii_digit())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered tokens produced from one line of user input.
///
/// An empty sequence means the input held nothing usable; it is never
/// forwarded to the compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSequence(Vec<Token>);

impl TokenSequence {
    /// Returns `true` when no tokens survived normalisation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of tokens in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the tokens in input order.
    pub fn iter(&self) -> slice::Iter<'_, Token> {
        self.0.iter()
    }

    /// Borrows the tokens as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Token] {
        &self.0
    }

    /// Returns the token texts in order.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|token| token.0.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a TokenSequence {
    type Item = &'a Token;
    type IntoIter = slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for TokenSequence {
    type Item = Token;
    type IntoIter = std::vec::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Normalises raw user input into a [`TokenSequence`].
///
/// # Example
///
/// ```
/// use lez_engine::normalize;
///
/// let tokens = normalize("Can my van enter SW1A?");
/// assert_eq!(tokens.to_strings(), ["can", "my", "van", "enter", "sw1a"]);
/// ```
#[must_use]
pub fn normalize(raw: &str) -> TokenSequence {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|character| !NOISE_CHARACTERS.contains(character))
        .collect();

    TokenSequence(
        cleaned
            .split_whitespace()
            .map(|word| Token(word.to_owned()))
            .collect(),
    )
}
