use crate::SiftError;
use std::fmt;

/// Shortest accepted keyword, in characters, after trimming
pub const MIN_KEYWORD_LEN: usize = 4;

/// Longest accepted keyword, in characters, after trimming
pub const MAX_KEYWORD_LEN: usize = 32;

/// A search term that passed validation
///
/// Stored trimmed and lower-cased so matching is a plain substring test against
/// lower-cased page text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Keyword(String);

impl Keyword {
    /// Validates and normalizes raw user input
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sift::job::Keyword;
    ///
    /// let keyword = Keyword::parse("  Widget ").unwrap();
    /// assert_eq!(keyword.as_str(), "widget");
    /// assert!(Keyword::parse("ab").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, SiftError> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if !(MIN_KEYWORD_LEN..=MAX_KEYWORD_LEN).contains(&len) {
            return Err(SiftError::InvalidKeyword);
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive containment test against page text
    pub fn is_found_in(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.0)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
