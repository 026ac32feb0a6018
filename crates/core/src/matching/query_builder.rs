//! Turns free text into a search query.

use super::MatchError;

/// Separator used between words in the encoded query.
const ENCODED_SPACE: &str = "%20";

/// A validated search query.
///
/// Keeps both the trimmed text (for matching against titles) and the
/// encoded token (for the request URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    encoded: String,
}

impl SearchQuery {
    /// Build a query from raw user input.
    ///
    /// Leading and trailing whitespace is trimmed; each internal run of
    /// whitespace becomes a single `%20`. Nothing else is escaped and case is
    /// preserved. Blank input is rejected.
    pub fn parse(raw: &str) -> Result<Self, MatchError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(MatchError::InvalidQuery(
                "search text cannot be empty".to_string(),
            ));
        }

        let encoded = text.split_whitespace().collect::<Vec<_>>().join(ENCODED_SPACE);

        Ok(Self {
            text: text.to_string(),
            encoded,
        })
    }

    /// The trimmed user text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The transport-safe token.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }
}
