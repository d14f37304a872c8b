//! Content parser boundary.
//!
//! Parsing raw bytes into an [`Article`] is the job of an external
//! collaborator; the builder depends only on the [`ArticleParser`]
//! signature. Parse failures are fatal for the build (fail-fast, no
//! retry).

use crema_model::Article;

/// Error returned by a content parser.
///
/// Carries a message and an optional backend-specific source error.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ParseError {
    /// Create a parse error with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// Turns raw content bytes into a parsed [`Article`].
///
/// Implementations must be shareable across the parallel ingestion
/// workers; parsing runs fully outside the builder's registration lock.
/// The article's `id` field may be left empty: the builder derives it
/// from the source file name.
pub trait ArticleParser: Send + Sync {
    /// Parse a raw source file.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the bytes do not form a valid article.
    fn parse(&self, source: &[u8]) -> Result<Article, ParseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_message_only() {
        let err = ParseError::new("missing title");

        assert_eq!(err.to_string(), "missing title");
    }

    #[test]
    fn test_parse_error_exposes_source() {
        use std::error::Error;

        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes");
        let err = ParseError::new("unreadable front matter").with_source(io);

        assert!(err.source().is_some());
    }
}
