//! Build error taxonomy.
//!
//! Two conditions are fatal and abort a build: a parse error from the
//! content parser and a raw file path that cannot be reduced to a route
//! path. Related-link resolution misses are *not* errors; they surface as
//! warnings in the [`BuildReport`](crate::BuildReport).

use std::path::PathBuf;

use crate::parser::ParseError;

/// Fatal build error. No partial output exists after one of these; the
/// caller discards the partially built tree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The content parser rejected a source file.
    #[error("Parse error in {}: {source}", .file.display())]
    Parse {
        /// Raw path of the offending source file.
        file: PathBuf,
        /// Underlying parser error.
        #[source]
        source: ParseError,
    },
    /// A raw file path did not start with the content-root prefix or was
    /// not valid UTF-8, so no route path could be computed. No mutation
    /// has occurred when this is returned.
    #[error("File {} is not inside the content root {}", .file.display(), .content_dir.display())]
    MalformedPath {
        /// Raw path of the offending source file.
        file: PathBuf,
        /// The expected content-root prefix.
        content_dir: PathBuf,
    },
}

/// Outcome of a single related-link lookup that found nothing.
///
/// `RouteNotFound` and `ArticleNotFound` are distinguished so callers can
/// tell a broken path from a broken id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No route exists at the link's path.
    #[error("No route at path {route:?}")]
    RouteNotFound {
        /// The missing route path.
        route: String,
    },
    /// The route exists but owns no article with the link's id.
    #[error("No article {id:?} under route {route:?}")]
    ArticleNotFound {
        /// The route path that was found.
        route: String,
        /// The missing article id.
        id: String,
    },
}
