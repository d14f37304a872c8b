//! Build report and warnings.
//!
//! Non-fatal findings collected while deriving the site model. Today the
//! only producer is the related-article resolver: a link that points at a
//! missing route or article does not abort the build, but it is never
//! dropped silently either. The caller decides whether to print, collect
//! or escalate.

use crema_model::RelatedLink;

use crate::error::ResolveError;

/// A related link that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveWarning {
    /// Route path of the page whose article carries the broken link.
    pub page_route: String,
    /// Id of the article carrying the broken link.
    pub article_id: String,
    /// The link that failed to resolve.
    pub link: RelatedLink,
    /// Why the lookup found nothing.
    pub error: ResolveError,
}

impl std::fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Article {:?} under route {:?}: related link {} did not resolve: {}",
            self.article_id, self.page_route, self.link, self.error
        )
    }
}

/// Non-fatal findings of a completed build.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Related links that did not resolve.
    pub warnings: Vec<ResolveWarning>,
}

impl BuildReport {
    /// Whether the build produced no warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean() {
        assert!(BuildReport::default().is_clean());
    }

    #[test]
    fn test_resolve_warning_display() {
        let warning = ResolveWarning {
            page_route: "blog".to_owned(),
            article_id: "post-2".to_owned(),
            link: RelatedLink::parse("blog/ghost").unwrap(),
            error: ResolveError::ArticleNotFound {
                route: "blog".to_owned(),
                id: "ghost".to_owned(),
            },
        };

        assert_eq!(
            warning.to_string(),
            "Article \"post-2\" under route \"blog\": related link blog/ghost \
             did not resolve: No article \"ghost\" under route \"blog\""
        );
    }
}
