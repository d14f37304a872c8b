//! Parallel build pipeline.
//!
//! Ties the pieces together for the common case: parse every raw content
//! file in parallel, register the results sequentially, then run the
//! derivation passes. Parsing is the expensive part and embarrassingly
//! parallel; registration is cheap tree surgery, and doing it in a single
//! deterministic pass keeps sibling page order independent of worker
//! scheduling.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::builder::{BuildContext, Builder, ContentUnit, RegisterMode};
use crate::error::BuildError;
use crate::report::BuildReport;
use crate::site::Site;

/// A raw content file awaiting parsing.
#[derive(Clone, Debug)]
pub struct RawContent {
    /// Path of the file, including the content-root prefix.
    pub file: PathBuf,
    /// Raw file bytes.
    pub source: Vec<u8>,
}

/// Knobs for [`build_site`].
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Sort list pages by article date, newest first. On by default.
    pub sort_list_pages: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            sort_list_pages: true,
        }
    }
}

/// Build the complete site model from raw content.
///
/// Content is parsed on the rayon thread pool; the first parse or path
/// error aborts the whole build. Registration order follows the order of
/// `content`, so two builds over the same input produce identical models.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered while parsing or while
/// reducing file paths to route paths.
pub fn build_site(
    ctx: BuildContext,
    content: &[RawContent],
    options: BuildOptions,
) -> Result<(Site, BuildReport), BuildError> {
    let builder = Builder::new(ctx);

    tracing::debug!(files = content.len(), "parsing content");
    let units: Vec<ContentUnit> = content
        .par_iter()
        .map(|raw| builder.build_page(&raw.source, &raw.file, RegisterMode::Deferred))
        .collect::<Result<_, _>>()?;

    tracing::debug!(units = units.len(), "registering content units");
    for unit in units {
        builder.register_unit(unit);
    }

    tracing::debug!("deriving site views");
    Ok(builder.finish(options.sort_list_pages))
}

#[cfg(test)]
mod tests {
    use crema_config::Settings;
    use crema_model::Article;
    use pretty_assertions::assert_eq;

    use crate::parser::{ArticleParser, ParseError};

    use super::*;

    struct JsonParser;

    impl ArticleParser for JsonParser {
        fn parse(&self, source: &[u8]) -> Result<Article, ParseError> {
            serde_json::from_slice(source)
                .map_err(|e| ParseError::new("invalid article JSON").with_source(e))
        }
    }

    fn context() -> BuildContext {
        BuildContext {
            content_dir: PathBuf::from("site/content"),
            settings: Settings::default(),
            parser: Box::new(JsonParser),
        }
    }

    fn raw(file: &str, title: &str, date: &str) -> RawContent {
        RawContent {
            file: PathBuf::from(file),
            source: format!(r#"{{"title":"{title}","date":"{date}"}}"#).into_bytes(),
        }
    }

    #[test]
    fn test_build_site_end_to_end() {
        let content = vec![
            raw("site/content/blog/older.md", "Older", "2023-01-01T00:00:00Z"),
            raw("site/content/blog/newer.md", "Newer", "2023-03-01T00:00:00Z"),
            raw("site/content/docs/index.md", "Docs", "2023-01-01T00:00:00Z"),
            raw("site/content/about.md", "About", "2023-01-01T00:00:00Z"),
        ];

        let (site, report) = build_site(context(), &content, BuildOptions::default()).unwrap();

        assert!(report.is_clean());
        assert_eq!(site.page_count(), 3);

        let blog = site.lookup("blog").unwrap();
        let ids: Vec<_> = blog
            .list_page()
            .unwrap()
            .pages
            .iter()
            .map(|p| p.article.id.as_str())
            .collect();
        assert_eq!(ids, vec!["newer", "older"]);

        let docs = site.lookup("docs").unwrap();
        assert_eq!(docs.index_page().unwrap().pages.len(), 3);
        assert!(docs.list_page().is_none());

        // Derived nav picks up the top-level routes.
        let labels: Vec<_> = site.nav.items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["Blog", "Docs"]);
    }

    #[test]
    fn test_build_site_fails_fast_on_parse_error() {
        let content = vec![
            raw("site/content/blog/good.md", "Good", "2023-01-01T00:00:00Z"),
            RawContent {
                file: PathBuf::from("site/content/blog/bad.md"),
                source: b"not an article".to_vec(),
            },
        ];

        let err = build_site(context(), &content, BuildOptions::default()).unwrap_err();

        assert!(matches!(err, BuildError::Parse { ref file, .. } if file.ends_with("bad.md")));
    }

    #[test]
    fn test_build_site_fails_fast_on_malformed_path() {
        let content = vec![raw("elsewhere/post.md", "Stray", "2023-01-01T00:00:00Z")];

        let err = build_site(context(), &content, BuildOptions::default()).unwrap_err();

        assert!(matches!(err, BuildError::MalformedPath { .. }));
    }

    #[test]
    fn test_build_site_unsorted_option() {
        let content = vec![
            raw("site/content/blog/older.md", "Older", "2023-01-01T00:00:00Z"),
            raw("site/content/blog/newer.md", "Newer", "2023-03-01T00:00:00Z"),
        ];

        let (site, _) = build_site(
            context(),
            &content,
            BuildOptions {
                sort_list_pages: false,
            },
        )
        .unwrap();

        let ids: Vec<_> = site
            .lookup("blog")
            .unwrap()
            .list_page()
            .unwrap()
            .pages
            .iter()
            .map(|p| p.article.id.as_str())
            .collect();
        assert_eq!(ids, vec!["older", "newer"]);
    }
}
