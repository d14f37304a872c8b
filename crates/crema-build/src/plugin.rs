//! Publishing plugin boundary.
//!
//! Plugins observe the finished site model during publishing: every
//! visible page is offered to every plugin, then each plugin gets one
//! [`finalize`](Plugin::finalize) call to write its own output. The model
//! itself is never mutated.

use std::path::PathBuf;

use crema_model::ArticlePage;

use crate::site::Site;

/// Error raised by a publishing plugin.
///
/// Opaque to the build pipeline; the plugin's own error type carries the
/// detail.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct PluginError(Box<dyn std::error::Error + Send + Sync>);

impl PluginError {
    /// Wrap a plugin-specific error.
    #[must_use]
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }
}

/// Where plugin output goes.
pub struct PublishContext {
    /// Directory that receives generated artifacts.
    pub target_dir: PathBuf,
}

/// A publishing-time observer of the site model.
pub trait Plugin {
    /// Offer one article page to the plugin.
    ///
    /// Called once per visible page, in deterministic model order.
    ///
    /// # Errors
    ///
    /// A plugin error aborts publishing.
    fn process_page(&mut self, page: &ArticlePage) -> Result<(), PluginError>;

    /// Write the plugin's output after all pages have been offered.
    ///
    /// # Errors
    ///
    /// A plugin error aborts publishing.
    fn finalize(&mut self, ctx: &PublishContext) -> Result<(), PluginError>;
}

/// Drive a set of plugins over the finished site model.
///
/// Every visible page is offered to every plugin in deterministic model
/// order; afterwards each plugin is finalized in order. The first error
/// aborts.
///
/// # Errors
///
/// Returns the first [`PluginError`] raised by any plugin.
pub fn deliver_pages(
    site: &Site,
    ctx: &PublishContext,
    plugins: &mut [Box<dyn Plugin>],
) -> Result<(), PluginError> {
    for page in site.visible_pages() {
        for plugin in plugins.iter_mut() {
            plugin.process_page(&page)?;
        }
    }
    for plugin in plugins.iter_mut() {
        plugin.finalize(ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use crema_config::Settings;
    use crema_model::Article;
    use pretty_assertions::assert_eq;

    use crate::builder::{BuildContext, Builder};
    use crate::parser::{ArticleParser, ParseError};

    use super::*;

    struct NoParser;

    impl ArticleParser for NoParser {
        fn parse(&self, _source: &[u8]) -> Result<Article, ParseError> {
            Err(ParseError::new("unused"))
        }
    }

    fn article(id: &str, hide: bool) -> Article {
        Article {
            id: id.to_owned(),
            title: format!("Article {id}"),
            description: String::new(),
            author: String::new(),
            date: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            hide,
            related: Vec::new(),
        }
    }

    fn finished_site() -> Site {
        let builder = Builder::new(BuildContext {
            content_dir: "content".into(),
            settings: Settings::default(),
            parser: Box::new(NoParser),
        });
        builder.register_page(Arc::new(ArticlePage::new("blog", article("post-1", false))));
        builder.register_page(Arc::new(ArticlePage::new("blog", article("draft", true))));
        builder.register_page(Arc::new(ArticlePage::new("", article("about", false))));
        let (site, _) = builder.finish(true);
        site
    }

    /// Records every offered page id and the finalize target into a log
    /// shared with the test.
    struct Recorder {
        log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
    }

    impl Plugin for Recorder {
        fn process_page(&mut self, page: &ArticlePage) -> Result<(), PluginError> {
            self.log.borrow_mut().push(page.article.id.clone());
            Ok(())
        }

        fn finalize(&mut self, ctx: &PublishContext) -> Result<(), PluginError> {
            self.log
                .borrow_mut()
                .push(format!("finalize:{}", ctx.target_dir.display()));
            Ok(())
        }
    }

    struct FailOn(&'static str);

    impl Plugin for FailOn {
        fn process_page(&mut self, page: &ArticlePage) -> Result<(), PluginError> {
            if page.article.id == self.0 {
                return Err(PluginError::new(ParseError::new("boom")));
            }
            Ok(())
        }

        fn finalize(&mut self, _ctx: &PublishContext) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[test]
    fn test_deliver_offers_visible_pages_then_finalizes() {
        let site = finished_site();
        let ctx = PublishContext {
            target_dir: PathBuf::from("target/site"),
        };
        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(Recorder {
            log: std::rc::Rc::clone(&log),
        })];

        deliver_pages(&site, &ctx, &mut plugins).unwrap();

        // Root pages first, then routes in segment order; the hidden
        // draft never reaches the plugin. Finalize comes last.
        assert_eq!(
            *log.borrow(),
            vec!["about", "post-1", "finalize:target/site"]
        );
    }

    #[test]
    fn test_deliver_never_offers_hidden_pages() {
        let site = finished_site();
        let ctx = PublishContext {
            target_dir: PathBuf::from("target/site"),
        };
        let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(FailOn("draft"))];

        assert!(deliver_pages(&site, &ctx, &mut plugins).is_ok());
    }

    #[test]
    fn test_deliver_aborts_on_first_plugin_error() {
        let site = finished_site();
        let ctx = PublishContext {
            target_dir: PathBuf::from("target/site"),
        };
        let mut plugins: Vec<Box<dyn Plugin>> = vec![Box::new(FailOn("post-1"))];

        assert!(deliver_pages(&site, &ctx, &mut plugins).is_err());
    }
}
