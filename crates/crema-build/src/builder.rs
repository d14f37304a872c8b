//! Site model construction.
//!
//! The [`Builder`] ingests parsed content units into the route tree and,
//! once registration has quiesced, derives the secondary views: main
//! navigation, per-route list pages, site-wide index aggregates, related
//! articles and the footer.
//!
//! # Thread Safety
//!
//! Registration is safe for concurrent invocation: the builder owns the
//! [`Site`] behind an internal mutex that is held only for the in-memory
//! insert itself, never across parsing. The lock is not exposed to
//! callers. The derivation passes run on the exclusively owned site after
//! all registration has finished.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crema_config::Settings;
use crema_model::{ArticlePage, Footer, FooterItem, IndexPage, ListPage, Nav, NavItem};

use crate::error::BuildError;
use crate::parser::ArticleParser;
use crate::report::{BuildReport, ResolveWarning};
use crate::site::Site;

/// Whether [`Builder::build_page`] registers its result directly or
/// leaves registration to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterMode {
    /// Return the built unit without touching the site model.
    Deferred,
    /// Register the built unit into the site model before returning.
    Direct,
}

/// A built content unit, ready for registration.
///
/// Files whose stem is `index` become their route's index page; all
/// others become ordinary article pages.
#[derive(Clone, Debug)]
pub enum ContentUnit {
    /// An ordinary article page.
    Page(Arc<ArticlePage>),
    /// A route's user-supplied index page.
    Index(IndexPage),
}

/// Everything a build needs to know up front.
pub struct BuildContext {
    /// Content-root prefix stripped from raw file paths to obtain route
    /// paths (e.g. `site/content`).
    pub content_dir: PathBuf,
    /// User-defined site settings.
    pub settings: Settings,
    /// The content parser collaborator.
    pub parser: Box<dyn ArticleParser>,
}

/// Builds the site model from parsed content.
///
/// Create one builder per build; it exclusively owns the route tree for
/// the duration of ingestion and hands the finished, read-only model back
/// from [`finish`](Builder::finish).
pub struct Builder {
    ctx: BuildContext,
    site: Mutex<Site>,
}

impl Builder {
    /// Create a builder for the given build context.
    #[must_use]
    pub fn new(ctx: BuildContext) -> Self {
        Self {
            ctx,
            site: Mutex::new(Site::default()),
        }
    }

    /// Build a content unit from a raw source file.
    ///
    /// Parses `source` with the context's parser (outside any lock),
    /// computes the route path by stripping the content-root prefix from
    /// `file` and taking the directory portion, and derives the article
    /// id from the file's stem. A file named `index.*` becomes the
    /// route's index page instead of an ordinary page.
    ///
    /// Safe for concurrent invocation.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Parse`] if the parser rejects the source and
    /// [`BuildError::MalformedPath`] if `file` is not under the content
    /// root; in both cases the site model is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the internal registration lock is poisoned.
    pub fn build_page(
        &self,
        source: &[u8],
        file: &Path,
        mode: RegisterMode,
    ) -> Result<ContentUnit, BuildError> {
        let mut article = self.ctx.parser.parse(source).map_err(|source| BuildError::Parse {
            file: file.to_path_buf(),
            source,
        })?;
        let (route, id) = self.route_and_id(file)?;
        article.id = id;

        let unit = if article.id == "index" {
            ContentUnit::Index(IndexPage::new(route, article))
        } else {
            ContentUnit::Page(Arc::new(ArticlePage::new(route, article)))
        };

        if mode == RegisterMode::Direct {
            self.register_unit(unit.clone());
        }
        Ok(unit)
    }

    /// Register a previously built content unit.
    ///
    /// Safe for concurrent invocation; exactly one registration mutates
    /// the tree at a time.
    ///
    /// # Panics
    ///
    /// Panics if the internal registration lock is poisoned.
    pub fn register_unit(&self, unit: ContentUnit) {
        match unit {
            ContentUnit::Page(page) => self.register_page(page),
            ContentUnit::Index(index_page) => self.register_index_page(index_page),
        }
    }

    /// Register an article page under the route stored in `page.route`.
    ///
    /// Safe for concurrent invocation.
    ///
    /// # Panics
    ///
    /// Panics if the internal registration lock is poisoned.
    pub fn register_page(&self, page: Arc<ArticlePage>) {
        self.site.lock().unwrap().register_page(page);
    }

    /// Register an index page for the route stored in `index_page.route`.
    ///
    /// Safe for concurrent invocation.
    ///
    /// # Panics
    ///
    /// Panics if the internal registration lock is poisoned.
    pub fn register_index_page(&self, index_page: IndexPage) {
        self.site.lock().unwrap().register_index_page(index_page);
    }

    /// Run the derivation passes and hand back the finished model.
    ///
    /// Must be called after all registration has finished; consuming the
    /// builder makes that explicit. `sort_pages` enables date-descending
    /// ordering of list pages (stable; ties keep registration order).
    ///
    /// # Panics
    ///
    /// Panics if the internal registration lock is poisoned.
    #[must_use]
    pub fn finish(self, sort_pages: bool) -> (Site, BuildReport) {
        let mut site = self.site.into_inner().unwrap();
        let mut report = BuildReport::default();

        build_nav(&mut site, &self.ctx.settings);
        build_list_pages(&mut site, sort_pages);
        attach_pages_to_index_pages(&mut site);
        build_footer(&mut site, &self.ctx.settings);
        resolve_related(&site, &mut report);

        (site, report)
    }

    /// Compute (route path, article id) for a raw content file.
    ///
    /// For `site/content/blog/coffee/post.md` with content root
    /// `site/content` this yields `("blog/coffee", "post")`.
    fn route_and_id(&self, file: &Path) -> Result<(String, String), BuildError> {
        let malformed = || BuildError::MalformedPath {
            file: file.to_path_buf(),
            content_dir: self.ctx.content_dir.clone(),
        };

        let relative = file.strip_prefix(&self.ctx.content_dir).map_err(|_| malformed())?;
        let id = relative
            .file_stem()
            .and_then(std::ffi::OsStr::to_str)
            .filter(|stem| !stem.is_empty())
            .ok_or_else(malformed)?
            .to_owned();

        let route = match relative.parent() {
            Some(dir) => {
                let mut segments = Vec::new();
                for component in dir.components() {
                    segments.push(component.as_os_str().to_str().ok_or_else(malformed)?);
                }
                segments.join("/")
            }
            None => String::new(),
        };

        Ok((route, id))
    }
}

/// Assemble the main navigation from the settings and, unless overridden,
/// the top-level route keys.
fn build_nav(site: &mut Site, settings: &Settings) {
    let mut nav = Nav {
        brand: settings.title.clone(),
        items: settings
            .nav
            .items
            .iter()
            .map(|item| NavItem {
                label: item.label.clone(),
                target: item.target.clone(),
            })
            .collect(),
    };

    if !settings.nav.override_routes {
        site.walk_routes(Some(1), |path, _| {
            nav.items.push(NavItem {
                label: titlecase_from_slug(path),
                target: path.to_owned(),
            });
        });
    }

    site.nav = nav;
}

/// Build a list page for every route without a user-supplied index page.
///
/// Hidden articles are skipped entirely; they appear in no derived view.
fn build_list_pages(site: &mut Site, sort_pages: bool) {
    site.for_each_route_mut(|path, route| {
        if route.index_page().is_some() {
            return;
        }

        let mut pages: Vec<_> = route.pages().iter().filter(|p| p.is_visible()).cloned().collect();
        if sort_pages {
            // Stable: equal dates keep their registration order.
            pages.sort_by(|a, b| b.article.date.cmp(&a.article.date));
        }

        route.set_list_page(ListPage {
            route: path.to_owned(),
            pages,
        });
    });
}

/// Hand every index page the site-wide list of visible pages.
///
/// An index page is a site-wide feed, not a subtree feed. The flat list is
/// collected once and shared with every index page, so the pass stays
/// linear in the number of routes regardless of how many index pages
/// exist.
fn attach_pages_to_index_pages(site: &mut Site) {
    let visible = site.visible_pages();
    site.for_each_route_mut(|_, route| {
        if let Some(index_page) = route.index_page_mut() {
            index_page.pages = visible.clone();
        }
    });
}

/// Resolve every article's related links and store the back-references.
///
/// Misses are reportable: they are logged and collected into the build
/// report, never silently dropped.
fn resolve_related(site: &Site, report: &mut BuildReport) {
    let mut pages: Vec<Arc<ArticlePage>> = Vec::new();
    if let Some(root) = site.lookup("") {
        pages.extend(root.pages().iter().cloned());
    }
    site.walk_routes(None, |_, route| pages.extend(route.pages().iter().cloned()));

    for page in &pages {
        if page.article.related.is_empty() {
            continue;
        }
        let mut resolved = Vec::with_capacity(page.article.related.len());
        for link in &page.article.related {
            match site.resolve_page(link) {
                Ok(target) => resolved.push(Arc::clone(target)),
                Err(error) => {
                    tracing::warn!(
                        article = %page.article.id,
                        route = %page.route,
                        link = %link,
                        %error,
                        "Related link did not resolve"
                    );
                    report.warnings.push(ResolveWarning {
                        page_route: page.route.clone(),
                        article_id: page.article.id.clone(),
                        link: link.clone(),
                        error,
                    });
                }
            }
        }
        page.set_related_pages(resolved);
    }
}

/// Assemble the footer from the settings. Independent of any pages.
fn build_footer(site: &mut Site, settings: &Settings) {
    site.footer = Footer {
        text: settings.footer.text.clone(),
        items: settings
            .footer
            .items
            .iter()
            .map(|item| FooterItem {
                label: item.label.clone(),
                target: item.target.clone(),
            })
            .collect(),
    };
}

/// Convert a slug (kebab-case or `snake_case`) to title case for derived
/// navigation labels.
fn titlecase_from_slug(slug: &str) -> String {
    let mut result = String::with_capacity(slug.len());
    for word in slug.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}
