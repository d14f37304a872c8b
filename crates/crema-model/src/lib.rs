//! Domain entities for the crema site model.
//!
//! This crate provides the pure data types that the site model is built
//! from: parsed content units ([`Article`]), their placement in the route
//! hierarchy ([`ArticlePage`], [`IndexPage`], [`ListPage`]) and the derived
//! navigation views ([`Nav`], [`Footer`]).
//!
//! # Path Convention
//!
//! All route paths are `/`-separated segment sequences **without** a leading
//! or trailing slash:
//! - `""` - the site root
//! - `"blog"` - a top-level route
//! - `"blog/coffee"` - a nested route
//!
//! # Sharing
//!
//! An [`ArticlePage`] is registered exactly once and then referenced from
//! several derived views (list pages, index aggregates, related-article
//! back-references). Pages are therefore shared as `Arc<ArticlePage>`;
//! the back-reference list is write-once and set after all registration
//! has finished.

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a related-link string cannot be split into a route
/// path and an article id.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Malformed related link {0:?}: expected \"<route-path>/<article-id>\"")]
pub struct MalformedLinkError(pub String);

/// A structured cross-reference from one article to another.
///
/// Related links are authored as `<route-path>/<article-id>` strings and
/// parsed into their two components eagerly, so malformed references fail
/// at ingestion time rather than during resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedLink {
    /// Route path owning the referenced article (e.g. `"blog"`).
    pub route: String,
    /// Id of the referenced article (e.g. `"post-1"`).
    pub id: String,
}

impl RelatedLink {
    /// Parse the `<route-path>/<article-id>` string form.
    ///
    /// The split happens on the *last* slash so the route path itself may
    /// contain further segments (`"blog/coffee/post-1"` references article
    /// `post-1` under route `blog/coffee`).
    ///
    /// # Errors
    ///
    /// Returns [`MalformedLinkError`] if the string contains no slash or an
    /// empty article id.
    pub fn parse(link: &str) -> Result<Self, MalformedLinkError> {
        match link.rsplit_once('/') {
            Some((route, id)) if !id.is_empty() => Ok(Self {
                route: route.to_owned(),
                id: id.to_owned(),
            }),
            _ => Err(MalformedLinkError(link.to_owned())),
        }
    }
}

impl std::str::FromStr for RelatedLink {
    type Err = MalformedLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for RelatedLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.route, self.id)
    }
}

// Related links keep their string form in serialized front matter.
impl Serialize for RelatedLink {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RelatedLink {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let link = String::deserialize(deserializer)?;
        Self::parse(&link).map_err(serde::de::Error::custom)
    }
}

/// A parsed content unit.
///
/// Articles are produced by the (external) parser collaborator and are
/// immutable once registered. The `id` is derived from the source file's
/// base name by the builder, not by the parser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Article identifier, unique within its route (file stem).
    #[serde(default)]
    pub id: String,
    /// Display title.
    pub title: String,
    /// Short description or teaser.
    #[serde(default)]
    pub description: String,
    /// Author name.
    #[serde(default)]
    pub author: String,
    /// Creation date; list pages sort on this, most recent first.
    pub date: DateTime<Utc>,
    /// Hidden articles appear in no derived view.
    #[serde(default)]
    pub hide: bool,
    /// Cross-references to other articles.
    #[serde(default)]
    pub related: Vec<RelatedLink>,
}

/// A (route path, [`Article`]) binding placed into the route tree.
///
/// Registered exactly once and shared from there on. The back-reference
/// list is populated by the related-article resolver after all
/// registration has finished and is write-once.
#[derive(Debug)]
pub struct ArticlePage {
    /// Route path the page is registered under (`""` for the root).
    pub route: String,
    /// The parsed content unit.
    pub article: Article,
    related_pages: OnceLock<Vec<Arc<ArticlePage>>>,
}

impl ArticlePage {
    /// Create a page binding for `article` under `route`.
    #[must_use]
    pub fn new(route: impl Into<String>, article: Article) -> Self {
        Self {
            route: route.into(),
            article,
            related_pages: OnceLock::new(),
        }
    }

    /// Whether the page participates in derived views.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.article.hide
    }

    /// Resolved related pages, empty until the resolver pass has run.
    #[must_use]
    pub fn related_pages(&self) -> &[Arc<ArticlePage>] {
        self.related_pages.get().map_or(&[], Vec::as_slice)
    }

    /// Set the resolved related pages.
    ///
    /// Returns `false` if the back-references were already set; the first
    /// write wins. The resolver pass runs once per build, so a second call
    /// indicates a caller bug rather than a data problem.
    pub fn set_related_pages(&self, pages: Vec<Arc<ArticlePage>>) -> bool {
        self.related_pages.set(pages).is_ok()
    }
}

/// A derived, route-scoped, visibility-filtered view of pages.
///
/// Built for every route that has no user-supplied index page. Pages are
/// ordered by descending creation date when sorting is enabled.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    /// Route path of the owning route.
    pub route: String,
    /// Visible pages of the owning route, in derived order.
    pub pages: Vec<Arc<ArticlePage>>,
}

/// A route's user-authored landing page.
///
/// An index page is a site-wide feed: after derivation it aggregates every
/// visible page of the whole tree, not just its own subtree.
#[derive(Clone, Debug)]
pub struct IndexPage {
    /// Route path of the owning route.
    pub route: String,
    /// The index article itself (parsed from the route's `index` file).
    pub article: Article,
    /// All visible pages of the entire site.
    pub pages: Vec<Arc<ArticlePage>>,
}

impl IndexPage {
    /// Create an index page for `route` with an empty aggregate.
    #[must_use]
    pub fn new(route: impl Into<String>, article: Article) -> Self {
        Self {
            route: route.into(),
            article,
            pages: Vec::new(),
        }
    }
}

/// A labeled navigation entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NavItem {
    /// Display label.
    pub label: String,
    /// Link target path.
    pub target: String,
}

/// The site's main navigation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Nav {
    /// Brand text, usually the site title.
    pub brand: String,
    /// Navigation entries in display order.
    pub items: Vec<NavItem>,
}

/// A labeled footer entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FooterItem {
    /// Display label.
    pub label: String,
    /// Link target path.
    pub target: String,
}

/// The site's footer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Footer {
    /// Footer text.
    pub text: String,
    /// Footer entries in display order.
    pub items: Vec<FooterItem>,
}
