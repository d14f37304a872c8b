//! The site model: a hierarchical route tree.
//!
//! A [`Site`] holds the route tree plus the derived navigation and footer
//! views. Each [`Route`] is keyed by a path segment and owns the pages
//! registered directly under it; for example the page registered under
//! `"blog/coffee"` lives in:
//!
//! ```text
//! root
//! └── "blog"
//!     └── "coffee"   <- page appended here
//! ```
//!
//! Routes are created lazily on first registration and never deleted
//! during a build. After the derivation passes have run, every route holds
//! exactly one of a user-supplied index page or a derived list page.
//!
//! # Thread Safety
//!
//! `Site` itself is plain data. Concurrent registration is synchronized by
//! the [`Builder`](crate::Builder), which owns the site behind an internal
//! lock for the duration of ingestion; walks and lookups must only run
//! after registration has quiesced.

use std::collections::BTreeMap;
use std::sync::Arc;

use crema_model::{ArticlePage, Footer, IndexPage, ListPage, Nav, RelatedLink};

use crate::error::ResolveError;

/// A node in the site's hierarchical path structure.
#[derive(Debug, Default)]
pub struct Route {
    pages: Vec<Arc<ArticlePage>>,
    children: BTreeMap<String, Route>,
    index_page: Option<IndexPage>,
    list_page: Option<ListPage>,
}

impl Route {
    /// Pages registered directly under this route, in registration order
    /// (derivation may reorder derived views, never this list).
    #[must_use]
    pub fn pages(&self) -> &[Arc<ArticlePage>] {
        &self.pages
    }

    /// Child routes keyed by path segment, in segment order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Route)> {
        self.children.iter().map(|(key, route)| (key.as_str(), route))
    }

    /// The user-supplied index page, if any.
    #[must_use]
    pub fn index_page(&self) -> Option<&IndexPage> {
        self.index_page.as_ref()
    }

    /// The derived list page, if any.
    #[must_use]
    pub fn list_page(&self) -> Option<&ListPage> {
        self.list_page.as_ref()
    }

    pub(crate) fn index_page_mut(&mut self) -> Option<&mut IndexPage> {
        self.index_page.as_mut()
    }

    pub(crate) fn set_list_page(&mut self, list_page: ListPage) {
        self.list_page = Some(list_page);
    }

    /// Walk/create the child chain for a `/`-separated path and return the
    /// final node. The empty path is this node itself; creation is
    /// idempotent, so an existing chain is reused.
    fn ensure_route(&mut self, path: &str) -> &mut Route {
        if path.is_empty() {
            return self;
        }
        path.split('/')
            .fold(self, |node, segment| node.children.entry(segment.to_owned()).or_default())
    }

    /// Descend the child chain for a `/`-separated path.
    fn descend(&self, path: &str) -> Option<&Route> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('/').try_fold(self, |node, segment| node.children.get(segment))
    }
}

/// The website model: route tree plus derived navigation and footer.
///
/// Owned exclusively by the [`Builder`](crate::Builder) while it is being
/// populated; read-only once the derivation passes have completed.
#[derive(Debug, Default)]
pub struct Site {
    /// The site's main navigation, populated by derivation.
    pub nav: Nav,
    /// The site's footer, populated by derivation.
    pub footer: Footer,
    root: Route,
}

impl Site {
    /// Register a page under the route stored in `page.route`.
    ///
    /// All missing intermediate routes are created; a page with an empty
    /// route path is appended directly to the root node.
    pub(crate) fn register_page(&mut self, page: Arc<ArticlePage>) {
        self.root.ensure_route(&page.route).pages.push(page);
    }

    /// Register an index page for the route stored in `index_page.route`.
    ///
    /// A route owning an index page never gets a derived list page. Two
    /// index files mapping to the same route indicate a content mistake;
    /// the last registration wins and a warning is logged.
    pub(crate) fn register_index_page(&mut self, index_page: IndexPage) {
        let route = self.root.ensure_route(&index_page.route);
        if let Some(previous) = route.index_page.replace(index_page) {
            tracing::warn!(route = %previous.route, "Route has more than one index page");
        }
    }

    /// Resolve a `/`-separated path to its route node.
    ///
    /// The empty path resolves to the tree root. Returns `None` if any
    /// segment of the chain is missing.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&Route> {
        self.root.descend(path)
    }

    /// Resolve a related link to the registered page it references.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::RouteNotFound`] if the link's route path
    /// does not exist and [`ResolveError::ArticleNotFound`] if the route
    /// exists but owns no article with the link's id.
    pub fn resolve_page(&self, link: &RelatedLink) -> Result<&Arc<ArticlePage>, ResolveError> {
        let route = self.lookup(&link.route).ok_or_else(|| ResolveError::RouteNotFound {
            route: link.route.clone(),
        })?;
        route
            .pages
            .iter()
            .find(|page| page.article.id == link.id)
            .ok_or_else(|| ResolveError::ArticleNotFound {
                route: link.route.clone(),
                id: link.id.clone(),
            })
    }

    /// Walk all routes below the root, invoking `walk_fn` with each
    /// route's full path.
    ///
    /// `depth` bounds the descent: `Some(1)` visits only the root's
    /// immediate children, `None` walks down to the lowest level. The root
    /// itself is not visited (its path is the empty string and it is
    /// always reachable directly). Siblings are visited in segment order.
    pub fn walk_routes<F>(&self, depth: Option<usize>, mut walk_fn: F)
    where
        F: FnMut(&str, &Route),
    {
        Self::walk_children(&self.root, "", depth, 0, &mut walk_fn);
    }

    fn walk_children<F>(route: &Route, prefix: &str, depth: Option<usize>, current: usize, walk_fn: &mut F)
    where
        F: FnMut(&str, &Route),
    {
        if depth == Some(current) {
            return;
        }
        for (key, child) in &route.children {
            let path = join_path(prefix, key);
            walk_fn(&path, child);
            Self::walk_children(child, &path, depth, current + 1, walk_fn);
        }
    }

    /// Visit every route including the root, mutably and unbounded.
    /// Drives the derivation passes.
    pub(crate) fn for_each_route_mut<F>(&mut self, mut walk_fn: F)
    where
        F: FnMut(&str, &mut Route),
    {
        fn recurse<F>(route: &mut Route, prefix: &str, walk_fn: &mut F)
        where
            F: FnMut(&str, &mut Route),
        {
            walk_fn(prefix, route);
            for (key, child) in &mut route.children {
                let path = join_path(prefix, key);
                recurse(child, &path, walk_fn);
            }
        }
        recurse(&mut self.root, "", &mut walk_fn);
    }

    /// Collect every visible page of the entire tree, root included, as a
    /// flat list. Ordering is deterministic: routes in segment order,
    /// pages in registration order within each route.
    #[must_use]
    pub fn visible_pages(&self) -> Vec<Arc<ArticlePage>> {
        fn collect(route: &Route, pages: &mut Vec<Arc<ArticlePage>>) {
            pages.extend(route.pages.iter().filter(|p| p.is_visible()).cloned());
            for child in route.children.values() {
                collect(child, pages);
            }
        }
        let mut pages = Vec::new();
        collect(&self.root, &mut pages);
        pages
    }

    /// Total number of registered pages, hidden ones included.
    #[must_use]
    pub fn page_count(&self) -> usize {
        fn count(route: &Route) -> usize {
            route.pages.len() + route.children.values().map(count).sum::<usize>()
        }
        count(&self.root)
    }
}

/// Join a route prefix and a segment, avoiding a leading slash at the root.
fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_owned()
    } else {
        format!("{prefix}/{segment}")
    }
}
