//! In-memory site model construction for crema.
//!
//! This crate provides:
//! - [`Site`]: the route tree and its derived views (navigation, list
//!   pages, index aggregates, related articles, footer)
//! - [`Builder`]: concurrent-safe ingestion of parsed content units
//! - [`build_site`]: the parallel parse-register-derive pipeline
//! - [`ArticleParser`] and [`Plugin`]: the collaborator boundaries for
//!   content parsing and publishing
//!
//! # Architecture
//!
//! A build runs in two phases. During *registration* the [`Builder`] owns
//! the site behind an internal lock and accepts content units from any
//! number of threads; parsing itself happens outside the lock. During
//! *derivation*, after registration has quiesced, the builder runs the
//! view-building passes over the exclusively owned tree and hands back an
//! immutable [`Site`] plus a [`BuildReport`] of non-fatal findings.
//!
//! # Quick Start
//!
//! ```
//! use std::path::PathBuf;
//! use crema_build::{build_site, ArticleParser, BuildContext, BuildOptions, ParseError, RawContent};
//! use crema_config::Settings;
//! use crema_model::Article;
//!
//! /// Treats the whole file as the article title.
//! struct TitleParser;
//!
//! impl ArticleParser for TitleParser {
//!     fn parse(&self, source: &[u8]) -> Result<Article, ParseError> {
//!         let title = std::str::from_utf8(source)
//!             .map_err(|e| ParseError::new("not UTF-8").with_source(e))?;
//!         Ok(Article {
//!             id: String::new(),
//!             title: title.trim().to_owned(),
//!             description: String::new(),
//!             author: String::new(),
//!             date: chrono::Utc::now(),
//!             hide: false,
//!             related: Vec::new(),
//!         })
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = BuildContext {
//!     content_dir: PathBuf::from("content"),
//!     settings: Settings::default(),
//!     parser: Box::new(TitleParser),
//! };
//! let content = vec![RawContent {
//!     file: PathBuf::from("content/blog/hello.md"),
//!     source: b"Hello".to_vec(),
//! }];
//!
//! let (site, report) = build_site(ctx, &content, BuildOptions::default())?;
//!
//! assert!(report.is_clean());
//! assert_eq!(site.lookup("blog").unwrap().pages()[0].article.title, "Hello");
//! # Ok(())
//! # }
//! ```

pub(crate) mod builder;
pub(crate) mod error;
pub(crate) mod parser;
pub(crate) mod pipeline;
pub(crate) mod plugin;
pub(crate) mod report;
pub(crate) mod site;

pub use builder::{BuildContext, Builder, ContentUnit, RegisterMode};
pub use error::{BuildError, ResolveError};
pub use parser::{ArticleParser, ParseError};
pub use pipeline::{build_site, BuildOptions, RawContent};
pub use plugin::{deliver_pages, Plugin, PluginError, PublishContext};
pub use report::{BuildReport, ResolveWarning};
pub use site::{Route, Site};
