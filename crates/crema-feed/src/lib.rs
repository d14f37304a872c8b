//! Atom feed publishing plugin.
//!
//! Implements the [`Plugin`] boundary from `crema-build`: collects every
//! visible article page offered during publishing and writes an Atom 1.0
//! `atom.xml` into the publish target directory on finalize. Hidden
//! articles never enter the feed.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use crema_build::{Plugin, PluginError, PublishContext};
use crema_config::Settings;
use crema_model::ArticlePage;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesText, Event};

/// File name of the generated feed, relative to the publish target.
pub const FEED_FILENAME: &str = "atom.xml";

const ATOM_NAMESPACE: &str = "http://www.w3.org/2005/Atom";

/// Error raised while rendering or writing the feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The XML writer failed.
    #[error("Failed to render feed XML: {0}")]
    Render(#[source] std::io::Error),
    /// The rendered feed could not be written to disk.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Target path of the feed file.
        path: PathBuf,
        /// Underlying io error.
        #[source]
        source: std::io::Error,
    },
}

/// Site-level feed metadata, taken from the settings.
#[derive(Clone, Debug)]
struct FeedMeta {
    title: String,
    subtitle: String,
    base_url: String,
    author: String,
    rights: String,
}

/// One collected feed entry.
#[derive(Clone, Debug)]
struct FeedEntry {
    title: String,
    url: String,
    updated: DateTime<Utc>,
    summary: String,
    author: String,
}

/// Atom feed generator.
///
/// Create one per build, hand it to the publishing driver, and the feed
/// lands next to the rest of the output.
pub struct AtomFeed {
    meta: FeedMeta,
    entries: Vec<FeedEntry>,
}

impl AtomFeed {
    /// Create a feed generator from the site settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        // Atom has no separate description element; the subtitle wins
        // when both are configured.
        let subtitle = if settings.subtitle.is_empty() {
            settings.description.clone()
        } else {
            settings.subtitle.clone()
        };
        Self {
            meta: FeedMeta {
                title: settings.title.clone(),
                subtitle,
                base_url: settings.base_url.trim_end_matches('/').to_owned(),
                author: settings.author.clone(),
                rights: settings.copyright.clone(),
            },
            entries: Vec::new(),
        }
    }

    /// Number of entries collected so far.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Canonical URL of a page, derived from the base URL, the route path
    /// and the article id.
    fn page_url(&self, page: &ArticlePage) -> String {
        if page.route.is_empty() {
            format!("{}/{}", self.meta.base_url, page.article.id)
        } else {
            format!("{}/{}/{}", self.meta.base_url, page.route, page.article.id)
        }
    }

    /// Render the collected entries as an Atom 1.0 document.
    fn render(&self) -> Result<Vec<u8>, FeedError> {
        let updated = self
            .entries
            .iter()
            .map(|e| e.updated)
            .max()
            .unwrap_or_else(Utc::now);

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(FeedError::Render)?;
        writer
            .create_element("feed")
            .with_attribute(("xmlns", ATOM_NAMESPACE))
            .write_inner_content(|w| {
                write_text(w, "title", &self.meta.title)?;
                if !self.meta.subtitle.is_empty() {
                    write_text(w, "subtitle", &self.meta.subtitle)?;
                }
                write_text(w, "id", &self.meta.base_url)?;
                w.create_element("link")
                    .with_attribute(("href", self.meta.base_url.as_str()))
                    .write_empty()?;
                write_text(w, "updated", &rfc3339(updated))?;
                if !self.meta.author.is_empty() {
                    w.create_element("author")
                        .write_inner_content(|w| write_text(w, "name", &self.meta.author))?;
                }
                if !self.meta.rights.is_empty() {
                    write_text(w, "rights", &self.meta.rights)?;
                }
                for entry in &self.entries {
                    w.create_element("entry").write_inner_content(|w| {
                        write_text(w, "title", &entry.title)?;
                        write_text(w, "id", &entry.url)?;
                        w.create_element("link")
                            .with_attribute(("href", entry.url.as_str()))
                            .write_empty()?;
                        write_text(w, "updated", &rfc3339(entry.updated))?;
                        if !entry.summary.is_empty() {
                            write_text(w, "summary", &entry.summary)?;
                        }
                        if !entry.author.is_empty() {
                            w.create_element("author")
                                .write_inner_content(|w| write_text(w, "name", &entry.author))?;
                        }
                        Ok(())
                    })?;
                }
                Ok(())
            })
            .map_err(FeedError::Render)?;

        Ok(writer.into_inner())
    }
}

impl Plugin for AtomFeed {
    /// Collect one visible page; hidden articles are skipped.
    fn process_page(&mut self, page: &ArticlePage) -> Result<(), PluginError> {
        if !page.is_visible() {
            return Ok(());
        }
        self.entries.push(FeedEntry {
            title: page.article.title.clone(),
            url: self.page_url(page),
            updated: page.article.date,
            summary: page.article.description.clone(),
            author: page.article.author.clone(),
        });
        Ok(())
    }

    /// Render the feed and write it into the publish target directory.
    fn finalize(&mut self, ctx: &PublishContext) -> Result<(), PluginError> {
        let xml = self.render().map_err(PluginError::new)?;
        let path = ctx.target_dir.join(FEED_FILENAME);
        std::fs::write(&path, xml).map_err(|source| {
            PluginError::new(FeedError::Write {
                path: path.clone(),
                source,
            })
        })?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "wrote atom feed");
        Ok(())
    }
}

fn write_text<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), std::io::Error> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}
