//! Site settings for crema.
//!
//! Parses `site.toml` files with serde. All sections are optional and
//! default to empty values; the builder turns them into the navigation
//! and footer views of the finished site model.
//!
//! # Example
//!
//! ```toml
//! title = "Roast Notes"
//! base_url = "https://example.com"
//! author = "Jane Doe"
//!
//! [nav]
//! override = false
//!
//! [[nav.items]]
//! label = "About"
//! target = "/about"
//!
//! [footer]
//! text = "© Roast Notes"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Settings filename conventionally used at the project root.
pub const SETTINGS_FILENAME: &str = "site.toml";

/// Settings error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Settings file not found.
    #[error("Settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// User-defined site settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Site title, used as the navigation brand and feed title.
    pub title: String,
    /// Site description, used as the feed description.
    pub description: String,
    /// Absolute base URL of the published site (no trailing slash).
    pub base_url: String,
    /// Site author.
    pub author: String,
    /// Feed subtitle.
    pub subtitle: String,
    /// Copyright notice.
    pub copyright: String,
    /// Navigation settings.
    pub nav: NavSettings,
    /// Footer settings.
    pub footer: FooterSettings,
}

/// Navigation settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NavSettings {
    /// When set, only the configured items appear in the navigation and
    /// no entries are derived from top-level routes.
    #[serde(rename = "override")]
    pub override_routes: bool,
    /// User-defined navigation entries.
    pub items: Vec<LinkSettings>,
}

/// Footer settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FooterSettings {
    /// Footer text.
    pub text: String,
    /// User-defined footer entries.
    pub items: Vec<LinkSettings>,
}

/// A labeled link in a settings file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkSettings {
    /// Display label.
    pub label: String,
    /// Link target path or URL.
    pub target: String,
}

impl Settings {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotFound`] if the file does not exist,
    /// [`SettingsError::Io`] if it cannot be read and
    /// [`SettingsError::Parse`] if it is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Err(SettingsError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Parse`] if the input is not valid TOML.
    pub fn from_toml(raw: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_from_toml_empty_input_uses_defaults() {
        let settings = Settings::from_toml("").unwrap();

        assert_eq!(settings, Settings::default());
        assert!(!settings.nav.override_routes);
        assert!(settings.nav.items.is_empty());
        assert!(settings.footer.items.is_empty());
    }

    #[test]
    fn test_from_toml_full_settings() {
        let raw = r#"
            title = "Roast Notes"
            description = "Notes on coffee"
            base_url = "https://example.com"
            author = "Jane Doe"
            subtitle = "Fresh from the roaster"
            copyright = "© Roast Notes"

            [nav]
            override = true

            [[nav.items]]
            label = "About"
            target = "/about"

            [footer]
            text = "© Roast Notes"

            [[footer.items]]
            label = "Imprint"
            target = "/imprint"
        "#;

        let settings = Settings::from_toml(raw).unwrap();

        assert_eq!(settings.title, "Roast Notes");
        assert_eq!(settings.base_url, "https://example.com");
        assert!(settings.nav.override_routes);
        assert_eq!(settings.nav.items.len(), 1);
        assert_eq!(settings.nav.items[0].label, "About");
        assert_eq!(settings.nav.items[0].target, "/about");
        assert_eq!(settings.footer.text, "© Roast Notes");
        assert_eq!(settings.footer.items.len(), 1);
        assert_eq!(settings.footer.items[0].label, "Imprint");
    }

    #[test]
    fn test_from_toml_partial_sections_default_rest() {
        let raw = "title = \"Roast Notes\"\n";

        let settings = Settings::from_toml(raw).unwrap();

        assert_eq!(settings.title, "Roast Notes");
        assert!(settings.description.is_empty());
        assert!(settings.nav.items.is_empty());
    }

    #[test]
    fn test_from_toml_invalid_syntax_is_parse_error() {
        let result = Settings::from_toml("title = ");

        assert!(matches!(result, Err(SettingsError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let result = Settings::load(&dir.path().join("site.toml"));

        assert!(matches!(result, Err(SettingsError::NotFound(_))));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, "title = \"Roast Notes\"").unwrap();

        let settings = Settings::load(&path).unwrap();

        assert_eq!(settings.title, "Roast Notes");
    }
}
