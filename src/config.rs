//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. The file lives in
//! the content root next to `categories.json` and the `posts/` directory.
//! Every key is optional: user values are merged over stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! [site]
//! name = "Concrete Calc"
//! base_url = "https://example.com"    # absolute, no trailing slash
//! tagline = "Estimate concrete before you order it."
//!
//! [content]
//! categories_file = "categories.json"  # relative to the content root
//! posts_dir = "posts"                  # relative to the content root
//!
//! [blog]
//! per_page = 9                         # posts per category page
//! related_limit = 3                    # related posts under an article
//!
//! [calculator]
//! default_waste_percent = 10.0         # used when the form leaves waste empty
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [blog]
//! per_page = 12
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site identity used in titles, JSON-LD and absolute URLs.
    pub site: SiteIdentity,
    /// Where posts and categories live, relative to the content root.
    pub content: ContentConfig,
    /// Listing and related-post settings.
    pub blog: BlogConfig,
    /// Calculator form defaults.
    pub calculator: CalculatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteIdentity {
    pub name: String,
    /// Absolute origin, e.g. `https://example.com`. No trailing slash.
    pub base_url: String,
    pub tagline: String,
}

impl Default for SiteIdentity {
    fn default() -> Self {
        Self {
            name: "Concrete Calc".to_string(),
            base_url: "https://example.com".to_string(),
            tagline: "Estimate concrete before you order it.".to_string(),
        }
    }
}

impl SiteIdentity {
    /// Absolute URL for a site path (`/blog` → `https://example.com/blog`).
    pub fn absolute_url(&self, path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContentConfig {
    pub categories_file: String,
    pub posts_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            categories_file: "categories.json".to_string(),
            posts_dir: "posts".to_string(),
        }
    }
}

impl ContentConfig {
    pub fn categories_path(&self, root: &Path) -> PathBuf {
        root.join(&self.categories_file)
    }

    pub fn posts_path(&self, root: &Path) -> PathBuf {
        root.join(&self.posts_dir)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    pub per_page: usize,
    pub related_limit: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            per_page: 9,
            related_limit: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorConfig {
    pub default_waste_percent: f64,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_waste_percent: 10.0,
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blog.per_page == 0 {
            return Err(ConfigError::Validation(
                "blog.per_page must be at least 1".into(),
            ));
        }
        let waste = self.calculator.default_waste_percent;
        if !(0.0..=100.0).contains(&waste) {
            return Err(ConfigError::Validation(
                "calculator.default_waste_percent must be 0-100".into(),
            ));
        }
        let base = &self.site.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "site.base_url must start with http:// or https://".into(),
            ));
        }
        if base.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.base_url must not end with a slash".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if there is no `config.toml` in the directory.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the content root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(root)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Concrete site configuration
# ===========================
#
# Place this file in the content root. Every key is optional; anything you
# leave out keeps the value shown here. Unknown keys are rejected.

[site]
# Shown in page titles and as the JSON-LD publisher.
name = "Concrete Calc"
# Absolute origin used for canonical URLs, the sitemap and JSON-LD.
# No trailing slash.
base_url = "https://example.com"
tagline = "Estimate concrete before you order it."

[content]
# JSON array of { "slug", "name", "description" } objects.
categories_file = "categories.json"
# Directory of Markdown posts with YAML frontmatter. Subdirectories become
# part of the slug: posts/guides/footings.md -> /blog/guides/footings
posts_dir = "posts"

[blog]
# Posts per category listing page (at least 1).
per_page = 9
# Related posts shown under an article, drawn from the same category.
related_limit = 3

[calculator]
# Waste allowance applied when the form leaves it empty (0-100).
default_waste_percent = 10.0
"##
}
