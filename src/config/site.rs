//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Placeholder replaced by the page number in `paginate_path`
pub const PAGE_NUMBER_PLACEHOLDER: &str = ":num";

/// Errors raised while loading or validating the site configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub keywords: Option<Vec<String>>,
    pub author: String,
    pub language: String,
    pub timezone: String,

    // URL
    pub url: String,
    pub root: String,
    pub permalink: String,

    // Directory
    pub source_dir: String,
    pub public_dir: String,
    pub posts_dir: String,
    pub drafts_dir: String,
    pub category_dir: String,
    #[serde(default)]
    pub exclude: Vec<String>,

    // Writing
    pub render_drafts: bool,
    pub future: bool,
    pub highlight_theme: String,
    pub line_numbers: bool,

    // Listing
    pub excerpt_words: usize,
    pub excerpt_separator: String,
    pub read_more: String,
    pub date_format: String,

    // Pagination
    pub per_page: usize,
    pub paginate_path: String,
    pub mid_size: usize,

    // Navigation, in declaration order
    #[serde(default)]
    pub menu: IndexMap<String, String>,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            subtitle: String::new(),
            description: String::new(),
            keywords: None,
            author: String::new(),
            language: "en".to_string(),
            timezone: String::new(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),
            permalink: ":categories/:year/:month/:day/:title.html".to_string(),

            source_dir: "source".to_string(),
            public_dir: "public".to_string(),
            posts_dir: "_posts".to_string(),
            drafts_dir: "_drafts".to_string(),
            category_dir: "categories".to_string(),
            exclude: Vec::new(),

            render_drafts: false,
            future: true,
            highlight_theme: "base16-ocean.dark".to_string(),
            line_numbers: false,

            excerpt_words: 40,
            excerpt_separator: "<!-- more -->".to_string(),
            read_more: "Read more".to_string(),
            date_format: "YYYY-MM-DD".to_string(),

            per_page: 10,
            paginate_path: "page:num/".to_string(),
            mid_size: 0,

            menu: IndexMap::new(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {:?}", path))?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty file deserializes to unit, not a mapping
        let config: SiteConfig = if content.trim().is_empty() {
            SiteConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the generator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.per_page == 0 {
            return Err(ConfigError::invalid(
                "per_page",
                "must be greater than zero",
            ));
        }
        if !self.paginate_path.contains(PAGE_NUMBER_PLACEHOLDER) {
            return Err(ConfigError::invalid(
                "paginate_path",
                format!("must contain `{}`", PAGE_NUMBER_PLACEHOLDER),
            ));
        }
        if self.excerpt_words == 0 {
            return Err(ConfigError::invalid(
                "excerpt_words",
                "must be greater than zero",
            ));
        }
        self.time_zone()?;
        Ok(())
    }

    /// The configured IANA time zone, if any
    pub fn time_zone(&self) -> Result<Option<Tz>, ConfigError> {
        let name = self.timezone.trim();
        if name.is_empty() {
            return Ok(None);
        }
        name.parse::<Tz>()
            .map(Some)
            .map_err(|e| ConfigError::invalid("timezone", e.to_string()))
    }
}
