//! pagefold: a small static blog generator
//!
//! Posts are Markdown files with YAML front-matter. The generator orders the
//! published ones newest first, slices them into fixed-size index pages with
//! [`paginator::paginate`], and renders every page and post to static HTML
//! through embedded Tera templates.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod paginator;
pub mod templates;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the site configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// A blog rooted at a directory on disk
#[derive(Debug, Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory
    pub source_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl Blog {
    /// Open the blog in `base_dir`, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join(CONFIG_FILE);

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            tracing::debug!("No {} in {:?}, using defaults", CONFIG_FILE, base_dir);
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Build a blog from an already loaded configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            source_dir,
            public_dir,
        }
    }

    /// Delete the public directory, refusing when it would take the sources with it
    pub fn remove_public_dir(&self) -> Result<()> {
        if !self.public_dir.exists() {
            return Ok(());
        }
        if self.base_dir.starts_with(&self.public_dir)
            || self.source_dir.starts_with(&self.public_dir)
        {
            anyhow::bail!(
                "Refusing to remove public directory {:?}: it contains the site sources",
                self.public_dir
            );
        }
        fs::remove_dir_all(&self.public_dir)
            .with_context(|| format!("failed to remove {:?}", self.public_dir))?;
        tracing::debug!("Removed {:?}", self.public_dir);
        Ok(())
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str, draft: bool) -> Result<PathBuf> {
        commands::new::create_post(self, title, draft)
    }
}
