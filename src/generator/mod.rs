//! Generator module - writes the static site using the built-in templates

use anyhow::{Context, Result};
use indexmap::{IndexMap, IndexSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::content::{Category, Post};
use crate::helpers::pagination_path;
use crate::paginator::paginate;
use crate::templates::{
    ListingData, PostPageData, SiteData, TemplateRenderer, STYLESHEET, STYLESHEET_PATH,
};
use crate::Blog;

/// What a generation run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    pub posts: usize,
    /// Pages the paginator produced; an empty listing's placeholder is not one
    pub listing_pages: usize,
    pub categories: usize,
    pub assets: usize,
}

/// Static site generator using Tera templates
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site from posts ordered newest first
    ///
    /// The public directory is rebuilt from scratch, so pages of posts that
    /// were removed or unpublished since the last run do not linger.
    pub fn generate(&self, posts: &[Post]) -> Result<GenerateReport> {
        let public_dir = &self.blog.public_dir;
        self.blog.remove_public_dir()?;
        fs::create_dir_all(public_dir)
            .with_context(|| format!("failed to create {:?}", public_dir))?;

        let mut report = GenerateReport {
            assets: self.copy_source_assets()?,
            ..GenerateReport::default()
        };
        write_file(&public_dir.join(STYLESHEET_PATH), STYLESHEET)?;

        let site = SiteData::new(&self.blog.config);

        report.listing_pages += self.generate_listing(&site, posts, "", None)?;

        let categories = group_by_category(posts, &self.blog.config.category_dir);
        for (category, category_posts) in &categories {
            report.listing_pages += self.generate_listing(
                &site,
                category_posts,
                &category.path,
                Some(&category.name),
            )?;
        }
        report.categories = categories.len();
        tracing::info!("Generated {} category listings", categories.len());

        report.posts = self.generate_post_pages(&site, posts)?;

        Ok(report)
    }

    /// Write every page of a listing rooted at `base`, returning the page count
    fn generate_listing(
        &self,
        site: &SiteData,
        posts: &[Post],
        base: &str,
        heading: Option<&str>,
    ) -> Result<usize> {
        let config = &self.blog.config;
        let pages = paginate(posts, config.per_page)?;

        if pages.is_empty() {
            let listing = ListingData::empty(config, heading, base);
            let html = self.renderer.render_listing(site, &listing)?;
            write_file(&self.listing_output(base, 1), &html)?;
            return Ok(0);
        }

        for pager in &pages {
            let listing = ListingData::new(config, heading, pager, base);
            let html = self.renderer.render_listing(site, &listing)?;
            let output_path = self.listing_output(base, pager.page_number);
            write_file(&output_path, &html)?;
            tracing::debug!("Generated: {:?}", output_path);
        }

        Ok(pages.len())
    }

    fn listing_output(&self, base: &str, page: usize) -> PathBuf {
        let relative = pagination_path(base, &self.blog.config.paginate_path, page);
        self.blog.public_dir.join(relative).join("index.html")
    }

    /// Generate individual post pages
    fn generate_post_pages(&self, site: &SiteData, posts: &[Post]) -> Result<usize> {
        let config = &self.blog.config;

        for (i, post) in posts.iter().enumerate() {
            let newer = i.checked_sub(1).and_then(|j| posts.get(j));
            let older = posts.get(i + 1);

            let data = PostPageData::new(config, post, newer, older);
            let html = self.renderer.render_post(site, &data)?;

            let output_path = post_output(&self.blog.public_dir, &post.url);
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
        }

        Ok(posts.len())
    }

    /// Copy non-Markdown files outside underscore directories to the public directory
    fn copy_source_assets(&self) -> Result<usize> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden_or_private(e.path()))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("markdown")
            ) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("failed to copy {:?} to {:?}", path, dest))?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// Posts per category, keyed by the category's slug so names that slugify
/// alike share one listing. Categories appear in order of first use.
pub fn group_by_category(posts: &[Post], category_dir: &str) -> Vec<(Category, Vec<Post>)> {
    let mut groups: IndexMap<String, (Category, Vec<Post>)> = IndexMap::new();

    for post in posts {
        let mut seen = IndexSet::new();
        for name in &post.categories {
            let category = Category::new(name, category_dir);
            if category.slug.is_empty() || !seen.insert(category.slug.clone()) {
                continue;
            }
            groups
                .entry(category.slug.clone())
                .or_insert_with(|| (category, Vec::new()))
                .1
                .push(post.clone());
        }
    }

    groups.into_values().collect()
}

/// File a post URL maps to: directories get an `index.html`
fn post_output(public_dir: &Path, url: &str) -> PathBuf {
    if url.is_empty() || url.ends_with('/') {
        public_dir.join(url).join("index.html")
    } else {
        public_dir.join(url)
    }
}

fn is_hidden_or_private(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('_') || n.starts_with('.'))
        .unwrap_or(false)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create dir {:?}", parent))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {:?}", path))
}
