//! Post and category models

use chrono::{DateTime, FixedOffset};
use indexmap::IndexSet;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date
    pub date: DateTime<FixedOffset>,

    /// Categories, outermost first, without duplicates
    pub categories: IndexSet<String>,

    /// Post tags
    pub tags: Vec<String>,

    /// SEO keywords
    pub keywords: Vec<String>,

    /// Summary from front-matter
    pub description: Option<String>,

    /// Whether the post is published
    pub published: bool,

    /// Layout template to use
    pub layout: String,

    /// Raw markdown content
    pub raw: String,

    /// Rendered HTML content
    pub content: String,

    /// Plain-text preview shown in listings
    pub excerpt: String,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// URL path relative to the site root, without a leading slash
    pub url: String,

    /// Source file path (relative to the source dir)
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// Custom front-matter fields
    #[serde(skip)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: DateTime<FixedOffset>, slug: String, source: String) -> Self {
        Self {
            title,
            date,
            categories: IndexSet::new(),
            tags: Vec::new(),
            keywords: Vec::new(),
            description: None,
            published: true,
            layout: "post".to_string(),
            raw: String::new(),
            content: String::new(),
            excerpt: String::new(),
            slug,
            url: String::new(),
            source: source.clone(),
            full_source: PathBuf::from(&source),
            extra: HashMap::new(),
        }
    }
}

/// A category and the listing directory it renders to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
    /// Listing path relative to the site root, with a trailing slash
    pub path: String,
}

impl Category {
    pub fn new(name: &str, category_dir: &str) -> Self {
        let slug = slug::slugify(name);
        let dir = category_dir.trim_matches('/');
        let path = if dir.is_empty() {
            format!("{}/", slug)
        } else {
            format!("{}/{}/", dir, slug)
        };
        Self {
            name: name.to_string(),
            slug,
            path,
        }
    }
}
