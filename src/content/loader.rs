//! Content loader - loads posts from the source directory

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use chrono_tz::Tz;
use glob::Pattern;
use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::{FrontMatter, MarkdownRenderer, Post};
use crate::helpers::{excerpt_from_html, html_escape, localize};
use crate::Blog;

lazy_static! {
    /// `2019-03-12-understanding-g1` → date and slug
    static ref DATED_NAME: Regex =
        Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})-(.+)$").unwrap();
}

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
    renderer: MarkdownRenderer,
    tz: Option<Tz>,
    exclude: Vec<Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Result<Self> {
        let config = &blog.config;
        let renderer = MarkdownRenderer::with_options(&config.highlight_theme, config.line_numbers);
        let tz = config.time_zone()?;
        let exclude = config
            .exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern {:?}", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            blog,
            renderer,
            tz,
            exclude,
        })
    }

    /// Load every listable post, newest first
    ///
    /// Unpublished posts are dropped, as are future-dated ones unless the
    /// site allows them. Files that fail to load are logged and skipped.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            tracing::warn!("Source directory {:?} does not exist", source_dir);
            return Ok(Vec::new());
        }

        let now = Local::now().fixed_offset();
        let mut posts = Vec::new();

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }

            let relative = path.strip_prefix(source_dir).unwrap_or(path);
            if self.is_excluded(relative) {
                tracing::debug!("Excluded: {:?}", relative);
                continue;
            }
            let Some(parents) = self.post_parents(relative) else {
                continue;
            };

            let post = match self.load_post(path, &parents) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {:#}", path, e);
                    continue;
                }
            };

            if !post.published {
                tracing::debug!("Skipping unpublished post {:?}", post.source);
                continue;
            }
            if !self.blog.config.future && post.date > now {
                tracing::debug!("Skipping future post {:?}", post.source);
                continue;
            }
            posts.push(post);
        }

        sort_posts(&mut posts);
        Ok(posts)
    }

    /// Directory names between the source root and the posts (or drafts)
    /// directory holding `relative`, or `None` if it is not a post file
    fn post_parents(&self, relative: &Path) -> Option<Vec<String>> {
        let config = &self.blog.config;
        let mut dirs: Vec<String> = relative
            .parent()?
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();

        let pos = dirs.iter().position(|d| {
            *d == config.posts_dir || (config.render_drafts && *d == config.drafts_dir)
        })?;
        dirs.truncate(pos);
        Some(dirs)
    }

    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }

    /// Load a single post from a file
    fn load_post(&self, path: &Path, parents: &[String]) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)?;
        let config = &self.blog.config;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let (name_date, slug) = match DATED_NAME.captures(stem) {
            Some(caps) => {
                let date = NaiveDate::from_ymd_opt(
                    caps[1].parse()?,
                    caps[2].parse()?,
                    caps[3].parse()?,
                )
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|d| localize(d, self.tz));
                (date, caps[4].to_string())
            }
            None => (None, stem.to_string()),
        };

        let date = match fm.parse_date(self.tz).or(name_date) {
            Some(date) => date,
            None => {
                if let Some(raw) = &fm.date {
                    tracing::warn!("Unrecognized date {:?} in {:?}", raw, path);
                }
                file_modified(path)?
            }
        };

        let title = fm.title.clone().unwrap_or_else(|| slug.clone());

        let source = path
            .strip_prefix(&self.blog.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let categories = unique_categories(parents.iter().chain(fm.categories.iter()));

        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body, &config.excerpt_separator);
        let content_html = self.renderer.render(&full_md);
        let excerpt_source = match (&fm.description, &excerpt_md) {
            (Some(description), _) => html_escape(description),
            (None, Some(excerpt)) => self.renderer.render(excerpt),
            (None, None) => content_html.clone(),
        };
        let excerpt = excerpt_from_html(&excerpt_source, config.excerpt_words);

        let pattern = fm.permalink.as_deref().unwrap_or(&config.permalink);
        let url = permalink(pattern, &date, &slug, &categories);

        let mut post = Post::new(title, date, slug, source);
        post.categories = categories;
        post.tags = fm.tags;
        post.keywords = fm.keywords;
        post.description = fm.description;
        post.published = fm.published;
        post.layout = fm.layout.unwrap_or_else(|| "post".to_string());
        post.raw = body.to_string();
        post.content = content_html;
        post.excerpt = excerpt;
        post.url = url;
        post.full_source = path.to_path_buf();
        post.extra = fm.extra;

        Ok(post)
    }
}

/// Categories in order, dropping blanks and any name whose slug was already seen
///
/// `java/_posts` with `categories: Java` keeps only the directory's `java`.
fn unique_categories<'s>(names: impl Iterator<Item = &'s String>) -> IndexSet<String> {
    let mut slugs = IndexSet::new();
    let mut categories = IndexSet::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if slugs.insert(slug::slugify(name)) {
            categories.insert(name.to_string());
        }
    }
    categories
}

/// Newest first; equal dates fall back to URL order so builds are stable
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.url.cmp(&b.url)));
}

/// Expand a permalink pattern into a site-relative path
///
/// Placeholders: `:year`, `:month`, `:day`, `:i_month`, `:i_day`, `:title`,
/// `:slug` and `:categories`. Empty segments collapse, so a post without
/// categories under `:categories/:title.html` lands at `title.html`.
pub fn permalink(
    pattern: &str,
    date: &DateTime<FixedOffset>,
    slug: &str,
    categories: &IndexSet<String>,
) -> String {
    let categories = categories
        .iter()
        .map(|c| slug::slugify(c))
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let expanded = pattern
        .replace(":year", &date.format("%Y").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":categories", &categories)
        .replace(":title", slug)
        .replace(":slug", slug);

    let trailing_slash = expanded.ends_with('/');
    let mut path = expanded
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if trailing_slash && !path.is_empty() {
        path.push('/');
    }
    path
}

fn file_modified(path: &Path) -> Result<DateTime<FixedOffset>> {
    let modified = fs::metadata(path)?.modified()?;
    Ok(DateTime::<Local>::from(modified).fixed_offset())
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn blog(dir: &TempDir, config: SiteConfig) -> Blog {
        Blog::with_config(dir.path(), config)
    }

    fn utc_config() -> SiteConfig {
        SiteConfig {
            timezone: "UTC".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_permalink_expansion() {
        let date = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2019, 3, 5, 0, 0, 0)
            .unwrap();
        let cats: IndexSet<String> = ["Java".to_string(), "JVM Internals".to_string()]
            .into_iter()
            .collect();

        assert_eq!(
            permalink(":categories/:year/:month/:day/:title.html", &date, "g1", &cats),
            "java/jvm-internals/2019/03/05/g1.html"
        );
        assert_eq!(
            permalink(":categories/:year/:month/:day/:title.html", &date, "g1", &IndexSet::new()),
            "2019/03/05/g1.html"
        );
        assert_eq!(
            permalink("/:year/:i_month/:i_day/:slug/", &date, "g1", &cats),
            "2019/3/5/g1/"
        );
    }

    #[test]
    fn test_load_posts_orders_and_filters() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(&source, "_posts/2020-01-01-first.md", "---\ntitle: First\n---\nOne.");
        write(&source, "_posts/2020-02-01-second.md", "---\ntitle: Second\n---\nTwo.");
        write(
            &source,
            "_posts/2020-03-01-hidden.md",
            "---\ntitle: Hidden\npublished: false\n---\nNope.",
        );
        write(&source, "about.md", "---\ntitle: About\n---\nNot a post.");

        let blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();

        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Second", "First"]);
        assert_eq!(posts[0].url, "2020/02/01/second.html");
        assert_eq!(posts[0].date.to_rfc3339(), "2020-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_directory_categories_come_first() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(
            &source,
            "java/_posts/2019-05-04-locks.md",
            "---\ntitle: Locks\ncategories: concurrency java\n---\nBody.",
        );

        let blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();

        assert_eq!(posts.len(), 1);
        let cats: Vec<_> = posts[0].categories.iter().map(String::as_str).collect();
        assert_eq!(cats, vec!["java", "concurrency"]);
        assert_eq!(posts[0].url, "java/concurrency/2019/05/04/locks.html");
    }

    #[test]
    fn test_categories_differing_in_case_collapse() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(
            &source,
            "java/_posts/2023-02-01-gc.md",
            "---\ntitle: GC\ncategories: [Java, JVM, jvm]\n---\nBody.",
        );

        let blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();

        let cats: Vec<_> = posts[0].categories.iter().map(String::as_str).collect();
        assert_eq!(cats, vec!["java", "JVM"]);
        assert_eq!(posts[0].url, "java/jvm/2023/02/01/gc.html");
    }

    #[test]
    fn test_front_matter_date_overrides_file_name() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(
            &source,
            "_posts/2019-01-01-moved.md",
            "---\ntitle: Moved\ndate: 2019-06-30 12:00:00 +0800\n---\nBody.",
        );

        let blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();
        assert_eq!(posts[0].date.to_rfc3339(), "2019-06-30T12:00:00+08:00");
        assert_eq!(posts[0].url, "2019/06/30/moved.html");
    }

    #[test]
    fn test_excerpt_sources() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(
            &source,
            "_posts/2020-01-01-described.md",
            "---\ntitle: D\ndescription: Short <summary>\n---\nLong body text.",
        );
        write(
            &source,
            "_posts/2020-01-02-split.md",
            "---\ntitle: S\n---\nIntro **words**.\n\n<!-- more -->\n\nRest of it.",
        );
        write(
            &source,
            "_posts/2020-01-03-long.md",
            "---\ntitle: L\n---\none two three four five six",
        );

        let config = SiteConfig {
            excerpt_words: 4,
            ..utc_config()
        };
        let blog = blog(&dir, config);
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();

        assert_eq!(posts[0].excerpt, "one two three four…");
        assert_eq!(posts[1].excerpt, "Intro words.");
        assert!(posts[1].content.contains("Rest of it."));
        assert_eq!(posts[2].excerpt, "Short &lt;summary&gt;");
    }

    #[test]
    fn test_malformed_post_is_skipped() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(&source, "_posts/2020-01-01-bad.md", "---\ntitle: [oops\n---\nBody.");
        write(&source, "_posts/2020-01-02-good.md", "---\ntitle: Good\n---\nBody.");

        let blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Good");
    }

    #[test]
    fn test_drafts_exclude_and_future() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(&source, "_drafts/2020-01-01-draft.md", "---\ntitle: Draft\n---\nBody.");
        write(&source, "_posts/2020-01-02-skip-me.md", "---\ntitle: Skip\n---\nBody.");
        write(&source, "_posts/2999-01-01-later.md", "---\ntitle: Later\n---\nBody.");
        write(&source, "_posts/2020-01-03-kept.md", "---\ntitle: Kept\n---\nBody.");

        let default_blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&default_blog).unwrap().load_posts().unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Later", "Kept", "Skip"]);

        let config = SiteConfig {
            render_drafts: true,
            future: false,
            exclude: vec!["_posts/*skip*".to_string()],
            ..utc_config()
        };
        let tuned = blog(&dir, config);
        let posts = ContentLoader::new(&tuned).unwrap().load_posts().unwrap();
        let titles: Vec<_> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Kept", "Draft"]);
    }

    #[test]
    fn test_title_falls_back_to_slug() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        write(&source, "_posts/2020-01-01-untitled-note.md", "Just a note.");

        let blog = blog(&dir, utc_config());
        let posts = ContentLoader::new(&blog).unwrap().load_posts().unwrap();
        assert_eq!(posts[0].title, "untitled-note");
        assert_eq!(posts[0].slug, "untitled-note");
    }
}
