//! Built-in theme templates using the Tera template engine
//!
//! The listing, post and layout templates plus the stylesheet are embedded
//! in the binary. Everything a template prints is prepared here as plain
//! serializable view data: titles and names arrive already escaped and
//! links already rooted, so the templates only decide layout.

use anyhow::{Context as _, Result};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Category, Post};
use crate::helpers::{
    date_xml, encode_path, format_date, full_url_for, html_escape, pagination_path, url_for,
};
use crate::paginator::{PageLink, Pager};

/// Stylesheet shipped with every generated site
pub const STYLESHEET: &str = include_str!("theme/style.css");

/// Where the stylesheet lands, relative to the public directory
pub const STYLESHEET_PATH: &str = "css/style.css";

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // View data is escaped up front; post bodies are trusted HTML
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            (
                "partials/pagination.html",
                include_str!("theme/partials/pagination.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template_name, context)
            .with_context(|| format!("failed to render template {}", template_name))
    }

    /// Render one page of a post listing
    pub fn render_listing(&self, site: &SiteData, listing: &ListingData) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("listing", listing);
        context.insert("pagination", &listing.pagination);
        self.render("index.html", &context)
    }

    /// Render a single post page
    pub fn render_post(&self, site: &SiteData, post: &PostPageData) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("post", post);
        self.render("post.html", &context)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub keywords: String,
    pub author: String,
    pub language: String,
    pub home: String,
    pub stylesheet: String,
    pub read_more: String,
    pub menu: Vec<MenuItem>,
    pub year: String,
    pub generator: String,
}

impl SiteData {
    pub fn new(config: &SiteConfig) -> Self {
        let menu = config
            .menu
            .iter()
            .map(|(name, path)| MenuItem {
                name: html_escape(name),
                url: if path.starts_with("http://") || path.starts_with("https://") {
                    path.clone()
                } else {
                    url_for(config, path)
                },
            })
            .collect();

        Self {
            title: html_escape(&config.title),
            subtitle: html_escape(&config.subtitle),
            description: html_escape(&config.description),
            keywords: config
                .keywords
                .as_ref()
                .map(|k| html_escape(&k.join(", ")))
                .unwrap_or_default(),
            author: html_escape(&config.author),
            language: html_escape(&config.language),
            home: url_for(config, ""),
            stylesheet: url_for(config, STYLESHEET_PATH),
            read_more: html_escape(&config.read_more),
            menu,
            year: chrono::Local::now().format("%Y").to_string(),
            generator: format!("pagefold {}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
}

impl CategoryLink {
    pub fn new(config: &SiteConfig, name: &str) -> Self {
        let category = Category::new(name, &config.category_dir);
        Self {
            name: html_escape(name),
            url: url_for(config, &encode_path(&category.path)),
        }
    }
}

/// A post as it appears in a listing
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub url: String,
    pub date: String,
    pub datetime: String,
    pub categories: Vec<CategoryLink>,
    pub excerpt: String,
}

impl PostSummary {
    pub fn new(config: &SiteConfig, post: &Post) -> Self {
        let (date, datetime) = display_date(config, &post.date);
        Self {
            title: html_escape(&post.title),
            url: post_url(config, post),
            date,
            datetime,
            categories: category_links(config, post),
            excerpt: post.excerpt.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationLink {
    pub gap: bool,
    pub number: usize,
    pub url: String,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total_pages: usize,
    pub total_posts: usize,
    pub current: usize,
    pub current_url: String,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub links: Vec<PaginationLink>,
}

impl PaginationData {
    /// Navigation for `pager`, whose listing starts at `base`
    pub fn new<T>(config: &SiteConfig, pager: &Pager<'_, T>, base: &str) -> Self {
        let page_url = |number: usize| {
            url_for(
                config,
                &encode_path(&pagination_path(base, &config.paginate_path, number)),
            )
        };

        let links = pager
            .links(config.mid_size)
            .into_iter()
            .map(|link| match link {
                PageLink::Page { number, current } => PaginationLink {
                    gap: false,
                    number,
                    url: page_url(number),
                    current,
                },
                PageLink::Gap => PaginationLink {
                    gap: true,
                    number: 0,
                    url: String::new(),
                    current: false,
                },
            })
            .collect();

        Self {
            per_page: pager.per_page,
            total_pages: pager.total_pages,
            total_posts: pager.total_items,
            current: pager.page_number,
            current_url: page_url(pager.page_number),
            has_previous: pager.has_previous(),
            has_next: pager.has_next(),
            previous_url: pager.previous_page().map(page_url),
            next_url: pager.next_page().map(page_url),
            links,
        }
    }

    /// Navigation for a listing with no posts at all
    pub fn empty(config: &SiteConfig, base: &str) -> Self {
        Self {
            per_page: config.per_page,
            total_pages: 0,
            total_posts: 0,
            current: 1,
            current_url: url_for(config, &encode_path(base)),
            has_previous: false,
            has_next: false,
            previous_url: None,
            next_url: None,
            links: Vec::new(),
        }
    }
}

/// One rendered page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub heading: Option<String>,
    pub posts: Vec<PostSummary>,
    pub pagination: PaginationData,
}

impl ListingData {
    pub fn new(
        config: &SiteConfig,
        heading: Option<&str>,
        pager: &Pager<'_, Post>,
        base: &str,
    ) -> Self {
        Self {
            heading: heading.map(html_escape),
            posts: pager
                .items
                .iter()
                .map(|p| PostSummary::new(config, p))
                .collect(),
            pagination: PaginationData::new(config, pager, base),
        }
    }

    /// The page shown when a listing has nothing in it
    pub fn empty(config: &SiteConfig, heading: Option<&str>, base: &str) -> Self {
        Self {
            heading: heading.map(html_escape),
            posts: Vec::new(),
            pagination: PaginationData::empty(config, base),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

impl NavPost {
    pub fn new(config: &SiteConfig, post: &Post) -> Self {
        Self {
            title: html_escape(&post.title),
            url: post_url(config, post),
        }
    }
}

/// A full post page
#[derive(Debug, Clone, Serialize)]
pub struct PostPageData {
    pub title: String,
    /// Absolute URL, used as the canonical link
    pub permalink: String,
    pub date: String,
    pub datetime: String,
    pub description: Option<String>,
    pub keywords: String,
    pub categories: Vec<CategoryLink>,
    pub tags: Vec<String>,
    pub content: String,
    pub newer: Option<NavPost>,
    pub older: Option<NavPost>,
}

impl PostPageData {
    pub fn new(
        config: &SiteConfig,
        post: &Post,
        newer: Option<&Post>,
        older: Option<&Post>,
    ) -> Self {
        let (date, datetime) = display_date(config, &post.date);
        Self {
            title: html_escape(&post.title),
            permalink: full_url_for(config, &encode_path(&post.url)),
            date,
            datetime,
            description: post.description.as_deref().map(html_escape),
            keywords: html_escape(&post.keywords.join(", ")),
            categories: category_links(config, post),
            tags: post.tags.iter().map(|t| html_escape(t)).collect(),
            content: post.content.clone(),
            newer: newer.map(|p| NavPost::new(config, p)),
            older: older.map(|p| NavPost::new(config, p)),
        }
    }
}

/// Rooted, percent-encoded link to a post
pub fn post_url(config: &SiteConfig, post: &Post) -> String {
    url_for(config, &encode_path(&post.url))
}

fn category_links(config: &SiteConfig, post: &Post) -> Vec<CategoryLink> {
    post.categories
        .iter()
        .map(|c| CategoryLink::new(config, c))
        .collect()
}

/// Display text and machine-readable form of a date, in the site zone
fn display_date(config: &SiteConfig, date: &DateTime<FixedOffset>) -> (String, String) {
    match config.time_zone().ok().flatten() {
        Some(tz) => {
            let date = date.with_timezone(&tz);
            (format_date(&date, &config.date_format), date_xml(&date))
        }
        None => (format_date(date, &config.date_format), date_xml(date)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginator::paginate;
    use chrono::TimeZone;

    fn config() -> SiteConfig {
        SiteConfig {
            title: "Notes & Thoughts".to_string(),
            timezone: "UTC".to_string(),
            ..SiteConfig::default()
        }
    }

    fn post(n: u32, categories: &[&str]) -> Post {
        let date = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2020, 1, n, 9, 0, 0)
            .unwrap();
        let slug = format!("post-{}", n);
        let mut post = Post::new(format!("Post {}", n), date, slug.clone(), format!("{}.md", slug));
        post.categories = categories.iter().map(|c| c.to_string()).collect();
        post.url = format!("2020/01/{:02}/{}.html", n, slug);
        post.excerpt = format!("Excerpt {}", n);
        post
    }

    fn posts(count: u32) -> Vec<Post> {
        (1..=count).rev().map(|n| post(n, &[])).collect()
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_listing_renders_one_block_per_post_in_order() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);
        let posts = posts(25);
        let pages = paginate(&posts, 10).unwrap();

        let html = renderer
            .render_listing(&site, &ListingData::new(&config, None, &pages[1], ""))
            .unwrap();

        assert_eq!(count(&html, r#"<article class="post-item">"#), 10);
        let first = html.find("Post 15").unwrap();
        let last = html.find("Post 6").unwrap();
        assert!(first < last);
        assert!(!html.contains("Post 16<"));
        assert!(!html.contains("Post 5<"));

        assert!(html.contains(r#"<nav class="pagination""#));
        assert!(html.contains(r#"<a class="pagination-prev" href="/" rel="prev">"#));
        assert!(html.contains(r#"<a class="pagination-next" href="/page3/" rel="next">"#));
        assert!(html.contains(r#"<span class="pagination-number current" aria-current="page">2</span>"#));
        assert!(html.contains("<title>Notes &amp; Thoughts | Page 2</title>"));
    }

    #[test]
    fn test_last_page_has_no_next_link() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);
        let posts = posts(25);
        let pages = paginate(&posts, 10).unwrap();

        let html = renderer
            .render_listing(&site, &ListingData::new(&config, None, &pages[2], ""))
            .unwrap();
        assert_eq!(count(&html, r#"<article class="post-item">"#), 5);
        assert!(html.contains(r#"<span class="pagination-next disabled">"#));
        assert!(html.contains(r#"<a class="pagination-prev" href="/page2/" rel="prev">"#));
    }

    #[test]
    fn test_single_page_has_no_pagination_block() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);
        let posts = posts(3);
        let pages = paginate(&posts, 10).unwrap();
        assert_eq!(pages.len(), 1);

        let html = renderer
            .render_listing(&site, &ListingData::new(&config, None, &pages[0], ""))
            .unwrap();
        assert_eq!(count(&html, r#"<article class="post-item">"#), 3);
        assert!(!html.contains(r#"class="pagination""#));
    }

    #[test]
    fn test_empty_listing() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);

        let html = renderer
            .render_listing(&site, &ListingData::empty(&config, None, ""))
            .unwrap();
        assert_eq!(count(&html, r#"<article class="post-item">"#), 0);
        assert!(html.contains("post-list-empty"));
        assert!(!html.contains(r#"class="pagination""#));
    }

    #[test]
    fn test_category_segment_only_when_present() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);
        let posts = vec![post(2, &["Java", "JVM"]), post(1, &[])];
        let pages = paginate(&posts, 10).unwrap();

        let html = renderer
            .render_listing(&site, &ListingData::new(&config, None, &pages[0], ""))
            .unwrap();
        assert_eq!(count(&html, r#"<span class="post-categories">"#), 1);
        assert!(html.contains(r#"<a class="category-link" href="/categories/java/">Java</a>"#));
        assert!(html.contains(r#"<a class="category-link" href="/categories/jvm/">JVM</a>"#));
    }

    #[test]
    fn test_ellipsis_in_long_listing() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);
        let posts = posts(90);
        let pages = paginate(&posts, 10).unwrap();

        let html = renderer
            .render_listing(&site, &ListingData::new(&config, None, &pages[4], "categories/java/"))
            .unwrap();
        assert_eq!(count(&html, "pagination-ellipsis"), 2);
        assert!(html.contains(r#"<a class="pagination-number" href="/categories/java/">1</a>"#));
        assert!(html.contains(r#"<a class="pagination-number" href="/categories/java/page9/">9</a>"#));
    }

    #[test]
    fn test_summary_escapes_and_links() {
        let mut config = config();
        config.root = "/blog/".to_string();
        let mut p = post(7, &["Spring Framework"]);
        p.title = "Beans <and> Contexts".to_string();

        let summary = PostSummary::new(&config, &p);
        assert_eq!(summary.title, "Beans &lt;and&gt; Contexts");
        assert_eq!(summary.url, "/blog/2020/01/07/post-7.html");
        assert_eq!(summary.date, "2020-01-07");
        assert_eq!(summary.datetime, "2020-01-07T09:00:00+00:00");
        assert_eq!(
            summary.categories,
            vec![CategoryLink {
                name: "Spring Framework".to_string(),
                url: "/blog/categories/spring-framework/".to_string(),
            }]
        );
    }

    #[test]
    fn test_post_page() {
        let config = config();
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::new(&config);
        let posts = posts(3);
        let mut middle = posts[1].clone();
        middle.content = "<p>Body text</p>".to_string();
        middle.tags = vec!["gc".to_string()];

        let data = PostPageData::new(&config, &middle, Some(&posts[0]), Some(&posts[2]));
        let html = renderer.render_post(&site, &data).unwrap();
        assert!(html.contains("<p>Body text</p>"));
        assert!(html.contains("#gc"));
        assert!(html.contains(r#"href="/2020/01/03/post-3.html" rel="prev""#));
        assert!(html.contains(r#"href="/2020/01/01/post-1.html" rel="next""#));
        assert!(html.contains(r#"<link rel="stylesheet" href="/css/style.css">"#));
        assert!(html.contains(
            r#"<link rel="canonical" href="http://example.com/2020/01/02/post-2.html">"#
        ));
    }
}
