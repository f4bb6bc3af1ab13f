//! Content module - handles posts and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{parse_date_string, FrontMatter};
pub use loader::{permalink, sort_posts, ContentLoader};
pub use markdown::MarkdownRenderer;
pub use post::{Category, Post};
