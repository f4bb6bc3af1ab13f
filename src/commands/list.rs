//! List site content

use anyhow::Result;
use indexmap::IndexMap;

use crate::content::{ContentLoader, Post};
use crate::Blog;

/// List site content by type
pub fn run(blog: &Blog, content_type: &str) -> Result<()> {
    let loader = ContentLoader::new(blog)?;
    let posts = loader.load_posts()?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", posts.len());
            for post in &posts {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source
                );
            }
        }
        "category" | "categories" => {
            let categories = count_by(&posts, |p| p.categories.iter().cloned().collect());
            println!("Categories ({}):", categories.len());
            for (name, count) in categories {
                println!("  {} ({})", name, count);
            }
        }
        "tag" | "tags" => {
            let tags = count_by(&posts, |p| p.tags.clone());
            println!("Tags ({}):", tags.len());
            for (name, count) in tags {
                println!("  {} ({})", name, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, tag",
                content_type
            );
        }
    }

    Ok(())
}

/// Occurrence counts, most used first, ties in order of first use
fn count_by<F>(posts: &[Post], keys: F) -> Vec<(String, usize)>
where
    F: Fn(&Post) -> Vec<String>,
{
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for post in posts {
        for key in keys(post) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn test_count_by_orders_by_use() {
        let date = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2020, 5, 1, 0, 0, 0)
            .unwrap();
        let mut a = Post::new("A".into(), date, "a".into(), "a.md".into());
        a.tags = vec!["rust".into(), "web".into()];
        let mut b = Post::new("B".into(), date, "b".into(), "b.md".into());
        b.tags = vec!["web".into()];

        let counts = count_by(&[a, b], |p| p.tags.clone());
        assert_eq!(
            counts,
            vec![("web".to_string(), 2), ("rust".to_string(), 1)]
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let err = run(&blog, "routes").unwrap_err();
        assert!(err.to_string().contains("Unknown type"));
    }
}
