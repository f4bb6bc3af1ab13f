//! Create a new post or draft

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Write a dated post skeleton and return its path
///
/// Posts go to the posts directory, drafts to the drafts directory. The
/// filename is `YYYY-MM-DD-slug.md`; an existing file is never overwritten.
pub fn create_post(blog: &Blog, title: &str, draft: bool) -> Result<PathBuf> {
    let title = title.trim();
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a file name from title {:?}", title);
    }

    let config = &blog.config;
    let now = current_time(blog)?;

    let target_dir = if draft {
        blog.source_dir.join(&config.drafts_dir)
    } else {
        blog.source_dir.join(&config.posts_dir)
    };
    fs::create_dir_all(&target_dir)
        .with_context(|| format!("failed to create {:?}", target_dir))?;

    let file_path = target_dir.join(format!("{}-{}.md", now.format("%Y-%m-%d"), slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let content = scaffold(title, &now)?;
    fs::write(&file_path, content)
        .with_context(|| format!("failed to write {:?}", file_path))?;

    tracing::info!("Created: {:?}", file_path);
    Ok(file_path)
}

fn current_time(blog: &Blog) -> Result<DateTime<FixedOffset>> {
    let now = Utc::now();
    Ok(match blog.config.time_zone()? {
        Some(tz) => now.with_timezone(&tz).fixed_offset(),
        None => now.with_timezone(&chrono::Local).fixed_offset(),
    })
}

fn scaffold(title: &str, date: &DateTime<FixedOffset>) -> Result<String> {
    let title = serde_yaml::to_string(title)?;
    Ok(format!(
        "---\ntitle: {}\ndate: {}\ncategories:\ntags:\n---\n",
        title.trim_end(),
        date.format("%Y-%m-%d %H:%M:%S %z")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FrontMatter;
    use tempfile::TempDir;

    #[test]
    fn test_create_post_writes_dated_file() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Tuning the G1 Collector", false).unwrap();
        assert!(path.starts_with(blog.source_dir.join("_posts")));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("-tuning-the-g1-collector.md"));
        assert_eq!(name.len(), "2020-01-01-".len() + "tuning-the-g1-collector.md".len());

        let content = fs::read_to_string(&path).unwrap();
        let (fm, body) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Tuning the G1 Collector"));
        assert!(fm.parse_date(None).is_some());
        assert!(fm.categories.is_empty());
        assert!(body.trim().is_empty());
    }

    #[test]
    fn test_create_draft_and_refuse_overwrite() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        let path = create_post(&blog, "Half: Done", true).unwrap();
        assert!(path.starts_with(blog.source_dir.join("_drafts")));

        let content = fs::read_to_string(&path).unwrap();
        let (fm, _) = FrontMatter::parse(&content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Half: Done"));

        assert!(create_post(&blog, "Half: Done", true).is_err());
    }

    #[test]
    fn test_title_without_slug_rejected() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(create_post(&blog, "  ?!  ", false).is_err());
    }
}
