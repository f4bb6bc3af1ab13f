//! Generate static files

use anyhow::Result;
use notify::{EventKind, RecursiveMode, Watcher};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::content::ContentLoader;
use crate::generator::{GenerateReport, Generator};
use crate::{Blog, CONFIG_FILE};

/// Quiet period after the last file event before rebuilding
const DEBOUNCE: Duration = Duration::from_millis(300);

/// Generate the static site
pub fn run(blog: &Blog) -> Result<()> {
    build(blog).map(|_| ())
}

/// Load every post and write the site, reporting what was written
pub fn build(blog: &Blog) -> Result<GenerateReport> {
    let start = Instant::now();

    let loader = ContentLoader::new(blog)?;
    let posts = loader.load_posts()?;
    tracing::info!("Loaded {} posts", posts.len());

    let generator = Generator::new(blog)?;
    let report = generator.generate(&posts)?;

    tracing::info!(
        "Generated {} posts, {} listing pages and {} assets in {:.2}s",
        report.posts,
        report.listing_pages,
        report.assets,
        start.elapsed().as_secs_f64()
    );

    Ok(report)
}

/// Watch the source directory and configuration, regenerating on change
pub async fn watch(blog: &Blog) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => tracing::warn!("Watch error: {}", e),
        }
    })?;

    watcher.watch(&blog.source_dir, RecursiveMode::Recursive)?;

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        watcher.watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching {:?} for changes. Press Ctrl+C to stop.", blog.source_dir);

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if !is_content_change(&event.kind) {
                    continue;
                }

                // Let a burst of saves settle into one rebuild
                while let Ok(Some(_)) = tokio::time::timeout(DEBOUNCE, rx.recv()).await {}

                tracing::info!("Change detected, regenerating...");
                if let Err(e) = rebuild(blog) {
                    tracing::error!("Generation failed: {:#}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopped watching");
                break;
            }
        }
    }

    Ok(())
}

/// Re-read the configuration so edits to it take effect
fn rebuild(blog: &Blog) -> Result<()> {
    let blog = Blog::new(&blog.base_dir)?;
    run(&blog)
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_reports_pages() {
        let dir = TempDir::new().unwrap();
        let posts_dir = dir.path().join("source/_posts");
        fs::create_dir_all(&posts_dir).unwrap();
        for day in 1..=12 {
            fs::write(
                posts_dir.join(format!("2022-03-{:02}-note-{}.md", day, day)),
                format!("---\ntitle: Note {}\n---\nBody {}\n", day, day),
            )
            .unwrap();
        }
        fs::write(dir.path().join(CONFIG_FILE), "per_page: 5\n").unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        let report = build(&blog).unwrap();

        assert_eq!(report.posts, 12);
        // Three home pages, no categories
        assert_eq!(report.listing_pages, 3);
        assert_eq!(report.categories, 0);
        assert!(blog.public_dir.join("page3/index.html").exists());
        assert!(!blog.public_dir.join("page4/index.html").exists());
    }

    #[test]
    fn test_build_empty_site_reports_no_listing_pages() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        let report = build(&blog).unwrap();

        assert_eq!(report.listing_pages, 0);
        assert_eq!(report.posts, 0);
        // The home page still exists as a placeholder
        assert!(blog.public_dir.join("index.html").exists());
    }

    #[test]
    fn test_content_change_kinds() {
        use notify::event::{AccessKind, CreateKind};
        assert!(is_content_change(&EventKind::Create(CreateKind::File)));
        assert!(!is_content_change(&EventKind::Access(AccessKind::Any)));
    }
}
