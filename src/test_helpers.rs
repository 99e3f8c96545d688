//! Shared test utilities for the concrete-site test suite.
//!
//! Provides fixture setup, post lookups, and small writers for ad-hoc post
//! files in temp directories.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let cache = fixture_cache(tmp.path());
//!
//! let posts = cache.get_all_posts();
//! let post = find_post(&posts, "ordering-ready-mix");
//! assert_eq!(post.category_slug().as_deref(), Some("mix"));
//! ```

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::content::{ContentCache, Post};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Cache over a content root laid out with default config paths.
pub fn fixture_cache(root: &Path) -> ContentCache {
    ContentCache::from_config(&SiteConfig::default(), root)
}

/// Write `posts/<rel_path>` under `root` with the given frontmatter.
pub fn write_post(root: &Path, rel_path: &str, title: &str, date: &str, category: Option<&str>) {
    let path = root.join("posts").join(rel_path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let category = category
        .map(|c| format!("category: {c}\n"))
        .unwrap_or_default();
    let source = format!("---\ntitle: {title}\ndate: {date}\n{category}---\n\nBody of {title}.\n");
    std::fs::write(path, source).unwrap();
}

// =========================================================================
// Post lookups; panic with a clear message on miss
// =========================================================================

/// Find a post by slug. Panics if not found.
pub fn find_post<'a>(posts: &'a [Arc<Post>], slug: &str) -> &'a Arc<Post> {
    posts.iter().find(|p| p.slug == slug).unwrap_or_else(|| {
        let slugs = post_slugs(posts);
        panic!("post '{slug}' not found. Available: {slugs:?}")
    })
}

/// All post slugs in list order.
pub fn post_slugs(posts: &[Arc<Post>]) -> Vec<&str> {
    posts.iter().map(|p| p.slug.as_str()).collect()
}
