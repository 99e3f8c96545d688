//! Blog content cache.
//!
//! Posts and categories are flat files under the content root:
//!
//! ```text
//! content/
//! ├── categories.json        # [{ "slug", "name", "description"? }, ...]
//! └── posts/
//!     ├── ordering-ready-mix.md
//!     └── guides/
//!         └── footing-sizing-basics.md   # slug: guides/footing-sizing-basics
//! ```
//!
//! [`ContentCache`] is a read-through cache over those files. It is built once
//! per process and handed to request handlers by reference; there is no
//! global instance.
//!
//! ## What is cached
//!
//! - **Posts**, keyed by slug. Each post file is parsed at most once per cache
//!   lifetime. Files that fail to parse are remembered as malformed so they
//!   are not re-read on every listing either.
//! - **Categories**, after the first successful load. A failed load is not
//!   remembered: [`ContentCache::get_categories`] returns an empty list and
//!   tries again next time.
//!
//! Nothing expires. The cache is cleared only by [`ContentCache::reset`] or by
//! dropping it; editing a file on disk has no effect on a live cache.
//!
//! ## Concurrency
//!
//! The slug map sits behind a mutex and is append-only between resets.
//! Parsing happens outside the lock, so two threads asking for the same
//! uncached slug may both parse it; the first insert wins and the results are
//! identical anyway. [`ContentCache::frontmatter_load_count`] counts actual
//! parses, which is what the single-threaded tests assert on.
//!
//! ## Failure handling
//!
//! Nothing here returns an error to page code. Missing slugs are `None`,
//! missing categories are `[]`, malformed posts are left out of listings and
//! logged at `warn`.

use crate::config::SiteConfig;
use crate::frontmatter::{self, Frontmatter, FrontmatterError};
use crate::slug::{self, is_safe_slug, slugify};
use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Post {
    pub slug: String,
    pub frontmatter: Frontmatter,
    /// Raw Markdown body, frontmatter removed.
    pub content: String,
    /// Parsed `date`, used for newest-first ordering.
    pub published: NaiveDateTime,
    #[serde(skip)]
    pub source_path: PathBuf,
}

impl Post {
    pub fn title(&self) -> &str {
        self.frontmatter.title()
    }

    pub fn date(&self) -> &str {
        self.frontmatter.date()
    }

    /// The frontmatter `category`, normalized to slug form.
    pub fn category_slug(&self) -> Option<String> {
        self.frontmatter
            .category()
            .map(slugify)
            .filter(|s| !s.is_empty())
    }

    pub fn tags(&self) -> Vec<&str> {
        self.frontmatter.tags()
    }

    /// Frontmatter excerpt, or the first paragraph of the body.
    pub fn summary(&self) -> String {
        if let Some(excerpt) = self.frontmatter.excerpt() {
            return excerpt.to_string();
        }
        self.content
            .split("\n\n")
            .map(str::trim)
            .find(|p| !p.is_empty() && !p.starts_with('#'))
            .unwrap_or_default()
            .to_string()
    }

    /// Whether every (lowercased) term occurs in the title, excerpt, tags or
    /// body.
    fn matches_all(&self, terms: &[String]) -> bool {
        let haystack = format!(
            "{}\n{}\n{}\n{}",
            self.title(),
            self.frontmatter.excerpt().unwrap_or_default(),
            self.tags().join(" "),
            self.content
        )
        .to_lowercase();
        terms.iter().all(|t| haystack.contains(t.as_str()))
    }
}

/// File locations the cache reads from.
#[derive(Debug, Clone)]
pub struct ContentPaths {
    pub categories_file: PathBuf,
    pub posts_dir: PathBuf,
}

impl ContentPaths {
    pub fn from_config(config: &SiteConfig, root: &Path) -> Self {
        Self {
            categories_file: config.content.categories_path(root),
            posts_dir: config.content.posts_path(root),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Parsed(Arc<Post>),
    /// The file exists but could not be parsed; holds the reason.
    Malformed(String),
}

impl Entry {
    fn post(&self) -> Option<Arc<Post>> {
        match self {
            Entry::Parsed(post) => Some(Arc::clone(post)),
            Entry::Malformed(_) => None,
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    posts: HashMap<String, Entry>,
    categories: Option<Vec<Category>>,
}

/// Summary of a full content pass, used by `check`.
#[derive(Debug)]
pub struct ContentReport {
    pub posts: usize,
    pub malformed: Vec<(String, String)>,
    /// Category count, or why the index could not be read.
    pub categories: Result<usize, String>,
    /// `(post slug, category)` pairs naming a category that does not exist.
    pub unknown_categories: Vec<(String, String)>,
}

impl ContentReport {
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty()
            && self.categories.is_ok()
            && self.unknown_categories.is_empty()
    }
}

#[derive(Debug)]
pub struct ContentCache {
    paths: ContentPaths,
    state: Mutex<CacheState>,
    loads: AtomicUsize,
}

impl ContentCache {
    pub fn new(paths: ContentPaths) -> Self {
        Self {
            paths,
            state: Mutex::new(CacheState::default()),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn from_config(config: &SiteConfig, root: &Path) -> Self {
        Self::new(ContentPaths::from_config(config, root))
    }

    pub fn paths(&self) -> &ContentPaths {
        &self.paths
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // The state is only ever appended to; a panic elsewhere cannot leave
        // it half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories in file order. Empty when the index is missing or
    /// unreadable.
    pub fn get_categories(&self) -> Vec<Category> {
        if let Some(categories) = &self.lock().categories {
            return categories.clone();
        }
        match self.load_categories() {
            Ok(categories) => {
                self.lock().categories = Some(categories.clone());
                categories
            }
            Err(e) => {
                log::warn!(
                    "categories unavailable ({}): {}",
                    self.paths.categories_file.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    pub fn get_category(&self, slug: &str) -> Option<Category> {
        self.get_categories().into_iter().find(|c| c.slug == slug)
    }

    /// Read and parse the categories index, bypassing the cache.
    pub fn load_categories(&self) -> Result<Vec<Category>, ContentError> {
        let content = fs::read_to_string(&self.paths.categories_file)?;
        Ok(serde_json::from_str(&content)?)
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Every well-formed post, newest first. Posts sharing a date keep their
    /// file enumeration order.
    pub fn get_all_posts(&self) -> Vec<Arc<Post>> {
        let files = self.enumerate_post_files();

        let uncached: Vec<&(String, PathBuf)> = {
            let state = self.lock();
            files
                .iter()
                .filter(|(slug, _)| !state.posts.contains_key(slug))
                .collect()
        };

        if !uncached.is_empty() {
            log::debug!("parsing {} uncached post(s)", uncached.len());
            let parsed: Vec<(String, Entry)> = uncached
                .par_iter()
                .map(|(slug, path)| (slug.clone(), self.load_post(slug, path)))
                .collect();
            let mut state = self.lock();
            for (slug, entry) in parsed {
                state.posts.entry(slug).or_insert(entry);
            }
        }

        let mut posts: Vec<Arc<Post>> = {
            let state = self.lock();
            files
                .iter()
                .filter_map(|(slug, _)| state.posts.get(slug).and_then(Entry::post))
                .collect()
        };
        posts.sort_by(|a, b| b.published.cmp(&a.published));
        posts
    }

    /// Slugs of every post file, without parsing. Slugs already known to be
    /// malformed are left out so the list matches [`Self::get_all_posts`].
    pub fn get_all_post_slugs(&self) -> Vec<String> {
        let files = self.enumerate_post_files();
        let state = self.lock();
        files
            .into_iter()
            .map(|(slug, _)| slug)
            .filter(|slug| !matches!(state.posts.get(slug), Some(Entry::Malformed(_))))
            .collect()
    }

    /// A single post. `None` for unknown, unsafe or malformed slugs.
    pub fn get_post_by_slug(&self, slug: &str) -> Option<Arc<Post>> {
        if !is_safe_slug(slug) {
            return None;
        }
        if let Some(entry) = self.lock().posts.get(slug) {
            return entry.post();
        }
        let path = self.locate_post(slug)?;
        let entry = self.load_post(slug, &path);
        self.lock()
            .posts
            .entry(slug.to_string())
            .or_insert(entry)
            .post()
    }

    /// Up to `limit` newest posts in `category`, excluding `exclude_slug`.
    pub fn get_related_by_category(
        &self,
        category: &str,
        exclude_slug: &str,
        limit: usize,
    ) -> Vec<Arc<Post>> {
        let wanted = slugify(category);
        self.get_all_posts()
            .into_iter()
            .filter(|p| p.slug != exclude_slug && p.category_slug().as_deref() == Some(&wanted))
            .take(limit)
            .collect()
    }

    /// Every post in `category_slug`, newest first.
    pub fn get_posts_by_category(&self, category_slug: &str) -> Vec<Arc<Post>> {
        self.get_all_posts()
            .into_iter()
            .filter(|p| p.category_slug().as_deref() == Some(category_slug))
            .collect()
    }

    /// Posts containing every whitespace-separated term of `query`, case
    /// insensitive, newest first. A blank query matches nothing.
    pub fn search_posts(&self, query: &str) -> Vec<Arc<Post>> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Vec::new();
        }
        self.get_all_posts()
            .into_iter()
            .filter(|p| p.matches_all(&terms))
            .collect()
    }

    // =========================================================================
    // Test hooks
    // =========================================================================

    /// Forget everything: posts, malformed markers, categories, and the load
    /// counter.
    pub fn reset(&self) {
        *self.lock() = CacheState::default();
        self.loads.store(0, Ordering::SeqCst);
    }

    /// Number of post files actually parsed since construction or the last
    /// [`Self::reset`].
    pub fn frontmatter_load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Parse everything and report what is wrong with it.
    pub fn report(&self) -> ContentReport {
        let posts = self.get_all_posts();
        let categories = self.load_categories().map_err(|e| e.to_string());

        let malformed = {
            let state = self.lock();
            let mut malformed: Vec<(String, String)> = state
                .posts
                .iter()
                .filter_map(|(slug, entry)| match entry {
                    Entry::Malformed(reason) => Some((slug.clone(), reason.clone())),
                    Entry::Parsed(_) => None,
                })
                .collect();
            malformed.sort();
            malformed
        };

        let unknown_categories = match &categories {
            Ok(list) => {
                let known: HashSet<&str> = list.iter().map(|c| c.slug.as_str()).collect();
                posts
                    .iter()
                    .filter_map(|p| {
                        let category = p.category_slug()?;
                        (!known.contains(category.as_str())).then(|| (p.slug.clone(), category))
                    })
                    .collect()
            }
            Err(_) => Vec::new(),
        };

        ContentReport {
            posts: posts.len(),
            malformed,
            categories: categories.map(|list| list.len()),
            unknown_categories,
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// `(slug, path)` for every post file, in file-name order, depth first.
    /// Hidden files and directories are skipped, as are files whose slug
    /// would need URL escaping; on a slug collision
    /// (`a.md` next to `a.mdx`) the first file wins.
    fn enumerate_post_files(&self) -> Vec<(String, PathBuf)> {
        let root = &self.paths.posts_dir;
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("skipping unreadable post entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(slug) = slug::slug_from_path(root, entry.path()) else {
                continue;
            };
            if !is_safe_slug(&slug) {
                log::warn!(
                    "skipping {}: file name is not URL-safe",
                    entry.path().display()
                );
                continue;
            }
            if seen.insert(slug.clone()) {
                files.push((slug, entry.into_path()));
            } else {
                log::debug!("ignoring {}: slug already taken", entry.path().display());
            }
        }
        files
    }

    fn locate_post(&self, slug: &str) -> Option<PathBuf> {
        slug::POST_EXTENSIONS
            .iter()
            .map(|ext| self.paths.posts_dir.join(format!("{slug}.{ext}")))
            .find(|p| p.is_file())
    }

    fn load_post(&self, slug: &str, path: &Path) -> Entry {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match read_post(slug, path) {
            Ok(post) => Entry::Parsed(Arc::new(post)),
            Err(e) => {
                log::warn!("excluding post {} ({}): {}", slug, path.display(), e);
                Entry::Malformed(e.to_string())
            }
        }
    }
}

fn read_post(slug: &str, path: &Path) -> Result<Post, ContentError> {
    let source = fs::read_to_string(path)?;
    let doc = frontmatter::parse_document(&source)?;
    Ok(Post {
        slug: slug.to_string(),
        frontmatter: doc.frontmatter,
        content: doc.body,
        published: doc.published,
        source_path: path.to_path_buf(),
    })
}
