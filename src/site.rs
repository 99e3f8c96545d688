//! Request routing and static export.
//!
//! [`Site`] maps a request path to a rendered page. It holds no state of its
//! own beyond borrowed config and the shared [`ContentCache`], so it can be
//! built per request or shared freely.
//!
//! ## Routes
//!
//! | Path                          | Page                                   |
//! |-------------------------------|----------------------------------------|
//! | `/`                           | home: calculators and latest articles  |
//! | `/calculators`                | calculator index                       |
//! | `/calculators/<slug>`         | calculator form, estimate from query   |
//! | `/blog`                       | every post, newest first               |
//! | `/blog/category/<slug>`       | category listing, `?page=N`            |
//! | `/blog/<slug...>`             | one post; slugs may contain `/`        |
//! | `/search?q=`                  | full-text search over posts            |
//! | `/sitemap.xml`, `/robots.txt` | crawler files                          |
//!
//! Unknown calculators, categories and posts are 404, as is a category page
//! past the last one. Bad calculator input is 400 with the form re-rendered.
//!
//! ## Export
//!
//! [`export`] renders every canonical path into a directory of
//! `index.html` files that any static file server can host:
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── 404.html
//! ├── robots.txt
//! ├── sitemap.xml
//! ├── calculators/slab/index.html
//! └── blog/
//!     ├── index.html
//!     ├── category/mix/index.html
//!     └── guides/footing-sizing-basics/index.html
//! ```
//!
//! Category pages beyond the first only exist through [`Site::handle`]; a
//! static host cannot route on query strings.

use crate::calculators::{self, CalculatorInput};
use crate::config::SiteConfig;
use crate::content::ContentCache;
use crate::pagination::{
    CATEGORY_BASE_PATH, PaginationInput, build_category_pagination, page_slice, parse_page_param,
};
use crate::render::{self, CalculatorOutcome};
use crate::seo;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Articles shown on the home page.
const HOME_LATEST: usize = 3;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path} rendered with status {status}")]
    Status { path: String, status: u16 },
}

/// A parsed request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Percent-decoded path without a trailing slash (except `/`).
    pub path: String,
    /// Percent-decoded query pairs in order.
    pub query: Vec<(String, String)>,
}

impl Request {
    /// Parse `"/path?key=value&..."`. `+` in the query means space.
    pub fn parse(target: &str) -> Self {
        let target = target.split('#').next().unwrap_or_default();
        let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));

        let mut path = percent_decode(raw_path, false);
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        while path.len() > 1 && path.ends_with('/') {
            path.pop();
        }

        let query = raw_query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                (percent_decode(k, true), percent_decode(v, true))
            })
            .collect();

        Self { path, query }
    }

    /// First value for `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Decode `%XX` escapes; malformed escapes are kept as written. Invalid
/// UTF-8 is replaced rather than rejected.
fn percent_decode(input: &str, plus_is_space: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' if plus_is_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    fn html(status: u16, markup: maud::Markup) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            body: markup.into_string(),
        }
    }

    fn text(content_type: &'static str, body: String) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

pub struct Site<'a> {
    config: &'a SiteConfig,
    cache: &'a ContentCache,
}

impl<'a> Site<'a> {
    pub fn new(config: &'a SiteConfig, cache: &'a ContentCache) -> Self {
        Self { config, cache }
    }

    pub fn handle(&self, request: &Request) -> Response {
        let path = request.path.as_str();
        log::debug!("handling {}", path);

        match path {
            "/" => self.home(),
            "/calculators" => {
                Response::html(200, render::render_calculator_index(&self.config.site))
            }
            "/blog" => self.blog_index(),
            "/search" => self.search(request.param("q").unwrap_or_default()),
            "/sitemap.xml" => Response::text("application/xml", self.sitemap()),
            "/robots.txt" => Response::text(
                "text/plain; charset=utf-8",
                seo::render_robots(&self.config.site),
            ),
            _ => {
                if let Some(slug) = path.strip_prefix("/calculators/") {
                    self.calculator(slug, request)
                } else if let Some(slug) = path
                    .strip_prefix(CATEGORY_BASE_PATH)
                    .and_then(|rest| rest.strip_prefix('/'))
                {
                    self.category(slug, request.param("page"))
                } else if let Some(slug) = path.strip_prefix("/blog/") {
                    self.post(slug)
                } else {
                    self.not_found(path)
                }
            }
        }
    }

    fn home(&self) -> Response {
        let posts = self.cache.get_all_posts();
        let latest = &posts[..posts.len().min(HOME_LATEST)];
        Response::html(200, render::render_home(&self.config.site, latest))
    }

    fn blog_index(&self) -> Response {
        let categories = self.cache.get_categories();
        let posts = self.cache.get_all_posts();
        Response::html(
            200,
            render::render_blog_index(&self.config.site, &categories, &posts),
        )
    }

    fn calculator(&self, slug: &str, request: &Request) -> Response {
        let Some(calc) = calculators::find_calculator(slug) else {
            return self.not_found(&request.path);
        };

        let default_waste = self.config.calculator.default_waste_percent;
        let outcome = match CalculatorInput::from_query(&request.query, default_waste) {
            Ok(input) if input.is_blank() => CalculatorOutcome::Blank,
            Ok(input) => match calculators::evaluate(calc, &input) {
                Ok(estimate) => CalculatorOutcome::Estimate(estimate),
                Err(e) => CalculatorOutcome::Error(e.to_string()),
            },
            Err(e) => CalculatorOutcome::Error(e.to_string()),
        };
        let status = match outcome {
            CalculatorOutcome::Error(_) => 400,
            _ => 200,
        };
        Response::html(
            status,
            render::render_calculator(&self.config.site, calc, &request.query, &outcome),
        )
    }

    fn category(&self, slug: &str, page: Option<&str>) -> Response {
        let Some(category) = self.cache.get_category(slug) else {
            return self.not_found(&format!("{CATEGORY_BASE_PATH}/{slug}"));
        };
        let posts = self.cache.get_posts_by_category(&category.slug);
        let per_page = self.config.blog.per_page;
        let pagination = build_category_pagination(PaginationInput {
            slug: &category.slug,
            page: parse_page_param(page),
            total_posts: posts.len(),
            per_page,
        });
        if !pagination.is_page_within_range {
            return self.not_found(&pagination.canonical);
        }

        let shown = page_slice(&posts, pagination.current_page, per_page);
        Response::html(
            200,
            render::render_category(&self.config.site, &category, shown, &pagination),
        )
    }

    fn post(&self, slug: &str) -> Response {
        let Some(post) = self.cache.get_post_by_slug(slug) else {
            return self.not_found(&format!("/blog/{slug}"));
        };
        let category_slug = post.category_slug();
        let category = category_slug
            .as_deref()
            .and_then(|c| self.cache.get_category(c));
        let related = match &category_slug {
            Some(c) => {
                self.cache
                    .get_related_by_category(c, &post.slug, self.config.blog.related_limit)
            }
            None => Vec::new(),
        };
        Response::html(
            200,
            render::render_post(&self.config.site, &post, category.as_ref(), &related),
        )
    }

    fn search(&self, query: &str) -> Response {
        let results = self.cache.search_posts(query);
        Response::html(200, render::render_search(&self.config.site, query, &results))
    }

    fn not_found(&self, path: &str) -> Response {
        Response::html(404, render::render_not_found(&self.config.site, path))
    }

    /// Every canonical path, from the current categories and posts.
    pub fn canonical_paths(&self) -> Vec<String> {
        let categories = self.cache.get_categories();
        let slugs: Vec<String> = self
            .cache
            .get_all_posts()
            .iter()
            .map(|p| p.slug.clone())
            .collect();
        seo::canonical_paths(&categories, &slugs)
    }

    fn sitemap(&self) -> String {
        let lastmod = self
            .cache
            .get_all_posts()
            .first()
            .map(|p| p.published.format("%Y-%m-%d").to_string());
        seo::render_sitemap(&self.config.site, &self.canonical_paths(), lastmod.as_deref())
    }
}

/// Counts from one [`export`] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub pages: usize,
    pub files: Vec<PathBuf>,
}

/// Output file for a site path: `/` → `index.html`, `/blog/x` →
/// `blog/x/index.html`, `/sitemap.xml` → `sitemap.xml`.
pub fn output_file(output_dir: &Path, path: &str) -> PathBuf {
    let rel = path.trim_matches('/');
    if rel.is_empty() {
        return output_dir.join("index.html");
    }
    let mut file = output_dir.to_path_buf();
    file.extend(rel.split('/'));
    if rel.ends_with(".xml") || rel.ends_with(".txt") {
        file
    } else {
        file.join("index.html")
    }
}

/// Render every canonical page plus the crawler files and a `404.html`.
pub fn export(site: &Site<'_>, output_dir: &Path) -> Result<ExportSummary, ExportError> {
    fs::create_dir_all(output_dir)?;
    let mut summary = ExportSummary::default();

    let mut paths = site.canonical_paths();
    paths.push("/sitemap.xml".to_string());
    paths.push("/robots.txt".to_string());

    for path in &paths {
        let response = site.handle(&Request::parse(path));
        if !response.is_ok() {
            return Err(ExportError::Status {
                path: path.clone(),
                status: response.status,
            });
        }
        let file = output_file(output_dir, path);
        write_file(&file, &response.body)?;
        if response.content_type.starts_with("text/html") {
            summary.pages += 1;
        }
        summary.files.push(file);
    }

    let not_found = site.not_found("/404");
    let file = output_dir.join("404.html");
    write_file(&file, &not_found.body)?;
    summary.files.push(file);

    log::info!(
        "exported {} pages ({} files) to {}",
        summary.pages,
        summary.files.len(),
        output_dir.display()
    );
    Ok(summary)
}

fn write_file(file: &Path, body: &str) -> Result<(), ExportError> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file, body)?;
    log::debug!("wrote {}", file.display());
    Ok(())
}
