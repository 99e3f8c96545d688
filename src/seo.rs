//! `sitemap.xml` and `robots.txt`.
//!
//! The sitemap lists canonical URLs only: category listings appear once at
//! their page-1 path, never with `?page=N`. It is rebuilt from the content
//! cache on every build, so it always matches the posts that actually
//! render.

use crate::calculators::CALCULATORS;
use crate::config::SiteIdentity;
use crate::content::Category;
use crate::pagination::category_page_path;
use maud::{Markup, html};

/// Site pages that exist regardless of content.
pub const STATIC_PATHS: &[&str] = &["/", "/calculators", "/blog"];

/// Every canonical path on the site, in sitemap order.
pub fn canonical_paths(categories: &[Category], post_slugs: &[String]) -> Vec<String> {
    let mut paths: Vec<String> = STATIC_PATHS.iter().map(|p| p.to_string()).collect();
    paths.extend(CALCULATORS.iter().map(|c| c.path()));
    paths.extend(categories.iter().map(|c| category_page_path(&c.slug, 1)));
    paths.extend(post_slugs.iter().map(|slug| format!("/blog/{slug}")));
    paths
}

/// Render a sitemap for `paths`. `lastmod` is a `YYYY-MM-DD` date applied
/// to every entry.
pub fn render_sitemap(site: &SiteIdentity, paths: &[String], lastmod: Option<&str>) -> String {
    let urlset: Markup = html! {
        urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" {
            @for path in paths {
                url {
                    loc { (site.absolute_url(path)) }
                    @if let Some(date) = lastmod {
                        lastmod { (date) }
                    }
                }
            }
        }
    };
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}\n",
        urlset.into_string()
    )
}

pub fn render_robots(site: &SiteIdentity) -> String {
    format!(
        "User-agent: *\nAllow: /\nDisallow: /search\n\nSitemap: {}\n",
        site.absolute_url("/sitemap.xml")
    )
}
