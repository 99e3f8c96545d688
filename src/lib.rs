//! # Concrete Site
//!
//! A concrete-calculator website with a Markdown blog. Calculator pages
//! estimate volume and materials for slabs, footings, walls, beams and
//! columns; the blog is a directory of Markdown posts with YAML frontmatter
//! grouped into categories.
//!
//! # Architecture
//!
//! ```text
//! content/                  ContentCache               Site::handle
//! ├── categories.json  ──►  categories (memoized)  ──►  /blog/category/<slug>
//! └── posts/**/*.md    ──►  posts by slug          ──►  /blog/<slug...>
//!                                                       /calculators/<slug>  ◄── calc
//! ```
//!
//! Pages are rendered on demand by [`site::Site::handle`]. The `build`
//! command walks every canonical path and writes the results to disk, so the
//! same code serves both a live router and a static export.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`calc`] | Pure volume, unit and material formulas |
//! | [`calculators`] | Calculator catalog, form parsing, estimates |
//! | [`content`] | Read-through cache over posts and categories |
//! | [`frontmatter`] | YAML frontmatter splitting and field narrowing |
//! | [`slug`] | Post slugs from paths, slug safety, `slugify` |
//! | [`pagination`] | Category listing pagination and canonical URLs |
//! | [`jsonld`] | Script-safe JSON-LD serialization and schema.org builders |
//! | [`seo`] | `sitemap.xml` and `robots.txt` |
//! | [`render`] | Maud page templates |
//! | [`site`] | Request routing and static export |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## An Explicit Cache Object
//!
//! The content cache is a value constructed in `main` and passed by
//! reference, never a global. Tests build as many independent caches as they
//! like over temp directories, and [`content::ContentCache::reset`] exists
//! for the rare test that wants to reuse one.
//!
//! ## Malformed Content Is Skipped, Not Fatal
//!
//! A post with broken frontmatter disappears from listings and logs a
//! warning; the rest of the site still renders. `concrete-site check` lists
//! every such file with the reason.
//!
//! ## Canonical Page 1
//!
//! Category listings use `?page=N` for later pages but never `?page=1`, so
//! every listing has exactly one canonical URL. The sitemap lists page 1
//! only.

pub mod calc;
pub mod calculators;
pub mod config;
pub mod content;
pub mod frontmatter;
pub mod jsonld;
pub mod output;
pub mod pagination;
pub mod render;
pub mod seo;
pub mod site;
pub mod slug;

#[cfg(test)]
pub(crate) mod test_helpers;
