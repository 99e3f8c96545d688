//! Category listing pagination.
//!
//! Category pages live at `/blog/category/<slug>` and take a 1-based `page`
//! query parameter. Page 1 is always addressed without the parameter so
//! search engines see exactly one canonical URL for it:
//!
//! ```text
//! /blog/category/mix          ← page 1
//! /blog/category/mix?page=2
//! /blog/category/mix?page=3
//! ```
//!
//! [`build_category_pagination`] clamps the requested page up to 1 but never
//! down to the last page. A request past the end comes back with
//! `is_page_within_range == false` and the route decides to 404.

use serde::Serialize;

/// Path prefix of every category listing.
pub const CATEGORY_BASE_PATH: &str = "/blog/category";

/// Path of a category listing page; page 1 carries no query string.
pub fn category_page_path(slug: &str, page: usize) -> String {
    if page <= 1 {
        format!("{}/{}", CATEGORY_BASE_PATH, slug)
    } else {
        format!("{}/{}?page={}", CATEGORY_BASE_PATH, slug, page)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PaginationInput<'a> {
    pub slug: &'a str,
    /// Requested page as parsed from the query. Fractions are floored,
    /// anything below 1 (including NaN) becomes 1.
    pub page: f64,
    pub total_posts: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPagination {
    pub canonical: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    pub total_pages: usize,
    pub current_page: usize,
    pub is_page_within_range: bool,
}

pub fn build_category_pagination(input: PaginationInput<'_>) -> CategoryPagination {
    let safe_page = safe_page(input.page);
    // A zero page size would never fill a page; treat it as one post per page.
    let per_page = input.per_page.max(1);
    let total_pages = input.total_posts.div_ceil(per_page).max(1);

    let prev = (safe_page > 1).then(|| category_page_path(input.slug, safe_page - 1));
    let next = (safe_page < total_pages).then(|| category_page_path(input.slug, safe_page + 1));

    CategoryPagination {
        canonical: category_page_path(input.slug, safe_page),
        prev,
        next,
        total_pages,
        current_page: safe_page,
        is_page_within_range: safe_page <= total_pages,
    }
}

/// `max(1, floor(page))` as a page index. `f64::max` ignores NaN, and the
/// float-to-int cast saturates for huge values.
fn safe_page(page: f64) -> usize {
    page.floor().max(1.0) as usize
}

/// Read the `page` query parameter. Missing or unparseable values mean page 1.
pub fn parse_page_param(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(1.0)
}

/// The items shown on `current_page` (1-based). Out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], current_page: usize, per_page: usize) -> &[T] {
    let per_page = per_page.max(1);
    let start = current_page.saturating_sub(1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(slug: &str, page: f64, total_posts: usize, per_page: usize) -> PaginationInput<'_> {
        PaginationInput {
            slug,
            page,
            total_posts,
            per_page,
        }
    }

    // =========================================================================
    // category_page_path
    // =========================================================================

    #[test]
    fn first_page_has_no_query() {
        assert_eq!(category_page_path("mix", 1), "/blog/category/mix");
        assert!(!category_page_path("mix", 1).contains('?'));
    }

    #[test]
    fn later_pages_end_with_page_param() {
        for p in 2..6 {
            let path = category_page_path("mix", p);
            assert!(path.ends_with(&format!("?page={p}")), "{path}");
        }
    }

    // =========================================================================
    // build_category_pagination
    // =========================================================================

    #[test]
    fn middle_page_has_prev_and_next() {
        let p = build_category_pagination(input("mix", 2.0, 25, 9));
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.current_page, 2);
        assert_eq!(p.canonical, "/blog/category/mix?page=2");
        assert_eq!(p.prev.as_deref(), Some("/blog/category/mix"));
        assert_eq!(p.next.as_deref(), Some("/blog/category/mix?page=3"));
        assert!(p.is_page_within_range);
    }

    #[test]
    fn last_page_has_no_next() {
        let p = build_category_pagination(input("mix", 3.0, 25, 9));
        assert_eq!(p.next, None);
        assert_eq!(p.prev.as_deref(), Some("/blog/category/mix?page=2"));
    }

    #[test]
    fn page_past_the_end_is_out_of_range() {
        let p = build_category_pagination(input("mix", 9.0, 5, 5));
        assert_eq!(p.total_pages, 1);
        assert_eq!(p.current_page, 9);
        assert!(!p.is_page_within_range);
        assert_eq!(p.next, None);
    }

    #[test]
    fn empty_category_still_has_one_page() {
        let p = build_category_pagination(input("mix", 1.0, 0, 9));
        assert_eq!(p.total_pages, 1);
        assert!(p.is_page_within_range);
        assert_eq!(p.prev, None);
        assert_eq!(p.next, None);
        assert_eq!(p.canonical, "/blog/category/mix");
    }

    #[test]
    fn low_and_fractional_pages_clamp_up() {
        assert_eq!(build_category_pagination(input("mix", 0.0, 20, 5)).current_page, 1);
        assert_eq!(build_category_pagination(input("mix", -3.0, 20, 5)).current_page, 1);
        assert_eq!(build_category_pagination(input("mix", 2.9, 20, 5)).current_page, 2);
        assert_eq!(build_category_pagination(input("mix", f64::NAN, 20, 5)).current_page, 1);
    }

    #[test]
    fn zero_per_page_treated_as_one() {
        let p = build_category_pagination(input("mix", 1.0, 4, 0));
        assert_eq!(p.total_pages, 4);
    }

    #[test]
    fn identical_inputs_give_identical_output() {
        let a = build_category_pagination(input("pour", 2.0, 40, 9));
        let b = build_category_pagination(input("pour", 2.0, 40, 9));
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    // =========================================================================
    // Query parsing and slicing
    // =========================================================================

    #[test]
    fn page_param_defaults_to_one() {
        assert_eq!(parse_page_param(None), 1.0);
        assert_eq!(parse_page_param(Some("abc")), 1.0);
        assert_eq!(parse_page_param(Some(" 3 ")), 3.0);
    }

    #[test]
    fn page_slice_bounds() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(page_slice(&items, 1, 3), &[1, 2, 3]);
        assert_eq!(page_slice(&items, 3, 3), &[7]);
        assert!(page_slice(&items, 4, 3).is_empty());
    }
}
