//! CLI output formatting for `check`, `build` and `calc`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (category, post) is its semantic identity, a positional
//! index and title, with slugs and dates shown as indented context lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 Slabs & Driveways (1 post)
//!     Slug: slabs
//! 002 Mix Design (2 posts)
//!     Slug: mix
//!
//! Posts
//! 001 Cement, sand and aggregate ratios explained
//!     Slug: cement-sand-aggregate-ratios
//!     Date: 2024-06-11 · Category: mix
//!
//! Malformed
//!     broken-draft: Missing required field: date
//!
//! 5 posts, 3 categories, 1 problem
//! ```
//!
//! ## Build
//!
//! ```text
//! index.html
//! blog/index.html
//! sitemap.xml
//!
//! Exported 17 pages (21 files) to dist
//! ```
//!
//! ## Calc
//!
//! ```text
//! Concrete Slab Calculator
//!     Volume:      33.33 ft³ · 1.23 yd³ · 0.94 m³
//!     With waste:  36.67 ft³ (10%)
//!     Cement:      8.07 ft³
//!     Sand:        12.10 ft³
//!     Aggregate:   16.50 ft³
//!     Dry volume:  56.47 ft³
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::calculators::{Calculator, Estimate};
use crate::content::{Category, ContentReport, Post};
use crate::site::ExportSummary;
use std::path::Path;
use std::sync::Arc;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 Mix Design (2 posts)
/// 001 Ordering ready-mix without running short
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "post", "posts")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the `check` report: every category and post, then problems.
pub fn format_check_output(
    report: &ContentReport,
    categories: &[Category],
    posts: &[Arc<Post>],
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Categories".to_string());
    match &report.categories {
        Ok(_) => {
            for (i, category) in categories.iter().enumerate() {
                let count = posts
                    .iter()
                    .filter(|p| p.category_slug().as_deref() == Some(category.slug.as_str()))
                    .count();
                lines.push(entity_header(i + 1, &category.name, Some(count)));
                lines.push(format!("{}Slug: {}", indent(1), category.slug));
                if let Some(description) = &category.description {
                    lines.push(format!(
                        "{}Description: {}",
                        indent(1),
                        truncate_desc(description, 60)
                    ));
                }
            }
        }
        Err(e) => lines.push(format!("{}unavailable: {}", indent(1), e)),
    }

    lines.push(String::new());
    lines.push("Posts".to_string());
    for (i, post) in posts.iter().enumerate() {
        lines.push(entity_header(i + 1, post.title(), None));
        lines.push(format!("{}Slug: {}", indent(1), post.slug));
        let mut detail = format!("{}Date: {}", indent(1), post.date());
        if let Some(category) = post.category_slug() {
            detail.push_str(&format!(" · Category: {category}"));
        }
        lines.push(detail);
    }

    if !report.malformed.is_empty() {
        lines.push(String::new());
        lines.push("Malformed".to_string());
        for (slug, reason) in &report.malformed {
            lines.push(format!("{}{}: {}", indent(1), slug, reason));
        }
    }

    if !report.unknown_categories.is_empty() {
        lines.push(String::new());
        lines.push("Unknown categories".to_string());
        for (slug, category) in &report.unknown_categories {
            lines.push(format!("{}{} → {}", indent(1), slug, category));
        }
    }

    let problems = report.malformed.len()
        + report.unknown_categories.len()
        + usize::from(report.categories.is_err());
    lines.push(String::new());
    lines.push(format!(
        "{}, {}, {}",
        plural(report.posts, "post", "posts"),
        plural(*report.categories.as_ref().unwrap_or(&0), "category", "categories"),
        plural(problems, "problem", "problems"),
    ));
    lines
}

pub fn print_check_output(report: &ContentReport, categories: &[Category], posts: &[Arc<Post>]) {
    for line in format_check_output(report, categories, posts) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format the files written by `build`, relative to the output directory.
pub fn format_build_output(summary: &ExportSummary, output_dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = summary
        .files
        .iter()
        .map(|f| {
            f.strip_prefix(output_dir)
                .unwrap_or(f)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "Exported {} ({}) to {}",
        plural(summary.pages, "page", "pages"),
        plural(summary.files.len(), "file", "files"),
        output_dir.display()
    ));
    lines
}

pub fn print_build_output(summary: &ExportSummary, output_dir: &Path) {
    for line in format_build_output(summary, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Calc
// ============================================================================

pub fn format_calc_output(calc: &Calculator, estimate: &Estimate) -> Vec<String> {
    let v = &estimate.volume;
    let m = &estimate.materials;
    vec![
        calc.name.to_string(),
        format!(
            "{}Volume:      {:.2} ft³ · {:.2} yd³ · {:.2} m³",
            indent(1),
            v.cubic_feet,
            v.cubic_yards,
            v.cubic_meters
        ),
        format!(
            "{}With waste:  {:.2} ft³ ({}%)",
            indent(1),
            m.total_with_waste,
            m.waste_percent
        ),
        format!("{}Cement:      {:.2} ft³", indent(1), m.cement),
        format!("{}Sand:        {:.2} ft³", indent(1), m.sand),
        format!("{}Aggregate:   {:.2} ft³", indent(1), m.aggregate),
        format!(
            "{}Dry volume:  {:.2} ft³",
            indent(1),
            estimate.dry_volume.cubic_feet
        ),
    ]
}

pub fn print_calc_output(calc: &Calculator, estimate: &Estimate) {
    for line in format_calc_output(calc, estimate) {
        println!("{}", line);
    }
}
