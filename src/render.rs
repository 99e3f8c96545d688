//! HTML page templates.
//!
//! Every page is a pure function from already-loaded data to [`Markup`]; the
//! router in [`crate::site`] does the lookups and picks the status code.
//!
//! ## Head contents
//!
//! Each page supplies a [`PageMeta`]: title, optional description, its
//! canonical path, `rel=prev`/`rel=next` for paginated listings, and any
//! number of JSON-LD documents. JSON-LD is written through
//! [`stringify_json_ld`] so post titles and excerpts cannot close the
//! `<script>` element.
//!
//! Uses [maud](https://maud.lambda.xyz/) for templating; post bodies are
//! Markdown rendered with `pulldown-cmark`.

use crate::calc::LengthUnit;
use crate::calculators::{CALCULATORS, Calculator, Estimate};
use crate::config::SiteIdentity;
use crate::content::{Category, Post};
use crate::jsonld::{
    ArticleMeta, article_schema, breadcrumb_schema, collection_page_schema, faq_schema,
    stringify_json_ld,
};
use crate::pagination::CategoryPagination;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use serde_json::Value;
use std::sync::Arc;

const CSS: &str = include_str!("../static/site.css");

/// Head-level metadata for one page.
#[derive(Debug, Default)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    /// Site-relative canonical path, e.g. `/blog/category/mix?page=2`.
    pub canonical: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub json_ld: Vec<Value>,
    pub noindex: bool,
}

/// What the calculator page shows under its form.
#[derive(Debug)]
pub enum CalculatorOutcome {
    /// No dimensions entered yet.
    Blank,
    Estimate(Estimate),
    Error(String),
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    body_html
}

// ============================================================================
// Layout
// ============================================================================

/// Renders the base HTML document structure
pub fn base_document(site: &SiteIdentity, meta: &PageMeta, content: Markup) -> Markup {
    let full_title = if meta.title == site.name {
        meta.title.clone()
    } else {
        format!("{} | {}", meta.title, site.name)
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
                @if let Some(description) = &meta.description {
                    meta name="description" content=(description);
                }
                @if meta.noindex {
                    meta name="robots" content="noindex";
                }
                @if let Some(canonical) = &meta.canonical {
                    link rel="canonical" href=(site.absolute_url(canonical));
                }
                @if let Some(prev) = &meta.prev {
                    link rel="prev" href=(site.absolute_url(prev));
                }
                @if let Some(next) = &meta.next {
                    link rel="next" href=(site.absolute_url(next));
                }
                style { (PreEscaped(CSS)) }
                @for doc in &meta.json_ld {
                    @if let Some(json) = json_ld_script(doc) {
                        script type="application/ld+json" { (PreEscaped(json)) }
                    }
                }
            }
            body {
                (site_header(site))
                main { (content) }
                footer.site-footer { (site.tagline) }
            }
        }
    }
}

fn json_ld_script(doc: &Value) -> Option<String> {
    match stringify_json_ld(doc) {
        Ok(json) => Some(json),
        Err(e) => {
            log::warn!("dropping JSON-LD block: {}", e);
            None
        }
    }
}

fn site_header(site: &SiteIdentity) -> Markup {
    html! {
        header.site-header {
            a.brand href="/" { (site.name) }
            nav.site-nav {
                a href="/calculators" { "Calculators" }
                a href="/blog" { "Blog" }
                form action="/search" method="get" {
                    input type="search" name="q" placeholder="Search articles" aria-label="Search";
                }
            }
        }
    }
}

/// Visible breadcrumb trail; the last item is the current page and is not
/// linked.
fn breadcrumb(items: &[(&str, String)]) -> Markup {
    html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            @for (i, (name, path)) in items.iter().enumerate() {
                @if i > 0 { " › " }
                @if i + 1 == items.len() {
                    span { (name) }
                } @else {
                    a href=(path) { (name) }
                }
            }
        }
    }
}

/// Breadcrumb trail as JSON-LD, with absolute URLs.
fn breadcrumb_ld(site: &SiteIdentity, items: &[(&str, String)]) -> Value {
    let absolute: Vec<(&str, String)> = items
        .iter()
        .map(|(name, path)| (*name, site.absolute_url(path)))
        .collect();
    breadcrumb_schema(&absolute)
}

fn post_list(posts: &[Arc<Post>]) -> Markup {
    html! {
        ul.card-list {
            @for post in posts {
                li {
                    a href={ "/blog/" (post.slug) } { (post.title()) }
                    div.meta { (display_date(post)) }
                    @let summary = post.summary();
                    @if !summary.is_empty() {
                        p { (summary) }
                    }
                }
            }
        }
    }
}

fn display_date(post: &Post) -> String {
    post.published.format("%B %-d, %Y").to_string()
}

// ============================================================================
// Page Renderers
// ============================================================================

pub fn render_home(site: &SiteIdentity, latest: &[Arc<Post>]) -> Markup {
    let meta = PageMeta {
        title: site.name.clone(),
        description: Some(site.tagline.clone()),
        canonical: Some("/".into()),
        ..PageMeta::default()
    };
    let content = html! {
        h1 { (site.name) }
        p { (site.tagline) }
        h2 { "Calculators" }
        (calculator_list())
        @if !latest.is_empty() {
            h2 { "Latest articles" }
            (post_list(latest))
        }
    };
    base_document(site, &meta, content)
}

fn calculator_list() -> Markup {
    html! {
        ul.card-list {
            @for calc in CALCULATORS {
                li {
                    a href=(calc.path()) { (calc.name) }
                    p { (calc.summary) }
                }
            }
        }
    }
}

pub fn render_calculator_index(site: &SiteIdentity) -> Markup {
    let crumbs = [("Home", "/".to_string()), ("Calculators", "/calculators".to_string())];
    let meta = PageMeta {
        title: "Concrete Calculators".into(),
        description: Some("Volume and material estimates for common concrete pours.".into()),
        canonical: Some("/calculators".into()),
        json_ld: vec![breadcrumb_ld(site, &crumbs)],
        ..PageMeta::default()
    };
    let content = html! {
        (breadcrumb(&crumbs))
        h1 { "Concrete Calculators" }
        (calculator_list())
    };
    base_document(site, &meta, content)
}

/// One calculator page. `values` are the raw query pairs, echoed back into
/// the form.
pub fn render_calculator(
    site: &SiteIdentity,
    calc: &Calculator,
    values: &[(String, String)],
    outcome: &CalculatorOutcome,
) -> Markup {
    let path = calc.path();
    let crumbs = [
        ("Home", "/".to_string()),
        ("Calculators", "/calculators".to_string()),
        (calc.name, path.clone()),
    ];
    let faqs: Vec<(&str, &str)> = calc.faqs.iter().map(|f| (f.question, f.answer)).collect();
    let meta = PageMeta {
        title: calc.name.into(),
        description: Some(calc.summary.into()),
        canonical: Some(path.clone()),
        json_ld: vec![breadcrumb_ld(site, &crumbs), faq_schema(&faqs)],
        ..PageMeta::default()
    };

    let value_of = |key: &str| {
        values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default()
    };
    let unit = value_of("unit");
    let depth_unit = match value_of("depth_unit") {
        "" => calc.default_depth_unit.symbol(),
        other => other,
    };

    let content = html! {
        (breadcrumb(&crumbs))
        h1 { (calc.name) }
        p { (calc.summary) }
        form.calc-form action=(path) method="get" {
            @for (key, label) in calc.fields() {
                label for=(key) { (label) }
                input id=(key) name=(key) type="text" inputmode="decimal" value=(value_of(key));
            }
            label for="unit" { "Length unit" }
            (unit_select("unit", if unit.is_empty() { "ft" } else { unit }))
            label for="depth_unit" { "Depth unit" }
            (unit_select("depth_unit", depth_unit))
            label for="waste" { "Waste %" }
            input id="waste" name="waste" type="text" inputmode="decimal" value=(value_of("waste"));
            button type="submit" { "Calculate" }
        }
        @match outcome {
            CalculatorOutcome::Blank => {}
            CalculatorOutcome::Error(message) => {
                p.form-error role="alert" { (message) }
            }
            CalculatorOutcome::Estimate(estimate) => {
                (estimate_table(estimate))
            }
        }
        h2 { "Frequently asked questions" }
        @for faq in calc.faqs {
            h3 { (faq.question) }
            p { (faq.answer) }
        }
    };
    base_document(site, &meta, content)
}

fn unit_select(name: &str, selected: &str) -> Markup {
    html! {
        select id=(name) name=(name) {
            @for unit in [LengthUnit::Feet, LengthUnit::Inches, LengthUnit::Meters] {
                option value=(unit.symbol()) selected[unit.symbol() == selected] { (unit.symbol()) }
            }
        }
    }
}

fn estimate_table(estimate: &Estimate) -> Markup {
    let m = &estimate.materials;
    html! {
        section.estimate {
            h2 { "Estimate" }
            table {
                tr { th { "Volume" } td { (format!("{:.2} ft³", estimate.volume.cubic_feet)) } }
                tr { th { "" } td { (format!("{:.2} yd³", estimate.volume.cubic_yards)) } }
                tr { th { "" } td { (format!("{:.2} m³", estimate.volume.cubic_meters)) } }
                tr {
                    th { (format!("With {}% waste", m.waste_percent)) }
                    td { (format!("{:.2} ft³", m.total_with_waste)) }
                }
                tr { th { "Cement" } td { (format!("{:.2} ft³", m.cement)) } }
                tr { th { "Sand" } td { (format!("{:.2} ft³", m.sand)) } }
                tr { th { "Aggregate" } td { (format!("{:.2} ft³", m.aggregate)) } }
                tr {
                    th { "Dry materials" }
                    td { (format!("{:.2} ft³", estimate.dry_volume.cubic_feet)) }
                }
            }
        }
    }
}

pub fn render_blog_index(
    site: &SiteIdentity,
    categories: &[Category],
    posts: &[Arc<Post>],
) -> Markup {
    let crumbs = [("Home", "/".to_string()), ("Blog", "/blog".to_string())];
    let items: Vec<(&str, String)> = posts
        .iter()
        .map(|p| (p.title(), site.absolute_url(&format!("/blog/{}", p.slug))))
        .collect();
    let meta = PageMeta {
        title: "Blog".into(),
        description: Some("Guides on pouring, mixing and ordering concrete.".into()),
        canonical: Some("/blog".into()),
        json_ld: vec![
            breadcrumb_ld(site, &crumbs),
            collection_page_schema("Blog", None, &site.absolute_url("/blog"), &items),
        ],
        ..PageMeta::default()
    };
    let content = html! {
        (breadcrumb(&crumbs))
        h1 { "Blog" }
        @if !categories.is_empty() {
            nav.categories {
                @for category in categories {
                    a href={ "/blog/category/" (category.slug) } { (category.name) }
                    " "
                }
            }
        }
        (post_list(posts))
    };
    base_document(site, &meta, content)
}

pub fn render_category(
    site: &SiteIdentity,
    category: &Category,
    posts: &[Arc<Post>],
    pagination: &CategoryPagination,
) -> Markup {
    let crumbs = [
        ("Home", "/".to_string()),
        ("Blog", "/blog".to_string()),
        (category.name.as_str(), pagination.canonical.clone()),
    ];
    let items: Vec<(&str, String)> = posts
        .iter()
        .map(|p| (p.title(), site.absolute_url(&format!("/blog/{}", p.slug))))
        .collect();
    let title = if pagination.current_page > 1 {
        format!("{} (page {})", category.name, pagination.current_page)
    } else {
        category.name.clone()
    };
    let meta = PageMeta {
        title: title.clone(),
        description: category.description.clone(),
        canonical: Some(pagination.canonical.clone()),
        prev: pagination.prev.clone(),
        next: pagination.next.clone(),
        json_ld: vec![
            breadcrumb_ld(site, &crumbs),
            collection_page_schema(
                &category.name,
                category.description.as_deref(),
                &site.absolute_url(&pagination.canonical),
                &items,
            ),
        ],
        ..PageMeta::default()
    };
    let content = html! {
        (breadcrumb(&crumbs))
        h1 { (title) }
        @if let Some(description) = &category.description {
            p { (description) }
        }
        @if posts.is_empty() {
            p { "No articles in this category yet." }
        } @else {
            (post_list(posts))
        }
        @if pagination.total_pages > 1 {
            nav.pagination {
                @if let Some(prev) = &pagination.prev {
                    a rel="prev" href=(prev) { "← Newer" }
                } @else { span {} }
                span { "Page " (pagination.current_page) " of " (pagination.total_pages) }
                @if let Some(next) = &pagination.next {
                    a rel="next" href=(next) { "Older →" }
                } @else { span {} }
            }
        }
    };
    base_document(site, &meta, content)
}

pub fn render_post(
    site: &SiteIdentity,
    post: &Post,
    category: Option<&Category>,
    related: &[Arc<Post>],
) -> Markup {
    let path = format!("/blog/{}", post.slug);
    let mut crumbs = vec![("Home", "/".to_string()), ("Blog", "/blog".to_string())];
    if let Some(category) = category {
        crumbs.push((
            category.name.as_str(),
            format!("/blog/category/{}", category.slug),
        ));
    }
    crumbs.push((post.title(), path.clone()));

    let url = site.absolute_url(&path);
    let image = post.frontmatter.cover().map(|c| {
        if c.starts_with('/') {
            site.absolute_url(c)
        } else {
            c.to_string()
        }
    });
    let keywords: Vec<String> = post.tags().into_iter().map(String::from).collect();
    let summary = post.summary();
    let description = (!summary.is_empty()).then_some(summary);
    let article = article_schema(&ArticleMeta {
        headline: post.title(),
        description: description.as_deref(),
        date_published: post.date(),
        author: post.frontmatter.author(),
        image: image.as_deref(),
        url: &url,
        publisher: &site.name,
        keywords: &keywords,
    });

    let meta = PageMeta {
        title: post.title().to_string(),
        description: description.clone(),
        canonical: Some(path),
        json_ld: vec![breadcrumb_ld(site, &crumbs), article],
        ..PageMeta::default()
    };
    let content = html! {
        (breadcrumb(&crumbs))
        article {
            h1 { (post.title()) }
            div.meta {
                time datetime=(post.date()) { (display_date(post)) }
                @if let Some(author) = post.frontmatter.author() {
                    " · " (author)
                }
            }
            (PreEscaped(markdown_to_html(&post.content)))
        }
        @if !related.is_empty() {
            aside.related {
                h2 { "Related articles" }
                (post_list(related))
            }
        }
    };
    base_document(site, &meta, content)
}

pub fn render_search(site: &SiteIdentity, query: &str, results: &[Arc<Post>]) -> Markup {
    let meta = PageMeta {
        title: "Search".into(),
        noindex: true,
        ..PageMeta::default()
    };
    let content = html! {
        h1 { "Search" }
        form action="/search" method="get" {
            input type="search" name="q" value=(query) aria-label="Search";
            button type="submit" { "Search" }
        }
        @if !query.trim().is_empty() {
            p { (results.len()) " result" @if results.len() != 1 { "s" } " for “" (query) "”" }
            (post_list(results))
        }
    };
    base_document(site, &meta, content)
}

pub fn render_not_found(site: &SiteIdentity, path: &str) -> Markup {
    let meta = PageMeta {
        title: "Page not found".into(),
        noindex: true,
        ..PageMeta::default()
    };
    let content = html! {
        h1 { "Page not found" }
        p { "Nothing lives at " code { (path) } "." }
        p { a href="/" { "Back to the calculators" } }
    };
    base_document(site, &meta, content)
}

// ============================================================================
// Tests
// ============================================================================
