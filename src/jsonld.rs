//! Structured data (schema.org JSON-LD) for inline `<script>` embedding.
//!
//! JSON is not HTML-safe: a string value containing `</script>` ends the
//! surrounding script element early. [`stringify_json_ld`] serializes with
//! `serde_json` and then rewrites every `<` as `\u003c` and every `>` as
//! `\u003e`. Both characters can only occur inside JSON string literals,
//! where the `\uXXXX` form decodes back to the same character, so the
//! output parses to exactly the input value.
//!
//! The builders below produce the four document types the site emits. Key
//! names are schema.org vocabulary and must not be renamed.

use serde::Serialize;
use serde_json::{Value, json};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Serialize `value` as compact JSON that is safe inside `<script>`.
pub fn stringify_json_ld<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(json.replace('<', "\\u003c").replace('>', "\\u003e"))
}

pub struct ArticleMeta<'a> {
    pub headline: &'a str,
    pub description: Option<&'a str>,
    pub date_published: &'a str,
    pub author: Option<&'a str>,
    pub image: Option<&'a str>,
    pub url: &'a str,
    pub publisher: &'a str,
    pub keywords: &'a [String],
}

pub fn article_schema(meta: &ArticleMeta<'_>) -> Value {
    let mut doc = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "Article",
        "headline": meta.headline,
        "datePublished": meta.date_published,
        "mainEntityOfPage": meta.url,
        "publisher": {
            "@type": "Organization",
            "name": meta.publisher,
        },
    });
    if let Some(description) = meta.description {
        doc["description"] = json!(description);
    }
    if let Some(author) = meta.author {
        doc["author"] = json!({ "@type": "Person", "name": author });
    }
    if let Some(image) = meta.image {
        doc["image"] = json!(image);
    }
    if !meta.keywords.is_empty() {
        doc["keywords"] = json!(meta.keywords.join(", "));
    }
    doc
}

/// `BreadcrumbList` from `(name, absolute url)` pairs, positions 1-based.
pub fn breadcrumb_schema(items: &[(&str, String)]) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (name, url))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": name,
                "item": url,
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "BreadcrumbList",
        "itemListElement": elements,
    })
}

/// `FAQPage` from `(question, answer)` pairs.
pub fn faq_schema(entries: &[(&str, &str)]) -> Value {
    let questions: Vec<Value> = entries
        .iter()
        .map(|(question, answer)| {
            json!({
                "@type": "Question",
                "name": question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": answer,
                },
            })
        })
        .collect();
    json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "FAQPage",
        "mainEntity": questions,
    })
}

/// `CollectionPage` listing the given `(name, absolute url)` items.
pub fn collection_page_schema(
    name: &str,
    description: Option<&str>,
    url: &str,
    items: &[(&str, String)],
) -> Value {
    let elements: Vec<Value> = items
        .iter()
        .enumerate()
        .map(|(i, (item_name, item_url))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "name": item_name,
                "url": item_url,
            })
        })
        .collect();
    let mut doc = json!({
        "@context": SCHEMA_CONTEXT,
        "@type": "CollectionPage",
        "name": name,
        "url": url,
        "mainEntity": {
            "@type": "ItemList",
            "itemListElement": elements,
        },
    });
    if let Some(description) = description {
        doc["description"] = json!(description);
    }
    doc
}
