//! YAML frontmatter for blog posts.
//!
//! A post file opens with a `---` fenced YAML block, followed by the Markdown
//! body:
//!
//! ```text
//! ---
//! title: How thick should a driveway slab be?
//! date: 2024-03-01
//! category: slabs
//! tags: [driveway, thickness]
//! ---
//!
//! Most residential driveways are poured at four inches...
//! ```
//!
//! Frontmatter keys are free-form. Values are narrowed into [`FieldValue`]:
//! strings, lists of strings, or numbers. Booleans keep their string form,
//! nulls count as absent, and nested mappings are dropped. The keys in
//! [`TEXT_KEYS`] are always text, so `title: 2024` is the title `"2024"`
//! rather than a number. Callers read
//! fields through typed accessors (`title()`, `tags()`, `get_number(..)`) and
//! decide at the call site what a missing or differently-typed value means.
//!
//! `title` and `date` are required; a file without them is malformed.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("File does not start with a `---` frontmatter block")]
    Missing,
    #[error("Frontmatter block is never closed with `---`")]
    Unterminated,
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Frontmatter must be a mapping of keys to values")]
    NotAMapping,
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Unrecognized date: {0:?}")]
    BadDate(String),
}

/// Keys read through string accessors. Scalar values under these keys
/// narrow to [`FieldValue::Text`] whatever their YAML type.
pub const TEXT_KEYS: &[&str] = &["title", "date", "excerpt", "cover", "category", "author"];

/// One frontmatter value after type narrowing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
    Number(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Frontmatter {
    fields: BTreeMap<String, FieldValue>,
}

impl Frontmatter {
    /// Narrow a YAML document into frontmatter fields. An empty document is
    /// an empty mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, FrontmatterError> {
        let value: Yaml = serde_yaml::from_str(yaml)?;
        let mapping = match value {
            Yaml::Null => return Ok(Self::default()),
            Yaml::Mapping(m) => m,
            _ => return Err(FrontmatterError::NotAMapping),
        };

        let mut fields = BTreeMap::new();
        for (key, value) in mapping {
            let Some(key) = scalar_text(&key) else {
                log::debug!("skipping non-scalar frontmatter key {:?}", key);
                continue;
            };
            let narrowed = if TEXT_KEYS.contains(&key.as_str()) && !value.is_sequence() {
                scalar_text(&value).map(FieldValue::Text)
            } else {
                narrow(value)
            };
            match narrowed {
                Some(v) => {
                    fields.insert(key, v);
                }
                None => log::debug!("dropping frontmatter field {:?}: unsupported value", key),
            }
        }
        Ok(Self { fields })
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.fields.get(key)? {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// A list field. A single string counts as a one-item list.
    pub fn get_list(&self, key: &str) -> Vec<&str> {
        match self.fields.get(key) {
            Some(FieldValue::List(items)) => items.iter().map(String::as_str).collect(),
            Some(FieldValue::Text(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn title(&self) -> &str {
        self.get_str("title").unwrap_or_default()
    }

    pub fn date(&self) -> &str {
        self.get_str("date").unwrap_or_default()
    }

    pub fn excerpt(&self) -> Option<&str> {
        self.get_str("excerpt")
    }

    pub fn cover(&self) -> Option<&str> {
        self.get_str("cover")
    }

    pub fn category(&self) -> Option<&str> {
        self.get_str("category")
    }

    pub fn author(&self) -> Option<&str> {
        self.get_str("author")
    }

    pub fn tags(&self) -> Vec<&str> {
        self.get_list("tags")
    }
}

fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn narrow(value: Yaml) -> Option<FieldValue> {
    match value {
        Yaml::Null => None,
        Yaml::Number(n) => n.as_f64().map(FieldValue::Number),
        Yaml::Sequence(items) => Some(FieldValue::List(
            items.iter().filter_map(scalar_text).collect(),
        )),
        Yaml::Mapping(_) => None,
        Yaml::Tagged(tagged) => narrow(tagged.value),
        other => scalar_text(&other).map(FieldValue::Text),
    }
}

/// Split a source file into its raw YAML block and the body after it.
pub fn split_frontmatter(source: &str) -> Result<(&str, &str), FrontmatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = source.split_inclusive('\n');
    let first = lines.next().ok_or(FrontmatterError::Missing)?;
    if first.trim_end() != "---" {
        return Err(FrontmatterError::Missing);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if matches!(line.trim_end(), "---" | "...") {
            let yaml = &source[yaml_start..offset];
            let body = &source[offset + line.len()..];
            return Ok((yaml, body.trim_start_matches(['\r', '\n'])));
        }
        offset += line.len();
    }
    Err(FrontmatterError::Unterminated)
}

/// A post source file with validated required fields.
#[derive(Debug, Clone)]
pub struct Document {
    pub frontmatter: Frontmatter,
    pub body: String,
    pub published: NaiveDateTime,
}

/// Parse a whole post file: split, narrow, and check `title` and `date`.
pub fn parse_document(source: &str) -> Result<Document, FrontmatterError> {
    let (yaml, body) = split_frontmatter(source)?;
    let frontmatter = Frontmatter::from_yaml(yaml)?;

    if frontmatter.title().trim().is_empty() {
        return Err(FrontmatterError::MissingField("title"));
    }
    let date = frontmatter.date();
    if date.trim().is_empty() {
        return Err(FrontmatterError::MissingField("date"));
    }
    let published = parse_date(date).ok_or_else(|| FrontmatterError::BadDate(date.to_string()))?;

    Ok(Document {
        frontmatter,
        body: body.to_string(),
        published,
    })
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` and RFC 3339.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
