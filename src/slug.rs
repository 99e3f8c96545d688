//! Post slugs and URL-safe identifiers.
//!
//! A post's slug is its path under the posts directory with the extension
//! removed and `/` as the separator, so nested folders become nested URLs:
//!
//! - `posts/pouring-a-slab.md` → `pouring-a-slab`
//! - `posts/guides/footings-101.mdx` → `guides/footings-101`
//!
//! Slugs arriving from URLs go through [`is_safe_slug`] before they are
//! turned back into file paths, and post files whose slug fails the same
//! check are left out of enumeration.

use std::path::{Component, Path};

/// Extensions recognized as post sources, in lookup priority order.
pub const POST_EXTENSIONS: &[&str] = &["md", "mdx"];

pub fn is_post_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| POST_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Slug for `path`, relative to `posts_dir`. `None` when `path` is not a
/// post file under `posts_dir`.
pub fn slug_from_path(posts_dir: &Path, path: &Path) -> Option<String> {
    if !is_post_file(path) {
        return None;
    }
    let rel = path.strip_prefix(posts_dir).ok()?.with_extension("");
    let parts: Vec<String> = rel
        .components()
        .map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Option<_>>()?;
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Whether `slug` can be safely joined onto the posts directory and used
/// verbatim in a URL path.
///
/// Segments are non-empty, do not start with `.` (which covers `.`, `..`
/// and hidden files), and contain only URL-unreserved characters: ASCII
/// letters and digits plus `-`, `_`, `.` and `~`. Anything else (`?`, `#`,
/// `%`, spaces, backslashes, non-ASCII) would need escaping.
pub fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.split('/').all(|seg| {
            !seg.is_empty()
                && !seg.starts_with('.')
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
        })
}

/// Lowercase, ASCII-alphanumeric words joined by single dashes.
///
/// - `"Mix Design"` → `"mix-design"`
/// - `"  Footings & Foundations "` → `"footings-foundations"`
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn flat_post_slug() {
        let root = PathBuf::from("/site/posts");
        assert_eq!(
            slug_from_path(&root, &root.join("pouring-a-slab.md")).as_deref(),
            Some("pouring-a-slab")
        );
    }

    #[test]
    fn nested_post_slug_uses_forward_slashes() {
        let root = PathBuf::from("/site/posts");
        let path = root.join("guides").join("footings-101.mdx");
        assert_eq!(
            slug_from_path(&root, &path).as_deref(),
            Some("guides/footings-101")
        );
    }

    #[test]
    fn non_post_files_have_no_slug() {
        let root = PathBuf::from("/site/posts");
        assert_eq!(slug_from_path(&root, &root.join("cover.png")), None);
        assert_eq!(slug_from_path(&root, Path::new("/elsewhere/a.md")), None);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert!(is_post_file(Path::new("a.md")));
        assert!(is_post_file(Path::new("a.mdx")));
        assert!(!is_post_file(Path::new("A.MD")));
        assert!(!is_post_file(Path::new("a.Mdx")));
        assert!(!is_post_file(Path::new("notes.txt")));
    }

    #[test]
    fn safe_slugs() {
        assert!(is_safe_slug("pouring-a-slab"));
        assert!(is_safe_slug("guides/footings-101"));
        assert!(is_safe_slug("Shout"));
        assert!(is_safe_slug("mix_v2.1~draft"));
    }

    #[test]
    fn unsafe_slugs() {
        assert!(!is_safe_slug(""));
        assert!(!is_safe_slug("/etc/passwd"));
        assert!(!is_safe_slug("../config"));
        assert!(!is_safe_slug("guides/../../x"));
        assert!(!is_safe_slug("guides//x"));
        assert!(!is_safe_slug("a\\b"));
        assert!(!is_safe_slug(".drafts/secret"));
    }

    #[test]
    fn slugs_needing_url_escapes_are_unsafe() {
        assert!(!is_safe_slug("what-is-psi?"));
        assert!(!is_safe_slug("ratios#table"));
        assert!(!is_safe_slug("50%25-off"));
        assert!(!is_safe_slug("two words"));
        assert!(!is_safe_slug("béton"));
    }

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Mix Design"), "mix-design");
        assert_eq!(slugify("  Footings & Foundations "), "footings-foundations");
        assert_eq!(slugify("3000 PSI"), "3000-psi");
        assert_eq!(slugify("---"), "");
    }
}
