//! Materialized-path algebra for hierarchical pages.
//!
//! A page's location is encoded as a dot-separated sequence of labels
//! (`guide.setup.linux`). Labels are restricted to `[A-Za-z0-9_]`; hyphens
//! in user-supplied slugs are substituted with underscores at write time
//! since hierarchical storage labels forbid them. All functions here are
//! pure; the subtree-relocation predicate they define is executed by the
//! backends as a single atomic UPDATE.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WikiError;

/// A validated materialized page path.
///
/// # Examples
///
/// ```
/// use roomwiki_persistence::path::PagePath;
///
/// let root: PagePath = "intro".parse().unwrap();
/// let child = root.child("setup");
/// assert_eq!(child.as_str(), "intro.setup");
/// assert_eq!(child.parent().unwrap(), root);
/// assert!(child.is_descendant_of(&root));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PagePath(String);

impl PagePath {
    /// Builds a path from an optional parent path and an already-sanitized
    /// slug. An empty/absent parent yields a root path.
    pub fn compose(parent: Option<&PagePath>, slug: &str) -> Result<PagePath, WikiError> {
        let slug = sanitize_slug(slug)?;
        match parent {
            None => Ok(PagePath(slug)),
            Some(p) => Ok(PagePath(format!("{}.{}", p.0, slug))),
        }
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parent path, or `None` for a root (single-label) path.
    pub fn parent(&self) -> Option<PagePath> {
        self.0
            .rfind('.')
            .map(|idx| PagePath(self.0[..idx].to_string()))
    }

    /// Returns the final label of the path.
    pub fn leaf(&self) -> &str {
        match self.0.rfind('.') {
            Some(idx) => &self.0[idx + 1..],
            None => &self.0,
        }
    }

    /// Appends an already-sanitized label. Use [`PagePath::compose`] for
    /// fallible construction from user input.
    pub fn child(&self, slug: &str) -> PagePath {
        PagePath(format!("{}.{}", self.0, slug))
    }

    /// True when `self` equals `ancestor` or sits strictly below it.
    pub fn is_descendant_of(&self, ancestor: &PagePath) -> bool {
        self.0 == ancestor.0
            || (self.0.starts_with(&ancestor.0) && self.0[ancestor.0.len()..].starts_with('.'))
    }

    /// Rewrites the `old_ancestor` prefix of this path to `new_ancestor`,
    /// preserving the suffix. Returns `None` when `self` is not a descendant
    /// of `old_ancestor`.
    ///
    /// This is the per-row semantics of subtree relocation. Backends apply
    /// it set-wide in a single UPDATE scoped by the is-descendant predicate,
    /// excluding the renamed page's own row (updated separately).
    pub fn relocate(&self, old_ancestor: &PagePath, new_ancestor: &PagePath) -> Option<PagePath> {
        if !self.is_descendant_of(old_ancestor) {
            return None;
        }
        let suffix = &self.0[old_ancestor.0.len()..];
        Some(PagePath(format!("{}{}", new_ancestor.0, suffix)))
    }

    /// Number of labels in the path.
    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PagePath({})", self.0)
    }
}

impl FromStr for PagePath {
    type Err = WikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(WikiError::validation("page path must not be empty"));
        }
        for label in s.split('.') {
            if label.is_empty() || !label.chars().all(is_label_char) {
                return Err(WikiError::validation(format!(
                    "invalid page path: {}",
                    s
                )));
            }
        }
        Ok(PagePath(s.to_string()))
    }
}

impl AsRef<str> for PagePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Normalizes a user-supplied slug into a storage-safe label.
///
/// Hyphens become underscores; anything outside `[A-Za-z0-9_]` after that
/// is rejected rather than silently dropped.
pub fn sanitize_slug(raw: &str) -> Result<String, WikiError> {
    let slug = raw.replace('-', "_");
    if slug.is_empty() {
        return Err(WikiError::validation("slug must not be empty"));
    }
    if !slug.chars().all(is_label_char) {
        return Err(WikiError::validation(format!("invalid slug: {}", raw)));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> PagePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_sanitize_slug_replaces_hyphens() {
        assert_eq!(sanitize_slug("getting-started").unwrap(), "getting_started");
        assert_eq!(sanitize_slug("intro").unwrap(), "intro");
    }

    #[test]
    fn test_sanitize_slug_rejects_bad_chars() {
        assert!(sanitize_slug("a.b").is_err());
        assert!(sanitize_slug("a b").is_err());
        assert!(sanitize_slug("").is_err());
        assert!(sanitize_slug("a;drop").is_err());
    }

    #[test]
    fn test_compose_root_and_child() {
        let root = PagePath::compose(None, "intro").unwrap();
        assert_eq!(root.as_str(), "intro");

        let child = PagePath::compose(Some(&root), "setup").unwrap();
        assert_eq!(child.as_str(), "intro.setup");
    }

    #[test]
    fn test_compose_sanitizes() {
        let p = PagePath::compose(None, "my-page").unwrap();
        assert_eq!(p.as_str(), "my_page");
    }

    #[test]
    fn test_parent_and_leaf() {
        let p = path("a.b.c");
        assert_eq!(p.parent().unwrap(), path("a.b"));
        assert_eq!(p.leaf(), "c");
        assert_eq!(path("a").parent(), None);
        assert_eq!(path("a").leaf(), "a");
    }

    #[test]
    fn test_parent_compose_round_trip() {
        let p = path("guide.setup");
        let parent = p.parent().unwrap();
        let recomposed = PagePath::compose(Some(&parent), p.leaf()).unwrap();
        assert_eq!(recomposed, p);
    }

    #[test]
    fn test_is_descendant() {
        assert!(path("a.b").is_descendant_of(&path("a")));
        assert!(path("a").is_descendant_of(&path("a")));
        assert!(path("a.b.c").is_descendant_of(&path("a.b")));
        assert!(!path("ab").is_descendant_of(&path("a")));
        assert!(!path("a.x").is_descendant_of(&path("a.b")));
    }

    #[test]
    fn test_relocate_descendant() {
        let old = path("a.b");
        let new = path("a.c");
        assert_eq!(path("a.b.d").relocate(&old, &new).unwrap(), path("a.c.d"));
        assert_eq!(path("a.b").relocate(&old, &new).unwrap(), path("a.c"));
        assert!(path("a.x").relocate(&old, &new).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<PagePath>().is_err());
        assert!("a..b".parse::<PagePath>().is_err());
        assert!(".a".parse::<PagePath>().is_err());
        assert!("a-b".parse::<PagePath>().is_err());
        assert!("a b".parse::<PagePath>().is_err());
    }

    #[test]
    fn test_depth() {
        assert_eq!(path("a").depth(), 1);
        assert_eq!(path("a.b.c").depth(), 3);
    }
}
