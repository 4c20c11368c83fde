//! Page forest construction from path-ordered listings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::path::PagePath;
use crate::types::Page;

/// A page with its children, for tree listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNode {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub path: PagePath,
    pub children: Vec<PageNode>,
}

/// Builds a forest from pages ordered by path.
///
/// A single-label page is a root. Any other page attaches to the page whose
/// path equals its parent path; because input is path-ordered, the parent
/// (when present) has always been visited already. A page whose parent path
/// is absent from the namespace is dropped from the listing.
pub fn build_tree(pages: &[Page]) -> Vec<PageNode> {
    // Arena of nodes plus child index lists, flattened at the end.
    let mut arena: Vec<PageNode> = Vec::with_capacity(pages.len());
    let mut children: Vec<Vec<usize>> = Vec::with_capacity(pages.len());
    let mut by_path: HashMap<&str, usize> = HashMap::with_capacity(pages.len());
    let mut roots: Vec<usize> = Vec::new();

    for page in pages {
        let idx = arena.len();
        arena.push(PageNode {
            id: page.id,
            title: page.title.clone(),
            slug: page.slug.clone(),
            path: page.path.clone(),
            children: Vec::new(),
        });
        children.push(Vec::new());

        match page.path.parent() {
            None => roots.push(idx),
            Some(parent) => {
                if let Some(&parent_idx) = by_path.get(parent.as_str()) {
                    children[parent_idx].push(idx);
                }
                // No parent row: orphan, excluded from the forest.
            }
        }
        by_path.insert(page.path.as_str(), idx);
    }

    fn assemble(idx: usize, arena: &[PageNode], children: &[Vec<usize>]) -> PageNode {
        let mut node = arena[idx].clone();
        node.children = children[idx]
            .iter()
            .map(|&c| assemble(c, arena, children))
            .collect();
        node
    }

    roots
        .into_iter()
        .map(|idx| assemble(idx, &arena, &children))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn page(id: i64, path: &str) -> Page {
        let path: PagePath = path.parse().unwrap();
        Page {
            id,
            title: format!("Page {}", id),
            slug: path.leaf().to_string(),
            content: json!(null),
            path,
            created_at: Utc::now(),
            created_by: "ada".to_string(),
            updated_at: Utc::now(),
            updated_by: "ada".to_string(),
        }
    }

    #[test]
    fn test_builds_nested_forest() {
        let pages = vec![
            page(1, "guide"),
            page(2, "guide.setup"),
            page(3, "guide.setup.linux"),
            page(4, "guide.usage"),
            page(5, "intro"),
        ];
        let tree = build_tree(&pages);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, 1);
        assert_eq!(tree[0].children.len(), 2);
        assert_eq!(tree[0].children[0].id, 2);
        assert_eq!(tree[0].children[0].children[0].id, 3);
        assert_eq!(tree[1].id, 5);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_orphan_excluded() {
        let pages = vec![page(1, "a"), page(2, "missing.child")];
        let tree = build_tree(&pages);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id, 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_tree(&[]).is_empty());
    }
}
