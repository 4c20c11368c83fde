//! Ranked full-text search over one room namespace.
//!
//! Backends fetch candidate pages with case-insensitive containment
//! filters; scoring and excerpt generation happen here so both backends
//! share one ranking law: exact title match 100, title containment 50,
//! content-only containment 10, ties broken by path.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::path::PagePath;
use crate::types::Page;

const SCORE_EXACT_TITLE: i32 = 100;
const SCORE_TITLE: i32 = 50;
const SCORE_CONTENT: i32 = 10;

/// Characters of context kept before the first content match.
const EXCERPT_LEAD: usize = 60;
/// Total excerpt length in characters.
const EXCERPT_LEN: usize = 150;

/// One ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub path: PagePath,
    pub score: i32,
    /// Excerpt around the first content match, with `<mark>` highlighting.
    pub excerpt: Option<String>,
}

/// Ranks candidate pages against a query.
///
/// Pages matching neither title nor content are dropped, so callers may
/// over-fetch candidates.
pub fn rank_pages(query: &str, pages: &[Page]) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let highlighter = highlighter(query);

    let mut hits: Vec<SearchHit> = pages
        .iter()
        .filter_map(|page| {
            let content_text = page.content.to_string();
            let score = score_page(&needle, &page.title, &content_text)?;
            let excerpt = excerpt(&content_text, &needle).map(|e| highlighter.highlight(&e));
            Some(SearchHit {
                id: page.id,
                title: page.title.clone(),
                slug: page.slug.clone(),
                path: page.path.clone(),
                score,
                excerpt,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.path.as_str().cmp(b.path.as_str()))
    });
    hits
}

fn score_page(needle: &str, title: &str, content_text: &str) -> Option<i32> {
    let title_lower = title.to_lowercase();
    if title_lower == *needle {
        Some(SCORE_EXACT_TITLE)
    } else if title_lower.contains(needle) {
        Some(SCORE_TITLE)
    } else if content_text.to_lowercase().contains(needle) {
        Some(SCORE_CONTENT)
    } else {
        None
    }
}

/// Extracts a window starting [`EXCERPT_LEAD`] characters before the first
/// case-insensitive match, [`EXCERPT_LEN`] characters long. Operates on
/// character counts so multi-byte content cannot split a code point.
fn excerpt(content_text: &str, needle: &str) -> Option<String> {
    let lower = content_text.to_lowercase();
    let byte_pos = lower.find(needle)?;
    let char_pos = content_text[..byte_pos].chars().count();
    let start = char_pos.saturating_sub(EXCERPT_LEAD);
    let snippet: String = content_text.chars().skip(start).take(EXCERPT_LEN).collect();
    Some(snippet)
}

/// Case-insensitive query highlighter. The query is regex-escaped so
/// metacharacters in user input match literally.
struct Highlighter {
    pattern: Option<Regex>,
}

fn highlighter(query: &str) -> Highlighter {
    let pattern = Regex::new(&format!("(?i){}", regex::escape(query))).ok();
    Highlighter { pattern }
}

impl Highlighter {
    fn highlight(&self, text: &str) -> String {
        match &self.pattern {
            Some(re) => re.replace_all(text, "<mark>$0</mark>").into_owned(),
            None => text.to_string(),
        }
    }
}
