//! Reading a previously written index and merging new fragments into it.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

static ID_ATTR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"id="(.+?)""#).unwrap());

static FRAGMENT_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="(post|comment)"|<!--(post|comment)end--></div>"#).unwrap()
});

/// Kind of item a fragment renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Post,
    Comment,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Identifiers and fragments found in an existing index file.
#[derive(Debug, Default, Clone)]
pub struct ExistingArchive {
    ids: HashSet<String>,
    posts: Vec<String>,
    comments: Vec<String>,
}

impl ExistingArchive {
    /// Read an index file; a missing file is an empty archive.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read archive {}", path.display()))
            }
        }
    }

    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            ids: extract_ids(content),
            posts: extract_fragments(content, Category::Post),
            comments: extract_fragments(content, Category::Comment),
        }
    }

    /// Whether an item with this identifier is already archived.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn fragments(&self, category: Category) -> &[String] {
        match category {
            Category::Post => &self.posts,
            Category::Comment => &self.comments,
        }
    }
}

/// Every value of an `id="..."` attribute in the document.
#[must_use]
pub fn extract_ids(content: &str) -> HashSet<String> {
    ID_ATTR
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Every top-level fragment of `category`, in document order.
///
/// A fragment runs from its opening `<div class="...">` to the end marker
/// that closes it; fragments nested inside it stay part of it.
#[must_use]
pub fn extract_fragments(content: &str, category: Category) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for caps in FRAGMENT_BOUNDARY.captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(open) = caps.get(1) {
            if open.as_str() != category.as_str() {
                continue;
            }
            if depth == 0 {
                start = whole.start();
            }
            depth += 1;
        } else if let Some(end) = caps.get(2) {
            if end.as_str() != category.as_str() || depth == 0 {
                continue;
            }
            depth -= 1;
            if depth == 0 {
                fragments.push(content[start..whole.end()].to_string());
            }
        }
    }

    fragments
}

/// New fragments (in fetch order) followed by existing ones (in file order).
#[must_use]
pub fn merge(new: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut merged = new;
    merged.extend_from_slice(existing);
    merged
}
