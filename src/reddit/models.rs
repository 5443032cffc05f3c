//! Reddit listing payloads and the domain items built from them.

use serde::Deserialize;
use tracing::warn;

/// A submission fetched from the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    /// `None` when the account was deleted.
    pub author: Option<String>,
    /// External URL (equal to the permalink URL for text posts).
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    /// Pre-rendered self text.
    pub selftext_html: Option<String>,
    pub score: i64,
}

/// A comment with its (already resolved) reply tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author: Option<String>,
    pub body_html: Option<String>,
    pub score: i64,
    pub permalink: String,
    pub created_utc: f64,
    pub replies: Vec<Comment>,
}

/// One entry of a saved or upvoted listing.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedItem {
    Post(Post),
    Comment(Comment),
}

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    #[serde(default)]
    pub after: Option<String>,
}

/// A listing child; `kind` says how to read `data`.
#[derive(Debug, Deserialize)]
pub(crate) struct Thing {
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A listing child after discrimination.
enum Entry {
    Link(RawPost),
    Comment(RawComment),
}

impl Thing {
    /// `t3` is a submission, `t1` a comment; anything else (including
    /// `more` placeholders) is skipped.
    fn into_entry(self) -> Option<Entry> {
        let entry = match self.kind.as_str() {
            "t3" => serde_json::from_value(self.data).map(Entry::Link),
            "t1" => serde_json::from_value(self.data).map(Entry::Comment),
            _ => return None,
        };
        match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(kind = %self.kind, "Skipping malformed listing entry: {e}");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub selftext_html: Option<String>,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawComment {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub created_utc: f64,
    /// Either an empty string or a nested listing.
    #[serde(default)]
    pub replies: serde_json::Value,
}

fn author_name(author: Option<String>) -> Option<String> {
    author.filter(|name| !name.is_empty() && name != "[deleted]")
}

impl From<RawPost> for Post {
    fn from(raw: RawPost) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            subreddit: raw.subreddit,
            author: author_name(raw.author),
            url: raw.url,
            permalink: raw.permalink,
            created_utc: raw.created_utc,
            selftext_html: raw.selftext_html,
            score: raw.score,
        }
    }
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        let replies = if raw.replies.is_object() {
            serde_json::from_value::<Listing>(raw.replies)
                .map(comments_from_listing)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Self {
            id: raw.id,
            author: author_name(raw.author),
            body_html: raw.body_html,
            score: raw.score,
            permalink: raw.permalink,
            created_utc: raw.created_utc,
            replies,
        }
    }
}

/// Convert a listing's children, dropping "load more" placeholders.
pub(crate) fn comments_from_listing(listing: Listing) -> Vec<Comment> {
    listing
        .data
        .children
        .into_iter()
        .filter_map(|thing| match thing.into_entry()? {
            Entry::Comment(raw) => Some(Comment::from(raw)),
            Entry::Link(_) => None,
        })
        .collect()
}

/// Convert a saved/upvoted listing page into items.
pub(crate) fn items_from_listing(listing: Listing) -> (Vec<SavedItem>, Option<String>) {
    let after = listing.data.after;
    let items = listing
        .data
        .children
        .into_iter()
        .filter_map(|thing| match thing.into_entry()? {
            Entry::Link(raw) => Some(SavedItem::Post(raw.into())),
            Entry::Comment(raw) => Some(SavedItem::Comment(raw.into())),
        })
        .collect();
    (items, after)
}
