//! Platform client for the current user's saved and upvoted items.

mod client;
mod models;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::archiver::Mode;

pub use client::RedditClient;
pub use models::{Comment, Post, SavedItem};

#[derive(Debug, Error)]
pub enum RedditError {
    #[error("authentication failed: {reason}")]
    Auth { reason: String },
    #[error("request to {endpoint} failed with status {status}")]
    Status { status: u16, endpoint: String },
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Source of items to archive.
#[async_trait]
pub trait ItemSource: Send + Sync {
    /// All items in the given listing, newest first.
    async fn items(&self, mode: Mode) -> Result<Vec<SavedItem>>;

    /// Root comments of a post, with placeholders already removed.
    async fn post_comments(&self, post: &Post) -> Result<Vec<Comment>>;
}
