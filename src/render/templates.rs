use std::path::Path;

use anyhow::{Context, Result};

use crate::archiver::Mode;
use crate::config::Config;

/// The HTML templates used by one archiving pass.
///
/// Loaded once up front; the contents never change while the process runs.
#[derive(Debug, Clone)]
pub struct Templates {
    pub post_page: String,
    pub post_div: String,
    pub comment_div: String,
    pub style: String,
    pub script: String,
    saved_index: String,
    upvoted_index: String,
}

impl Templates {
    /// Templates compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            post_page: include_str!("../../html/post.html").to_string(),
            post_div: include_str!("../../html/post-div.html").to_string(),
            comment_div: include_str!("../../html/comment-div.html").to_string(),
            style: include_str!("../../html/style.css").to_string(),
            script: include_str!("../../html/main.js").to_string(),
            saved_index: include_str!("../../html/saved.html").to_string(),
            upvoted_index: include_str!("../../html/upvoted.html").to_string(),
        }
    }

    /// Read every template from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first template that cannot be read.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template {}", path.display()))
        };

        Ok(Self {
            post_page: read("post.html")?,
            post_div: read("post-div.html")?,
            comment_div: read("comment-div.html")?,
            style: read("style.css")?,
            script: read("main.js")?,
            saved_index: read("saved.html")?,
            upvoted_index: read("upvoted.html")?,
        })
    }

    /// Templates from `TEMPLATE_DIR` when configured, built-in otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured directory is missing a template.
    pub fn from_config(config: &Config) -> Result<Self> {
        config
            .template_dir
            .as_deref()
            .map_or_else(|| Ok(Self::builtin()), Self::load)
    }

    /// Index page template for a mode.
    #[must_use]
    pub fn index(&self, mode: Mode) -> &str {
        match mode {
            Mode::Saved => &self.saved_index,
            Mode::Upvoted => &self.upvoted_index,
        }
    }
}
