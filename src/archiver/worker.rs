use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::reconcile::{merge, Category, ExistingArchive};
use super::{sanitize_filename, Mode};
use crate::fs_utils::write_atomic;
use crate::handlers::MediaFetcher;
use crate::reddit::{Comment, ItemSource, Post, SavedItem};
use crate::render::{
    add_media_preview, comment_tree, index_page, post_fragment, post_page, Templates,
};

/// Counts reported at the end of a pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    pub new_posts: usize,
    pub new_comments: usize,
    pub failed: usize,
}

/// One archiving pass over a user's listing.
///
/// Items already present in the index are skipped; new fragments are placed
/// ahead of the existing ones and the index is rewritten once at the end.
pub struct Archiver<S> {
    source: S,
    media: MediaFetcher,
    templates: Templates,
    root: PathBuf,
}

impl<S: ItemSource> Archiver<S> {
    pub fn new(
        source: S,
        media: MediaFetcher,
        templates: Templates,
        root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            media,
            templates,
            root: root.into(),
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Archive every new item of `mode` and rewrite the index.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched or the index cannot
    /// be read or written. Failures of individual items are logged and
    /// counted instead.
    pub async fn run(&self, mode: Mode) -> Result<PassSummary> {
        let index_path = self.root.join(mode.index_file());
        let existing = ExistingArchive::load(&index_path).await?;

        let items = self
            .source
            .items(mode)
            .await
            .with_context(|| format!("Failed to fetch {mode} items"))?;

        let mut posts = Vec::new();
        let mut comments = Vec::new();
        for item in items {
            match item {
                SavedItem::Post(post) if !existing.contains(&post.id) => posts.push(post),
                SavedItem::Comment(comment) if !existing.contains(&comment.id) => {
                    comments.push(comment);
                }
                _ => {}
            }
        }

        let mut summary = PassSummary::default();

        let mut post_fragments = Vec::with_capacity(posts.len());
        if posts.is_empty() {
            info!("No new posts");
        } else {
            info!(count = posts.len(), "Processing new posts");
        }
        for (index, post) in posts.iter().enumerate() {
            debug!(
                post_id = %post.id,
                current = index + 1,
                total = posts.len(),
                "Archiving post"
            );
            match self.archive_post(post).await {
                Ok(fragment) => {
                    post_fragments.push(fragment);
                    summary.new_posts += 1;
                }
                Err(e) => {
                    warn!(
                        post_id = %post.id,
                        title = %post.title,
                        error = %format!("{e:#}"),
                        "Failed to archive post"
                    );
                    summary.failed += 1;
                }
            }
        }

        let mut comment_fragments = Vec::with_capacity(comments.len());
        if comments.is_empty() {
            info!("No new comments");
        } else {
            info!(count = comments.len(), "Processing new comments");
        }
        for comment in &comments {
            match self.archive_comment(comment) {
                Ok(fragment) => {
                    comment_fragments.push(fragment);
                    summary.new_comments += 1;
                }
                Err(e) => {
                    warn!(
                        comment_id = %comment.id,
                        error = %format!("{e:#}"),
                        "Failed to archive comment"
                    );
                    summary.failed += 1;
                }
            }
        }

        let all_posts = merge(post_fragments, existing.fragments(Category::Post));
        let all_comments = merge(comment_fragments, existing.fragments(Category::Comment));
        let html = index_page(
            self.templates.index(mode),
            &self.templates,
            &all_posts,
            &all_comments,
        );

        write_atomic(&index_path, html.as_bytes())?;
        info!(path = %index_path.display(), "Archive saved");

        Ok(summary)
    }

    /// Render one post, fetch its media and write its standalone page.
    ///
    /// Only a failure to render the index fragment fails the post; a page
    /// that cannot be written is logged and the fragment kept.
    async fn archive_post(&self, post: &Post) -> Result<String> {
        let page_name = self.page_name(post).await;
        let page_link = format!("posts/{page_name}");

        let mut fragment = post_fragment(&self.templates, post, &page_link)?;
        if let Some(media) = self.media.save_media(post).await {
            debug!(post_id = %post.id, file = %media, "Saved media");
            fragment = add_media_preview(&fragment, &media);
        }

        let page_path = self.root.join("posts").join(&page_name);
        if let Err(e) = self.write_page(post, &fragment, &page_path).await {
            warn!(title = %post.title, error = %format!("{e:#}"), "Failed to create post page");
        }

        Ok(fragment)
    }

    fn archive_comment(&self, comment: &Comment) -> Result<String> {
        comment_tree(&self.templates, comment, None)
    }

    /// File name for the post's page, falling back to an id suffix when the
    /// sanitized name is taken.
    async fn page_name(&self, post: &Post) -> String {
        let base = sanitize_filename(&post.subreddit, &post.title);
        let candidate = format!("{base}.html");
        let taken = tokio::fs::try_exists(self.root.join("posts").join(&candidate))
            .await
            .unwrap_or(false);

        if taken {
            format!("{base}_{}.html", post.id)
        } else {
            candidate
        }
    }

    async fn write_page(&self, post: &Post, fragment: &str, path: &Path) -> Result<()> {
        let comments = self.source.post_comments(post).await?;
        let html = post_page(&self.templates, post, fragment, &comments)?;
        tokio::fs::write(path, html)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Wrote post page");
        Ok(())
    }
}
