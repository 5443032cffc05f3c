//! Media acquisition: URL classification and the per-host download routes.

mod classify;
pub mod direct;
pub mod gfycat;
pub mod imgur;
pub mod vreddit;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, warn};

use crate::archiver::ytdlp::Extractor;
use crate::config::Config;
use crate::fs_utils::find_file_with_stem;
use crate::reddit::Post;

pub use classify::{classify, fallback_route, route, Route, UrlInfo};
pub use vreddit::{CommandVideoDownloader, VideoDownloader};

/// Resolves a post's external URL to a file in the media directory.
pub struct MediaFetcher {
    client: Client,
    media_dir: PathBuf,
    extractor: Extractor,
    video_downloader: Box<dyn VideoDownloader>,
}

impl MediaFetcher {
    /// Create a fetcher writing into `media_dir`, which must exist.
    ///
    /// The request timeout bounds connecting and each wait for data, not the
    /// whole transfer, so large files that keep streaming are not cut off.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the directory
    /// cannot be resolved.
    pub fn new(config: &Config, media_dir: &Path) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.request_timeout)
            .read_timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        // Absolute, so external tools that change directory cannot break it.
        let media_dir = std::fs::canonicalize(media_dir)
            .with_context(|| format!("Media directory not found: {}", media_dir.display()))?;

        Ok(Self {
            client,
            media_dir,
            extractor: Extractor::new(config),
            video_downloader: Box::new(CommandVideoDownloader::new(
                config.video_downloader_path.clone(),
                config.download_timeout,
            )),
        })
    }

    /// Replace the native video host downloader.
    #[must_use]
    pub fn with_video_downloader(mut self, downloader: Box<dyn VideoDownloader>) -> Self {
        self.video_downloader = downloader;
        self
    }

    #[must_use]
    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Download the media attached to `post`, returning its file name.
    ///
    /// Never fails: every network or tool error is logged and reported as
    /// "no media".
    pub async fn save_media(&self, post: &Post) -> Option<String> {
        let info = classify(&post.url, &post.permalink)?;
        let stem = format!("{}_{}", info.slug, post.id);

        let route = route(&info, &post.url);
        match route {
            Route::Gallery => {
                debug!(url = %post.url, "Skipping gallery");
                return None;
            }
            Route::Unsupported => {
                debug!(url = %post.url, domain = %info.domain, "No media route for domain");
                return None;
            }
            _ => {}
        }

        if let Some(existing) = self.existing(&stem).await {
            debug!(post_id = %post.id, file = %existing, "Media already downloaded");
            return Some(existing);
        }

        match route {
            Route::Direct => {
                direct::download(
                    &self.client,
                    &post.url,
                    &self.media_dir,
                    &stem,
                    &info.extension,
                )
                .await
            }
            Route::VideoHost => {
                vreddit::download(
                    self.video_downloader.as_ref(),
                    &post.url,
                    &self.media_dir,
                    &stem,
                )
                .await
            }
            Route::Redirector => {
                let resolved = gfycat::resolve(&self.client, &post.url).await?;
                self.fallback(&info, &resolved, &stem).await
            }
            Route::ImageHost | Route::Extractor => self.fallback(&info, &post.url, &stem).await,
            Route::Gallery | Route::Unsupported => None,
        }
    }

    async fn fallback(&self, info: &UrlInfo, url: &str, stem: &str) -> Option<String> {
        match fallback_route(info) {
            Route::ImageHost => imgur::download(&self.client, url, &self.media_dir, stem).await,
            Route::Extractor => self.extractor.download(url, &self.media_dir, stem).await,
            _ => None,
        }
    }

    async fn existing(&self, stem: &str) -> Option<String> {
        match find_file_with_stem(&self.media_dir, stem).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Failed to scan media directory: {e:#}");
                None
            }
        }
    }
}
