use std::path::Path;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

/// Fetch a URL whose extension already names a media type.
///
/// The file is kept only if the server declares an image or video content
/// type. Every failure yields `None`.
pub async fn download(
    client: &Client,
    url: &str,
    media_dir: &Path,
    stem: &str,
    extension: &str,
) -> Option<String> {
    match fetch(client, url, media_dir, stem, extension).await {
        Ok(filename) => filename,
        Err(e) => {
            warn!(url = %url, "Direct download failed: {e:#}");
            None
        }
    }
}

async fn fetch(
    client: &Client,
    url: &str,
    media_dir: &Path,
    stem: &str,
    extension: &str,
) -> Result<Option<String>> {
    let response = client.get(url).send().await.context("Request failed")?;

    let status = response.status();
    if !status.is_success() {
        debug!(url = %url, status = %status, "Direct download returned non-success status");
        return Ok(None);
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !(content_type.starts_with("image") || content_type.starts_with("video")) {
        debug!(url = %url, content_type = %content_type, "Not a media response, skipping");
        return Ok(None);
    }

    let bytes = response
        .bytes()
        .await
        .context("Failed to read response body")?;
    let filename = format!("{stem}.{extension}");
    let path = media_dir.join(&filename);
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(url = %url, file = %filename, bytes = bytes.len(), "Saved media");
    Ok(Some(filename))
}
