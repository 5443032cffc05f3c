use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

use crate::constants::REDIRECT_BODY_CEILING;

static MP4_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http([\dA-Za-z+:/.]+)\.mp4").unwrap());

/// First embedded mp4 link in a redirector page.
#[must_use]
pub fn find_mp4_link(body: &str) -> Option<&str> {
    MP4_LINK.find(body).map(|m| m.as_str())
}

/// Resolve a redirector page to the URL the extractor should use.
///
/// Pages at or above [`REDIRECT_BODY_CEILING`] bytes are not scanned and the
/// original URL is kept. A small page without a link, a non-success status,
/// or any request failure yields `None`.
pub async fn resolve(client: &Client, url: &str) -> Option<String> {
    let body = match client.get(url).send().await {
        Ok(response) if !response.status().is_success() => {
            debug!(url = %url, status = %response.status(), "Redirector returned non-success status");
            return None;
        }
        Ok(response) => match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, "Failed to read redirector page: {e}");
                return None;
            }
        },
        Err(e) => {
            warn!(url = %url, "Redirector request failed: {e}");
            return None;
        }
    };

    if body.len() >= REDIRECT_BODY_CEILING {
        debug!(url = %url, size = body.len(), "Redirector page too large to scan, keeping URL");
        return Some(url.to_string());
    }

    let text = String::from_utf8_lossy(&body);
    if let Some(link) = find_mp4_link(&text) {
        debug!(url = %url, resolved = %link, "Resolved redirector link");
        Some(link.to_string())
    } else {
        debug!(url = %url, "No mp4 link in redirector page");
        None
    }
}
