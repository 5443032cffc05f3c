use std::path::Path;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::constants::IMAGE_EXTENSIONS;

/// Host prefixes folded into the bare image host.
const HOST_ALIASES: &[&str] = &["i.imgur.com", "m.imgur.com", "www.imgur.com"];

/// Direct image URLs to probe for an image page URL, paired with the
/// extension each one would be saved under.
#[must_use]
pub fn candidate_urls(url: &str) -> Vec<(String, &'static str)> {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let mut base = without_query
        .split_once("//")
        .map_or(without_query, |(_, rest)| rest)
        .trim_end_matches('/')
        .to_string();
    for alias in HOST_ALIASES {
        base = base.replace(alias, "imgur.com");
    }

    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| (format!("https://i.{base}.{ext}"), *ext))
        .collect()
}

/// Try the direct image URLs for an image page and save the first hit.
pub async fn download(client: &Client, url: &str, media_dir: &Path, stem: &str) -> Option<String> {
    let found = download_candidates(client, candidate_urls(url), media_dir, stem).await;
    if found.is_none() {
        debug!(url = %url, "No imgur candidate answered");
    }
    found
}

/// Request each candidate in order and save the first that answers 200 as
/// `{stem}.{ext}`. Transport errors move on to the next candidate.
pub async fn download_candidates(
    client: &Client,
    candidates: Vec<(String, &'static str)>,
    media_dir: &Path,
    stem: &str,
) -> Option<String> {
    for (candidate, ext) in candidates {
        let response = match client.get(&candidate).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %candidate, "Imgur candidate request failed: {e}");
                continue;
            }
        };
        if response.status() != StatusCode::OK {
            continue;
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(url = %candidate, "Failed to read imgur response: {e}");
                continue;
            }
        };

        let filename = format!("{stem}.{ext}");
        let path = media_dir.join(&filename);
        return match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                debug!(url = %candidate, file = %filename, "Saved imgur image");
                Some(filename)
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to write imgur image: {e}");
                None
            }
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_follow_extension_order() {
        let candidates = candidate_urls("https://imgur.com/AbCdE");
        let urls: Vec<&str> = candidates.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(urls.len(), IMAGE_EXTENSIONS.len());
        assert_eq!(urls[0], "https://i.imgur.com/AbCdE.jpg");
        assert_eq!(urls[1], "https://i.imgur.com/AbCdE.jpeg");
        assert_eq!(urls[2], "https://i.imgur.com/AbCdE.png");
        assert_eq!(candidates.last().map(|(_, e)| *e), Some("gifv"));
    }

    #[test]
    fn test_candidates_normalize_host() {
        for url in [
            "https://m.imgur.com/AbCdE",
            "https://i.imgur.com/AbCdE",
            "http://www.imgur.com/AbCdE/",
            "https://imgur.com/AbCdE?ref=share",
        ] {
            assert_eq!(candidate_urls(url)[0].0, "https://i.imgur.com/AbCdE.jpg", "{url}");
        }
    }
}
