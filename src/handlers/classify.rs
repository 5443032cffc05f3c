use url::Url;

use crate::constants::{
    is_image_extension, is_video_extension, EXTRACTOR_PLATFORMS, GALLERY_MARKER, IMAGE_HOST,
    IMAGE_HOST_ANIMATED_EXTENSION, REDIRECTOR_HOST, VIDEO_HOST,
};

/// What the classifier derives from a post's external URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlInfo {
    /// Last two labels of the host.
    pub domain: String,
    /// Lowercase suffix of the last path segment, or empty.
    pub extension: String,
    /// Human readable stem taken from the permalink.
    pub slug: String,
}

/// Media resolution route for a classified URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Multi-image gallery on the image host; never downloaded.
    Gallery,
    /// Known media extension; fetched as-is.
    Direct,
    /// Native video host; handed to the short-video downloader.
    VideoHost,
    /// Redirector page that embeds a direct mp4 link.
    Redirector,
    /// Image host page; direct image URLs are probed.
    ImageHost,
    /// Any other known video platform; handed to the extractor.
    Extractor,
    Unsupported,
}

/// Classify a post URL.
///
/// Returns `None` for text posts, whose URL just repeats the permalink.
/// Never fails: malformed URLs produce a best-effort guess.
#[must_use]
pub fn classify(url: &str, permalink: &str) -> Option<UrlInfo> {
    if !permalink.is_empty() && url.ends_with(permalink) {
        return None;
    }

    let parsed = Url::parse(url).ok();
    let host = parsed
        .as_ref()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| fallback_host(url));
    let path = parsed
        .as_ref()
        .map_or_else(|| fallback_path(url), |u| u.path().to_string());

    Some(UrlInfo {
        domain: reduce_host(&host),
        extension: extension_of(&path),
        slug: slug_of(permalink),
    })
}

/// Pick the route for a classified URL.
#[must_use]
pub fn route(info: &UrlInfo, url: &str) -> Route {
    if info.domain == IMAGE_HOST && url.contains(GALLERY_MARKER) {
        return Route::Gallery;
    }
    if is_image_extension(&info.extension) || is_video_extension(&info.extension) {
        return Route::Direct;
    }
    if info.domain == VIDEO_HOST {
        return Route::VideoHost;
    }
    if info.domain == REDIRECTOR_HOST {
        return Route::Redirector;
    }
    fallback_route(info)
}

/// Routes that remain once the specific ones have been ruled out, also used
/// after a redirector has been resolved.
#[must_use]
pub fn fallback_route(info: &UrlInfo) -> Route {
    if info.domain == IMAGE_HOST && info.extension != IMAGE_HOST_ANIMATED_EXTENSION {
        return Route::ImageHost;
    }
    if EXTRACTOR_PLATFORMS.contains(&info.domain.as_str()) {
        return Route::Extractor;
    }
    Route::Unsupported
}

fn reduce_host(host: &str) -> String {
    let labels: Vec<&str> = host
        .trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();
    let start = labels.len().saturating_sub(2);
    labels[start..].join(".").to_lowercase()
}

fn fallback_host(url: &str) -> String {
    url.split('/')
        .nth(2)
        .unwrap_or_default()
        .split(':')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn fallback_path(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let after_scheme = without_query
        .split_once("//")
        .map_or(without_query, |(_, rest)| rest);
    after_scheme
        .find('/')
        .map_or_else(String::new, |i| after_scheme[i..].to_string())
}

fn extension_of(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or_default();
    last.rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

fn slug_of(permalink: &str) -> String {
    permalink
        .split('/')
        .rfind(|part| !part.is_empty())
        .unwrap_or("post")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERMALINK: &str = "/r/pics/comments/abc123/a_nice_picture/";

    fn info(url: &str) -> UrlInfo {
        classify(url, PERMALINK).expect("link post")
    }

    #[test]
    fn test_png_extension() {
        let info = info("https://i.redd.it/xyz.png");
        assert_eq!(info.extension, "png");
        assert_eq!(info.domain, "redd.it");
        assert_eq!(info.slug, "a_nice_picture");
    }

    #[test]
    fn test_mobile_imgur_gifv() {
        let info = info("https://m.imgur.com/abc.gifv");
        assert_eq!(info.domain, "imgur.com");
        assert_eq!(info.extension, "gifv");
    }

    #[test]
    fn test_query_string_stripped() {
        let info = info("https://cdn.example.com/media/Photo.JPG?width=640&format=png");
        assert_eq!(info.extension, "jpg");
        assert_eq!(info.domain, "example.com");
    }

    #[test]
    fn test_no_extension() {
        assert_eq!(info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").extension, "");
        assert_eq!(info("https://imgur.com/AbCdE").extension, "");
    }

    #[test]
    fn test_text_post_has_no_media() {
        let url = format!("https://www.reddit.com{PERMALINK}");
        assert!(classify(&url, PERMALINK).is_none());
    }

    #[test]
    fn test_malformed_url_best_effort() {
        let info = classify("not a url/thing.GIF?x", PERMALINK).unwrap();
        assert_eq!(info.extension, "gif");

        let info = classify("", "").unwrap();
        assert_eq!(info.domain, "");
        assert_eq!(info.extension, "");
        assert_eq!(info.slug, "post");
    }

    #[test]
    fn test_gallery_excluded_regardless_of_extension() {
        for url in [
            "https://imgur.com/gallery/abc",
            "https://imgur.com/gallery/abc.jpg",
            "https://i.imgur.com/gallery.png",
        ] {
            assert_eq!(route(&info(url), url), Route::Gallery, "{url}");
        }
    }

    #[test]
    fn test_routes() {
        let cases = [
            ("https://i.redd.it/xyz.jpg", Route::Direct),
            ("https://example.com/clip.webm", Route::Direct),
            ("https://i.imgur.com/abc.gifv", Route::Direct),
            ("https://v.redd.it/abcdef", Route::VideoHost),
            ("https://gfycat.com/SomeAnimal", Route::Redirector),
            ("https://imgur.com/AbCdE", Route::ImageHost),
            ("https://www.youtube.com/watch?v=1", Route::Extractor),
            ("https://vimeo.com/12345", Route::Extractor),
            ("https://example.com/article", Route::Unsupported),
        ];
        for (url, expected) in cases {
            assert_eq!(route(&info(url), url), expected, "{url}");
        }
    }

    #[test]
    fn test_fallback_after_redirect() {
        let resolved = UrlInfo {
            domain: "gfycat.com".to_string(),
            extension: String::new(),
            slug: "s".to_string(),
        };
        assert_eq!(fallback_route(&resolved), Route::Extractor);
    }
}
