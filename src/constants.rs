//! Shared constants used across the application.

use std::time::Duration;

/// Image extensions, in the order imgur candidates are probed.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tiff", "gifv"];

/// Video extensions that can be fetched directly.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "flv", "avi", "mov"];

/// Hosts handed to the general-purpose media extractor.
pub const EXTRACTOR_PLATFORMS: &[&str] = &[
    "youtube.com",
    "vimeo.com",
    "dailymotion.com",
    "redgifs.com",
    "gfycat.com",
    "imgur.com",
];

/// Image host that is probed for direct image URLs.
pub const IMAGE_HOST: &str = "imgur.com";

/// Animated container format on the image host that is never probed.
pub const IMAGE_HOST_ANIMATED_EXTENSION: &str = "gifv";

/// Marker in image host URLs that identifies multi-image galleries.
pub const GALLERY_MARKER: &str = "gallery";

/// Native video host (`v.redd.it` after domain reduction).
pub const VIDEO_HOST: &str = "redd.it";

/// Legacy redirector whose pages embed a direct mp4 link.
pub const REDIRECTOR_HOST: &str = "gfycat.com";

/// Redirector pages at or above this size are not scanned for a link.
pub const REDIRECT_BODY_CEILING: usize = 50_000;

/// Maximum length of a sanitized page name.
pub const MAX_FILENAME_LENGTH: usize = 160;

/// Byte budget of a sanitized page name, leaving room for `_{id}.html`
/// under the common 255-byte file name limit.
pub const MAX_FILENAME_BYTES: usize = 200;

/// Default timeout for every outbound HTTP request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Base URL prepended to permalinks.
pub const REDDIT_WEB_BASE: &str = "https://reddit.com";

/// Returns true if `extension` is a known image type.
#[must_use]
pub fn is_image_extension(extension: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension)
}

/// Returns true if `extension` is a known video type.
#[must_use]
pub fn is_video_extension(extension: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&extension)
}
