//! Reddit saved/upvoted archiver library.
//!
//! Fetches the current user's saved or upvoted items, downloads the media
//! they link to and maintains an incremental static HTML archive.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod archiver;
pub mod config;
pub mod constants;
pub mod fs_utils;
pub mod handlers;
pub mod reddit;
pub mod render;
