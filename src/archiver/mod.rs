//! The archiving pass: reconciling the index, sanitizing page names and
//! running external extractors.

pub mod reconcile;
mod sanitize;
pub mod worker;
pub mod ytdlp;

use std::fmt;

pub use sanitize::sanitize_filename;
pub use worker::{Archiver, PassSummary};

/// Which of the user's listings a pass archives.
///
/// Each mode has its own index file under the archive root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    Saved,
    Upvoted,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Upvoted => "upvoted",
        }
    }

    /// File name of the mode's index page.
    #[must_use]
    pub fn index_file(self) -> String {
        format!("{}.html", self.as_str())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Saved.as_str(), "saved");
        assert_eq!(Mode::Upvoted.index_file(), "upvoted.html");
        assert_eq!(Mode::Saved.to_string(), "saved");
    }
}
