use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Leftovers of interrupted downloads that never count as media.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

/// Replace `path` with `contents` atomically.
///
/// The data is written to a temporary file in the same directory and then
/// renamed over the target, so readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    std::io::Write::write_all(&mut tmp, contents)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

/// Find the first file in `dir` named `{stem}.<ext>`.
///
/// Entries are visited in sorted order so the result is deterministic.
/// Partial download leftovers are skipped.
pub async fn find_file_with_stem(dir: &Path, stem: &str) -> Result<Option<String>> {
    let prefix = format!("{stem}.");
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) && !PARTIAL_SUFFIXES.iter().any(|s| name.ends_with(s)) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names.into_iter().next())
}

/// Restores the process working directory when dropped.
///
/// External downloaders are free to change directory; holding a guard across
/// the call keeps relative paths valid for whatever runs afterwards.
pub struct WorkingDirGuard {
    original: PathBuf,
}

impl WorkingDirGuard {
    /// Capture the current working directory.
    pub fn capture() -> Result<Self> {
        let original = std::env::current_dir().context("Failed to read working directory")?;
        Ok(Self { original })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        match std::env::current_dir() {
            Ok(current) if current == self.original => {}
            _ => {
                debug!(path = %self.original.display(), "Restoring working directory");
                if let Err(e) = std::env::set_current_dir(&self.original) {
                    warn!(path = %self.original.display(), "Failed to restore working directory: {e}");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.html");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new contents").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new contents");
        // Only the target should remain
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_find_file_with_stem() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("clip_abc.webm.part"), "x").unwrap();
        std::fs::write(dir.path().join("clip_abcd.mp4"), "x").unwrap();
        std::fs::write(dir.path().join("clip_abc.mp4"), "x").unwrap();

        let found = find_file_with_stem(dir.path(), "clip_abc").await.unwrap();
        assert_eq!(found.as_deref(), Some("clip_abc.mp4"));

        let missing = find_file_with_stem(dir.path(), "other_1").await.unwrap();
        assert!(missing.is_none());
    }

    #[test]
    #[serial]
    fn test_working_dir_guard_restores() {
        let original = std::env::current_dir().unwrap();
        let dir = TempDir::new().unwrap();
        {
            let _guard = WorkingDirGuard::capture().unwrap();
            std::env::set_current_dir(dir.path()).unwrap();
        }
        assert_eq!(std::env::current_dir().unwrap(), original);
    }
}
