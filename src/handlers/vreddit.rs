use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::fs_utils::WorkingDirGuard;

/// External downloader for the native short-video host.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    /// Download `url` into `dir` and return the path of the produced file.
    ///
    /// Implementations may change the process working directory.
    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf>;
}

/// Runs a yt-dlp compatible command line tool.
pub struct CommandVideoDownloader {
    program: String,
    timeout: Duration,
}

impl CommandVideoDownloader {
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl VideoDownloader for CommandVideoDownloader {
    async fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let output_template = dir.join("%(id)s.%(ext)s");
        let args = [
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            // Highest quality, audio merged in when available
            "--format".to_string(),
            "bestvideo+bestaudio/best".to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().to_string(),
            url.to_string(),
        ];

        debug!(url = %url, program = %self.program, "Running video downloader");

        let run = Command::new(&self.program)
            .args(&args)
            .current_dir(dir)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .with_context(|| {
                format!(
                    "{} timed out after {} seconds",
                    self.program,
                    self.timeout.as_secs()
                )
            })?
            .with_context(|| format!("Failed to run {}", self.program))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} failed: {}", self.program, stderr.trim());
        }

        first_file(dir)
            .await?
            .with_context(|| format!("{} produced no file", self.program))
    }
}

async fn first_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files.into_iter().next())
}

/// Download a native-host video and store it as `{stem}.{ext}`.
///
/// The downloader runs in a private staging directory beneath `media_dir`.
/// The working directory is restored whatever the outcome.
pub async fn download(
    downloader: &dyn VideoDownloader,
    url: &str,
    media_dir: &Path,
    stem: &str,
) -> Option<String> {
    let staging = media_dir.join(format!(".staging-{stem}"));
    let result = fetch(downloader, url, media_dir, &staging, stem).await;

    if let Err(e) = tokio::fs::remove_dir_all(&staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %staging.display(), "Failed to remove staging directory: {e}");
        }
    }

    match result {
        Ok(filename) => Some(filename),
        Err(e) => {
            warn!(url = %url, "Video host download failed: {e:#}");
            None
        }
    }
}

async fn fetch(
    downloader: &dyn VideoDownloader,
    url: &str,
    media_dir: &Path,
    staging: &Path,
    stem: &str,
) -> Result<String> {
    tokio::fs::create_dir_all(staging)
        .await
        .with_context(|| format!("Failed to create {}", staging.display()))?;

    let produced = {
        let _cwd = WorkingDirGuard::capture()?;
        downloader.download(url, staging).await
    }?;
    let produced = if produced.is_absolute() {
        produced
    } else {
        staging.join(produced)
    };

    let extension = produced
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .context("Downloaded file has no extension")?;
    let filename = format!("{stem}.{extension}");
    let target = media_dir.join(&filename);
    tokio::fs::rename(&produced, &target)
        .await
        .with_context(|| format!("Failed to move video to {}", target.display()))?;

    debug!(url = %url, file = %filename, "Saved video host download");
    Ok(filename)
}
