use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Config;
use crate::fs_utils::find_file_with_stem;

/// General-purpose media extractor (yt-dlp).
#[derive(Debug, Clone)]
pub struct Extractor {
    program: String,
    socket_timeout: Duration,
    run_timeout: Duration,
}

impl Extractor {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.yt_dlp_path.clone(),
            socket_timeout: config.request_timeout,
            run_timeout: config.download_timeout,
        }
    }

    fn args(&self, url: &str, media_dir: &Path, stem: &str) -> Vec<String> {
        let output_template = media_dir.join(format!("{stem}.%(ext)s"));
        vec![
            "--no-check-certificates".to_string(),
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--ignore-errors".to_string(),
            "--socket-timeout".to_string(),
            self.socket_timeout.as_secs().to_string(),
            "--output".to_string(),
            output_template.to_string_lossy().to_string(),
            // URL goes last
            url.to_string(),
        ]
    }

    /// Download `url` to `{stem}.<ext>` in `media_dir`, letting the extractor
    /// pick the extension, and return the produced file name.
    pub async fn download(&self, url: &str, media_dir: &Path, stem: &str) -> Option<String> {
        if let Err(e) = self.run(url, media_dir, stem).await {
            warn!(url = %url, "yt-dlp download failed: {e:#}");
            return None;
        }

        match find_file_with_stem(media_dir, stem).await {
            Ok(Some(filename)) => {
                debug!(url = %url, file = %filename, "Saved extractor download");
                Some(filename)
            }
            Ok(None) => {
                debug!(url = %url, "Extractor produced no file");
                None
            }
            Err(e) => {
                warn!(url = %url, "Failed to scan media directory: {e:#}");
                None
            }
        }
    }

    async fn run(&self, url: &str, media_dir: &Path, stem: &str) -> Result<()> {
        debug!(url = %url, "Running yt-dlp");

        let run = Command::new(&self.program)
            .args(self.args(url, media_dir, stem))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.run_timeout, run)
            .await
            .with_context(|| {
                format!(
                    "yt-dlp timed out after {} seconds",
                    self.run_timeout.as_secs()
                )
            })?
            .context("Failed to spawn yt-dlp")?;

        // Per-entry failures are tolerated; whatever was written is used.
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(url = %url, status = %output.status, "yt-dlp reported errors: {}", stderr.trim());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let extractor = Extractor::new(&Config::for_testing());
        let args = extractor.args(
            "https://vimeo.com/1",
            Path::new("/archive/media"),
            "clip_abc",
        );

        assert!(args.contains(&"--no-check-certificates".to_string()));
        assert!(args.contains(&"--ignore-errors".to_string()));
        assert!(args.contains(&"/archive/media/clip_abc.%(ext)s".to_string()));
        let timeout_pos = args.iter().position(|a| a == "--socket-timeout").unwrap();
        assert_eq!(args[timeout_pos + 1], "10");
        assert_eq!(args.last().map(String::as_str), Some("https://vimeo.com/1"));
    }

    #[tokio::test]
    async fn test_missing_program_is_no_media() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config {
            yt_dlp_path: "/nonexistent/yt-dlp-binary".to_string(),
            ..Config::for_testing()
        };
        let extractor = Extractor::new(&config);

        let result = extractor
            .download("https://vimeo.com/1", dir.path(), "clip_abc")
            .await;
        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_picks_produced_file_over_partial() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let media = dir.path().join("media");
        std::fs::create_dir(&media).unwrap();
        let script = dir.path().join("fake-yt-dlp");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf partial > '{m}/clip_abc.mkv.part'\nprintf video > '{m}/clip_abc.webm'\nexit 1\n",
                m = media.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = Config {
            yt_dlp_path: script.to_string_lossy().into_owned(),
            ..Config::for_testing()
        };
        let result = Extractor::new(&config)
            .download("https://vimeo.com/1", &media, "clip_abc")
            .await;

        assert_eq!(result.as_deref(), Some("clip_abc.webm"));
    }
}
