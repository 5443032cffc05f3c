use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::REQUEST_TIMEOUT;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Reddit credentials
    pub reddit_client_id: String,
    pub reddit_client_secret: String,
    pub reddit_username: String,
    pub reddit_password: String,
    pub user_agent: String,

    // Reddit endpoints
    pub reddit_auth_url: String,
    pub reddit_api_base: String,

    // Rendering
    pub template_dir: Option<PathBuf>,

    // Downloads
    pub request_timeout: Duration,
    pub download_timeout: Duration,
    pub yt_dlp_path: String,
    pub video_downloader_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Reddit credentials
            reddit_client_id: required_env("REDDIT_CLIENT_ID")?,
            reddit_client_secret: required_env("REDDIT_CLIENT_SECRET")?,
            reddit_username: required_env("REDDIT_USERNAME")?,
            reddit_password: required_env("REDDIT_PASSWORD")?,
            user_agent: env_or_default("REDDIT_USER_AGENT", "reddit-saver"),

            // Reddit endpoints
            reddit_auth_url: env_or_default(
                "REDDIT_AUTH_URL",
                "https://www.reddit.com/api/v1/access_token",
            ),
            reddit_api_base: env_or_default("REDDIT_API_BASE", "https://oauth.reddit.com"),

            // Rendering
            template_dir: optional_env("TEMPLATE_DIR").map(PathBuf::from),

            // Downloads
            request_timeout: Duration::from_secs(parse_env_u64(
                "REQUEST_TIMEOUT_SECS",
                REQUEST_TIMEOUT.as_secs(),
            )?),
            download_timeout: Duration::from_secs(parse_env_u64("DOWNLOAD_TIMEOUT_SECS", 300)?),
            yt_dlp_path: env_or_default("YT_DLP_PATH", "yt-dlp"),
            video_downloader_path: env_or_default("VIDEO_DOWNLOADER_PATH", "yt-dlp"),
        })
    }

    /// Configuration with placeholder credentials and default limits.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            reddit_client_id: "test-client".to_string(),
            reddit_client_secret: "test-secret".to_string(),
            reddit_username: "test-user".to_string(),
            reddit_password: "test-password".to_string(),
            user_agent: "reddit-saver-tests".to_string(),
            reddit_auth_url: "http://127.0.0.1:9/api/v1/access_token".to_string(),
            reddit_api_base: "http://127.0.0.1:9".to_string(),
            template_dir: None,
            request_timeout: REQUEST_TIMEOUT,
            download_timeout: Duration::from_secs(30),
            yt_dlp_path: "yt-dlp".to_string(),
            video_downloader_path: "yt-dlp".to_string(),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("REDDIT_CLIENT_ID", &self.reddit_client_id),
            ("REDDIT_CLIENT_SECRET", &self.reddit_client_secret),
            ("REDDIT_USERNAME", &self.reddit_username),
            ("REDDIT_PASSWORD", &self.reddit_password),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "cannot be empty".to_string(),
                });
            }
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.download_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "DOWNLOAD_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(dir) = &self.template_dir {
            if !dir.is_dir() {
                return Err(ConfigError::InvalidValue {
                    name: "TEMPLATE_DIR".to_string(),
                    message: format!("{} is not a directory", dir.display()),
                });
            }
        }
        Ok(())
    }
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u64_default() {
        assert_eq!(parse_env_u64("NONEXISTENT_TIMEOUT_VAR", 10).unwrap(), 10);
    }

    #[test]
    fn test_testing_config_is_valid() {
        Config::for_testing().validate().unwrap();
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let config = Config {
            reddit_password: "  ".to_string(),
            ..Config::for_testing()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("REDDIT_PASSWORD"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = Config {
            request_timeout: Duration::ZERO,
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_template_dir_rejected() {
        let config = Config {
            template_dir: Some(PathBuf::from("/definitely/not/a/template/dir")),
            ..Config::for_testing()
        };
        assert!(config.validate().is_err());
    }
}
