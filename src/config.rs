//! Configuration file.
//!
//! Everything is optional; an absent file is the same as an empty one,
//! except that naming a file that does not exist is an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::registry::Destination;
use crate::source::FeedFormat;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid TOML syntax or shape.
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Longest accepted base polling interval: one year.
pub const MAX_POLL_INTERVAL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base polling interval; each registered feed adds its sequence number in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Where to write logs when the terminal UI owns the screen.
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Used when a registration names no destination.
    #[serde(default = "default_destination")]
    pub default_destination: Destination,

    /// Repository URLs registered at startup.
    #[serde(default)]
    pub repositories: Vec<RepositoryConfig>,

    /// Feeds registered at startup by their own URL.
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            log_file: None,
            default_destination: default_destination(),
            repositories: Vec::new(),
            feeds: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositoryConfig {
    pub url: String,
    /// Empty means the default destination.
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Display label; the feed identity is derived from it.
    pub name: String,
    pub feed_url: String,
    #[serde(default)]
    pub format: FeedFormat,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

fn default_poll_interval() -> u64 {
    300
}

fn default_destination() -> Destination {
    Destination::new("local", "#commits")
}

impl Config {
    /// Check values serde cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be positive".into()));
        }
        if self.poll_interval_secs > MAX_POLL_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_secs must be at most {MAX_POLL_INTERVAL_SECS}"
            )));
        }

        let configured = self
            .repositories
            .iter()
            .flat_map(|r| &r.destinations)
            .chain(self.feeds.iter().flat_map(|f| &f.destinations));
        for destination in std::iter::once(&self.default_destination).chain(configured) {
            if destination.network.trim().is_empty() || destination.channel.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "destination {destination:?} needs both a network and a channel"
                )));
            }
        }

        if let Some(feed) = self.feeds.iter().find(|f| f.name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("feed {} has an empty name", feed.feed_url)));
        }
        Ok(())
    }
}

/// Loads and validates configuration from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("commits.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn load_config_not_found() {
        match load_config("/nonexistent/path/commits.toml") {
            Err(ConfigError::NotFound(path)) => {
                assert!(path.to_string_lossy().contains("commits.toml"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn empty_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(write(&dir, "")).unwrap();

        assert_eq!(config.poll_interval_secs, 300);
        assert!(config.log_file.is_none());
        assert_eq!(config.default_destination, Destination::new("local", "#commits"));
        assert!(config.repositories.is_empty());
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn full_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r##"
            poll_interval_secs = 120
            log_file = "commits.log"

            [default_destination]
            network = "freenode"
            channel = "#parrot"

            [[repositories]]
            url = "http://github.com/tene/gil/"
            destinations = [{ network = "magnet", channel = "#perl6" }]

            [[repositories]]
            url = "http://bschmalhofer.github.com/hq9plus/"

            [[feeds]]
            name = "parrot"
            feed_url = "https://example.org/parrot.rss"
            format = "rss"
        "##,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.poll_interval_secs, 120);
        assert_eq!(config.log_file.as_deref(), Some(Path::new("commits.log")));
        assert_eq!(config.default_destination, Destination::new("freenode", "#parrot"));
        assert_eq!(config.repositories.len(), 2);
        assert_eq!(
            config.repositories[0].destinations,
            vec![Destination::new("magnet", "#perl6")]
        );
        assert!(config.repositories[1].destinations.is_empty());
        assert_eq!(config.feeds[0].format, FeedFormat::Rss);
    }

    #[test]
    fn feed_format_defaults_to_atom() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"
            [[feeds]]
            name = "gil"
            feed_url = "http://github.com/feeds/tene/commits/gil/master"
        "#,
        );
        assert_eq!(load_config(&path).unwrap().feeds[0].format, FeedFormat::Atom);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = load_config(write(&dir, "this is not valid toml [[["));
        assert!(matches!(result, Err(ConfigError::InvalidToml(_))));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let result = load_config(write(&dir, "poll_interval = 5"));
        assert!(matches!(result, Err(ConfigError::InvalidToml(_))));
    }

    #[test]
    fn zero_interval_is_invalid() {
        let dir = TempDir::new().unwrap();
        let result = load_config(write(&dir, "poll_interval_secs = 0"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn oversized_interval_is_invalid() {
        let dir = TempDir::new().unwrap();
        let result = load_config(write(&dir, "poll_interval_secs = 18446744073709551615"));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let config = Config {
            poll_interval_secs: MAX_POLL_INTERVAL_SECS,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_channel_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"
            [[repositories]]
            url = "http://github.com/tene/gil/"
            destinations = [{ network = "freenode", channel = " " }]
        "#,
        );
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }
}
