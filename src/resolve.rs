//! Recognising GitHub repository URLs.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// `github.com/<owner>/<project>` and `wiki.github.com/<owner>/<project>`.
static REPO_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:wiki\.)?github\.com/([^/?#\s]+)/([^/?#\s]+)").expect("valid regex")
});
/// `<owner>.github.com/<project>` (project pages).
static PAGES_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://([^/.?#\s]+)\.github\.com/([^/?#\s]+)").expect("valid regex")
});
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s<>]+").expect("valid regex"));

/// The URL does not look like a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a recognised GitHub repository URL: {0}")]
pub struct UnrecognizedUrl(pub String);

/// A repository located from a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub owner: String,
    pub project: String,
    /// Commit feed for the repository's master branch.
    pub feed_url: String,
}

impl Repository {
    fn new(owner: &str, project: &str) -> Self {
        Self {
            owner: owner.to_string(),
            project: project.to_string(),
            feed_url: format!("http://github.com/feeds/{owner}/commits/{project}/master"),
        }
    }
}

pub fn resolve(url: &str) -> Result<Repository, UnrecognizedUrl> {
    // REPO_PATH goes first: `wiki.github.com/...` would otherwise read as a
    // project page owned by "wiki".
    REPO_PATH
        .captures(url)
        .or_else(|| PAGES_HOST.captures(url))
        .map(|caps| Repository::new(&caps[1], &caps[2]))
        .ok_or_else(|| UnrecognizedUrl(url.to_string()))
}

/// Every `http(s)://` link in a line of free text.
pub fn discover_links(text: &str) -> Vec<&str> {
    LINK.find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', ';', ':', '!', '?', '\'', '"']))
        .collect()
}
