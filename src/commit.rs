//! Commit records extracted from feed entries.
//!
//! GitHub's commit feed wraps each description in a `<pre>` block laid out
//! as a changed-file list, a blank line, then the log message:
//!
//! ```text
//! <pre>M src/ops/perl6.ops
//! + src/classes/IO.pir
//!
//! Add IO class<br />
//!
//! git-svn-id: http://svn.example.org/repo/trunk@1234 d31e2699-...</pre>
//! ```
//!
//! [`CommitRecord::parse`] turns that into a normalised record.  `<br />`
//! markers are dropped before HTML entities are decoded.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::source::FeedEntry;

static REVISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/commit/([0-9a-f]{40})").expect("valid regex"));
static CHANGED_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+M-] (.+)$").expect("valid regex"));
static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static LINE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("valid regex"));

const NO_MESSAGE: &str = "(no commit message)";
const SVN_TRAILER: &str = "git-svn-id: http:";

/// Why an entry could not be turned into a [`CommitRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The entry link carries no `/commit/<sha>` segment.
    #[error("no commit revision in link {0:?}")]
    MissingRevision(String),

    /// The file list was not followed by a blank separator line.
    #[error("expected blank line after file list, found {0:?}")]
    MalformedDescription(String),
}

/// One commit, normalised from its feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub revision_full: String,
    pub revision_short: String,
    pub author: String,
    pub changed_files: Vec<String>,
    pub log_lines: Vec<String>,
    /// Common prefix of `changed_files`, plus a file count when there are several.
    pub path_summary: String,
}

impl CommitRecord {
    pub fn parse(entry: &FeedEntry) -> Result<Self, ParseError> {
        let revision_full = REVISION
            .captures(&entry.link)
            .map(|c| c[1].to_string())
            .ok_or_else(|| ParseError::MissingRevision(entry.link.clone()))?;

        let author = entry.author.clone().unwrap_or_else(|| "unknown".to_string());

        let body = preformatted(entry.content.as_deref().unwrap_or(NO_MESSAGE));
        let mut lines = body.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));

        let mut changed_files = Vec::new();
        let separator = loop {
            match lines.next() {
                Some(line) => match CHANGED_FILE.captures(line) {
                    Some(caps) => changed_files.push(caps[1].to_string()),
                    None => break Some(line),
                },
                None => break None,
            }
        };
        match separator {
            Some("") => {}
            Some(other) => return Err(ParseError::MalformedDescription(other.to_string())),
            None => return Err(ParseError::MalformedDescription(String::new())),
        }

        let log_lines = log_lines(lines.collect());
        let path_summary = path_summary(&changed_files);
        let revision_short = revision_full.chars().take(7).collect();

        Ok(Self {
            revision_full,
            revision_short,
            author,
            changed_files,
            log_lines,
            path_summary,
        })
    }
}

/// The text between the first `<pre>` and the last `</pre>`, or the whole
/// body when either tag is missing.
fn preformatted(body: &str) -> &str {
    match (body.find("<pre>"), body.rfind("</pre>")) {
        (Some(open), Some(close)) if open + "<pre>".len() <= close => {
            &body[open + "<pre>".len()..close]
        }
        _ => body,
    }
}

fn log_lines(mut lines: Vec<&str>) -> Vec<String> {
    if let Some(last) = lines.iter().rposition(|l| !l.trim().is_empty()) {
        if lines[last].starts_with(SVN_TRAILER) {
            lines.truncate(last);
        }
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }

    let text = LINE_BREAK.replace_all(&lines.join("\n"), "").into_owned();
    let text = html_escape::decode_html_entities(&text);
    if text.is_empty() {
        return Vec::new();
    }
    LINE_BOUNDARY.split(&text).map(String::from).collect()
}

fn path_summary(files: &[String]) -> String {
    let prefix = longest_common_prefix(files);
    let prefix = prefix.strip_prefix('/').unwrap_or(prefix);
    if files.len() > 1 {
        format!("{prefix} ({} files)", files.len())
    } else {
        prefix.to_string()
    }
}

/// Longest string that every path starts with.
///
/// Shrinks the first path one character at a time until it prefixes all of
/// them; an empty list has an empty prefix.
pub fn longest_common_prefix<S: AsRef<str>>(paths: &[S]) -> &str {
    let Some(first) = paths.first() else {
        return "";
    };
    let mut prefix = first.as_ref();
    while !paths.iter().all(|p| p.as_ref().starts_with(prefix)) {
        let mut chars = prefix.chars();
        chars.next_back();
        prefix = chars.as_str();
    }
    prefix
}
