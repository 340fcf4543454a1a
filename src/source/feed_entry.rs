//! The entry type shared by every feed format.
//!
//! `FeedEntry` is one commit as the hosting site's feed describes it, before
//! any commit-specific parsing.  Atom and RSS sources both convert their
//! native items into this struct so that the poll cycle stays
//! format-agnostic.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A single feed entry, normalised from any feed format.
///
/// ## Sorting
///
/// `FeedEntry` implements [`Ord`] in **chronological** order: older entries
/// sort before newer ones, and entries without a timestamp sort first.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedEntry {
    /// Link to the commit page; carries the revision id.
    pub link: String,

    /// Last-updated timestamp, used for ordering.
    pub updated: Option<DateTime<Utc>>,

    /// Author name as published by the feed.
    pub author: Option<String>,

    /// Raw (HTML) description of the commit.
    pub content: Option<String>,
}

impl FeedEntry {
    pub fn new(link: impl Into<String>, updated: Option<DateTime<Utc>>) -> Self {
        Self {
            link: link.into(),
            updated,
            author: None,
            content: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Ordering — chronological (oldest first)
// ---------------------------------------------------------------------------

impl Ord for FeedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // `None < Some(_)`, so undated entries come first.
        self.updated.cmp(&other.updated)
    }
}

impl PartialOrd for FeedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
    }

    #[test]
    fn sort_chronological() {
        let old = FeedEntry::new("1", at(2009, 1, 1));
        let mid = FeedEntry::new("2", at(2009, 6, 15));
        let new = FeedEntry::new("3", at(2010, 1, 1));

        let mut entries = vec![new, old, mid];
        entries.sort();

        assert_eq!(entries[0].link, "1", "oldest first");
        assert_eq!(entries[1].link, "2");
        assert_eq!(entries[2].link, "3", "newest last");
    }

    #[test]
    fn undated_entries_sort_before_dated() {
        let dated = FeedEntry::new("dated", at(2009, 1, 1));
        let undated = FeedEntry::new("undated", None);

        let mut entries = vec![dated, undated];
        entries.sort();

        assert_eq!(entries[0].link, "undated");
    }

    #[test]
    fn builder_sets_optional_fields() {
        let entry = FeedEntry::new("l", None)
            .with_author("tene")
            .with_content("<pre></pre>");
        assert_eq!(entry.author.as_deref(), Some("tene"));
        assert_eq!(entry.content.as_deref(), Some("<pre></pre>"));
    }
}
