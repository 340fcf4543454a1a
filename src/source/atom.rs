//! Atom commit feeds, the format GitHub serves.

use atom_syndication::{Entry, Feed};
use chrono::Utc;

use super::FeedEntry;

/// Convert an already-parsed Atom [`Feed`] into [`FeedEntry`]s.
pub fn parse_feed(feed: &Feed) -> Vec<FeedEntry> {
    feed.entries().iter().map(convert_entry).collect()
}

fn convert_entry(entry: &Entry) -> FeedEntry {
    let links = entry.links();
    let link = links
        .iter()
        .find(|l| l.rel() == "alternate")
        .or_else(|| links.first())
        .map(|l| l.href().to_string())
        .unwrap_or_default();

    let content = entry
        .content()
        .and_then(|c| c.value())
        .map(String::from)
        .or_else(|| entry.summary().map(|s| s.value.clone()));

    FeedEntry {
        link,
        updated: Some(entry.updated().with_timezone(&Utc)),
        author: entry.authors().first().map(|p| p.name().to_string()),
        content,
    }
}
