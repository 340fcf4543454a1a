//! RSS commit feeds.
//!
//! GitHub publishes Atom, but mirrors and self-hosted forges often expose the
//! same commit stream as RSS 2.0.  Items map onto [`FeedEntry`] as follows:
//!
//! | `FeedEntry` | RSS                                        |
//! |-------------|--------------------------------------------|
//! | `link`      | `<link>`, falling back to `<guid>`         |
//! | `updated`   | `<pubDate>` (RFC 2822)                     |
//! | `author`    | `<author>`, falling back to `dc:creator`   |
//! | `content`   | `content:encoded`, falling back to `<description>` |

use chrono::{DateTime, Utc};

use super::FeedEntry;

/// Convert an already-parsed [`rss::Channel`] into [`FeedEntry`]s.
///
/// Pure (no I/O) so that tests can exercise the mapping without the network.
pub fn parse_channel(channel: &rss::Channel) -> Vec<FeedEntry> {
    channel
        .items()
        .iter()
        .map(|item| {
            let link = item
                .link()
                .map(String::from)
                .or_else(|| item.guid().map(|g| g.value().to_string()))
                .unwrap_or_default();

            // Invalid dates degrade to None rather than failing the feed.
            let updated = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                .map(|dt| dt.with_timezone(&Utc));

            let author = item.author().map(String::from).or_else(|| {
                item.dublin_core_ext()
                    .and_then(|dc| dc.creators().first().cloned())
            });

            let content = item
                .content()
                .or_else(|| item.description())
                .map(String::from);

            FeedEntry {
                link,
                updated,
                author,
                content,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_extracts_entries() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>parrot commits</title>
    <item>
      <link>http://github.com/rakudo/rakudo/commit/0123456789abcdef0123456789abcdef01234567</link>
      <author>pmichaud</author>
      <pubDate>Mon, 01 Jun 2009 00:00:00 +0000</pubDate>
      <description>&lt;pre&gt;M src/parser/actions.pm

Fix it&lt;/pre&gt;</description>
    </item>
    <item>
      <link>http://github.com/rakudo/rakudo/commit/fedcba9876543210fedcba9876543210fedcba98</link>
    </item>
  </channel>
</rss>"#;

        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let entries = parse_channel(&channel);

        assert_eq!(entries.len(), 2);
        assert!(entries[0].link.ends_with("0123456789abcdef0123456789abcdef01234567"));
        assert_eq!(entries[0].author.as_deref(), Some("pmichaud"));
        assert!(entries[0].updated.is_some());
        assert!(entries[0]
            .content
            .as_deref()
            .unwrap()
            .starts_with("<pre>M src/parser/actions.pm"));

        assert!(entries[1].author.is_none());
        assert!(entries[1].content.is_none());
        assert!(entries[1].updated.is_none());
    }

    #[test]
    fn falls_back_to_guid_when_no_link() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <guid>http://example.org/commit/0123456789abcdef0123456789abcdef01234567</guid>
    </item>
  </channel>
</rss>"#;

        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let entries = parse_channel(&channel);

        assert_eq!(
            entries[0].link,
            "http://example.org/commit/0123456789abcdef0123456789abcdef01234567"
        );
    }

    #[test]
    fn handles_invalid_date() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test</title>
    <item>
      <link>http://example.org/x</link>
      <pubDate>not-a-real-date</pubDate>
    </item>
  </channel>
</rss>"#;

        let channel = rss::Channel::read_from(xml.as_bytes()).unwrap();
        let entries = parse_channel(&channel);

        assert!(entries[0].updated.is_none());
    }
}
