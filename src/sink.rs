//! Delivering notifications as lines of text.
//!
//! A [`Notification`] renders to a header, one line per log line, and a
//! review link, each prefixed with the project label:
//!
//! ```text
//! gil: 0123456 | tene++ | src/ (2 files):
//! gil: Add IO class
//! gil: review: http://github.com/tene/gil/commit/0123456789abcdef...
//! ```

use std::io::{self, Write};

use tracing::warn;

use crate::poll::Notification;
use crate::registry::Destination;

/// Something that can publish a line of text to a destination.
pub trait NotificationSink {
    fn publish(&mut self, destination: &Destination, line: &str);
}

/// Render `notification` as the lines to publish, in order.
pub fn render(notification: &Notification) -> Vec<String> {
    let label = &notification.label;
    let mut header = format!(
        "{label}: {} | {}++",
        notification.revision_short, notification.author
    );
    if !notification.path_summary.is_empty() {
        header.push_str(" | ");
        header.push_str(&notification.path_summary);
    }
    header.push(':');

    let mut lines = Vec::with_capacity(notification.log_lines.len() + 2);
    lines.push(header);
    lines.extend(notification.log_lines.iter().map(|l| format!("{label}: {l}")));
    lines.push(format!("{label}: review: {}", notification.link));
    lines
}

/// Publish every rendered line of `notification` to each of its destinations.
pub fn deliver(notification: &Notification, sink: &mut dyn NotificationSink) {
    let lines = render(notification);
    for destination in &notification.destinations {
        for line in &lines {
            sink.publish(destination, line);
        }
    }
}

/// Writes `[network/channel] line` to standard output.
///
/// The first failed write is logged and closes the sink; later lines are
/// dropped.
pub struct StdoutSink<W: Write = io::Stdout> {
    out: W,
    closed: bool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out, closed: false }
    }

    /// Whether a write has failed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NotificationSink for StdoutSink<W> {
    fn publish(&mut self, destination: &Destination, line: &str) {
        if self.closed {
            return;
        }
        if let Err(e) = writeln!(self.out, "[{destination}] {line}") {
            warn!(error = %e, "cannot write to output");
            self.closed = true;
        }
    }
}
