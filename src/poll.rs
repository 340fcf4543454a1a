//! Feed polling.
//!
//! [`poll`] is one cycle over a fetched batch: it decides which entries are
//! new and turns them into [`Notification`]s.  [`Poller`] owns the moving
//! parts around it: registration requests, one tokio task per feed that
//! fetches on a timer, and the channel that carries results to the front
//! end.
//!
//! ## For contributors
//!
//! Each session is polled by exactly one task, so two polls of the same feed
//! never overlap.  The session mutex is only taken between awaits; never hold
//! it across a fetch.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::commit::CommitRecord;
use crate::registry::{self, Destination, FeedRegistry, FeedSession, Registration, SharedSession};
use crate::resolve;
use crate::source::{self, FeedEntry, FeedFormat};

/// Give up on a fetch after this long; the next tick tries again.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Messages sent from the polling tasks (and the stdin reader) to the front end.
#[derive(Debug)]
pub enum PollMsg {
    /// New commits, oldest first.
    Notifications(Vec<Notification>),
    /// A poll succeeded but found nothing new.
    Polled { identity: String, entries: usize },
    /// A fetch failed with this error description.
    Error(String),
    /// A line of text typed by the user, to be scanned for links.
    Input(String),
}

/// One new commit, addressed to every destination of its feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub feed_identity: String,
    pub label: String,
    pub revision_short: String,
    pub author: String,
    pub log_lines: Vec<String>,
    pub link: String,
    pub path_summary: String,
    pub destinations: Vec<Destination>,
}

impl Notification {
    fn new(session: &FeedSession, record: CommitRecord, link: &str) -> Self {
        Self {
            feed_identity: session.identity.clone(),
            label: session.label.clone(),
            revision_short: record.revision_short,
            author: record.author,
            log_lines: record.log_lines,
            link: link.to_string(),
            path_summary: record.path_summary,
            destinations: session.destinations().to_vec(),
        }
    }
}

/// Run one poll cycle over `entries` and return what should be announced.
///
/// The first cycle of a session only records what is already there, so a
/// restart does not replay the repository's history.  Entries that fail to
/// parse are logged and left unseen; they will be retried (and fail again)
/// on every later cycle.
pub fn poll(session: &mut FeedSession, mut entries: Vec<FeedEntry>) -> Vec<Notification> {
    // Stable sort: entries sharing a timestamp keep feed order.
    entries.sort();

    let mut notifications = Vec::new();
    for entry in &entries {
        let record = match CommitRecord::parse(entry) {
            Ok(record) => record,
            Err(e) => {
                warn!(feed = %session.identity, link = %entry.link, error = %e, "skipping entry");
                continue;
            }
        };

        if !session.has_completed_first_poll {
            session.seen.insert(record.revision_full);
            continue;
        }
        if !session.seen.insert(record.revision_full.clone()) {
            continue;
        }
        notifications.push(Notification::new(session, record, &entry.link));
    }

    if !session.has_completed_first_poll {
        debug!(feed = %session.identity, seen = session.seen.len(), "first poll, history suppressed");
        session.has_completed_first_poll = true;
    }
    notifications
}

/// Builds the HTTP client shared by every polling task.
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()
}

/// Registration front door and task scheduler.
pub struct Poller {
    registry: Arc<Mutex<FeedRegistry>>,
    runtime: Handle,
    client: reqwest::Client,
    tx: mpsc::Sender<PollMsg>,
}

impl Poller {
    pub fn new(
        registry: FeedRegistry,
        runtime: Handle,
        client: reqwest::Client,
        tx: mpsc::Sender<PollMsg>,
    ) -> Self {
        Self {
            registry: Arc::new(Mutex::new(registry)),
            runtime,
            client,
            tx,
        }
    }

    pub fn feed_count(&self) -> usize {
        self.registry().len()
    }

    /// Scan `text` for links and submit each one. Returns how many links were found.
    pub fn submit_text(&self, text: &str, destination: Option<&Destination>) -> usize {
        let links = resolve::discover_links(text);
        for url in &links {
            self.submit_url(url, destination.cloned());
        }
        links.len()
    }

    /// Register (or extend) the repository behind `url`.  Unrecognised URLs
    /// are logged and otherwise ignored.
    pub fn submit_url(&self, url: &str, destination: Option<Destination>) {
        let registration = self.registry().register_or_extend(url, destination);
        self.start(registration);
    }

    /// Register a feed by its own URL rather than a repository URL.
    pub fn add_feed(
        &self,
        identity: &str,
        label: &str,
        feed_url: &str,
        format: FeedFormat,
        destinations: Vec<Destination>,
    ) {
        let registration =
            self.registry()
                .register_feed(identity, label, feed_url, format, destinations);
        self.start(registration);
    }

    fn start(&self, registration: Registration) {
        match registration {
            Registration::Created { session, interval } => self.schedule(session, interval),
            Registration::Extended { identity } | Registration::Unchanged { identity } => {
                debug!(feed = %identity, "feed already polled");
            }
            Registration::Unrecognized => {}
        }
    }

    /// Poll `session` every `interval`, starting one interval from now, until
    /// the front end goes away.
    pub fn schedule(&self, session: SharedSession, interval: Duration) {
        self.runtime.spawn(run_session(
            session,
            interval,
            self.client.clone(),
            self.tx.clone(),
        ));
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, FeedRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The first tick is one full interval away, so feeds registered together
/// start out as far apart as their intervals.
fn ticker(interval: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_session(
    session: SharedSession,
    interval: Duration,
    client: reqwest::Client,
    tx: mpsc::Sender<PollMsg>,
) {
    let mut ticker = ticker(interval);

    loop {
        ticker.tick().await;

        let (identity, url, format) = {
            let session = registry::lock(&session);
            (session.identity.clone(), session.feed_url.clone(), session.format)
        };

        // A failed fetch leaves the session exactly as it was.
        let msg = match source::fetch(&client, &url, format).await {
            Ok(entries) => {
                let count = entries.len();
                let notifications = {
                    let mut session = registry::lock(&session);
                    poll(&mut session, entries)
                };
                if notifications.is_empty() {
                    PollMsg::Polled {
                        identity,
                        entries: count,
                    }
                } else {
                    info!(feed = %identity, new = notifications.len(), "new commits");
                    PollMsg::Notifications(notifications)
                }
            }
            Err(e) => {
                warn!(feed = %identity, error = %e, "fetch failed");
                PollMsg::Error(format!("{identity}: {e}"))
            }
        };

        // The receiver is gone once the front end has exited.
        if tx.send(msg).is_err() {
            return;
        }
    }
}
