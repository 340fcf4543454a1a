//! Registered feeds and their per-feed state.
//!
//! The registry maps a feed identity (`<project>log`) to its
//! [`FeedSession`].  Asking for the same feed twice never creates a second
//! session; it only adds the new destination to the existing one.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::resolve;
use crate::source::FeedFormat;

/// Where notifications are delivered: a channel on a network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Destination {
    pub network: String,
    pub channel: String,
}

impl Destination {
    pub fn new(network: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.channel)
    }
}

/// State kept for one feed for the life of the process.
#[derive(Debug)]
pub struct FeedSession {
    pub identity: String,
    /// Prefix used when announcing commits (the project name).
    pub label: String,
    pub feed_url: String,
    pub format: FeedFormat,
    destinations: Vec<Destination>,
    /// Revisions already announced, or already present at the first poll.
    pub seen: HashSet<String>,
    pub has_completed_first_poll: bool,
}

impl FeedSession {
    pub fn new(
        identity: impl Into<String>,
        label: impl Into<String>,
        feed_url: impl Into<String>,
        format: FeedFormat,
    ) -> Self {
        Self {
            identity: identity.into(),
            label: label.into(),
            feed_url: feed_url.into(),
            format,
            destinations: Vec::new(),
            seen: HashSet::new(),
            has_completed_first_poll: false,
        }
    }

    /// Destinations in the order they were first added.
    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Add `destination` unless it is already present. Returns whether it was added.
    pub fn add_destination(&mut self, destination: Destination) -> bool {
        if self.destinations.contains(&destination) {
            return false;
        }
        self.destinations.push(destination);
        true
    }
}

/// A session shared between the registry and the task that polls it.
pub type SharedSession = Arc<Mutex<FeedSession>>;

/// Lock a session, recovering the guard if a previous holder panicked.
pub fn lock(session: &SharedSession) -> MutexGuard<'_, FeedSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a registration request did.
#[derive(Debug)]
pub enum Registration {
    /// A new session; the caller must schedule it every `interval`.
    Created {
        session: SharedSession,
        interval: Duration,
    },
    /// The feed was known; the destination was added to it.
    Extended { identity: String },
    /// The feed was known and already had that destination.
    Unchanged { identity: String },
    /// The URL was not a repository URL; nothing happened.
    Unrecognized,
}

pub struct FeedRegistry {
    sessions: HashMap<String, SharedSession>,
    /// Registrations so far; each new feed polls one second later than the last.
    sequence: u64,
    base_interval: Duration,
    default_destination: Destination,
}

impl FeedRegistry {
    pub fn new(base_interval: Duration, default_destination: Destination) -> Self {
        Self {
            sessions: HashMap::new(),
            sequence: 0,
            base_interval,
            default_destination,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<SharedSession> {
        self.sessions.get(identity).cloned()
    }

    /// Register the repository behind `url`, or add `destination` to it if it
    /// is already registered.  `None` means the default destination.
    pub fn register_or_extend(&mut self, url: &str, destination: Option<Destination>) -> Registration {
        let repo = match resolve::resolve(url) {
            Ok(repo) => repo,
            Err(e) => {
                warn!(error = %e, "ignoring link");
                return Registration::Unrecognized;
            }
        };
        debug!(owner = %repo.owner, project = %repo.project, "resolved repository");

        let identity = feed_identity(&repo.project);
        let destination = destination.unwrap_or_else(|| self.default_destination.clone());
        self.register(
            identity,
            || FeedSession::new(String::new(), repo.project.clone(), repo.feed_url.clone(), FeedFormat::Atom),
            vec![destination],
        )
    }

    /// Register a feed given directly by URL, as statically configured feeds are.
    /// An empty `destinations` list means the default destination.
    pub fn register_feed(
        &mut self,
        identity: &str,
        label: &str,
        feed_url: &str,
        format: FeedFormat,
        mut destinations: Vec<Destination>,
    ) -> Registration {
        if destinations.is_empty() {
            destinations.push(self.default_destination.clone());
        }
        self.register(
            identity.to_string(),
            || FeedSession::new(String::new(), label, feed_url, format),
            destinations,
        )
    }

    fn register(
        &mut self,
        identity: String,
        make_session: impl FnOnce() -> FeedSession,
        destinations: Vec<Destination>,
    ) -> Registration {
        if let Some(existing) = self.sessions.get(&identity) {
            let mut session = lock(existing);
            let mut added = false;
            for destination in destinations {
                if session.add_destination(destination.clone()) {
                    info!(feed = %identity, %destination, "added destination");
                    added = true;
                }
            }
            return if added {
                Registration::Extended { identity }
            } else {
                Registration::Unchanged { identity }
            };
        }

        let mut session = make_session();
        session.identity = identity.clone();
        for destination in destinations {
            session.add_destination(destination);
        }

        self.sequence += 1;
        let interval = self.base_interval.saturating_add(Duration::from_secs(self.sequence));
        info!(
            feed = %identity,
            url = %session.feed_url,
            interval_secs = interval.as_secs(),
            "registered feed"
        );

        let session = Arc::new(Mutex::new(session));
        self.sessions.insert(identity, Arc::clone(&session));
        Registration::Created { session, interval }
    }
}

/// Stable key for a project's feed: `<project>log`, hyphens as underscores.
pub fn feed_identity(project: &str) -> String {
    format!("{project}log").replace('-', "_")
}
