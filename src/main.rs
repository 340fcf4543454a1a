//! livescroll-commits — watch GitHub commit feeds and announce new commits.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────────┐  PollMsg   ┌────────────────┐  publish()  ┌──────────────┐
//! │   poll.rs    │ ─────────► │ main event loop│ ──────────► │ app.rs (TUI) │
//! │ (tokio task  │  (channel) │                │             │ or stdout    │
//! │  per feed)   │            └────────────────┘             └──────────────┘
//! └──────────────┘                    │ submit_text()
//!        ▲                            ▼
//!        │ schedule()         ┌────────────────┐
//!        └─────────────────── │  registry.rs   │
//!                             └────────────────┘
//! ```
//!
//! * **`source/`** — fetches a feed and maps Atom/RSS items to `FeedEntry`.
//! * **`commit`** — parses one entry into a `CommitRecord`.
//! * **`resolve`** — turns repository URLs into feed URLs; finds links in text.
//! * **`registry`** — one `FeedSession` per feed; merges destinations.
//! * **`poll`** — the poll cycle (what is new?) and the per-feed tasks.
//! * **`sink`** — renders notifications into lines for each destination.
//! * **`app`** / **`ui`** / **`input`** — the terminal front end.
//! * **`config`** / **`cli`** — settings from the config file and flags.

mod app;
mod cli;
mod commit;
mod config;
mod input;
mod poll;
mod registry;
mod resolve;
mod sink;
mod source;
mod ui;

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use config::Config;
use poll::{PollMsg, Poller};
use registry::{feed_identity, FeedRegistry};
use sink::{NotificationSink, StdoutSink};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Plain mode logs to stderr.  The terminal UI owns the screen, so it only
/// logs when given a file.
fn init_logging(plain: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if plain => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Feeds
// ---------------------------------------------------------------------------

/// Register everything named in the config file and on the command line.
fn bootstrap(poller: &Poller, config: &Config, urls: &[String]) {
    for repo in &config.repositories {
        if repo.destinations.is_empty() {
            poller.submit_url(&repo.url, None);
        }
        for destination in &repo.destinations {
            poller.submit_url(&repo.url, Some(destination.clone()));
        }
    }

    for feed in &config.feeds {
        poller.add_feed(
            &feed_identity(&feed.name),
            &feed.name,
            &feed.feed_url,
            feed.format,
            feed.destinations.clone(),
        );
    }

    for text in urls {
        if poller.submit_text(text, None) == 0 {
            warn!(argument = %text, "no link found in argument");
        }
    }
}

/// Act on one message from the pollers. Returns a status line for the user.
fn dispatch(msg: PollMsg, poller: &Poller, out: &mut dyn NotificationSink) -> String {
    match msg {
        PollMsg::Notifications(notifications) => {
            for notification in &notifications {
                sink::deliver(notification, out);
            }
            let feed = notifications
                .first()
                .map(|n| n.label.as_str())
                .unwrap_or_default();
            format!("{}: {} new commits", feed, notifications.len())
        }
        PollMsg::Polled { identity, entries } => {
            debug!(feed = %identity, entries, "nothing new");
            format!("{identity}: {entries} entries, nothing new")
        }
        PollMsg::Error(e) => format!("Error: {e}"),
        PollMsg::Input(text) => match poller.submit_text(&text, None) {
            0 => "No links found".to_string(),
            n => format!("Submitted {n} links"),
        },
    }
}

// ---------------------------------------------------------------------------
// Front ends
// ---------------------------------------------------------------------------

/// Print notifications to stdout; read links from stdin.
fn run_plain(poller: &Poller, rx: mpsc::Receiver<PollMsg>, tx: mpsc::Sender<PollMsg>) -> Result<()> {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(PollMsg::Input(line)).is_err() {
                return;
            }
        }
    });

    let mut out = StdoutSink::new();
    for msg in rx {
        let status = dispatch(msg, poller, &mut out);
        debug!(%status);
        if out.is_closed() {
            anyhow::bail!("standard output is closed");
        }
    }
    Ok(())
}

fn run_tui(poller: &Poller, rx: mpsc::Receiver<PollMsg>) -> Result<()> {
    install_panic_hook();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any messages from the pollers.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            app.status = dispatch(msg, poller, &mut app);
        }
        app.feeds = poller.feed_count();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if let Some(text) = input::handle_key_event(&mut app, key) {
                    app.status = dispatch(PollMsg::Input(text), poller, &mut app);
                }
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    init_logging(cli.plain, config.log_file.as_deref())?;

    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let (tx, rx) = mpsc::channel();
    let registry = FeedRegistry::new(
        Duration::from_secs(config.poll_interval_secs),
        config.default_destination.clone(),
    );
    let poller = Poller::new(
        registry,
        runtime.handle().clone(),
        poll::http_client().context("building HTTP client")?,
        tx.clone(),
    );

    bootstrap(&poller, &config, &cli.urls);

    if cli.plain {
        run_plain(&poller, rx, tx)
    } else {
        drop(tx);
        run_tui(&poller, rx)
    }
}
