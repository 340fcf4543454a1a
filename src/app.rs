use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use crate::registry::Destination;
use crate::sink::NotificationSink;

/// One line published to one destination.
#[derive(Debug, Clone)]
pub struct Published {
    pub at: DateTime<Local>,
    pub destination: Destination,
    pub text: String,
}

pub struct App {
    /// Everything published so far, oldest first.
    pub lines: Vec<Published>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last poll status message.
    pub status: String,
    /// Number of feeds being watched, for the status bar.
    pub feeds: usize,
    /// Text being typed after pressing `a`; `None` when not in input mode.
    pub input: Option<String>,
}

impl App {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            feeds: 0,
            input: None,
        }
    }

    /// Whether the view is following the newest line.
    fn following(&self) -> bool {
        match self.list_state.selected() {
            None => true,
            Some(i) => i + 1 >= self.lines.len(),
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.lines.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.lines.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.lines.is_empty() {
            self.list_state.select(Some(self.lines.len() - 1));
        }
    }

    // -- input line ----------------------------------------------------------

    pub fn begin_input(&mut self) {
        self.input = Some(String::new());
    }

    pub fn cancel_input(&mut self) {
        self.input = None;
    }

    /// Leave input mode, returning the typed text unless it was blank.
    pub fn take_input(&mut self) -> Option<String> {
        self.input.take().filter(|text| !text.trim().is_empty())
    }
}

impl NotificationSink for App {
    fn publish(&mut self, destination: &Destination, line: &str) {
        let follow = self.following();
        self.lines.push(Published {
            at: Local::now(),
            destination: destination.clone(),
            text: line.to_string(),
        });
        if follow {
            self.select_last();
        }
    }
}
