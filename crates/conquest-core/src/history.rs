//! Game history
//!
//! A flat list of events, each with a human readable description, optional
//! child notes and the changes applied while it was current. Rules code
//! writes through [`HistoryWriter`] so tests can substitute a recorder.
//!
//! # Example
//!
//! ```rust
//! use conquest_core::{History, HistoryWriter};
//!
//! let mut history = History::new();
//! history.start_event("Russia activates jetPower");
//! history.add_child("granted by triggerAttachment_1");
//! assert_eq!(history.len(), 1);
//! ```

use crate::change::ChangeSet;
use serde::{Deserialize, Serialize};

/// Sink for history events
pub trait HistoryWriter {
    /// Begin a new event; later children and changes belong to it.
    fn start_event(&mut self, description: &str);

    /// Add a note to the current event.
    fn add_child(&mut self, description: &str);
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub description: String,
    pub round: u32,
    pub step: Option<String>,
    pub children: Vec<String>,
    /// Changes applied while this event was current.
    pub changes: ChangeSet,
}

/// Configuration for the history
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Whether recording is enabled
    pub recording_enabled: bool,
    /// Maximum number of events to keep (0 = unlimited)
    pub max_events: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            recording_enabled: true,
            max_events: 0,
        }
    }
}

/// Recorded history of a game
#[derive(Debug, Clone, Default)]
pub struct History {
    config: HistoryConfig,
    events: Vec<HistoryEvent>,
    round: u32,
    step: Option<String>,
}

impl History {
    /// Create a new history with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn start_recording(&mut self) {
        self.config.recording_enabled = true;
    }

    pub fn stop_recording(&mut self) {
        self.config.recording_enabled = false;
    }

    pub fn is_recording(&self) -> bool {
        self.config.recording_enabled
    }

    /// Round stamped on subsequent events.
    pub fn set_round(&mut self, round: u32) {
        self.round = round;
    }

    /// Step stamped on subsequent events.
    pub fn set_step(&mut self, step: Option<String>) {
        self.step = step;
    }

    /// Attach applied changes to the current event.
    pub fn record_changes(&mut self, changes: &ChangeSet) {
        if !self.config.recording_enabled {
            return;
        }
        if let Some(event) = self.events.last_mut() {
            event.changes.extend(changes.clone());
        }
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&HistoryEvent> {
        self.events.last()
    }

    /// Event descriptions, oldest first.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.description.as_str())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    fn enforce_limits(&mut self) {
        if self.config.max_events > 0 && self.events.len() > self.config.max_events {
            let excess = self.events.len() - self.config.max_events;
            self.events.drain(0..excess);
        }
    }
}

impl HistoryWriter for History {
    fn start_event(&mut self, description: &str) {
        if !self.config.recording_enabled {
            return;
        }
        self.events.push(HistoryEvent {
            description: description.to_string(),
            round: self.round,
            step: self.step.clone(),
            children: Vec::new(),
            changes: ChangeSet::new(),
        });
        self.enforce_limits();
    }

    fn add_child(&mut self, description: &str) {
        if !self.config.recording_enabled {
            return;
        }
        match self.events.last_mut() {
            Some(event) => event.children.push(description.to_string()),
            None => self.start_event(description),
        }
    }
}
