//! Notification and victory texts

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resolves a message key to its text
pub trait MessageLookup {
    fn message(&self, key: &str) -> Option<String>;
}

impl MessageLookup for IndexMap<String, String> {
    fn message(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Message texts keyed by name, usually read from a RON map
///
/// ```
/// use conquest_trigger::{MessageLookup, Messages};
///
/// let messages = Messages::from_ron(r#"{"Reinforcements": "Fresh troops arrive."}"#).unwrap();
/// assert_eq!(messages.message("Reinforcements").as_deref(), Some("Fresh troops arrive."));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Messages {
    messages: IndexMap<String, String>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.messages.insert(key.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageLookup for Messages {
    fn message(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}
