//! Lookup from attachment kind names to constructors

use super::{Attachment, AttachmentKind};
use indexmap::IndexMap;
use std::fmt;

/// Builds an empty attachment with the given key.
pub type AttachmentConstructor = fn(&str) -> Attachment;

/// Maps the kind names found in map definitions to constructors.
///
/// The default registry knows every built-in [`AttachmentKind`]. Hosts may
/// register further names, for example an alias for an existing kind.
#[derive(Clone)]
pub struct AttachmentRegistry {
    constructors: IndexMap<String, AttachmentConstructor>,
}

impl AttachmentRegistry {
    /// An empty registry
    pub fn empty() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// Register a constructor under `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, constructor: AttachmentConstructor) {
        self.constructors.insert(kind.into(), constructor);
    }

    pub fn with(mut self, kind: impl Into<String>, constructor: AttachmentConstructor) -> Self {
        self.register(kind, constructor);
        self
    }

    /// Create an attachment of kind `kind` keyed `name`, if the kind is known.
    pub fn create(&self, kind: &str, name: &str) -> Option<Attachment> {
        self.constructors.get(kind).map(|constructor| constructor(name))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

impl fmt::Debug for AttachmentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.kinds()).finish()
    }
}

impl Default for AttachmentRegistry {
    fn default() -> Self {
        Self::empty()
            .with(AttachmentKind::Unit.key(), |name| {
                Attachment::new(AttachmentKind::Unit, name)
            })
            .with(AttachmentKind::Territory.key(), |name| {
                Attachment::new(AttachmentKind::Territory, name)
            })
            .with(AttachmentKind::Player.key(), |name| {
                Attachment::new(AttachmentKind::Player, name)
            })
            .with(AttachmentKind::RelationshipType.key(), |name| {
                Attachment::new(AttachmentKind::RelationshipType, name)
            })
            .with(AttachmentKind::TerritoryEffect.key(), |name| {
                Attachment::new(AttachmentKind::TerritoryEffect, name)
            })
            .with(AttachmentKind::TechAbility.key(), |name| {
                Attachment::new(AttachmentKind::TechAbility, name)
            })
            .with(AttachmentKind::UnitSupport.key(), |name| {
                Attachment::new(AttachmentKind::UnitSupport, name)
            })
            .with(AttachmentKind::Trigger.key(), |name| {
                Attachment::new(AttachmentKind::Trigger, name)
            })
    }
}
