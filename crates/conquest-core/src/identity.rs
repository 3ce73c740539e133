//! Identity types for units, entity kinds and attachment addresses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the player that owns nothing in particular.
///
/// Units placed without an owner and unowned territories belong to it.
pub const NULL_PLAYER: &str = "Neutral";

/// Unique identifier for a unit instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl UnitId {
    /// Create a new unit ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit:{}", self.0)
    }
}

/// The kinds of named objects held by [`GameData`](crate::GameData).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Territory,
    Resource,
    UnitType,
    RelationshipType,
    TerritoryEffect,
    Technology,
    TechnologyCategory,
    ProductionRule,
    ProductionFrontier,
    RepairRule,
    RepairFrontier,
    Delegate,
}

impl EntityKind {
    /// Kinds that can carry attachments, in the order they are validated.
    pub const ATTACHABLE: [EntityKind; 7] = [
        EntityKind::UnitType,
        EntityKind::Territory,
        EntityKind::Resource,
        EntityKind::Player,
        EntityKind::RelationshipType,
        EntityKind::TerritoryEffect,
        EntityKind::Technology,
    ];

    /// Map an attachment target tag from a map definition to a kind.
    ///
    /// ```
    /// use conquest_core::EntityKind;
    /// assert_eq!(EntityKind::from_target_tag("unitType"), Some(EntityKind::UnitType));
    /// assert_eq!(EntityKind::from_target_tag("sea"), None);
    /// ```
    pub fn from_target_tag(tag: &str) -> Option<Self> {
        match tag {
            "unitType" => Some(EntityKind::UnitType),
            "territory" => Some(EntityKind::Territory),
            "resource" => Some(EntityKind::Resource),
            "territoryEffect" => Some(EntityKind::TerritoryEffect),
            "player" => Some(EntityKind::Player),
            "relationship" => Some(EntityKind::RelationshipType),
            "technology" => Some(EntityKind::Technology),
            _ => None,
        }
    }

    pub fn is_attachable(&self) -> bool {
        Self::ATTACHABLE.contains(self)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Territory => "territory",
            EntityKind::Resource => "resource",
            EntityKind::UnitType => "unit type",
            EntityKind::RelationshipType => "relationship type",
            EntityKind::TerritoryEffect => "territory effect",
            EntityKind::Technology => "technology",
            EntityKind::TechnologyCategory => "technology category",
            EntityKind::ProductionRule => "production rule",
            EntityKind::ProductionFrontier => "production frontier",
            EntityKind::RepairRule => "repair rule",
            EntityKind::RepairFrontier => "repair frontier",
            EntityKind::Delegate => "delegate",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Address of one attachment: the entity it hangs off and its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub kind: EntityKind,
    pub entity: String,
    pub key: String,
}

impl AttachmentRef {
    pub fn new(kind: EntityKind, entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind,
            entity: entity.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for AttachmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} attached to {} {}", self.key, self.kind, self.entity)
    }
}
