//! Attachments: named bags of typed properties hung off game objects
//!
//! Every attachable object (unit type, territory, resource, player,
//! relationship type, territory effect, technology) carries attachments
//! keyed by name. Each attachment kind exposes its properties by name
//! through [`PropertyBag`], which is how both the map loader and the
//! trigger engine read and write them.
//!
//! Setting a property decodes its encoded string form. List properties
//! append on each set; scalar properties replace. Resetting restores the
//! default, so `reset` followed by `set(get())` reproduces the value.

mod player;
mod registry;
mod relationship_type;
mod tech;
mod territory;
mod territory_effect;
mod trigger;
mod unit;
mod unit_support;

pub use player::PlayerAttachment;
pub use registry::{AttachmentConstructor, AttachmentRegistry};
pub use relationship_type::RelationshipTypeAttachment;
pub use tech::TechAbilityAttachment;
pub use territory::TerritoryAttachment;
pub use territory_effect::TerritoryEffectAttachment;
pub use trigger::TriggerAttachment;
pub use unit::UnitAttachment;
pub use unit_support::UnitSupportAttachment;

use crate::codec::{self, Malformed, RECORD_SEPARATOR};
use crate::error::{Error, Result};
use crate::identity::EntityKind;
use crate::model::GameData;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named access to an attachment's properties.
pub trait PropertyBag {
    /// The attachment key, e.g. `unitAttachment`.
    fn name(&self) -> &str;

    /// Every property name this kind understands.
    fn property_names(&self) -> &'static [&'static str];

    /// Encoded form of the property's current value.
    fn get_property(&self, property: &str) -> Result<String>;

    /// Decode `value` into the property. Lists append, scalars replace.
    fn set_property(&mut self, property: &str, value: &str) -> Result<()>;

    /// Restore the property's default.
    fn reset_property(&mut self, property: &str) -> Result<()>;

    /// Cross-reference and range checks against the loaded game.
    fn validate(&self, data: &GameData) -> Result<()>;
}

/// The attachment kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentKind {
    Unit,
    Territory,
    Player,
    RelationshipType,
    TerritoryEffect,
    TechAbility,
    UnitSupport,
    Trigger,
}

impl AttachmentKind {
    pub const ALL: [AttachmentKind; 8] = [
        AttachmentKind::Unit,
        AttachmentKind::Territory,
        AttachmentKind::Player,
        AttachmentKind::RelationshipType,
        AttachmentKind::TerritoryEffect,
        AttachmentKind::TechAbility,
        AttachmentKind::UnitSupport,
        AttachmentKind::Trigger,
    ];

    /// The kind name used in map definitions and `*AttachmentName` options.
    pub fn key(&self) -> &'static str {
        match self {
            AttachmentKind::Unit => "UnitAttachment",
            AttachmentKind::Territory => "TerritoryAttachment",
            AttachmentKind::Player => "PlayerAttachment",
            AttachmentKind::RelationshipType => "RelationshipTypeAttachment",
            AttachmentKind::TerritoryEffect => "TerritoryEffectAttachment",
            AttachmentKind::TechAbility => "TechAbilityAttachment",
            AttachmentKind::UnitSupport => "UnitSupportAttachment",
            AttachmentKind::Trigger => "TriggerAttachment",
        }
    }

    /// The attachment key rules code looks for when none is named.
    pub fn default_key(&self) -> &'static str {
        match self {
            AttachmentKind::Unit => "unitAttachment",
            AttachmentKind::Territory => "territoryAttachment",
            AttachmentKind::Player => "playerAttachment",
            AttachmentKind::RelationshipType => "relationshipTypeAttachment",
            AttachmentKind::TerritoryEffect => "territoryEffectAttachment",
            AttachmentKind::TechAbility => "techAbilityAttachment",
            AttachmentKind::UnitSupport => "unitSupportAttachment",
            AttachmentKind::Trigger => "triggerAttachment",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Whether this kind may be attached to objects of `entity` kind.
    pub fn applies_to(&self, entity: EntityKind) -> bool {
        match self {
            AttachmentKind::Unit | AttachmentKind::UnitSupport => entity == EntityKind::UnitType,
            AttachmentKind::Territory => entity == EntityKind::Territory,
            AttachmentKind::Player | AttachmentKind::Trigger => entity == EntityKind::Player,
            AttachmentKind::RelationshipType => entity == EntityKind::RelationshipType,
            AttachmentKind::TerritoryEffect => entity == EntityKind::TerritoryEffect,
            AttachmentKind::TechAbility => entity == EntityKind::Technology,
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One attachment of any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attachment {
    Unit(UnitAttachment),
    Territory(TerritoryAttachment),
    Player(PlayerAttachment),
    RelationshipType(RelationshipTypeAttachment),
    TerritoryEffect(TerritoryEffectAttachment),
    TechAbility(TechAbilityAttachment),
    UnitSupport(UnitSupportAttachment),
    Trigger(TriggerAttachment),
}

impl Attachment {
    /// A fresh attachment of `kind` with every property at its default.
    pub fn new(kind: AttachmentKind, name: &str) -> Self {
        match kind {
            AttachmentKind::Unit => Attachment::Unit(UnitAttachment::new(name)),
            AttachmentKind::Territory => Attachment::Territory(TerritoryAttachment::new(name)),
            AttachmentKind::Player => Attachment::Player(PlayerAttachment::new(name)),
            AttachmentKind::RelationshipType => {
                Attachment::RelationshipType(RelationshipTypeAttachment::new(name))
            }
            AttachmentKind::TerritoryEffect => {
                Attachment::TerritoryEffect(TerritoryEffectAttachment::new(name))
            }
            AttachmentKind::TechAbility => Attachment::TechAbility(TechAbilityAttachment::new(name)),
            AttachmentKind::UnitSupport => {
                Attachment::UnitSupport(UnitSupportAttachment::new(name))
            }
            AttachmentKind::Trigger => Attachment::Trigger(TriggerAttachment::new(name)),
        }
    }

    pub fn kind(&self) -> AttachmentKind {
        match self {
            Attachment::Unit(_) => AttachmentKind::Unit,
            Attachment::Territory(_) => AttachmentKind::Territory,
            Attachment::Player(_) => AttachmentKind::Player,
            Attachment::RelationshipType(_) => AttachmentKind::RelationshipType,
            Attachment::TerritoryEffect(_) => AttachmentKind::TerritoryEffect,
            Attachment::TechAbility(_) => AttachmentKind::TechAbility,
            Attachment::UnitSupport(_) => AttachmentKind::UnitSupport,
            Attachment::Trigger(_) => AttachmentKind::Trigger,
        }
    }

    pub fn as_unit(&self) -> Option<&UnitAttachment> {
        match self {
            Attachment::Unit(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_territory(&self) -> Option<&TerritoryAttachment> {
        match self {
            Attachment::Territory(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_relationship_type(&self) -> Option<&RelationshipTypeAttachment> {
        match self {
            Attachment::RelationshipType(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_tech_ability(&self) -> Option<&TechAbilityAttachment> {
        match self {
            Attachment::TechAbility(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_unit_support(&self) -> Option<&UnitSupportAttachment> {
        match self {
            Attachment::UnitSupport(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_trigger(&self) -> Option<&TriggerAttachment> {
        match self {
            Attachment::Trigger(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_trigger_mut(&mut self) -> Option<&mut TriggerAttachment> {
        match self {
            Attachment::Trigger(a) => Some(a),
            _ => None,
        }
    }

    fn bag(&self) -> &dyn PropertyBag {
        match self {
            Attachment::Unit(a) => a,
            Attachment::Territory(a) => a,
            Attachment::Player(a) => a,
            Attachment::RelationshipType(a) => a,
            Attachment::TerritoryEffect(a) => a,
            Attachment::TechAbility(a) => a,
            Attachment::UnitSupport(a) => a,
            Attachment::Trigger(a) => a,
        }
    }

    fn bag_mut(&mut self) -> &mut dyn PropertyBag {
        match self {
            Attachment::Unit(a) => a,
            Attachment::Territory(a) => a,
            Attachment::Player(a) => a,
            Attachment::RelationshipType(a) => a,
            Attachment::TerritoryEffect(a) => a,
            Attachment::TechAbility(a) => a,
            Attachment::UnitSupport(a) => a,
            Attachment::Trigger(a) => a,
        }
    }
}

impl PropertyBag for Attachment {
    fn name(&self) -> &str {
        self.bag().name()
    }

    fn property_names(&self) -> &'static [&'static str] {
        self.bag().property_names()
    }

    fn get_property(&self, property: &str) -> Result<String> {
        self.bag().get_property(property)
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        self.bag_mut().set_property(property, value)
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        self.bag_mut().reset_property(property)
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        self.bag().validate(data)
    }
}

// Helpers shared by the attachment kinds.

pub(crate) fn unknown_property(attachment: &str, property: &str) -> Error {
    Error::UnknownProperty {
        attachment: attachment.to_string(),
        property: property.to_string(),
    }
}

pub(crate) fn invalid(attachment: &str, reason: impl Into<String>) -> Error {
    Error::InvalidAttachment {
        attachment: attachment.to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn parse_int(attachment: &str, property: &str, value: &str) -> Result<i32> {
    codec::parse_int(value).map_err(|e| e.into_error(attachment, property))
}

pub(crate) fn parse_bool(attachment: &str, property: &str, value: &str) -> Result<bool> {
    codec::parse_bool(value).map_err(|e| e.into_error(attachment, property))
}

/// Append every field of `value` to a name list.
pub(crate) fn append_names(
    list: &mut Vec<String>,
    attachment: &str,
    property: &str,
    value: &str,
) -> Result<()> {
    let fields = codec::fields(value).map_err(|e| e.into_error(attachment, property))?;
    list.extend(fields.into_iter().map(str::to_string));
    Ok(())
}

/// Decode one or more `;` separated records.
pub(crate) fn parse_records<T>(attachment: &str, property: &str, value: &str) -> Result<Vec<T>>
where
    T: FromStr<Err = Malformed>,
{
    value
        .split(RECORD_SEPARATOR)
        .map(|record| record.parse::<T>().map_err(|e| e.into_error(attachment, property)))
        .collect()
}

pub(crate) fn encode_records<T: fmt::Display>(records: &[T]) -> String {
    records
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}
