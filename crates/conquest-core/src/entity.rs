//! Named game objects
//!
//! Seven kinds of object carry attachments (see [`Attachable`]). Units,
//! production rules, frontiers and the turn sequence do not.

use crate::attachment::{Attachment, AttachmentKind};
use crate::error::{Error, Result};
use crate::identity::{AttachmentRef, EntityKind, UnitId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Attachments of one object, keyed by attachment name
pub type Attachments = IndexMap<String, Attachment>;

/// An object that can carry attachments
pub trait Attachable {
    fn name(&self) -> &str;
    fn kind(&self) -> EntityKind;
    fn attachments(&self) -> &Attachments;
    fn attachments_mut(&mut self) -> &mut Attachments;

    fn attachment(&self, key: &str) -> Result<&Attachment> {
        self.attachments()
            .get(key)
            .ok_or_else(|| Error::AttachmentNotFound {
                target: format!("{} {}", self.kind(), self.name()),
                key: key.to_string(),
            })
    }

    /// The attachment under `key`, checked to be of `kind`.
    fn attachment_of(&self, key: &str, kind: AttachmentKind) -> Result<&Attachment> {
        let attachment = self.attachment(key)?;
        if attachment.kind() != kind {
            return Err(Error::WrongAttachmentKind {
                target: format!("{} {}", self.kind(), self.name()),
                key: key.to_string(),
                expected: kind.key().to_string(),
                actual: attachment.kind().key().to_string(),
            });
        }
        Ok(attachment)
    }

    fn attachment_ref(&self, key: &str) -> AttachmentRef {
        AttachmentRef::new(self.kind(), self.name(), key)
    }
}

macro_rules! attachable {
    ($ty:ty, $kind:expr) => {
        impl Attachable for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn kind(&self) -> EntityKind {
                $kind
            }

            fn attachments(&self) -> &Attachments {
                &self.attachments
            }

            fn attachments_mut(&mut self) -> &mut Attachments {
                &mut self.attachments
            }
        }
    };
}

/// A unit instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: String,
    /// `None` for the null player.
    pub owner: Option<String>,
    pub hits: u32,
    pub bombing_damage: u32,
}

impl Unit {
    pub fn is_owned_by(&self, player: &str) -> bool {
        self.owner.as_deref() == Some(player)
    }
}

/// Human readable summary such as `2 infantry, 1 armour`.
pub fn describe_units(units: &[Unit]) -> String {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for unit in units {
        *counts.entry(unit.unit_type.as_str()).or_default() += 1;
    }
    counts
        .iter()
        .map(|(unit_type, count)| format!("{} {}", count, unit_type))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub optional: bool,
    pub can_be_disabled: bool,
    /// Default controller, e.g. `Human` or `AI`.
    pub default_type: String,
    pub is_hidden: bool,
    pub production_frontier: Option<String>,
    pub repair_frontier: Option<String>,
    /// Technology categories and the techs available in each.
    pub tech_categories: IndexMap<String, IndexSet<String>>,
    /// Technologies already researched.
    pub techs: IndexSet<String>,
    pub resources: IndexMap<String, i64>,
    /// Units bought but not yet placed.
    pub held_units: Vec<Unit>,
    pub attachments: Attachments,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            can_be_disabled: false,
            default_type: "Human".to_string(),
            is_hidden: false,
            production_frontier: None,
            repair_frontier: None,
            tech_categories: IndexMap::new(),
            techs: IndexSet::new(),
            resources: IndexMap::new(),
            held_units: Vec::new(),
            attachments: Attachments::new(),
        }
    }

    pub fn resource(&self, resource: &str) -> i64 {
        self.resources.get(resource).copied().unwrap_or(0)
    }
}

attachable!(Player, EntityKind::Player);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Territory {
    pub name: String,
    pub is_water: bool,
    /// `None` while unowned.
    pub owner: Option<String>,
    pub units: Vec<Unit>,
    pub attachments: Attachments,
}

impl Territory {
    pub fn new(name: impl Into<String>, is_water: bool) -> Self {
        Self {
            name: name.into(),
            is_water,
            owner: None,
            units: Vec::new(),
            attachments: Attachments::new(),
        }
    }

    pub fn units_owned_by<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a Unit> + 'a {
        self.units.iter().filter(move |u| u.is_owned_by(player))
    }
}

attachable!(Territory, EntityKind::Territory);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    /// Players that see this resource; empty means everyone.
    pub displayed_for: Vec<String>,
    /// Set when the map hides the resource from every player.
    pub hidden: bool,
    pub attachments: Attachments,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            displayed_for: Vec::new(),
            hidden: false,
            attachments: Attachments::new(),
        }
    }

    pub fn is_displayed_for(&self, player: &str) -> bool {
        !self.hidden && (self.displayed_for.is_empty() || self.displayed_for.iter().any(|p| p == player))
    }
}

attachable!(Resource, EntityKind::Resource);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitType {
    pub name: String,
    pub attachments: Attachments,
}

impl UnitType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: Attachments::new(),
        }
    }
}

attachable!(UnitType, EntityKind::UnitType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipType {
    pub name: String,
    pub attachments: Attachments,
}

impl RelationshipType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: Attachments::new(),
        }
    }
}

attachable!(RelationshipType, EntityKind::RelationshipType);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryEffect {
    pub name: String,
    pub attachments: Attachments,
}

impl TerritoryEffect {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attachments: Attachments::new(),
        }
    }
}

attachable!(TerritoryEffect, EntityKind::TerritoryEffect);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechAdvance {
    pub name: String,
    /// Built-in ability key, e.g. `jetPower`, when the advance has one.
    pub property: Option<String>,
    pub attachments: Attachments,
}

impl TechAdvance {
    pub fn new(name: impl Into<String>, property: Option<String>) -> Self {
        Self {
            name: name.into(),
            property,
            attachments: Attachments::new(),
        }
    }
}

attachable!(TechAdvance, EntityKind::Technology);

/// Built-in technology keys.
pub const DEFAULT_TECHNOLOGIES: &[&str] = &[
    "superSub",
    "jetPower",
    "improvedShipyards",
    "aARadar",
    "longRangeAir",
    "heavyBomber",
    "improvedArtillerySupport",
    "rocket",
    "paratroopers",
    "increasedFactoryProduction",
    "warBonds",
    "mechanizedInfantry",
    "destroyerBombard",
];

/// Costs and results of a production or repair rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    /// Resource name to quantity.
    pub costs: IndexMap<String, i32>,
    /// Resource or unit type name to quantity.
    pub results: IndexMap<String, i32>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            costs: IndexMap::new(),
            results: IndexMap::new(),
        }
    }
}

/// An ordered set of rules offered to a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontier {
    pub name: String,
    pub rules: Vec<String>,
}

impl Frontier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.rules.iter().any(|r| r == rule)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delegate {
    pub name: String,
    /// Implementation key the host maps to behaviour.
    pub implementation: String,
    pub display: String,
}

/// One step of the turn sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStep {
    pub name: String,
    pub delegate: String,
    pub player: Option<String>,
    pub display: Option<String>,
    pub max_run_count: Option<u32>,
    pub properties: IndexMap<String, String>,
}
