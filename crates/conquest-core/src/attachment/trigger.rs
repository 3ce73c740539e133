//! Trigger attachments
//!
//! A trigger is a player attachment holding any number of effect options.
//! The trigger engine decides when it is satisfied and fires the options;
//! this type only stores them in decoded form.
//!
//! Options holding several records (placements, ownership changes, ...)
//! accumulate one record per set. Their encoded form joins records with
//! [`RECORD_SEPARATOR`](crate::codec::RECORD_SEPARATOR), and setting such a
//! value adds every record in it.

use super::{
    append_names, encode_records, invalid, parse_int, parse_records, unknown_property,
    AttachmentKind, PropertyBag,
};
use crate::codec::{
    self, Activation, AttachmentName, Chance, FrontierEdit, OwnershipChange, PlayerMatch,
    PropertyDelta, Purchase, RelationshipChange, RelationshipMatch, StepTiming, SupportChange,
    TechAvailability, TerritoryScope, UnitPlacement, UnitRemoval, UnitScope,
};
use crate::error::{Error, Result};
use crate::identity::{AttachmentRef, EntityKind, NULL_PLAYER};
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "uses",
    "chance",
    "when",
    "players",
    "notification",
    "victory",
    "playerAttachmentName",
    "playerProperty",
    "relationshipTypeAttachmentName",
    "relationshipTypeProperty",
    "relationshipTypes",
    "territoryAttachmentName",
    "territoryProperty",
    "territories",
    "territoryEffectAttachmentName",
    "territoryEffectProperty",
    "territoryEffects",
    "unitAttachmentName",
    "unitProperty",
    "unitType",
    "support",
    "relationshipChange",
    "tech",
    "availableTech",
    "frontier",
    "productionRule",
    "purchase",
    "placement",
    "removeUnits",
    "changeOwnership",
    "resource",
    "resourceCount",
    "activateTrigger",
];

fn default_attachment_name(kind: AttachmentKind) -> AttachmentName {
    AttachmentName::new(kind.default_key(), kind.key())
}

/// Decoded trigger options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerAttachment {
    name: String,
    /// The player this trigger hangs off, set when attached.
    pub attached_to: Option<String>,
    /// Remaining firings; -1 is unlimited.
    pub uses: i32,
    pub chance: Chance,
    pub when: Vec<StepTiming>,
    pub players: Vec<String>,
    pub notification: Option<String>,
    pub victory: Option<String>,

    pub player_attachment_name: AttachmentName,
    pub player_property: Vec<PropertyDelta>,
    pub relationship_type_attachment_name: AttachmentName,
    pub relationship_type_property: Vec<PropertyDelta>,
    pub relationship_types: Vec<String>,
    pub territory_attachment_name: AttachmentName,
    pub territory_property: Vec<PropertyDelta>,
    pub territories: Vec<String>,
    pub territory_effect_attachment_name: AttachmentName,
    pub territory_effect_property: Vec<PropertyDelta>,
    pub territory_effects: Vec<String>,
    pub unit_attachment_name: AttachmentName,
    pub unit_property: Vec<PropertyDelta>,
    pub unit_types: Vec<String>,
    pub support: Vec<SupportChange>,

    pub relationship_change: Vec<RelationshipChange>,
    pub tech: Vec<String>,
    pub available_tech: Vec<TechAvailability>,
    pub frontier: Option<String>,
    pub production_rule: Vec<FrontierEdit>,
    pub purchase: Vec<Purchase>,
    pub placement: Vec<UnitPlacement>,
    pub remove_units: Vec<UnitRemoval>,
    pub change_ownership: Vec<OwnershipChange>,
    pub resource: Option<String>,
    pub resource_count: i32,
    pub activate_trigger: Vec<Activation>,
}

impl TriggerAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attached_to: None,
            uses: -1,
            chance: Chance::default(),
            when: Vec::new(),
            players: Vec::new(),
            notification: None,
            victory: None,
            player_attachment_name: default_attachment_name(AttachmentKind::Player),
            player_property: Vec::new(),
            relationship_type_attachment_name: default_attachment_name(
                AttachmentKind::RelationshipType,
            ),
            relationship_type_property: Vec::new(),
            relationship_types: Vec::new(),
            territory_attachment_name: default_attachment_name(AttachmentKind::Territory),
            territory_property: Vec::new(),
            territories: Vec::new(),
            territory_effect_attachment_name: default_attachment_name(
                AttachmentKind::TerritoryEffect,
            ),
            territory_effect_property: Vec::new(),
            territory_effects: Vec::new(),
            unit_attachment_name: default_attachment_name(AttachmentKind::Unit),
            unit_property: Vec::new(),
            unit_types: Vec::new(),
            support: Vec::new(),
            relationship_change: Vec::new(),
            tech: Vec::new(),
            available_tech: Vec::new(),
            frontier: None,
            production_rule: Vec::new(),
            purchase: Vec::new(),
            placement: Vec::new(),
            remove_units: Vec::new(),
            change_ownership: Vec::new(),
            resource: None,
            resource_count: 0,
            activate_trigger: Vec::new(),
        }
    }

    /// Builder used by tests and rules code to attach to a player.
    pub fn with_owner(mut self, player: impl Into<String>) -> Self {
        self.attached_to = Some(player.into());
        self
    }

    /// Players the effects apply to: `players` if given, else the owner.
    pub fn players(&self) -> Vec<String> {
        if self.players.is_empty() {
            self.attached_to.iter().cloned().collect()
        } else {
            self.players.clone()
        }
    }

    /// Where this trigger lives in the game data, once attached.
    pub fn attachment_ref(&self) -> Option<AttachmentRef> {
        self.attached_to
            .as_ref()
            .map(|player| AttachmentRef::new(EntityKind::Player, player, &self.name))
    }

    /// Whether any firing is left.
    pub fn has_uses(&self) -> bool {
        self.uses != 0
    }
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn decode<T>(attachment: &str, property: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = codec::Malformed>,
{
    value
        .parse::<T>()
        .map_err(|e| e.into_error(attachment, property))
}

impl PropertyBag for TriggerAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "uses" => self.uses.to_string(),
            "chance" => self.chance.to_string(),
            "when" => encode_records(&self.when),
            "players" => codec::join(&self.players),
            "notification" => self.notification.clone().unwrap_or_default(),
            "victory" => self.victory.clone().unwrap_or_default(),
            "playerAttachmentName" => self.player_attachment_name.to_string(),
            "playerProperty" => encode_records(&self.player_property),
            "relationshipTypeAttachmentName" => self.relationship_type_attachment_name.to_string(),
            "relationshipTypeProperty" => encode_records(&self.relationship_type_property),
            "relationshipTypes" => codec::join(&self.relationship_types),
            "territoryAttachmentName" => self.territory_attachment_name.to_string(),
            "territoryProperty" => encode_records(&self.territory_property),
            "territories" => codec::join(&self.territories),
            "territoryEffectAttachmentName" => self.territory_effect_attachment_name.to_string(),
            "territoryEffectProperty" => encode_records(&self.territory_effect_property),
            "territoryEffects" => codec::join(&self.territory_effects),
            "unitAttachmentName" => self.unit_attachment_name.to_string(),
            "unitProperty" => encode_records(&self.unit_property),
            "unitType" => codec::join(&self.unit_types),
            "support" => codec::join(self.support.iter().map(|s| s.to_string())),
            "relationshipChange" => encode_records(&self.relationship_change),
            "tech" => codec::join(&self.tech),
            "availableTech" => encode_records(&self.available_tech),
            "frontier" => self.frontier.clone().unwrap_or_default(),
            "productionRule" => encode_records(&self.production_rule),
            "purchase" => encode_records(&self.purchase),
            "placement" => encode_records(&self.placement),
            "removeUnits" => encode_records(&self.remove_units),
            "changeOwnership" => encode_records(&self.change_ownership),
            "resource" => self.resource.clone().unwrap_or_default(),
            "resourceCount" => self.resource_count.to_string(),
            "activateTrigger" => encode_records(&self.activate_trigger),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "uses" => self.uses = parse_int(name, property, value)?,
            "chance" => self.chance = decode(name, property, value)?,
            "when" => self.when.extend(parse_records(name, property, value)?),
            "players" => append_names(&mut self.players, name, property, value)?,
            "notification" => self.notification = optional(value),
            "victory" => self.victory = optional(value),
            "playerAttachmentName" => self.player_attachment_name = decode(name, property, value)?,
            "playerProperty" => self
                .player_property
                .extend(parse_records(name, property, value)?),
            "relationshipTypeAttachmentName" => {
                self.relationship_type_attachment_name = decode(name, property, value)?
            }
            "relationshipTypeProperty" => self
                .relationship_type_property
                .extend(parse_records(name, property, value)?),
            "relationshipTypes" => {
                append_names(&mut self.relationship_types, name, property, value)?
            }
            "territoryAttachmentName" => {
                self.territory_attachment_name = decode(name, property, value)?
            }
            "territoryProperty" => self
                .territory_property
                .extend(parse_records(name, property, value)?),
            "territories" => append_names(&mut self.territories, name, property, value)?,
            "territoryEffectAttachmentName" => {
                self.territory_effect_attachment_name = decode(name, property, value)?
            }
            "territoryEffectProperty" => self
                .territory_effect_property
                .extend(parse_records(name, property, value)?),
            "territoryEffects" => append_names(&mut self.territory_effects, name, property, value)?,
            "unitAttachmentName" => self.unit_attachment_name = decode(name, property, value)?,
            "unitProperty" => self
                .unit_property
                .extend(parse_records(name, property, value)?),
            "unitType" => append_names(&mut self.unit_types, name, property, value)?,
            "support" => self.support.extend(
                SupportChange::parse_list(value).map_err(|e| e.into_error(name, property))?,
            ),
            "relationshipChange" => self
                .relationship_change
                .extend(parse_records(name, property, value)?),
            "tech" => append_names(&mut self.tech, name, property, value)?,
            "availableTech" => self
                .available_tech
                .extend(parse_records(name, property, value)?),
            "frontier" => self.frontier = optional(value),
            "productionRule" => self
                .production_rule
                .extend(parse_records(name, property, value)?),
            "purchase" => self.purchase.extend(parse_records(name, property, value)?),
            "placement" => self.placement.extend(parse_records(name, property, value)?),
            "removeUnits" => self
                .remove_units
                .extend(parse_records(name, property, value)?),
            "changeOwnership" => self
                .change_ownership
                .extend(parse_records(name, property, value)?),
            "resource" => self.resource = optional(value),
            "resourceCount" => self.resource_count = parse_int(name, property, value)?,
            "activateTrigger" => self
                .activate_trigger
                .extend(parse_records(name, property, value)?),
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "uses" => self.uses = -1,
            "chance" => self.chance = Chance::default(),
            "when" => self.when.clear(),
            "players" => self.players.clear(),
            "notification" => self.notification = None,
            "victory" => self.victory = None,
            "playerAttachmentName" => {
                self.player_attachment_name = default_attachment_name(AttachmentKind::Player)
            }
            "playerProperty" => self.player_property.clear(),
            "relationshipTypeAttachmentName" => {
                self.relationship_type_attachment_name =
                    default_attachment_name(AttachmentKind::RelationshipType)
            }
            "relationshipTypeProperty" => self.relationship_type_property.clear(),
            "relationshipTypes" => self.relationship_types.clear(),
            "territoryAttachmentName" => {
                self.territory_attachment_name = default_attachment_name(AttachmentKind::Territory)
            }
            "territoryProperty" => self.territory_property.clear(),
            "territories" => self.territories.clear(),
            "territoryEffectAttachmentName" => {
                self.territory_effect_attachment_name =
                    default_attachment_name(AttachmentKind::TerritoryEffect)
            }
            "territoryEffectProperty" => self.territory_effect_property.clear(),
            "territoryEffects" => self.territory_effects.clear(),
            "unitAttachmentName" => {
                self.unit_attachment_name = default_attachment_name(AttachmentKind::Unit)
            }
            "unitProperty" => self.unit_property.clear(),
            "unitType" => self.unit_types.clear(),
            "support" => self.support.clear(),
            "relationshipChange" => self.relationship_change.clear(),
            "tech" => self.tech.clear(),
            "availableTech" => self.available_tech.clear(),
            "frontier" => self.frontier = None,
            "productionRule" => self.production_rule.clear(),
            "purchase" => self.purchase.clear(),
            "placement" => self.placement.clear(),
            "removeUnits" => self.remove_units.clear(),
            "changeOwnership" => self.change_ownership.clear(),
            "resource" => self.resource = None,
            "resourceCount" => self.resource_count = 0,
            "activateTrigger" => self.activate_trigger.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        if self.uses < -1 {
            return Err(invalid(&self.name, "uses must be -1 or more"));
        }
        for player in &self.players {
            data.player(player)?;
        }
        for attachment_name in [
            &self.player_attachment_name,
            &self.relationship_type_attachment_name,
            &self.territory_attachment_name,
            &self.territory_effect_attachment_name,
            &self.unit_attachment_name,
        ] {
            if AttachmentKind::from_key(&attachment_name.kind).is_none() {
                return Err(invalid(
                    &self.name,
                    format!("unknown attachment kind '{}'", attachment_name.kind),
                ));
            }
        }
        for territory in &self.territories {
            data.territory(territory)?;
        }
        for relationship_type in &self.relationship_types {
            data.relationship_type(relationship_type)?;
        }
        for effect in &self.territory_effects {
            data.territory_effect(effect)?;
        }
        for unit_type in &self.unit_types {
            data.unit_type(unit_type)?;
        }
        for change in &self.support {
            data.unit_support(&change.support)?;
        }
        for change in &self.relationship_change {
            data.player(&change.player1)?;
            data.player(&change.player2)?;
            if let RelationshipMatch::Named(current) = &change.from {
                data.relationship_type(current)?;
            }
            data.relationship_type(&change.to)?;
        }
        for tech in &self.tech {
            data.technology(tech)?;
        }
        for availability in &self.available_tech {
            for (tech, _) in &availability.techs {
                data.technology(tech)?;
            }
        }
        if let Some(frontier) = &self.frontier {
            data.production_frontier(frontier)?;
        }
        for edit in &self.production_rule {
            data.production_frontier(&edit.frontier)?;
            data.production_rule(&edit.rule)?;
        }
        for purchase in &self.purchase {
            for unit_type in &purchase.unit_types {
                data.unit_type(unit_type)?;
            }
        }
        for placement in &self.placement {
            data.territory(&placement.territory)?;
            for unit_type in &placement.unit_types {
                data.unit_type(unit_type)?;
            }
        }
        for removal in &self.remove_units {
            if let TerritoryScope::Named(territory) = &removal.territory {
                data.territory(territory)?;
            }
            if let UnitScope::Named(unit_types) = &removal.unit_types {
                for unit_type in unit_types {
                    data.unit_type(unit_type)?;
                }
            }
        }
        for change in &self.change_ownership {
            if let TerritoryScope::Named(territory) = &change.territory {
                data.territory(territory)?;
            }
            if let PlayerMatch::Named(player) = &change.from {
                if player != NULL_PLAYER {
                    data.player(player)?;
                }
            }
            if change.to != NULL_PLAYER {
                data.player(&change.to)?;
            }
        }
        if let Some(resource) = &self.resource {
            data.resource(resource)?;
        }
        for activation in &self.activate_trigger {
            if data.find_trigger(&activation.trigger).is_none() {
                return Err(Error::TriggerNotFound(activation.trigger.clone()));
            }
        }
        Ok(())
    }
}
