//! The game-state graph

use crate::attachment::{
    Attachment, AttachmentKind, PropertyBag, RelationshipTypeAttachment, TriggerAttachment,
};
use crate::entity::{
    Attachable, Delegate, Frontier, GameStep, Player, RelationshipType, Resource, Rule,
    TechAdvance, Territory, TerritoryEffect, Unit, UnitType,
};
use crate::error::{Error, Result};
use crate::identity::{AttachmentRef, EntityKind, UnitId, NULL_PLAYER};
use crate::relationship::{
    AllianceTracker, Archetype, RelationshipTracker, DEFAULT_ALLIED_RELATION,
    DEFAULT_WAR_RELATION, NULL_RELATION, SELF_RELATION,
};
use crate::value::GameProperties;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Options applied to one attachment while loading, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentRecord {
    pub attachment: AttachmentRef,
    /// `(property, final value)` pairs.
    pub options: Vec<(String, String)>,
}

/// The complete game state
///
/// Collections are keyed by name and keep declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub game_name: String,
    pub game_version: String,
    /// Sides of the game's dice, at least 1.
    pub dice_sides: u32,
    /// Added to the internal round number when displayed.
    pub round_offset: i32,
    pub properties: GameProperties,
    pub players: IndexMap<String, Player>,
    pub territories: IndexMap<String, Territory>,
    /// Neighbours of each territory; always symmetric.
    pub connections: IndexMap<String, IndexSet<String>>,
    pub resources: IndexMap<String, Resource>,
    pub unit_types: IndexMap<String, UnitType>,
    pub relationship_types: IndexMap<String, RelationshipType>,
    pub territory_effects: IndexMap<String, TerritoryEffect>,
    pub technologies: IndexMap<String, TechAdvance>,
    pub production_rules: IndexMap<String, Rule>,
    pub production_frontiers: IndexMap<String, Frontier>,
    pub repair_rules: IndexMap<String, Rule>,
    pub repair_frontiers: IndexMap<String, Frontier>,
    pub delegates: IndexMap<String, Delegate>,
    pub sequence: Vec<GameStep>,
    pub alliances: AllianceTracker,
    pub relationships: RelationshipTracker,
    pub attachment_order: Vec<AttachmentRecord>,
    next_unit_id: u64,
}

impl GameData {
    /// Create an empty game holding only the built-in relationship types
    pub fn new() -> Self {
        let mut data = Self {
            game_name: String::new(),
            game_version: String::new(),
            dice_sides: 6,
            round_offset: 0,
            properties: GameProperties::new(),
            players: IndexMap::new(),
            territories: IndexMap::new(),
            connections: IndexMap::new(),
            resources: IndexMap::new(),
            unit_types: IndexMap::new(),
            relationship_types: IndexMap::new(),
            territory_effects: IndexMap::new(),
            technologies: IndexMap::new(),
            production_rules: IndexMap::new(),
            production_frontiers: IndexMap::new(),
            repair_rules: IndexMap::new(),
            repair_frontiers: IndexMap::new(),
            delegates: IndexMap::new(),
            sequence: Vec::new(),
            alliances: AllianceTracker::new(),
            relationships: RelationshipTracker::new(),
            attachment_order: Vec::new(),
            next_unit_id: 1,
        };
        for (name, archetype) in [
            (SELF_RELATION, Archetype::Allied),
            (NULL_RELATION, Archetype::War),
            (DEFAULT_WAR_RELATION, Archetype::War),
            (DEFAULT_ALLIED_RELATION, Archetype::Allied),
        ] {
            data.add_relationship_type(name, archetype);
        }
        data
    }

    /// Register a relationship type with a default attachment of `archetype`.
    pub fn add_relationship_type(&mut self, name: &str, archetype: Archetype) {
        let key = AttachmentKind::RelationshipType.default_key();
        let mut relationship_type = RelationshipType::new(name);
        relationship_type.attachments.insert(
            key.to_string(),
            Attachment::RelationshipType(
                RelationshipTypeAttachment::new(key).with_archetype(archetype),
            ),
        );
        self.relationship_types
            .insert(name.to_string(), relationship_type);
    }

    // Lookups

    pub fn player(&self, name: &str) -> Result<&Player> {
        self.players
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::Player, name))
    }

    pub fn player_mut(&mut self, name: &str) -> Result<&mut Player> {
        self.players
            .get_mut(name)
            .ok_or_else(|| Error::not_found(EntityKind::Player, name))
    }

    /// Whether `name` is a player or the null player.
    pub fn is_player_or_null(&self, name: &str) -> bool {
        name == NULL_PLAYER || self.players.contains_key(name)
    }

    pub fn territory(&self, name: &str) -> Result<&Territory> {
        self.territories
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::Territory, name))
    }

    pub fn territory_mut(&mut self, name: &str) -> Result<&mut Territory> {
        self.territories
            .get_mut(name)
            .ok_or_else(|| Error::not_found(EntityKind::Territory, name))
    }

    pub fn resource(&self, name: &str) -> Result<&Resource> {
        self.resources
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::Resource, name))
    }

    pub fn unit_type(&self, name: &str) -> Result<&UnitType> {
        self.unit_types
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::UnitType, name))
    }

    pub fn relationship_type(&self, name: &str) -> Result<&RelationshipType> {
        self.relationship_types
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::RelationshipType, name))
    }

    pub fn territory_effect(&self, name: &str) -> Result<&TerritoryEffect> {
        self.territory_effects
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::TerritoryEffect, name))
    }

    /// Find a technology by name, then by its built-in property key.
    pub fn technology(&self, name: &str) -> Result<&TechAdvance> {
        self.technologies
            .get(name)
            .or_else(|| {
                self.technologies
                    .values()
                    .find(|t| t.property.as_deref() == Some(name))
            })
            .ok_or_else(|| Error::not_found(EntityKind::Technology, name))
    }

    pub fn production_rule(&self, name: &str) -> Result<&Rule> {
        self.production_rules
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::ProductionRule, name))
    }

    pub fn production_frontier(&self, name: &str) -> Result<&Frontier> {
        self.production_frontiers
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::ProductionFrontier, name))
    }

    pub fn production_frontier_mut(&mut self, name: &str) -> Result<&mut Frontier> {
        self.production_frontiers
            .get_mut(name)
            .ok_or_else(|| Error::not_found(EntityKind::ProductionFrontier, name))
    }

    pub fn repair_rule(&self, name: &str) -> Result<&Rule> {
        self.repair_rules
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::RepairRule, name))
    }

    pub fn repair_frontier(&self, name: &str) -> Result<&Frontier> {
        self.repair_frontiers
            .get(name)
            .ok_or_else(|| Error::not_found(EntityKind::RepairFrontier, name))
    }

    /// Connect two territories both ways.
    pub fn add_connection(&mut self, a: &str, b: &str) -> Result<()> {
        self.territory(a)?;
        self.territory(b)?;
        self.connections
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.connections
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
        Ok(())
    }

    pub fn neighbors(&self, territory: &str) -> impl Iterator<Item = &str> {
        self.connections
            .get(territory)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    // Attachments

    pub fn attachable(&self, kind: EntityKind, name: &str) -> Result<&dyn Attachable> {
        let found: Option<&dyn Attachable> = match kind {
            EntityKind::Player => self.players.get(name).map(|e| e as &dyn Attachable),
            EntityKind::Territory => self.territories.get(name).map(|e| e as &dyn Attachable),
            EntityKind::Resource => self.resources.get(name).map(|e| e as &dyn Attachable),
            EntityKind::UnitType => self.unit_types.get(name).map(|e| e as &dyn Attachable),
            EntityKind::RelationshipType => {
                self.relationship_types.get(name).map(|e| e as &dyn Attachable)
            }
            EntityKind::TerritoryEffect => {
                self.territory_effects.get(name).map(|e| e as &dyn Attachable)
            }
            EntityKind::Technology => self.technologies.get(name).map(|e| e as &dyn Attachable),
            _ => {
                return Err(Error::InvalidOperation(format!(
                    "{} objects cannot carry attachments",
                    kind
                )))
            }
        };
        found.ok_or_else(|| Error::not_found(kind, name))
    }

    pub fn attachable_mut(&mut self, kind: EntityKind, name: &str) -> Result<&mut dyn Attachable> {
        let found: Option<&mut dyn Attachable> = match kind {
            EntityKind::Player => self.players.get_mut(name).map(|e| e as &mut dyn Attachable),
            EntityKind::Territory => self
                .territories
                .get_mut(name)
                .map(|e| e as &mut dyn Attachable),
            EntityKind::Resource => self.resources.get_mut(name).map(|e| e as &mut dyn Attachable),
            EntityKind::UnitType => self.unit_types.get_mut(name).map(|e| e as &mut dyn Attachable),
            EntityKind::RelationshipType => self
                .relationship_types
                .get_mut(name)
                .map(|e| e as &mut dyn Attachable),
            EntityKind::TerritoryEffect => self
                .territory_effects
                .get_mut(name)
                .map(|e| e as &mut dyn Attachable),
            EntityKind::Technology => self
                .technologies
                .get_mut(name)
                .map(|e| e as &mut dyn Attachable),
            _ => {
                return Err(Error::InvalidOperation(format!(
                    "{} objects cannot carry attachments",
                    kind
                )))
            }
        };
        found.ok_or_else(|| Error::not_found(kind, name))
    }

    pub fn attachment(&self, reference: &AttachmentRef) -> Result<&Attachment> {
        self.attachable(reference.kind, &reference.entity)?
            .attachment(&reference.key)
    }

    pub fn attachment_mut(&mut self, reference: &AttachmentRef) -> Result<&mut Attachment> {
        let target = self.attachable_mut(reference.kind, &reference.entity)?;
        let description = format!("{} {}", target.kind(), target.name());
        target
            .attachments_mut()
            .get_mut(&reference.key)
            .ok_or_else(|| Error::AttachmentNotFound {
                target: description,
                key: reference.key.clone(),
            })
    }

    /// Find the unit support attachment keyed `name` on any unit type.
    pub fn unit_support(&self, name: &str) -> Result<AttachmentRef> {
        self.unit_types
            .values()
            .find(|unit_type| {
                unit_type
                    .attachments
                    .get(name)
                    .is_some_and(|a| a.kind() == AttachmentKind::UnitSupport)
            })
            .map(|unit_type| AttachmentRef::new(EntityKind::UnitType, &unit_type.name, name))
            .ok_or_else(|| Error::AttachmentNotFound {
                target: "any unit type".to_string(),
                key: name.to_string(),
            })
    }

    /// Hang `attachment` off the named object, replacing any with the same key.
    pub fn attach(&mut self, kind: EntityKind, name: &str, mut attachment: Attachment) -> Result<()> {
        if !attachment.kind().applies_to(kind) {
            return Err(Error::InvalidOperation(format!(
                "{} cannot be attached to {} {}",
                attachment.kind(),
                kind,
                name
            )));
        }
        if let Some(trigger) = attachment.as_trigger_mut() {
            trigger.attached_to = Some(name.to_string());
        }
        let key = attachment.name().to_string();
        self.attachable_mut(kind, name)?
            .attachments_mut()
            .insert(key, attachment);
        Ok(())
    }

    /// Every trigger attached to any player, in player then key order.
    pub fn triggers(&self) -> impl Iterator<Item = &TriggerAttachment> {
        self.players
            .values()
            .flat_map(|p| p.attachments.values())
            .filter_map(Attachment::as_trigger)
    }

    pub fn find_trigger(&self, name: &str) -> Option<&TriggerAttachment> {
        self.triggers().find(|t| t.name() == name)
    }

    // Relationships

    /// The archetype of a relationship type, read from its attachment.
    pub fn archetype(&self, relationship_type: &str) -> Result<Archetype> {
        let relationship_type = self.relationship_type(relationship_type)?;
        relationship_type
            .attachments
            .values()
            .find_map(Attachment::as_relationship_type)
            .map(|a| a.archetype)
            .ok_or_else(|| Error::AttachmentNotFound {
                target: format!("relationship type {}", relationship_type.name),
                key: AttachmentKind::RelationshipType.default_key().to_string(),
            })
    }

    /// Current relationship type between two players.
    pub fn relationship_between(&self, a: &str, b: &str) -> Result<&str> {
        self.relationships.relationship_type(a, b).ok_or_else(|| {
            Error::InvalidOperation(format!("no relationship between {} and {}", a, b))
        })
    }

    // Units

    /// Create `count` fresh units with new ids.
    ///
    /// Advances the id counter directly; rules code reserves ids with
    /// [`Change::UnitIds`](crate::Change::UnitIds) instead.
    pub fn create_units(
        &mut self,
        unit_type: &str,
        count: u32,
        owner: Option<&str>,
    ) -> Result<Vec<Unit>> {
        let units = self.build_units(unit_type, count, owner, self.next_unit_id)?;
        self.next_unit_id += u64::from(count);
        Ok(units)
    }

    /// The id the next created unit gets.
    pub fn next_unit_id(&self) -> u64 {
        self.next_unit_id
    }

    /// `count` units numbered from `first`, without touching the id counter.
    pub fn build_units(
        &self,
        unit_type: &str,
        count: u32,
        owner: Option<&str>,
        first: u64,
    ) -> Result<Vec<Unit>> {
        self.unit_type(unit_type)?;
        Ok((0..count)
            .map(|i| Unit {
                id: UnitId::new(first + u64::from(i)),
                unit_type: unit_type.to_string(),
                owner: owner.map(str::to_string),
                hits: 0,
                bombing_damage: 0,
            })
            .collect())
    }

    pub(crate) fn set_next_unit_id(&mut self, next: u64) {
        self.next_unit_id = next;
    }

    // Validation

    /// Post-load consistency checks.
    ///
    /// Every unit type must have a unit attachment, every attachment must
    /// validate, and every pair of players must have a relationship.
    pub fn validate(&self) -> Result<()> {
        for unit_type in self.unit_types.values() {
            if !unit_type
                .attachments
                .values()
                .any(|a| a.kind() == AttachmentKind::Unit)
            {
                return Err(Error::AttachmentNotFound {
                    target: format!("unit type {}", unit_type.name),
                    key: AttachmentKind::Unit.default_key().to_string(),
                });
            }
        }
        for attachable in self.all_attachables() {
            for attachment in attachable.attachments().values() {
                attachment.validate(self)?;
            }
        }
        for a in self.players.keys() {
            for b in self.players.keys() {
                self.relationship_between(a, b)?;
            }
            self.relationship_between(a, NULL_PLAYER)?;
        }
        Ok(())
    }

    fn all_attachables(&self) -> impl Iterator<Item = &dyn Attachable> {
        let unit_types = self.unit_types.values().map(|e| e as &dyn Attachable);
        let territories = self.territories.values().map(|e| e as &dyn Attachable);
        let resources = self.resources.values().map(|e| e as &dyn Attachable);
        let players = self.players.values().map(|e| e as &dyn Attachable);
        let relationship_types = self.relationship_types.values().map(|e| e as &dyn Attachable);
        let effects = self.territory_effects.values().map(|e| e as &dyn Attachable);
        let technologies = self.technologies.values().map(|e| e as &dyn Attachable);
        unit_types
            .chain(territories)
            .chain(resources)
            .chain(players)
            .chain(relationship_types)
            .chain(effects)
            .chain(technologies)
    }
}

impl Default for GameData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game() -> GameData {
        let mut data = GameData::new();
        data.players.insert("Russia".into(), Player::new("Russia"));
        data.players.insert("Germany".into(), Player::new("Germany"));
        data.territories
            .insert("Moscow".into(), Territory::new("Moscow", false));
        data.territories
            .insert("Berlin".into(), Territory::new("Berlin", false));
        data
    }

    #[test]
    fn test_builtin_relationship_types() {
        let data = GameData::new();
        assert_eq!(data.archetype(SELF_RELATION).unwrap(), Archetype::Allied);
        assert_eq!(data.archetype(NULL_RELATION).unwrap(), Archetype::War);
        assert_eq!(data.archetype(DEFAULT_WAR_RELATION).unwrap(), Archetype::War);
        assert_eq!(
            data.archetype(DEFAULT_ALLIED_RELATION).unwrap(),
            Archetype::Allied
        );
        assert_eq!(data.dice_sides, 6);
    }

    #[test]
    fn test_lookup_errors_name_the_kind() {
        let data = GameData::new();
        let err = data.territory("Atlantis").unwrap_err();
        assert_eq!(err, Error::not_found(EntityKind::Territory, "Atlantis"));
        assert_eq!(err.to_string(), "territory not found: Atlantis");
    }

    #[test]
    fn test_connections_are_symmetric() {
        let mut data = two_player_game();
        data.add_connection("Moscow", "Berlin").unwrap();
        assert_eq!(data.neighbors("Berlin").collect::<Vec<_>>(), vec!["Moscow"]);
        assert_eq!(data.neighbors("Moscow").collect::<Vec<_>>(), vec!["Berlin"]);
        assert!(data.add_connection("Moscow", "Atlantis").is_err());
    }

    #[test]
    fn test_attach_sets_trigger_owner() {
        let mut data = two_player_game();
        data.attach(
            EntityKind::Player,
            "Russia",
            Attachment::new(AttachmentKind::Trigger, "triggerAttachment_1"),
        )
        .unwrap();
        let trigger = data.find_trigger("triggerAttachment_1").unwrap();
        assert_eq!(trigger.attached_to.as_deref(), Some("Russia"));
        assert!(data.find_trigger("triggerAttachment_2").is_none());
    }

    #[test]
    fn test_attach_rejects_wrong_target() {
        let mut data = two_player_game();
        let result = data.attach(
            EntityKind::Territory,
            "Moscow",
            Attachment::new(AttachmentKind::Unit, "unitAttachment"),
        );
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_attachment_by_reference() {
        let mut data = two_player_game();
        data.attach(
            EntityKind::Territory,
            "Moscow",
            Attachment::new(AttachmentKind::Territory, "territoryAttachment"),
        )
        .unwrap();
        let reference = AttachmentRef::new(EntityKind::Territory, "Moscow", "territoryAttachment");
        data.attachment_mut(&reference)
            .unwrap()
            .set_property("production", "8")
            .unwrap();
        assert_eq!(
            data.attachment(&reference)
                .unwrap()
                .get_property("production")
                .unwrap(),
            "8"
        );
        let missing = AttachmentRef::new(EntityKind::Territory, "Berlin", "territoryAttachment");
        assert!(matches!(
            data.attachment(&missing),
            Err(Error::AttachmentNotFound { .. })
        ));
    }

    #[test]
    fn test_unit_support_is_found_on_any_unit_type() {
        let mut data = two_player_game();
        data.unit_types.insert("infantry".into(), UnitType::new("infantry"));
        data.unit_types.insert("artillery".into(), UnitType::new("artillery"));
        data.attach(
            EntityKind::UnitType,
            "artillery",
            Attachment::new(AttachmentKind::UnitSupport, "supportAttachmentArtillery"),
        )
        .unwrap();
        data.attach(
            EntityKind::UnitType,
            "infantry",
            Attachment::new(AttachmentKind::Unit, "supportAttachmentInfantry"),
        )
        .unwrap();

        assert_eq!(
            data.unit_support("supportAttachmentArtillery").unwrap(),
            AttachmentRef::new(
                EntityKind::UnitType,
                "artillery",
                "supportAttachmentArtillery"
            )
        );
        // right key, wrong kind
        assert!(matches!(
            data.unit_support("supportAttachmentInfantry"),
            Err(Error::AttachmentNotFound { .. })
        ));
    }

    #[test]
    fn test_unit_ids_are_unique() {
        let mut data = GameData::new();
        data.unit_types
            .insert("infantry".into(), UnitType::new("infantry"));
        let first = data.create_units("infantry", 2, Some("Russia")).unwrap();
        let second = data.create_units("infantry", 1, None).unwrap();
        assert_eq!(first.len(), 2);
        assert_ne!(first[1].id, second[0].id);
        assert!(second[0].owner.is_none());
        assert!(data.create_units("tank", 1, None).is_err());
    }

    #[test]
    fn test_validate_requires_every_relationship() {
        let mut data = two_player_game();
        data.relationships
            .set_self_relations(["Russia", "Germany"]);
        data.relationships
            .set_null_player_relations(NULL_PLAYER, ["Russia", "Germany"]);
        assert!(data.validate().is_err());
        data.relationships
            .set("Russia", "Germany", DEFAULT_WAR_RELATION, 0);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_unit_attachment() {
        let mut data = GameData::new();
        data.unit_types
            .insert("infantry".into(), UnitType::new("infantry"));
        assert!(matches!(
            data.validate(),
            Err(Error::AttachmentNotFound { .. })
        ));
    }

    #[test]
    fn test_technology_by_property() {
        let mut data = GameData::new();
        data.technologies.insert(
            "Jet Power".into(),
            TechAdvance::new("Jet Power", Some("jetPower".into())),
        );
        assert_eq!(data.technology("jetPower").unwrap().name, "Jet Power");
        assert_eq!(data.technology("Jet Power").unwrap().name, "Jet Power");
        assert!(data.technology("rocket").is_err());
    }

    #[test]
    fn test_ron_round_trip() {
        let data = two_player_game();
        let text = ron::to_string(&data).unwrap();
        let back: GameData = ron::from_str(&text).unwrap();
        assert_eq!(back, data);
    }
}
