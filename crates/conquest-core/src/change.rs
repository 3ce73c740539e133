//! Reversible state changes
//!
//! Nothing outside loading mutates [`GameData`] directly. Rules code builds
//! [`Change`]s, collects them into a [`ChangeSet`] and hands the set to
//! whoever owns the data, which applies it with [`GameData::apply`].
//!
//! Every change carries enough of the prior state to be undone:
//! `data.apply(&set)` followed by `data.apply(&set.invert())` restores
//! `data`. A set is applied atomically; if one change fails, the ones
//! before it are rolled back.

use crate::attachment::PropertyBag;
use crate::entity::Unit;
use crate::error::{Error, Result};
use crate::identity::{AttachmentRef, EntityKind, UnitId};
use crate::model::GameData;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where a group of units sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitLocation {
    Territory(String),
    /// A player's pool of purchased, unplaced units.
    Held(String),
}

/// A single reversible mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    /// Set one attachment property from its encoded form.
    AttachmentProperty {
        attachment: AttachmentRef,
        property: String,
        /// Encoded value before the change.
        previous: String,
        /// Encoded value to set; empty clears.
        value: String,
        /// Reset the property before setting `value`.
        clear_first: bool,
        /// Encoded value after the change.
        resulting: String,
    },
    AddProductionRule {
        frontier: String,
        rule: String,
    },
    RemoveProductionRule {
        frontier: String,
        rule: String,
    },
    ProductionFrontier {
        player: String,
        previous: Option<String>,
        frontier: Option<String>,
    },
    Relationship {
        player1: String,
        player2: String,
        previous_type: String,
        previous_round: i32,
        relationship_type: String,
        round: i32,
    },
    AddTech {
        player: String,
        tech: String,
    },
    RemoveTech {
        player: String,
        tech: String,
    },
    AddAvailableTech {
        player: String,
        category: String,
        tech: String,
    },
    RemoveAvailableTech {
        player: String,
        category: String,
        tech: String,
    },
    AddUnits {
        location: UnitLocation,
        units: Vec<Unit>,
    },
    RemoveUnits {
        location: UnitLocation,
        units: Vec<Unit>,
    },
    Ownership {
        territory: String,
        previous: Option<String>,
        owner: Option<String>,
    },
    /// Add `quantity` (possibly negative) of a resource.
    Resource {
        player: String,
        resource: String,
        quantity: i64,
    },
    /// Move the unit id counter from `previous` to `next`, reserving the
    /// ids in between for units created by the same set.
    UnitIds {
        previous: u64,
        next: u64,
    },
}

impl Change {
    /// The change that undoes this one.
    pub fn invert(&self) -> Change {
        match self.clone() {
            Change::AttachmentProperty {
                attachment,
                property,
                previous,
                resulting,
                ..
            } => Change::AttachmentProperty {
                attachment,
                property,
                previous: resulting,
                value: previous.clone(),
                clear_first: true,
                resulting: previous,
            },
            Change::AddProductionRule { frontier, rule } => {
                Change::RemoveProductionRule { frontier, rule }
            }
            Change::RemoveProductionRule { frontier, rule } => {
                Change::AddProductionRule { frontier, rule }
            }
            Change::ProductionFrontier {
                player,
                previous,
                frontier,
            } => Change::ProductionFrontier {
                player,
                previous: frontier,
                frontier: previous,
            },
            Change::Relationship {
                player1,
                player2,
                previous_type,
                previous_round,
                relationship_type,
                round,
            } => Change::Relationship {
                player1,
                player2,
                previous_type: relationship_type,
                previous_round: round,
                relationship_type: previous_type,
                round: previous_round,
            },
            Change::AddTech { player, tech } => Change::RemoveTech { player, tech },
            Change::RemoveTech { player, tech } => Change::AddTech { player, tech },
            Change::AddAvailableTech {
                player,
                category,
                tech,
            } => Change::RemoveAvailableTech {
                player,
                category,
                tech,
            },
            Change::RemoveAvailableTech {
                player,
                category,
                tech,
            } => Change::AddAvailableTech {
                player,
                category,
                tech,
            },
            Change::AddUnits { location, units } => Change::RemoveUnits { location, units },
            Change::RemoveUnits { location, units } => Change::AddUnits { location, units },
            Change::Ownership {
                territory,
                previous,
                owner,
            } => Change::Ownership {
                territory,
                previous: owner,
                owner: previous,
            },
            Change::Resource {
                player,
                resource,
                quantity,
            } => Change::Resource {
                player,
                resource,
                quantity: -quantity,
            },
            Change::UnitIds { previous, next } => Change::UnitIds {
                previous: next,
                next: previous,
            },
        }
    }
}

/// An ordered collection of changes applied as one unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    /// Create a new empty ChangeSet
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Extend this ChangeSet with changes from another
    pub fn extend(&mut self, other: ChangeSet) {
        self.changes.extend(other.changes);
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// The set that undoes this one: each change inverted, in reverse order.
    pub fn invert(&self) -> ChangeSet {
        ChangeSet {
            changes: self.changes.iter().rev().map(Change::invert).collect(),
        }
    }
}

impl From<Change> for ChangeSet {
    fn from(change: Change) -> Self {
        ChangeSet {
            changes: vec![change],
        }
    }
}

impl FromIterator<Change> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        ChangeSet {
            changes: iter.into_iter().collect(),
        }
    }
}

impl GameData {
    /// Apply every change in order, rolling back on the first failure.
    pub fn apply(&mut self, changes: &ChangeSet) -> Result<()> {
        for (applied, change) in changes.iter().enumerate() {
            if let Err(err) = self.apply_change(change) {
                warn!(?err, "change failed, rolling back {} applied changes", applied);
                for done in changes.changes[..applied].iter().rev() {
                    if let Err(rollback) = self.apply_change(&done.invert()) {
                        warn!(?rollback, "rollback step failed");
                    }
                }
                return Err(err);
            }
        }
        debug!(count = changes.len(), "applied change set");
        Ok(())
    }

    /// Apply one change.
    pub fn apply_change(&mut self, change: &Change) -> Result<()> {
        match change {
            Change::AttachmentProperty {
                attachment,
                property,
                value,
                clear_first,
                ..
            } => {
                // Edit a copy so a rejected value leaves the attachment as it was.
                let target = self.attachment_mut(attachment)?;
                let mut edited = target.clone();
                if *clear_first || value.is_empty() {
                    edited.reset_property(property)?;
                }
                if !value.is_empty() {
                    edited.set_property(property, value)?;
                }
                *target = edited;
            }
            Change::AddProductionRule { frontier, rule } => {
                self.production_rule(rule)?;
                let target = self.production_frontier_mut(frontier)?;
                if target.contains(rule) {
                    return Err(Error::InvalidOperation(format!(
                        "{} already offers {}",
                        frontier, rule
                    )));
                }
                target.rules.push(rule.clone());
            }
            Change::RemoveProductionRule { frontier, rule } => {
                let target = self.production_frontier_mut(frontier)?;
                let index = target
                    .rules
                    .iter()
                    .position(|r| r == rule)
                    .ok_or_else(|| Error::not_found(EntityKind::ProductionRule, rule))?;
                target.rules.remove(index);
            }
            Change::ProductionFrontier {
                player, frontier, ..
            } => {
                if let Some(frontier) = frontier {
                    self.production_frontier(frontier)?;
                }
                self.player_mut(player)?.production_frontier = frontier.clone();
            }
            Change::Relationship {
                player1,
                player2,
                relationship_type,
                round,
                ..
            } => {
                for player in [player1, player2] {
                    if !self.is_player_or_null(player) {
                        return Err(Error::not_found(EntityKind::Player, player));
                    }
                }
                self.relationship_type(relationship_type)?;
                self.relationships
                    .set(player1, player2, relationship_type, *round);
            }
            Change::AddTech { player, tech } => {
                self.technology(tech)?;
                if !self.player_mut(player)?.techs.insert(tech.clone()) {
                    return Err(Error::InvalidOperation(format!(
                        "{} already has {}",
                        player, tech
                    )));
                }
            }
            Change::RemoveTech { player, tech } => {
                if !self.player_mut(player)?.techs.shift_remove(tech) {
                    return Err(Error::not_found(EntityKind::Technology, tech));
                }
            }
            Change::AddAvailableTech {
                player,
                category,
                tech,
            } => {
                self.technology(tech)?;
                let techs = self
                    .player_mut(player)?
                    .tech_categories
                    .get_mut(category)
                    .ok_or_else(|| Error::not_found(EntityKind::TechnologyCategory, category))?;
                if !techs.insert(tech.clone()) {
                    return Err(Error::InvalidOperation(format!(
                        "{} already offers {}",
                        category, tech
                    )));
                }
            }
            Change::RemoveAvailableTech {
                player,
                category,
                tech,
            } => {
                let techs = self
                    .player_mut(player)?
                    .tech_categories
                    .get_mut(category)
                    .ok_or_else(|| Error::not_found(EntityKind::TechnologyCategory, category))?;
                if !techs.shift_remove(tech) {
                    return Err(Error::not_found(EntityKind::Technology, tech));
                }
            }
            Change::AddUnits { location, units } => {
                self.units_at_mut(location)?.extend(units.iter().cloned());
            }
            Change::RemoveUnits { location, units } => {
                let present = self.units_at_mut(location)?;
                let ids: Vec<UnitId> = units.iter().map(|u| u.id).collect();
                if let Some(missing) = ids.iter().find(|id| !present.iter().any(|u| u.id == **id)) {
                    return Err(Error::InvalidOperation(format!(
                        "{} is not at {:?}",
                        missing, location
                    )));
                }
                present.retain(|u| !ids.contains(&u.id));
            }
            Change::Ownership {
                territory, owner, ..
            } => {
                self.territory_mut(territory)?.owner = owner.clone();
            }
            Change::Resource {
                player,
                resource,
                quantity,
            } => {
                self.resource(resource)?;
                let holder = self.player_mut(player)?;
                let balance = holder.resource(resource);
                if balance + quantity < 0 {
                    return Err(Error::InvalidOperation(format!(
                        "{} cannot spend {} {} holding {}",
                        player, -quantity, resource, balance
                    )));
                }
                holder.resources.insert(resource.clone(), balance + quantity);
            }
            Change::UnitIds { previous, next } => {
                if self.next_unit_id() != *previous {
                    return Err(Error::InvalidOperation(format!(
                        "unit ids start at {}, not {}",
                        self.next_unit_id(),
                        previous
                    )));
                }
                self.set_next_unit_id(*next);
            }
        }
        Ok(())
    }

    fn units_at_mut(&mut self, location: &UnitLocation) -> Result<&mut Vec<Unit>> {
        match location {
            UnitLocation::Territory(name) => Ok(&mut self.territory_mut(name)?.units),
            UnitLocation::Held(player) => Ok(&mut self.player_mut(player)?.held_units),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::{Attachment, AttachmentKind};
    use crate::entity::{Frontier, Player, Resource, Rule, TechAdvance, Territory, UnitType};

    fn sample_game() -> GameData {
        let mut data = GameData::new();
        let mut russia = Player::new("Russia");
        russia.resources.insert("PUs".into(), 10);
        russia.production_frontier = Some("production".into());
        russia
            .tech_categories
            .insert("airCategory".into(), Default::default());
        data.players.insert("Russia".into(), russia);
        data.players.insert("Germany".into(), Player::new("Germany"));
        data.resources.insert("PUs".into(), Resource::new("PUs"));
        data.unit_types
            .insert("infantry".into(), UnitType::new("infantry"));
        data.technologies.insert(
            "jetPower".into(),
            TechAdvance::new("jetPower", Some("jetPower".into())),
        );
        data.production_rules
            .insert("buyInfantry".into(), Rule::new("buyInfantry"));
        data.production_frontiers
            .insert("production".into(), Frontier::new("production"));
        let mut moscow = Territory::new("Moscow", false);
        moscow.owner = Some("Russia".into());
        data.territories.insert("Moscow".into(), moscow);
        data.attach(
            EntityKind::UnitType,
            "infantry",
            Attachment::new(AttachmentKind::Unit, "unitAttachment"),
        )
        .unwrap();
        data.relationships
            .set("Russia", "Germany", crate::relationship::DEFAULT_WAR_RELATION, 0);
        data
    }

    fn every_kind_of_change(data: &mut GameData) -> ChangeSet {
        let units = data.create_units("infantry", 2, Some("Russia")).unwrap();
        let mut set = ChangeSet::new();
        set.push(Change::AttachmentProperty {
            attachment: AttachmentRef::new(EntityKind::UnitType, "infantry", "unitAttachment"),
            property: "movement".into(),
            previous: "0".into(),
            value: "2".into(),
            clear_first: false,
            resulting: "2".into(),
        });
        set.push(Change::AddProductionRule {
            frontier: "production".into(),
            rule: "buyInfantry".into(),
        });
        set.push(Change::ProductionFrontier {
            player: "Germany".into(),
            previous: None,
            frontier: Some("production".into()),
        });
        set.push(Change::Relationship {
            player1: "Germany".into(),
            player2: "Russia".into(),
            previous_type: crate::relationship::DEFAULT_WAR_RELATION.into(),
            previous_round: 0,
            relationship_type: crate::relationship::DEFAULT_ALLIED_RELATION.into(),
            round: 2,
        });
        set.push(Change::AddTech {
            player: "Russia".into(),
            tech: "jetPower".into(),
        });
        set.push(Change::AddAvailableTech {
            player: "Russia".into(),
            category: "airCategory".into(),
            tech: "jetPower".into(),
        });
        set.push(Change::AddUnits {
            location: UnitLocation::Territory("Moscow".into()),
            units: units.clone(),
        });
        set.push(Change::AddUnits {
            location: UnitLocation::Held("Russia".into()),
            units,
        });
        set.push(Change::Ownership {
            territory: "Moscow".into(),
            previous: Some("Russia".into()),
            owner: Some("Germany".into()),
        });
        set.push(Change::Resource {
            player: "Russia".into(),
            resource: "PUs".into(),
            quantity: -4,
        });
        set
    }

    #[test]
    fn test_change_set_empty() {
        let set = ChangeSet::new();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_apply_then_invert_restores() {
        let mut data = sample_game();
        let set = every_kind_of_change(&mut data);
        let before = data.clone();

        data.apply(&set).unwrap();
        assert_eq!(data.territory("Moscow").unwrap().owner.as_deref(), Some("Germany"));
        assert_eq!(data.player("Russia").unwrap().resource("PUs"), 6);
        assert_eq!(data.player("Russia").unwrap().held_units.len(), 2);
        assert_ne!(data, before);

        data.apply(&set.invert()).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn test_failed_set_rolls_back() {
        let mut data = sample_game();
        let before = data.clone();
        let mut set = ChangeSet::new();
        set.push(Change::Ownership {
            territory: "Moscow".into(),
            previous: Some("Russia".into()),
            owner: None,
        });
        set.push(Change::Resource {
            player: "Russia".into(),
            resource: "PUs".into(),
            quantity: -11,
        });
        assert!(data.apply(&set).is_err());
        assert_eq!(data, before);
    }

    #[test]
    fn test_property_invert_clears_first() {
        let change = Change::AttachmentProperty {
            attachment: AttachmentRef::new(EntityKind::UnitType, "infantry", "unitAttachment"),
            property: "canBeCapturedOnEnteringBy".into(),
            previous: "Russia".into(),
            value: "Germany".into(),
            clear_first: false,
            resulting: "Russia:Germany".into(),
        };
        let Change::AttachmentProperty {
            previous,
            value,
            clear_first,
            resulting,
            ..
        } = change.invert()
        else {
            panic!("wrong variant");
        };
        assert_eq!(previous, "Russia:Germany");
        assert_eq!(value, "Russia");
        assert!(clear_first);
        assert_eq!(resulting, "Russia");
    }

    #[test]
    fn test_rejected_value_leaves_property_alone() {
        let mut data = sample_game();
        let movement = AttachmentRef::new(EntityKind::UnitType, "infantry", "unitAttachment");
        data.apply_change(&Change::AttachmentProperty {
            attachment: movement.clone(),
            property: "movement".into(),
            previous: "0".into(),
            value: "2".into(),
            clear_first: false,
            resulting: "2".into(),
        })
        .unwrap();
        let before = data.clone();

        let result = data.apply_change(&Change::AttachmentProperty {
            attachment: movement.clone(),
            property: "movement".into(),
            previous: "2".into(),
            value: "fast".into(),
            clear_first: true,
            resulting: "fast".into(),
        });
        assert!(matches!(result, Err(Error::Decode { .. })));
        assert_eq!(
            data.attachment(&movement)
                .unwrap()
                .get_property("movement")
                .unwrap(),
            "2"
        );
        assert_eq!(data, before);
    }

    #[test]
    fn test_reserved_unit_ids_are_released_by_invert() {
        let mut data = sample_game();
        let before = data.clone();
        let first = data.next_unit_id();
        let units = data.build_units("infantry", 3, Some("Russia"), first).unwrap();
        let mut set = ChangeSet::from(Change::UnitIds {
            previous: first,
            next: first + 3,
        });
        set.push(Change::AddUnits {
            location: UnitLocation::Territory("Moscow".into()),
            units,
        });

        data.apply(&set).unwrap();
        assert_eq!(data.next_unit_id(), first + 3);
        let moscow = &data.territory("Moscow").unwrap().units;
        assert_eq!(moscow[2].id, UnitId::new(first + 2));

        data.apply(&set.invert()).unwrap();
        assert_eq!(data.next_unit_id(), first);
        assert_eq!(data, before);
    }

    #[test]
    fn test_stale_unit_id_reservation_fails() {
        let mut data = sample_game();
        let first = data.next_unit_id();
        let result = data.apply_change(&Change::UnitIds {
            previous: first + 1,
            next: first + 2,
        });
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
        assert_eq!(data.next_unit_id(), first);
    }

    #[test]
    fn test_remove_missing_units_fails() {
        let mut data = sample_game();
        let units = data.create_units("infantry", 1, Some("Russia")).unwrap();
        let result = data.apply_change(&Change::RemoveUnits {
            location: UnitLocation::Territory("Moscow".into()),
            units,
        });
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_change_set_serialization() {
        let set: ChangeSet = vec![Change::AddTech {
            player: "Russia".into(),
            tech: "jetPower".into(),
        }]
        .into_iter()
        .collect();
        let text = ron::to_string(&set).expect("serialize");
        let back: ChangeSet = ron::from_str(&text).expect("deserialize");
        assert_eq!(back, set);
    }
}
