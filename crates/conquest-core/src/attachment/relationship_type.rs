//! What a relationship type means: its archetype and movement rights

use super::{invalid, parse_bool, unknown_property, PropertyBag};
use crate::error::Result;
use crate::model::GameData;
use crate::relationship::Archetype;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "archeType",
    "canMoveLandUnitsOverOwnedLand",
    "canMoveAirUnitsOverOwnedLand",
    "alliancesCanChainTogether",
    "isDefaultWarPosition",
    "canTakeOverOwnedTerritory",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTypeAttachment {
    name: String,
    pub archetype: Archetype,
    pub can_move_land_units_over_owned_land: bool,
    pub can_move_air_units_over_owned_land: bool,
    pub alliances_can_chain_together: bool,
    pub is_default_war_position: bool,
    pub can_take_over_owned_territory: bool,
}

impl RelationshipTypeAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            archetype: Archetype::War,
            can_move_land_units_over_owned_land: false,
            can_move_air_units_over_owned_land: false,
            alliances_can_chain_together: false,
            is_default_war_position: false,
            can_take_over_owned_territory: false,
        }
    }

    pub fn with_archetype(mut self, archetype: Archetype) -> Self {
        self.archetype = archetype;
        self
    }
}

impl PropertyBag for RelationshipTypeAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "archeType" => self.archetype.to_string(),
            "canMoveLandUnitsOverOwnedLand" => self.can_move_land_units_over_owned_land.to_string(),
            "canMoveAirUnitsOverOwnedLand" => self.can_move_air_units_over_owned_land.to_string(),
            "alliancesCanChainTogether" => self.alliances_can_chain_together.to_string(),
            "isDefaultWarPosition" => self.is_default_war_position.to_string(),
            "canTakeOverOwnedTerritory" => self.can_take_over_owned_territory.to_string(),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "archeType" => {
                self.archetype = value.parse().map_err(|_| {
                    invalid(name, format!("unknown archetype '{}'", value))
                })?
            }
            "canMoveLandUnitsOverOwnedLand" => {
                self.can_move_land_units_over_owned_land = parse_bool(name, property, value)?
            }
            "canMoveAirUnitsOverOwnedLand" => {
                self.can_move_air_units_over_owned_land = parse_bool(name, property, value)?
            }
            "alliancesCanChainTogether" => {
                self.alliances_can_chain_together = parse_bool(name, property, value)?
            }
            "isDefaultWarPosition" => {
                self.is_default_war_position = parse_bool(name, property, value)?
            }
            "canTakeOverOwnedTerritory" => {
                self.can_take_over_owned_territory = parse_bool(name, property, value)?
            }
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "archeType" => self.archetype = Archetype::War,
            "canMoveLandUnitsOverOwnedLand" => self.can_move_land_units_over_owned_land = false,
            "canMoveAirUnitsOverOwnedLand" => self.can_move_air_units_over_owned_land = false,
            "alliancesCanChainTogether" => self.alliances_can_chain_together = false,
            "isDefaultWarPosition" => self.is_default_war_position = false,
            "canTakeOverOwnedTerritory" => self.can_take_over_owned_territory = false,
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, _data: &GameData) -> Result<()> {
        if self.alliances_can_chain_together && self.archetype != Archetype::Allied {
            return Err(invalid(
                &self.name,
                "alliancesCanChainTogether requires the allied archetype",
            ));
        }
        Ok(())
    }
}
