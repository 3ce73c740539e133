//! Combat and movement stats of a unit type

use super::{append_names, invalid, parse_bool, parse_int, unknown_property, PropertyBag};
use crate::codec;
use crate::error::Result;
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "movement",
    "attack",
    "defense",
    "hitPoints",
    "isAir",
    "isSea",
    "canBlitz",
    "isInfrastructure",
    "transportCapacity",
    "transportCost",
    "canBeCapturedOnEnteringBy",
];

/// Stats every unit type must carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitAttachment {
    name: String,
    pub movement: i32,
    pub attack: i32,
    pub defense: i32,
    pub hit_points: i32,
    pub is_air: bool,
    pub is_sea: bool,
    pub can_blitz: bool,
    pub is_infrastructure: bool,
    /// -1 when the unit cannot transport.
    pub transport_capacity: i32,
    /// -1 when the unit cannot be transported.
    pub transport_cost: i32,
    /// Players that capture this unit by entering its territory.
    pub can_be_captured_on_entering_by: Vec<String>,
}

impl UnitAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            movement: 0,
            attack: 0,
            defense: 0,
            hit_points: 1,
            is_air: false,
            is_sea: false,
            can_blitz: false,
            is_infrastructure: false,
            transport_capacity: -1,
            transport_cost: -1,
            can_be_captured_on_entering_by: Vec::new(),
        }
    }
}

impl PropertyBag for UnitAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "movement" => self.movement.to_string(),
            "attack" => self.attack.to_string(),
            "defense" => self.defense.to_string(),
            "hitPoints" => self.hit_points.to_string(),
            "isAir" => self.is_air.to_string(),
            "isSea" => self.is_sea.to_string(),
            "canBlitz" => self.can_blitz.to_string(),
            "isInfrastructure" => self.is_infrastructure.to_string(),
            "transportCapacity" => self.transport_capacity.to_string(),
            "transportCost" => self.transport_cost.to_string(),
            "canBeCapturedOnEnteringBy" => codec::join(&self.can_be_captured_on_entering_by),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "movement" => self.movement = parse_int(name, property, value)?,
            "attack" => self.attack = parse_int(name, property, value)?,
            "defense" => self.defense = parse_int(name, property, value)?,
            "hitPoints" => self.hit_points = parse_int(name, property, value)?,
            "isAir" => self.is_air = parse_bool(name, property, value)?,
            "isSea" => self.is_sea = parse_bool(name, property, value)?,
            "canBlitz" => self.can_blitz = parse_bool(name, property, value)?,
            "isInfrastructure" => self.is_infrastructure = parse_bool(name, property, value)?,
            "transportCapacity" => self.transport_capacity = parse_int(name, property, value)?,
            "transportCost" => self.transport_cost = parse_int(name, property, value)?,
            "canBeCapturedOnEnteringBy" => append_names(
                &mut self.can_be_captured_on_entering_by,
                name,
                property,
                value,
            )?,
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        let defaults = Self::new(&self.name);
        match property {
            "movement" => self.movement = defaults.movement,
            "attack" => self.attack = defaults.attack,
            "defense" => self.defense = defaults.defense,
            "hitPoints" => self.hit_points = defaults.hit_points,
            "isAir" => self.is_air = defaults.is_air,
            "isSea" => self.is_sea = defaults.is_sea,
            "canBlitz" => self.can_blitz = defaults.can_blitz,
            "isInfrastructure" => self.is_infrastructure = defaults.is_infrastructure,
            "transportCapacity" => self.transport_capacity = defaults.transport_capacity,
            "transportCost" => self.transport_cost = defaults.transport_cost,
            "canBeCapturedOnEnteringBy" => self.can_be_captured_on_entering_by.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        if self.hit_points < 1 {
            return Err(invalid(&self.name, "hitPoints must be at least 1"));
        }
        if self.movement < 0 || self.attack < 0 || self.defense < 0 {
            return Err(invalid(
                &self.name,
                "movement, attack and defense must not be negative",
            ));
        }
        if self.is_air && self.is_sea {
            return Err(invalid(&self.name, "a unit cannot be both air and sea"));
        }
        for player in &self.can_be_captured_on_entering_by {
            data.player(player)?;
        }
        Ok(())
    }
}
