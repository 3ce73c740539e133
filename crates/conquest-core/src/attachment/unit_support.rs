use super::{append_names, parse_bool, parse_int, unknown_property, PropertyBag};
use crate::codec;
use crate::error::Result;
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "unitType",
    "offence",
    "defence",
    "bonus",
    "number",
    "bonusType",
    "players",
];

/// A combat bonus that units of one type lend to nearby units
///
/// Only the listed players' units give the support; triggers add and
/// remove players as the game goes on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSupportAttachment {
    name: String,
    /// The unit types that receive the support.
    pub unit_type: Vec<String>,
    pub offence: bool,
    pub defence: bool,
    pub bonus: i32,
    /// How many units each supporting unit covers.
    pub number: i32,
    pub bonus_type: String,
    pub players: Vec<String>,
}

impl UnitSupportAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit_type: Vec::new(),
            offence: false,
            defence: false,
            bonus: 0,
            number: 0,
            bonus_type: String::new(),
            players: Vec::new(),
        }
    }

    pub fn supports(&self, player: &str) -> bool {
        self.players.iter().any(|p| p == player)
    }
}

impl PropertyBag for UnitSupportAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "unitType" => codec::join(&self.unit_type),
            "offence" => self.offence.to_string(),
            "defence" => self.defence.to_string(),
            "bonus" => self.bonus.to_string(),
            "number" => self.number.to_string(),
            "bonusType" => self.bonus_type.clone(),
            "players" => codec::join(&self.players),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "unitType" => append_names(&mut self.unit_type, name, property, value)?,
            "offence" => self.offence = parse_bool(name, property, value)?,
            "defence" => self.defence = parse_bool(name, property, value)?,
            "bonus" => self.bonus = parse_int(name, property, value)?,
            "number" => self.number = parse_int(name, property, value)?,
            "bonusType" => self.bonus_type = value.to_string(),
            "players" => append_names(&mut self.players, name, property, value)?,
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "unitType" => self.unit_type.clear(),
            "offence" => self.offence = false,
            "defence" => self.defence = false,
            "bonus" => self.bonus = 0,
            "number" => self.number = 0,
            "bonusType" => self.bonus_type.clear(),
            "players" => self.players.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        for unit_type in &self.unit_type {
            data.unit_type(unit_type)?;
        }
        for player in &self.players {
            data.player(player)?;
        }
        Ok(())
    }
}
