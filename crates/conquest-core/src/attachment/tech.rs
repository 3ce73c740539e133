use super::{append_names, parse_int, unknown_property, Attachment, AttachmentKind, PropertyBag};
use crate::codec;
use crate::entity::Attachable;
use crate::error::Result;
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "attackBonus",
    "defenseBonus",
    "movementBonus",
    "productionBonus",
    "unitTypes",
];

/// Bonuses granted by a technology to the listed unit types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechAbilityAttachment {
    name: String,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    pub movement_bonus: i32,
    pub production_bonus: i32,
    pub unit_types: Vec<String>,
}

impl TechAbilityAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attack_bonus: 0,
            defense_bonus: 0,
            movement_bonus: 0,
            production_bonus: 0,
            unit_types: Vec::new(),
        }
    }

    /// The ability a built-in technology grants when the map gives it none.
    ///
    /// Jet power adds one to the defense of air units and long range air
    /// two to their movement. Increased factory production adds two to
    /// production. The other built-in technologies work through rules
    /// code and get an attachment with no bonuses.
    pub fn stock(name: &str, property: &str, data: &GameData) -> Self {
        let mut ability = Self::new(name);
        match property {
            "jetPower" => {
                ability.defense_bonus = 1;
                ability.unit_types = air_unit_types(data);
            }
            "longRangeAir" => {
                ability.movement_bonus = 2;
                ability.unit_types = air_unit_types(data);
            }
            "increasedFactoryProduction" => ability.production_bonus = 2,
            _ => {}
        }
        ability
    }
}

fn air_unit_types(data: &GameData) -> Vec<String> {
    let key = AttachmentKind::Unit.default_key();
    data.unit_types
        .values()
        .filter(|unit_type| {
            unit_type
                .attachment(key)
                .ok()
                .and_then(Attachment::as_unit)
                .is_some_and(|unit| unit.is_air)
        })
        .map(|unit_type| unit_type.name.clone())
        .collect()
}

impl PropertyBag for TechAbilityAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "attackBonus" => self.attack_bonus.to_string(),
            "defenseBonus" => self.defense_bonus.to_string(),
            "movementBonus" => self.movement_bonus.to_string(),
            "productionBonus" => self.production_bonus.to_string(),
            "unitTypes" => codec::join(&self.unit_types),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "attackBonus" => self.attack_bonus = parse_int(name, property, value)?,
            "defenseBonus" => self.defense_bonus = parse_int(name, property, value)?,
            "movementBonus" => self.movement_bonus = parse_int(name, property, value)?,
            "productionBonus" => self.production_bonus = parse_int(name, property, value)?,
            "unitTypes" => append_names(&mut self.unit_types, name, property, value)?,
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "attackBonus" => self.attack_bonus = 0,
            "defenseBonus" => self.defense_bonus = 0,
            "movementBonus" => self.movement_bonus = 0,
            "productionBonus" => self.production_bonus = 0,
            "unitTypes" => self.unit_types.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        for unit_type in &self.unit_types {
            data.unit_type(unit_type)?;
        }
        Ok(())
    }
}
