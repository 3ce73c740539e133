use super::{append_names, parse_int, unknown_property, PropertyBag};
use crate::codec;
use crate::error::Result;
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "combatOffenseEffect",
    "combatDefenseEffect",
    "movementCostModifier",
    "unitsNotAllowed",
    "noBlitz",
];

/// Terrain modifiers shared by every territory carrying the effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryEffectAttachment {
    name: String,
    pub combat_offense_effect: i32,
    pub combat_defense_effect: i32,
    pub movement_cost_modifier: i32,
    pub units_not_allowed: Vec<String>,
    pub no_blitz: Vec<String>,
}

impl TerritoryEffectAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            combat_offense_effect: 0,
            combat_defense_effect: 0,
            movement_cost_modifier: 0,
            units_not_allowed: Vec::new(),
            no_blitz: Vec::new(),
        }
    }
}

impl PropertyBag for TerritoryEffectAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "combatOffenseEffect" => self.combat_offense_effect.to_string(),
            "combatDefenseEffect" => self.combat_defense_effect.to_string(),
            "movementCostModifier" => self.movement_cost_modifier.to_string(),
            "unitsNotAllowed" => codec::join(&self.units_not_allowed),
            "noBlitz" => codec::join(&self.no_blitz),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "combatOffenseEffect" => self.combat_offense_effect = parse_int(name, property, value)?,
            "combatDefenseEffect" => self.combat_defense_effect = parse_int(name, property, value)?,
            "movementCostModifier" => {
                self.movement_cost_modifier = parse_int(name, property, value)?
            }
            "unitsNotAllowed" => append_names(&mut self.units_not_allowed, name, property, value)?,
            "noBlitz" => append_names(&mut self.no_blitz, name, property, value)?,
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "combatOffenseEffect" => self.combat_offense_effect = 0,
            "combatDefenseEffect" => self.combat_defense_effect = 0,
            "movementCostModifier" => self.movement_cost_modifier = 0,
            "unitsNotAllowed" => self.units_not_allowed.clear(),
            "noBlitz" => self.no_blitz.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        for unit_type in self.units_not_allowed.iter().chain(&self.no_blitz) {
            data.unit_type(unit_type)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_not_allowed_accumulates() {
        let mut effect = TerritoryEffectAttachment::new("territoryEffectAttachment");
        effect
            .set_property("unitsNotAllowed", "conscript:veteran:champion")
            .unwrap();
        assert_eq!(effect.units_not_allowed.len(), 3);
        effect.set_property("unitsNotAllowed", "elite").unwrap();
        assert_eq!(
            effect.get_property("unitsNotAllowed").unwrap(),
            "conscript:veteran:champion:elite"
        );
    }
}
