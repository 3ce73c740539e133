use super::{append_names, invalid, parse_bool, parse_int, unknown_property, PropertyBag};
use crate::codec;
use crate::error::Result;
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "vps",
    "captureVps",
    "retainCapitalNumber",
    "retainCapitalProduceNumber",
    "productionPerXTerritories",
    "destroysPUs",
    "giveUnitControl",
    "captureUnitOnEnteringBy",
];

/// Per-player rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAttachment {
    name: String,
    pub vps: i32,
    pub capture_vps: i32,
    pub retain_capital_number: i32,
    pub retain_capital_produce_number: i32,
    /// Encoded `[count:]<unitType>` bonus units; kept verbatim.
    pub production_per_x_territories: Vec<String>,
    pub destroys_pus: bool,
    pub give_unit_control: Vec<String>,
    pub capture_unit_on_entering_by: Vec<String>,
}

impl PlayerAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vps: 0,
            capture_vps: 0,
            retain_capital_number: 1,
            retain_capital_produce_number: 1,
            production_per_x_territories: Vec::new(),
            destroys_pus: false,
            give_unit_control: Vec::new(),
            capture_unit_on_entering_by: Vec::new(),
        }
    }
}

impl PropertyBag for PlayerAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "vps" => self.vps.to_string(),
            "captureVps" => self.capture_vps.to_string(),
            "retainCapitalNumber" => self.retain_capital_number.to_string(),
            "retainCapitalProduceNumber" => self.retain_capital_produce_number.to_string(),
            "productionPerXTerritories" => codec::join(&self.production_per_x_territories),
            "destroysPUs" => self.destroys_pus.to_string(),
            "giveUnitControl" => codec::join(&self.give_unit_control),
            "captureUnitOnEnteringBy" => codec::join(&self.capture_unit_on_entering_by),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "vps" => self.vps = parse_int(name, property, value)?,
            "captureVps" => self.capture_vps = parse_int(name, property, value)?,
            "retainCapitalNumber" => self.retain_capital_number = parse_int(name, property, value)?,
            "retainCapitalProduceNumber" => {
                self.retain_capital_produce_number = parse_int(name, property, value)?
            }
            "productionPerXTerritories" => {
                append_names(&mut self.production_per_x_territories, name, property, value)?
            }
            "destroysPUs" => self.destroys_pus = parse_bool(name, property, value)?,
            "giveUnitControl" => append_names(&mut self.give_unit_control, name, property, value)?,
            "captureUnitOnEnteringBy" => {
                append_names(&mut self.capture_unit_on_entering_by, name, property, value)?
            }
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "vps" => self.vps = 0,
            "captureVps" => self.capture_vps = 0,
            "retainCapitalNumber" => self.retain_capital_number = 1,
            "retainCapitalProduceNumber" => self.retain_capital_produce_number = 1,
            "productionPerXTerritories" => self.production_per_x_territories.clear(),
            "destroysPUs" => self.destroys_pus = false,
            "giveUnitControl" => self.give_unit_control.clear(),
            "captureUnitOnEnteringBy" => self.capture_unit_on_entering_by.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        if self.retain_capital_number < 0 {
            return Err(invalid(&self.name, "retainCapitalNumber must not be negative"));
        }
        for player in self
            .give_unit_control
            .iter()
            .chain(&self.capture_unit_on_entering_by)
        {
            data.player(player)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_value_keeps_separators() {
        let mut player = PlayerAttachment::new("playerAttachment");
        player
            .set_property("productionPerXTerritories", "3:infantry")
            .unwrap();
        assert_eq!(
            player.get_property("productionPerXTerritories").unwrap(),
            "3:infantry"
        );
        assert_eq!(player.get_property("retainCapitalNumber").unwrap(), "1");
    }
}
