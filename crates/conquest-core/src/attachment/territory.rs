//! Economic and strategic values of a territory

use super::{append_names, invalid, parse_bool, parse_int, unknown_property, PropertyBag};
use crate::codec;
use crate::error::Result;
use crate::identity::NULL_PLAYER;
use crate::model::GameData;
use serde::{Deserialize, Serialize};

const PROPERTIES: &[&str] = &[
    "production",
    "victoryCity",
    "capital",
    "originalOwner",
    "isImpassable",
    "kamikazeZone",
    "convoyRoute",
    "blockadeZone",
    "territoryEffect",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryAttachment {
    name: String,
    pub production: i32,
    pub victory_city: i32,
    /// Player whose capital this is.
    pub capital: Option<String>,
    pub original_owner: Option<String>,
    pub is_impassable: bool,
    pub kamikaze_zone: bool,
    pub convoy_route: bool,
    pub blockade_zone: bool,
    pub territory_effects: Vec<String>,
}

impl TerritoryAttachment {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            production: 0,
            victory_city: 0,
            capital: None,
            original_owner: None,
            is_impassable: false,
            kamikaze_zone: false,
            convoy_route: false,
            blockade_zone: false,
            territory_effects: Vec::new(),
        }
    }
}

fn optional_name(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl PropertyBag for TerritoryAttachment {
    fn name(&self) -> &str {
        &self.name
    }

    fn property_names(&self) -> &'static [&'static str] {
        PROPERTIES
    }

    fn get_property(&self, property: &str) -> Result<String> {
        Ok(match property {
            "production" => self.production.to_string(),
            "victoryCity" => self.victory_city.to_string(),
            "capital" => self.capital.clone().unwrap_or_default(),
            "originalOwner" => self.original_owner.clone().unwrap_or_default(),
            "isImpassable" => self.is_impassable.to_string(),
            "kamikazeZone" => self.kamikaze_zone.to_string(),
            "convoyRoute" => self.convoy_route.to_string(),
            "blockadeZone" => self.blockade_zone.to_string(),
            "territoryEffect" => codec::join(&self.territory_effects),
            _ => return Err(unknown_property(&self.name, property)),
        })
    }

    fn set_property(&mut self, property: &str, value: &str) -> Result<()> {
        let name = self.name.as_str();
        match property {
            "production" => self.production = parse_int(name, property, value)?,
            "victoryCity" => self.victory_city = parse_int(name, property, value)?,
            "capital" => self.capital = optional_name(value),
            "originalOwner" => self.original_owner = optional_name(value),
            "isImpassable" => self.is_impassable = parse_bool(name, property, value)?,
            "kamikazeZone" => self.kamikaze_zone = parse_bool(name, property, value)?,
            "convoyRoute" => self.convoy_route = parse_bool(name, property, value)?,
            "blockadeZone" => self.blockade_zone = parse_bool(name, property, value)?,
            "territoryEffect" => append_names(&mut self.territory_effects, name, property, value)?,
            _ => return Err(unknown_property(name, property)),
        }
        Ok(())
    }

    fn reset_property(&mut self, property: &str) -> Result<()> {
        match property {
            "production" => self.production = 0,
            "victoryCity" => self.victory_city = 0,
            "capital" => self.capital = None,
            "originalOwner" => self.original_owner = None,
            "isImpassable" => self.is_impassable = false,
            "kamikazeZone" => self.kamikaze_zone = false,
            "convoyRoute" => self.convoy_route = false,
            "blockadeZone" => self.blockade_zone = false,
            "territoryEffect" => self.territory_effects.clear(),
            _ => return Err(unknown_property(&self.name, property)),
        }
        Ok(())
    }

    fn validate(&self, data: &GameData) -> Result<()> {
        if self.production < 0 {
            return Err(invalid(&self.name, "production must not be negative"));
        }
        if let Some(capital) = &self.capital {
            data.player(capital)?;
        }
        if let Some(owner) = self.original_owner.as_deref().filter(|o| *o != NULL_PLAYER) {
            data.player(owner)?;
        }
        for effect in &self.territory_effects {
            data.territory_effect(effect)?;
        }
        Ok(())
    }
}
