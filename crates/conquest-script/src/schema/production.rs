//! Production, repair and technology sections

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionDef {
    pub production_rules: Vec<RuleDef>,
    pub production_frontiers: Vec<FrontierDef>,
    pub player_production: Vec<PlayerFrontierDef>,
    pub repair_rules: Vec<RuleDef>,
    pub repair_frontiers: Vec<FrontierDef>,
    pub player_repair: Vec<PlayerFrontierDef>,
}

/// A production or repair rule; both lists must be non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    /// Resources paid.
    pub costs: Vec<QuantityDef>,
    /// Resources or unit types received.
    pub results: Vec<QuantityDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityDef {
    pub name: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierDef {
    pub name: String,
    pub rules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerFrontierDef {
    pub player: String,
    pub frontier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnologyDef {
    pub technologies: Vec<TechDef>,
    pub player_techs: Vec<PlayerTechDef>,
}

/// A technology; `tech` names the built-in ability it grants, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechDef {
    pub name: String,
    #[serde(default)]
    pub tech: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTechDef {
    pub player: String,
    pub categories: Vec<CategoryDef>,
}

/// A research category and the technologies in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    #[serde(default)]
    pub techs: Vec<String>,
}
