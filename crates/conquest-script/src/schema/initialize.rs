//! Starting ownership, units, resources and relationships

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InitializeDef {
    pub owners: Vec<OwnerDef>,
    pub unit_placements: Vec<UnitPlacementDef>,
    pub held_units: Vec<HeldUnitsDef>,
    pub resources_given: Vec<ResourceGivenDef>,
    /// When given, replaces the relationships derived from alliances.
    pub relationships: Option<Vec<RelationshipDef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerDef {
    pub territory: String,
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitPlacementDef {
    pub unit_type: String,
    pub territory: String,
    pub quantity: u32,
    /// Blank for the null player.
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub hits_taken: i32,
    #[serde(default)]
    pub unit_damage: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldUnitsDef {
    pub unit_type: String,
    pub player: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceGivenDef {
    pub player: String,
    pub resource: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipDef {
    pub relationship_type: String,
    pub player1: String,
    pub player2: String,
    /// Round the relationship started in.
    #[serde(default)]
    pub round_value: i32,
}
