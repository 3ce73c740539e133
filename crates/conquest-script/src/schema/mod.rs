//! Schema of a RON map definition
//!
//! A map is one [`GameDocument`]. Sections the loader cannot do without
//! (`info`, `players`, `map`, `game_play`) are required; every other
//! section may be left out.

pub mod attachment;
pub mod initialize;
pub mod map;
pub mod production;

pub use attachment::{AttachmentDef, OptionDef, VariableDef};
pub use initialize::{
    HeldUnitsDef, InitializeDef, OwnerDef, RelationshipDef, ResourceGivenDef, UnitPlacementDef,
};
pub use map::{
    AllianceDef, ConnectionDef, DelegateDef, GamePlayDef, MapDef, PlayerDef, PlayerList,
    PropertyDef, PropertyKind, ResourceDef, StepDef, TerritoryDef,
};
pub use production::{
    CategoryDef, FrontierDef, PlayerFrontierDef, PlayerTechDef, ProductionDef, QuantityDef,
    RuleDef, TechDef, TechnologyDef,
};

use serde::{Deserialize, Serialize};

/// A complete map definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameDocument {
    pub info: Info,
    #[serde(default)]
    pub engine: Option<EngineRequirement>,
    #[serde(default)]
    pub dice_sides: Option<i32>,
    pub players: PlayerList,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
    pub map: MapDef,
    #[serde(default)]
    pub resources: Vec<ResourceDef>,
    /// Unit type names.
    #[serde(default)]
    pub units: Vec<String>,
    /// Relationship type names beyond the built-in ones.
    #[serde(default)]
    pub relationship_types: Vec<String>,
    #[serde(default)]
    pub territory_effects: Vec<String>,
    pub game_play: GamePlayDef,
    #[serde(default)]
    pub production: Option<ProductionDef>,
    /// When absent every player shares the built-in technologies.
    #[serde(default)]
    pub technology: Option<TechnologyDef>,
    #[serde(default)]
    pub variables: Vec<VariableDef>,
    #[serde(default)]
    pub attachments: Vec<AttachmentDef>,
    #[serde(default)]
    pub initialize: Option<InitializeDef>,
}

/// Game name and version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Engine the map was written for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineRequirement {
    /// `major.minor[.point]`
    pub minimum_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document() {
        let ron_str = r#"
        (
            info: (name: "Skirmish"),
            players: (players: [(name: "Keoland")]),
            map: (territories: [(name: "Corusk Pass")]),
            game_play: (),
        )
        "#;

        let doc: GameDocument = ron::from_str(ron_str).unwrap();
        assert_eq!(doc.info.name, "Skirmish");
        assert_eq!(doc.info.version, "");
        assert!(doc.engine.is_none());
        assert!(doc.technology.is_none());
        assert_eq!(doc.players.players[0].default_type, "Human");
        assert!(!doc.map.territories[0].water);
    }

    #[test]
    fn test_missing_required_section() {
        let ron_str = r#"
        (
            info: (name: "Skirmish"),
            players: (players: []),
            game_play: (),
        )
        "#;

        assert!(ron::from_str::<GameDocument>(ron_str).is_err());
    }
}
