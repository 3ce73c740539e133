//! Players, territories, resources, properties and the turn sequence

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Players and the alliances they start in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerList {
    pub players: Vec<PlayerDef>,
    #[serde(default)]
    pub alliances: Vec<AllianceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDef {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub can_be_disabled: bool,
    /// Default controller, e.g. `Human` or `AI`.
    #[serde(default = "default_player_type")]
    pub default_type: String,
    #[serde(default)]
    pub is_hidden: bool,
}

fn default_player_type() -> String {
    "Human".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllianceDef {
    pub player: String,
    pub alliance: String,
}

/// Territories and the connections between them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapDef {
    pub territories: Vec<TerritoryDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritoryDef {
    pub name: String,
    #[serde(default)]
    pub water: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDef {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDef {
    pub name: String,
    /// Empty for every player, `NONE` for nobody, else `:` separated players.
    #[serde(default)]
    pub is_displayed_for: String,
}

/// A game property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub editable: bool,
    /// Declared type; untyped values are integers when they parse as one.
    #[serde(default)]
    pub kind: Option<PropertyKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyKind {
    Bool,
    Number { min: i64, max: i64 },
    String,
}

/// Delegates, the turn sequence and the displayed round offset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GamePlayDef {
    pub delegates: Vec<DelegateDef>,
    pub sequence: Vec<StepDef>,
    pub round_offset: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegateDef {
    pub name: String,
    /// Implementation key the host maps to behaviour.
    pub implementation: String,
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    pub name: String,
    pub delegate: String,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    /// Zero for no limit.
    #[serde(default)]
    pub max_run_count: u32,
    #[serde(default)]
    pub properties: IndexMap<String, String>,
}
