//! Relationships between players
//!
//! Every unordered pair of players, including each player with itself and
//! with the null player, has exactly one relationship once a game is
//! loaded. A relationship names a relationship type whose attachment gives
//! its [`Archetype`].

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relationship every player has with itself.
pub const SELF_RELATION: &str = "self_relation";
/// Relationship every player has with the null player.
pub const NULL_RELATION: &str = "null_relation";
/// Default between players sharing no alliance.
pub const DEFAULT_WAR_RELATION: &str = "default_war_relation";
/// Default between players sharing an alliance.
pub const DEFAULT_ALLIED_RELATION: &str = "default_allied_relation";

/// The broad meaning of a relationship type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    War,
    Allied,
    Neutral,
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::War => f.write_str("war"),
            Archetype::Allied => f.write_str("allied"),
            Archetype::Neutral => f.write_str("neutral"),
        }
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "war" => Ok(Archetype::War),
            "allied" => Ok(Archetype::Allied),
            "neutral" => Ok(Archetype::Neutral),
            _ => Err(s.to_string()),
        }
    }
}

/// An unordered pair of player names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerPair(String, String);

impl PlayerPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn players(&self) -> (&str, &str) {
        (&self.0, &self.1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub relationship_type: String,
    /// Round in which the relationship began.
    pub round_created: i32,
}

/// Current relationship of every player pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipTracker {
    relationships: IndexMap<PlayerPair, Relationship>,
}

impl RelationshipTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the relationship between two players, in either order.
    pub fn set(&mut self, a: &str, b: &str, relationship_type: &str, round_created: i32) {
        self.relationships.insert(
            PlayerPair::new(a, b),
            Relationship {
                relationship_type: relationship_type.to_string(),
                round_created,
            },
        );
    }

    pub fn get(&self, a: &str, b: &str) -> Option<&Relationship> {
        self.relationships.get(&PlayerPair::new(a, b))
    }

    pub fn relationship_type(&self, a: &str, b: &str) -> Option<&str> {
        self.get(a, b).map(|r| r.relationship_type.as_str())
    }

    /// Give every player the self relation.
    pub fn set_self_relations<'a>(&mut self, players: impl IntoIterator<Item = &'a str>) {
        for player in players {
            self.set(player, player, SELF_RELATION, 0);
        }
    }

    /// Give every player the null relation with `null_player`.
    pub fn set_null_player_relations<'a>(
        &mut self,
        null_player: &str,
        players: impl IntoIterator<Item = &'a str>,
    ) {
        for player in players {
            self.set(player, null_player, NULL_RELATION, 0);
        }
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerPair, &Relationship)> {
        self.relationships.iter()
    }
}

/// Named alliances and their members
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllianceTracker {
    alliances: IndexMap<String, IndexSet<String>>,
}

impl AllianceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_to_alliance(&mut self, player: &str, alliance: &str) {
        self.alliances
            .entry(alliance.to_string())
            .or_default()
            .insert(player.to_string());
    }

    /// Alliances `player` belongs to.
    pub fn alliances_of<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.alliances
            .iter()
            .filter(move |(_, members)| members.contains(player))
            .map(|(name, _)| name.as_str())
    }

    /// Every player sharing at least one alliance with `player`, itself included
    /// if it belongs to any alliance.
    pub fn allies_of(&self, player: &str) -> IndexSet<String> {
        self.alliances
            .values()
            .filter(|members| members.contains(player))
            .flat_map(|members| members.iter().cloned())
            .collect()
    }

    pub fn members(&self, alliance: &str) -> Option<&IndexSet<String>> {
        self.alliances.get(alliance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_unordered() {
        let mut tracker = RelationshipTracker::new();
        tracker.set("Russia", "Germany", DEFAULT_WAR_RELATION, 1);
        assert_eq!(
            tracker.relationship_type("Germany", "Russia"),
            Some(DEFAULT_WAR_RELATION)
        );
        tracker.set("Germany", "Russia", "peace", 3);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("Russia", "Germany").unwrap().round_created, 3);
    }

    #[test]
    fn test_self_and_null_relations() {
        let mut tracker = RelationshipTracker::new();
        tracker.set_self_relations(["Russia", "Germany"]);
        tracker.set_null_player_relations("Neutral", ["Russia", "Germany"]);
        assert_eq!(tracker.relationship_type("Russia", "Russia"), Some(SELF_RELATION));
        assert_eq!(tracker.relationship_type("Neutral", "Germany"), Some(NULL_RELATION));
        assert_eq!(tracker.relationship_type("Russia", "Germany"), None);
    }

    #[test]
    fn test_allies() {
        let mut alliances = AllianceTracker::new();
        alliances.add_to_alliance("Russia", "Allies");
        alliances.add_to_alliance("Britain", "Allies");
        alliances.add_to_alliance("Germany", "Axis");

        let allies = alliances.allies_of("Russia");
        assert!(allies.contains("Britain"));
        assert!(allies.contains("Russia"));
        assert!(!allies.contains("Germany"));
        assert_eq!(alliances.alliances_of("Germany").collect::<Vec<_>>(), vec!["Axis"]);
    }

    #[test]
    fn test_archetype_parse() {
        assert_eq!("Allied".parse::<Archetype>(), Ok(Archetype::Allied));
        assert!("frenemy".parse::<Archetype>().is_err());
    }

    #[test]
    fn test_tracker_ron_round_trip() {
        let mut tracker = RelationshipTracker::new();
        tracker.set("Russia", "Germany", DEFAULT_WAR_RELATION, 0);
        let text = ron::to_string(&tracker).unwrap();
        let back: RelationshipTracker = ron::from_str(&text).unwrap();
        assert_eq!(back, tracker);
    }
}
