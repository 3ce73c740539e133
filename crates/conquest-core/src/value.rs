//! Game property values
//!
//! Map definitions declare typed properties ("Low Luck", "neutralCharge")
//! that rules code reads by name.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A game property value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
}

impl Value {
    /// Try to get this value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get this value as an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get this value as a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A declared property and its editing bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameProperty {
    pub value: Value,
    /// Whether players may change it before the game starts.
    pub editable: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl GameProperty {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            editable: false,
            min: None,
            max: None,
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Named game properties in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameProperties {
    values: IndexMap<String, GameProperty>,
}

impl GameProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, property: GameProperty) {
        self.values.insert(name.into(), property);
    }

    pub fn get(&self, name: &str) -> Option<&GameProperty> {
        self.values.get(name)
    }

    pub fn get_bool(&self, name: &str, default: bool) -> bool {
        self.get(name)
            .and_then(|p| p.value.as_bool())
            .unwrap_or(default)
    }

    pub fn get_int(&self, name: &str, default: i64) -> i64 {
        self.get(name)
            .and_then(|p| p.value.as_int())
            .unwrap_or(default)
    }

    pub fn get_str<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name)
            .and_then(|p| p.value.as_str())
            .unwrap_or(default)
    }

    /// Names of properties players may edit
    pub fn editable(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .filter(|(_, p)| p.editable)
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_types() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(42).as_int(), Some(42));
        assert_eq!(Value::String("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Int(42).as_bool(), None);
        assert_eq!(Value::Int(3).to_string(), "3");
    }

    #[test]
    fn test_properties_defaults() {
        let mut props = GameProperties::new();
        props.set("Low Luck", GameProperty::new(true).editable());
        props.set("neutralCharge", GameProperty::new(3i64).with_bounds(0, 10));
        props.set("notes", GameProperty::new("none"));

        assert!(props.get_bool("Low Luck", false));
        assert_eq!(props.get_int("neutralCharge", 0), 3);
        assert_eq!(props.get_int("missing", 7), 7);
        // wrong type falls back to the default
        assert!(!props.get_bool("neutralCharge", false));
        assert_eq!(props.get_str("notes", ""), "none");
        assert_eq!(props.editable().collect::<Vec<_>>(), vec!["Low Luck"]);
    }

    #[test]
    fn test_properties_ron_round_trip() {
        let mut props = GameProperties::new();
        props.set("Low Luck", GameProperty::new(false));
        let text = ron::to_string(&props).unwrap();
        let back: GameProperties = ron::from_str(&text).unwrap();
        assert_eq!(back, props);
    }
}
