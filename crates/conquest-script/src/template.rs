//! Variable and foreach expansion
//!
//! Variables are named lists declared once and referenced as `$name$`. An
//! element that names another variable expands to that variable's
//! elements, recursively, in either declaration order.
//!
//! A foreach expression instantiates one attachment definition many times.
//! `$a$:$b$` walks `a` and `b` in step (their lengths must match);
//! `$a$^$b$` walks the cross product of two such groups. Each instance sees
//! `@a@`, `@b@` replaced by the current elements.

use crate::schema::VariableDef;
use conquest_core::codec::{foreach_placeholder, variable_key, SEPARATOR};
use indexmap::IndexMap;
use thiserror::Error;

const NEST: char = '^';

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("variable {key} refers to itself through {}", .chain.join(" -> "))]
    CyclicVariable { key: String, chain: Vec<String> },

    #[error("Invalid foreach expression, can only use variables, ':', and at most 1 '^': {0}")]
    InvalidForeach(String),

    #[error("Attachment has invalid variables in foreach: {0}")]
    UnknownForeachVariable(String),

    #[error("Attachment foreach variables must have same number of elements: {0}")]
    MismatchedLengths(String),
}

/// Placeholder to element, for one foreach instance.
pub type ForeachBinding = IndexMap<String, String>;

/// Fully expanded variables keyed by `$name$`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: IndexMap<String, Vec<String>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expand every declared variable.
    pub fn parse(defs: &[VariableDef]) -> Result<Self, TemplateError> {
        let raw: IndexMap<String, &[String]> = defs
            .iter()
            .map(|def| (variable_key(&def.name), def.elements.as_slice()))
            .collect();
        let mut variables = Self::new();
        for key in raw.keys() {
            let mut chain = Vec::new();
            let expanded = expand(key, &raw, &mut chain)?;
            variables.values.insert(key.clone(), expanded);
        }
        Ok(variables)
    }

    /// Elements of the variable with key `$name$`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `$name$` with its elements joined by `:`.
    pub fn substitute(&self, value: &str) -> String {
        let mut result = value.to_string();
        for (key, elements) in &self.values {
            if result.contains(key.as_str()) {
                result = result.replace(key.as_str(), &elements.join(&SEPARATOR.to_string()));
            }
        }
        result
    }

    /// One binding per instance of `foreach`; a single empty binding when
    /// `foreach` is empty.
    pub fn foreach(&self, foreach: &str) -> Result<Vec<ForeachBinding>, TemplateError> {
        if foreach.is_empty() {
            return Ok(vec![ForeachBinding::new()]);
        }
        let groups: Vec<&str> = foreach.split(NEST).collect();
        if groups.len() > 2 {
            return Err(TemplateError::InvalidForeach(foreach.to_string()));
        }
        let outer = self.group(groups[0], foreach)?;
        let inner = match groups.get(1) {
            Some(group) => Some(self.group(group, foreach)?),
            None => None,
        };

        let mut bindings = Vec::new();
        for i in 0..group_len(&outer) {
            let outer_binding = binding_at(&outer, i);
            match &inner {
                None => bindings.push(outer_binding),
                Some(inner) => {
                    for j in 0..group_len(inner) {
                        let mut binding = binding_at(inner, j);
                        binding.extend(outer_binding.clone());
                        bindings.push(binding);
                    }
                }
            }
        }
        Ok(bindings)
    }

    /// The variables of one `:` group, checked to exist and be equally long.
    fn group<'a>(
        &'a self,
        group: &'a str,
        foreach: &str,
    ) -> Result<Vec<(&'a str, &'a [String])>, TemplateError> {
        let mut members = Vec::new();
        for key in group.split(SEPARATOR) {
            let elements = self
                .get(key)
                .ok_or_else(|| TemplateError::UnknownForeachVariable(foreach.to_string()))?;
            members.push((key, elements));
        }
        let len = group_len(&members);
        if members.iter().any(|(_, elements)| elements.len() != len) {
            return Err(TemplateError::MismatchedLengths(foreach.to_string()));
        }
        Ok(members)
    }
}

fn expand(
    key: &str,
    raw: &IndexMap<String, &[String]>,
    chain: &mut Vec<String>,
) -> Result<Vec<String>, TemplateError> {
    if chain.iter().any(|k| k == key) {
        let mut cycle = chain.clone();
        cycle.push(key.to_string());
        return Err(TemplateError::CyclicVariable {
            key: key.to_string(),
            chain: cycle,
        });
    }
    chain.push(key.to_string());
    let mut expanded = Vec::new();
    for element in raw.get(key).copied().unwrap_or_default() {
        if raw.contains_key(element) {
            expanded.extend(expand(element, raw, chain)?);
        } else {
            expanded.push(element.clone());
        }
    }
    chain.pop();
    Ok(expanded)
}

fn group_len(group: &[(&str, &[String])]) -> usize {
    group.first().map_or(0, |(_, elements)| elements.len())
}

fn binding_at(group: &[(&str, &[String])], index: usize) -> ForeachBinding {
    group
        .iter()
        .map(|(key, elements)| {
            let name = key.trim_matches('$');
            (foreach_placeholder(name), elements[index].clone())
        })
        .collect()
}

/// Replace every foreach placeholder in `value`.
pub fn apply_foreach(value: &str, binding: &ForeachBinding) -> String {
    let mut result = value.to_string();
    for (placeholder, element) in binding {
        result = result.replace(placeholder.as_str(), element);
    }
    result
}

/// Whether `value` uses a placeholder bound to an empty element.
pub fn uses_empty_placeholder(value: &str, binding: &ForeachBinding) -> bool {
    binding
        .iter()
        .any(|(placeholder, element)| element.is_empty() && value.contains(placeholder.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, elements: &[&str]) -> VariableDef {
        VariableDef {
            name: name.to_string(),
            elements: elements.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_nested_variables_expand() {
        let variables = Variables::parse(&[
            var("foot", &["conscript", "sellsword"]),
            var("landUnits", &["$foot$", "knight"]),
        ])
        .unwrap();
        assert_eq!(
            variables.get("$landUnits$").unwrap(),
            ["conscript", "sellsword", "knight"]
        );
        assert_eq!(
            variables.substitute("2:$landUnits$"),
            "2:conscript:sellsword:knight"
        );
    }

    #[test]
    fn test_forward_reference_expands() {
        let variables = Variables::parse(&[
            var("all", &["$sea$", "$land$"]),
            var("land", &["Corusk Pass"]),
            var("sea", &["Nyr Dyv"]),
        ])
        .unwrap();
        assert_eq!(variables.get("$all$").unwrap(), ["Nyr Dyv", "Corusk Pass"]);
    }

    #[test]
    fn test_cyclic_variables_fail() {
        let err = Variables::parse(&[var("a", &["$b$"]), var("b", &["x", "$a$"])]).unwrap_err();
        assert!(matches!(err, TemplateError::CyclicVariable { .. }));
        assert_eq!(
            err.to_string(),
            "variable $a$ refers to itself through $a$ -> $b$ -> $a$"
        );
    }

    #[test]
    fn test_foreach_in_step() {
        let variables = Variables::parse(&[
            var("units", &["conscript", "knight"]),
            var("moves", &["1", "2"]),
        ])
        .unwrap();
        let bindings = variables.foreach("$units$:$moves$").unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(apply_foreach("@units@ moves @moves@", &bindings[1]), "knight moves 2");
    }

    #[test]
    fn test_foreach_cross_product() {
        let variables = Variables::parse(&[
            var("players", &["Keoland", "Furyondy"]),
            var("units", &["conscript", "knight", "sellsword"]),
        ])
        .unwrap();
        let bindings = variables.foreach("$players$^$units$").unwrap();
        assert_eq!(bindings.len(), 6);
        assert_eq!(apply_foreach("@players@/@units@", &bindings[0]), "Keoland/conscript");
        assert_eq!(apply_foreach("@players@/@units@", &bindings[5]), "Furyondy/sellsword");
    }

    #[test]
    fn test_foreach_errors() {
        let variables =
            Variables::parse(&[var("a", &["1", "2"]), var("b", &["1"]), var("c", &["x"])]).unwrap();
        assert!(matches!(
            variables.foreach("$a$:$b$"),
            Err(TemplateError::MismatchedLengths(_))
        ));
        assert!(matches!(
            variables.foreach("$a$:$missing$"),
            Err(TemplateError::UnknownForeachVariable(_))
        ));
        assert!(matches!(
            variables.foreach("$a$^$b$^$c$"),
            Err(TemplateError::InvalidForeach(_))
        ));
        assert_eq!(variables.foreach("").unwrap(), vec![ForeachBinding::new()]);
    }

    #[test]
    fn test_empty_placeholder_detected() {
        let variables = Variables::parse(&[var("bonus", &["", "2"])]).unwrap();
        let bindings = variables.foreach("$bonus$").unwrap();
        assert!(uses_empty_placeholder("@bonus@:attack", &bindings[0]));
        assert!(!uses_empty_placeholder("@bonus@:attack", &bindings[1]));
        assert!(!uses_empty_placeholder("1:attack", &bindings[0]));
    }
}
