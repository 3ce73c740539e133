//! Encoded option values
//!
//! Attachment and trigger options arrive as strings of fields joined by `:`.
//! This module splits them, recognises the shared conventions (optional
//! leading counts, `any`/`all` wildcards, `-clear-`/`-reset-` prefixes,
//! `-` prefixed removals) and decodes the record shapes used by triggers.
//!
//! Every record implements [`FromStr`] to decode and [`Display`] to produce
//! its canonical encoding, so `s.parse::<R>()?.to_string()` normalises `s`.
//!
//! [`Display`]: std::fmt::Display

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Field separator inside encoded values.
pub const SEPARATOR: char = ':';

/// Separates whole records when a property holds several of them.
pub const RECORD_SEPARATOR: char = ';';

/// Prefix asking for the property to be cleared before the new value is set.
pub const CLEAR_PREFIX: &str = "-clear-";

/// Synonym of [`CLEAR_PREFIX`].
pub const RESET_PREFIX: &str = "-reset-";

/// A value that does not follow its expected shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    pub value: String,
    pub reason: String,
}

impl Malformed {
    pub fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the owning attachment and option name.
    pub fn into_error(self, attachment: &str, option: &str) -> Error {
        Error::Decode {
            attachment: attachment.to_string(),
            option: option.to_string(),
            value: self.value,
            reason: self.reason,
        }
    }
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.value, self.reason)
    }
}

pub type DecodeResult<T> = std::result::Result<T, Malformed>;

/// Split a value into its fields, rejecting empty ones.
pub fn fields(value: &str) -> DecodeResult<Vec<&str>> {
    let parts: Vec<&str> = value.split(SEPARATOR).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(Malformed::new(value, "empty field"));
    }
    Ok(parts)
}

/// Join fields back into an encoded value.
pub fn join<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        out.push_str(item.as_ref());
    }
    out
}

/// Strip a leading `-clear-` or `-reset-`.
///
/// ```
/// use conquest_core::codec::clear_first;
/// assert_eq!(clear_first("-clear-4:conscript"), (true, "4:conscript"));
/// assert_eq!(clear_first("clearValue-clear-"), (false, "clearValue-clear-"));
/// ```
pub fn clear_first(value: &str) -> (bool, &str) {
    match value
        .strip_prefix(CLEAR_PREFIX)
        .or_else(|| value.strip_prefix(RESET_PREFIX))
    {
        Some(rest) => (true, rest),
        None => (false, value),
    }
}

/// Split on the last separator, for `<value>:<property>` pairs whose value
/// may itself contain separators.
pub fn split_last(value: &str) -> DecodeResult<(&str, &str)> {
    match value.rsplit_once(SEPARATOR) {
        Some((head, tail)) if !tail.is_empty() => Ok((head, tail)),
        _ => Err(Malformed::new(value, "expected <value>:<property>")),
    }
}

pub fn is_any(field: &str) -> bool {
    field.eq_ignore_ascii_case("any")
}

pub fn is_all(field: &str) -> bool {
    field.eq_ignore_ascii_case("all")
}

/// `any` and `all` both stand for "every one".
pub fn is_wildcard(field: &str) -> bool {
    is_any(field) || is_all(field)
}

pub fn parse_int(field: &str) -> DecodeResult<i32> {
    field
        .parse()
        .map_err(|_| Malformed::new(field, "expected an integer"))
}

pub fn parse_bool(field: &str) -> DecodeResult<bool> {
    if field.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if field.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Malformed::new(field, "expected true or false"))
    }
}

/// Lower-case the first character of an option name, so `Movement` and
/// `movement` name the same property.
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `@name@`, the placeholder a foreach loop variable is substituted for.
pub fn foreach_placeholder(name: &str) -> String {
    format!("@{}@", name)
}

/// `$name$`, how a map variable is referenced from option values.
pub fn variable_key(name: &str) -> String {
    format!("${}$", name)
}

/// Take an optional leading count; a missing count means one.
fn leading_count<'a, 'b>(value: &str, parts: &'b [&'a str]) -> DecodeResult<(u32, &'b [&'a str])> {
    match parts.split_first() {
        Some((first, rest)) => match first.parse::<i64>() {
            Ok(n) if n < 0 => Err(Malformed::new(value, "count must not be negative")),
            Ok(n) => u32::try_from(n)
                .map(|n| (n, rest))
                .map_err(|_| Malformed::new(value, "count too large")),
            Err(_) => Ok((1, parts)),
        },
        None => Err(Malformed::new(value, "empty value")),
    }
}

fn owned(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// A territory name or every territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerritoryScope {
    All,
    Named(String),
}

impl TerritoryScope {
    fn from_field(field: &str) -> Self {
        if is_wildcard(field) {
            TerritoryScope::All
        } else {
            TerritoryScope::Named(field.to_string())
        }
    }
}

impl fmt::Display for TerritoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerritoryScope::All => f.write_str("all"),
            TerritoryScope::Named(name) => f.write_str(name),
        }
    }
}

/// Unit type names or every unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitScope {
    All,
    Named(Vec<String>),
}

impl UnitScope {
    pub fn matches(&self, unit_type: &str) -> bool {
        match self {
            UnitScope::All => true,
            UnitScope::Named(names) => names.iter().any(|n| n == unit_type),
        }
    }
}

impl fmt::Display for UnitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitScope::All => f.write_str("all"),
            UnitScope::Named(names) => f.write_str(&join(names)),
        }
    }
}

/// A player name or `any`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerMatch {
    Any,
    Named(String),
}

impl PlayerMatch {
    pub fn matches(&self, player: &str) -> bool {
        match self {
            PlayerMatch::Any => true,
            PlayerMatch::Named(name) => name == player,
        }
    }
}

impl fmt::Display for PlayerMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerMatch::Any => f.write_str("any"),
            PlayerMatch::Named(name) => f.write_str(name),
        }
    }
}

/// Which current relationships a relationship change applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationshipMatch {
    Any,
    AnyNeutral,
    AnyAllied,
    AnyWar,
    Named(String),
}

impl RelationshipMatch {
    fn from_field(field: &str) -> Self {
        if is_any(field) {
            RelationshipMatch::Any
        } else if field.eq_ignore_ascii_case("anyNeutral") {
            RelationshipMatch::AnyNeutral
        } else if field.eq_ignore_ascii_case("anyAllied") {
            RelationshipMatch::AnyAllied
        } else if field.eq_ignore_ascii_case("anyWar") {
            RelationshipMatch::AnyWar
        } else {
            RelationshipMatch::Named(field.to_string())
        }
    }
}

impl fmt::Display for RelationshipMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipMatch::Any => f.write_str("any"),
            RelationshipMatch::AnyNeutral => f.write_str("anyNeutral"),
            RelationshipMatch::AnyAllied => f.write_str("anyAllied"),
            RelationshipMatch::AnyWar => f.write_str("anyWar"),
            RelationshipMatch::Named(name) => f.write_str(name),
        }
    }
}

/// `<frontier>:<rule>` adds a rule, `<frontier>:-<rule>` removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontierEdit {
    pub frontier: String,
    pub rule: String,
    pub remove: bool,
}

impl FromStr for FrontierEdit {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let [frontier, rule] = parts[..] else {
            return Err(Malformed::new(value, "expected <frontier>:<rule>"));
        };
        let (remove, rule) = match rule.strip_prefix('-') {
            Some("") => return Err(Malformed::new(value, "missing rule name")),
            Some(rest) => (true, rest),
            None => (false, rule),
        };
        Ok(Self {
            frontier: frontier.to_string(),
            rule: rule.to_string(),
            remove,
        })
    }
}

impl fmt::Display for FrontierEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dash = if self.remove { "-" } else { "" };
        write!(f, "{}:{}{}", self.frontier, dash, self.rule)
    }
}

/// `<new value>:<property>`; the property name is after the last separator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDelta {
    pub value: String,
    pub property: String,
}

impl PropertyDelta {
    /// The new value with any clear prefix stripped.
    pub fn clear_first(&self) -> (bool, &str) {
        clear_first(&self.value)
    }
}

impl FromStr for PropertyDelta {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let (new_value, property) = split_last(value)?;
        Ok(Self {
            value: new_value.to_string(),
            property: property.to_string(),
        })
    }
}

impl fmt::Display for PropertyDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, self.property)
    }
}

/// `<player1>:<player2>:<current type or wildcard>:<new type>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipChange {
    pub player1: String,
    pub player2: String,
    pub from: RelationshipMatch,
    pub to: String,
}

impl FromStr for RelationshipChange {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let [player1, player2, from, to] = parts[..] else {
            return Err(Malformed::new(
                value,
                "expected <player1>:<player2>:<current>:<new>",
            ));
        };
        Ok(Self {
            player1: player1.to_string(),
            player2: player2.to_string(),
            from: RelationshipMatch::from_field(from),
            to: to.to_string(),
        })
    }
}

impl fmt::Display for RelationshipChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.player1, self.player2, self.from, self.to)
    }
}

/// `<category>:<tech>:-<tech>...`; a leading dash withdraws the tech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechAvailability {
    pub category: String,
    /// `(tech, add)` pairs in order.
    pub techs: Vec<(String, bool)>,
}

impl FromStr for TechAvailability {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let Some((category, techs)) = parts.split_first().filter(|(_, t)| !t.is_empty()) else {
            return Err(Malformed::new(value, "expected <category>:<tech>..."));
        };
        let mut decoded = Vec::with_capacity(techs.len());
        for tech in techs {
            match tech.strip_prefix('-') {
                Some("") => return Err(Malformed::new(value, "missing tech name")),
                Some(rest) => decoded.push((rest.to_string(), false)),
                None => decoded.push((tech.to_string(), true)),
            }
        }
        Ok(Self {
            category: category.to_string(),
            techs: decoded,
        })
    }
}

impl fmt::Display for TechAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category)?;
        for (tech, add) in &self.techs {
            let dash = if *add { "" } else { "-" };
            write!(f, ":{}{}", dash, tech)?;
        }
        Ok(())
    }
}

/// `<supportName>` or `-<supportName>`: give a unit support to the trigger's
/// players, or take it away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportChange {
    pub support: String,
    pub add: bool,
}

impl SupportChange {
    /// Decode every field of a `:` joined list.
    pub fn parse_list(value: &str) -> DecodeResult<Vec<Self>> {
        fields(value)?.into_iter().map(str::parse).collect()
    }
}

impl FromStr for SupportChange {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let (support, add) = match value.strip_prefix('-') {
            Some(rest) => (rest, false),
            None => (value, true),
        };
        if support.is_empty() || support.contains(SEPARATOR) {
            return Err(Malformed::new(value, "expected <support> or -<support>"));
        }
        Ok(Self {
            support: support.to_string(),
            add,
        })
    }
}

impl fmt::Display for SupportChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dash = if self.add { "" } else { "-" };
        write!(f, "{}{}", dash, self.support)
    }
}

/// `[count:]<unitType>...`, units bought into the player's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub count: u32,
    pub unit_types: Vec<String>,
}

impl FromStr for Purchase {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let (count, rest) = leading_count(value, &parts)?;
        if rest.is_empty() {
            return Err(Malformed::new(value, "missing unit type"));
        }
        Ok(Self {
            count,
            unit_types: owned(rest),
        })
    }
}

impl fmt::Display for Purchase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.count, join(&self.unit_types))
    }
}

/// `[count:]<territory>:<unitType>...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    pub count: u32,
    pub territory: String,
    pub unit_types: Vec<String>,
}

impl FromStr for UnitPlacement {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let (count, rest) = leading_count(value, &parts)?;
        let Some((territory, unit_types)) = rest.split_first().filter(|(_, u)| !u.is_empty())
        else {
            return Err(Malformed::new(value, "expected [count:]<territory>:<unitType>..."));
        };
        Ok(Self {
            count,
            territory: territory.to_string(),
            unit_types: owned(unit_types),
        })
    }
}

impl fmt::Display for UnitPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.count, self.territory, join(&self.unit_types))
    }
}

/// `[count:][territory|any|all:]<unitType|all>...`
///
/// A lone unit field applies to every territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRemoval {
    pub count: u32,
    pub territory: TerritoryScope,
    pub unit_types: UnitScope,
}

impl FromStr for UnitRemoval {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let (count, rest) = leading_count(value, &parts)?;
        let (territory, units) = match rest {
            [] => return Err(Malformed::new(value, "missing unit type")),
            [units] => (TerritoryScope::All, std::slice::from_ref(units)),
            [territory, units @ ..] => (TerritoryScope::from_field(territory), units),
        };
        let unit_types = match units {
            [single] if is_wildcard(single) => UnitScope::All,
            _ => UnitScope::Named(owned(units)),
        };
        Ok(Self {
            count,
            territory,
            unit_types,
        })
    }
}

impl fmt::Display for UnitRemoval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.count, self.territory, self.unit_types)
    }
}

/// `<territory|all>:<currentOwner|any>:<newOwner>[:<captured>]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipChange {
    pub territory: TerritoryScope,
    pub from: PlayerMatch,
    pub to: String,
    pub captured: bool,
}

impl FromStr for OwnershipChange {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let (territory, from, to, captured) = match parts[..] {
            [t, from, to] => (t, from, to, false),
            [t, from, to, captured] => (t, from, to, parse_bool(captured)?),
            _ => {
                return Err(Malformed::new(
                    value,
                    "expected <territory>:<currentOwner>:<newOwner>[:<captured>]",
                ))
            }
        };
        let from = if is_any(from) {
            PlayerMatch::Any
        } else {
            PlayerMatch::Named(from.to_string())
        };
        Ok(Self {
            territory: TerritoryScope::from_field(territory),
            from,
            to: to.to_string(),
            captured,
        })
    }
}

impl fmt::Display for OwnershipChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.territory, self.from, self.to, self.captured)
    }
}

/// `<trigger>:<repeat>:<useUses>:<testUses>:<testChance>:<testWhen>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub trigger: String,
    pub repeat: u32,
    pub use_uses: bool,
    pub test_uses: bool,
    pub test_chance: bool,
    pub test_when: bool,
}

impl FromStr for Activation {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let [trigger, repeat, use_uses, test_uses, test_chance, test_when] = parts[..] else {
            return Err(Malformed::new(
                value,
                "expected <trigger>:<repeat>:<useUses>:<testUses>:<testChance>:<testWhen>",
            ));
        };
        let repeat = repeat
            .parse()
            .map_err(|_| Malformed::new(value, "repeat must be a non-negative integer"))?;
        Ok(Self {
            trigger: trigger.to_string(),
            repeat,
            use_uses: parse_bool(use_uses)?,
            test_uses: parse_bool(test_uses)?,
            test_chance: parse_bool(test_chance)?,
            test_when: parse_bool(test_when)?,
        })
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            self.trigger, self.repeat, self.use_uses, self.test_uses, self.test_chance, self.test_when
        )
    }
}

/// `<hits>:<sides>`, the odds a trigger fires when chance is tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chance {
    pub hits: u32,
    pub sides: u32,
}

impl Chance {
    /// A chance that always succeeds without rolling.
    pub fn is_certain(&self) -> bool {
        self.hits >= self.sides
    }
}

impl Default for Chance {
    fn default() -> Self {
        Self { hits: 1, sides: 1 }
    }
}

impl FromStr for Chance {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let [hits, sides] = parts[..] else {
            return Err(Malformed::new(value, "expected <hits>:<sides>"));
        };
        let (Ok(hits), Ok(sides)) = (hits.parse::<u32>(), sides.parse::<u32>()) else {
            return Err(Malformed::new(value, "hits and sides must be non-negative integers"));
        };
        if sides == 0 || hits > sides {
            return Err(Malformed::new(value, "need 0 <= hits <= sides and sides >= 1"));
        }
        Ok(Self { hits, sides })
    }
}

impl fmt::Display for Chance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hits, self.sides)
    }
}

/// `<attachmentKey>:<AttachmentKind>`, naming which attachment a property
/// change targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentName {
    pub key: String,
    pub kind: String,
}

impl AttachmentName {
    pub fn new(key: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: kind.into(),
        }
    }
}

impl FromStr for AttachmentName {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let [key, kind] = parts[..] else {
            return Err(Malformed::new(value, "expected <attachmentKey>:<AttachmentKind>"));
        };
        Ok(Self::new(key, kind))
    }
}

impl fmt::Display for AttachmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key, self.kind)
    }
}

/// Before or after a game step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn parse(field: &str) -> Option<Self> {
        if field.eq_ignore_ascii_case("before") {
            Some(Phase::Before)
        } else if field.eq_ignore_ascii_case("after") {
            Some(Phase::After)
        } else {
            None
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Before => f.write_str("before"),
            Phase::After => f.write_str("after"),
        }
    }
}

/// `<before|after>:<stepName>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTiming {
    pub phase: Phase,
    pub step: String,
}

impl FromStr for StepTiming {
    type Err = Malformed;

    fn from_str(value: &str) -> DecodeResult<Self> {
        let parts = fields(value)?;
        let [phase, step] = parts[..] else {
            return Err(Malformed::new(value, "expected <before|after>:<stepName>"));
        };
        let phase = Phase::parse(phase)
            .ok_or_else(|| Malformed::new(value, "phase must be before or after"))?;
        Ok(Self {
            phase,
            step: step.to_string(),
        })
    }
}

impl fmt::Display for StepTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.phase, self.step)
    }
}
