//! RON map loader
//!
//! Turns a [`GameDocument`] into a validated [`GameData`]. Sections are
//! read in dependency order: players before anything naming a player,
//! resources and unit types before the production rules that use them,
//! every object before the attachments hung off it.

use crate::config::{EngineVersion, LoaderConfig};
use crate::error::{Error, Result};
use crate::schema::{
    AllianceDef, AttachmentDef, DelegateDef, EngineRequirement, GameDocument, GamePlayDef,
    InitializeDef, MapDef, OptionDef, PlayerList, ProductionDef, PropertyDef, PropertyKind,
    ResourceDef, RuleDef, StepDef, TechnologyDef,
};
use crate::template::{apply_foreach, uses_empty_placeholder, ForeachBinding, Variables};
use conquest_core::codec::{decapitalize, SEPARATOR};
use conquest_core::{
    Attachment, AttachmentKind, AttachmentRecord, AttachmentRef, Delegate, EntityKind, Frontier,
    GameData, GameProperty, GameStep, Player, PropertyBag, RelationshipType, Resource, Rule,
    TechAbilityAttachment, TechAdvance, Territory, TerritoryEffect, Unit, UnitType,
    DEFAULT_TECHNOLOGIES, NULL_PLAYER,
};
use conquest_core::relationship::{DEFAULT_ALLIED_RELATION, DEFAULT_WAR_RELATION};
use indexmap::{IndexMap, IndexSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// `is_displayed_for` value hiding a resource from every player.
const DISPLAYED_FOR_NONE: &str = "NONE";

/// Loader for RON map definitions
#[derive(Debug, Clone)]
pub struct Loader {
    map_name: String,
    config: LoaderConfig,
}

impl Loader {
    /// Create a loader with the default configuration. `map_name` only
    /// identifies the map in errors.
    pub fn new(map_name: impl Into<String>) -> Self {
        Self::with_config(map_name, LoaderConfig::default())
    }

    pub fn with_config(map_name: impl Into<String>, config: LoaderConfig) -> Self {
        Self {
            map_name: map_name.into(),
            config,
        }
    }

    pub fn map_name(&self) -> &str {
        &self.map_name
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load a map from a RON file
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<GameData> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    /// Load a map from a RON string
    pub fn parse_str(&self, content: &str) -> Result<GameData> {
        let document: GameDocument = ron::from_str(content).map_err(|source| Error::Document {
            map: self.map_name.clone(),
            source,
        })?;
        self.parse_document(document)
    }

    /// Build and validate the game described by `document`
    pub fn parse_document(&self, document: GameDocument) -> Result<GameData> {
        let mut parser = Parser {
            map_name: &self.map_name,
            config: &self.config,
            data: GameData::new(),
        };
        parser.parse(document)?;
        info!(
            map = %self.map_name,
            game = %parser.data.game_name,
            territories = parser.data.territories.len(),
            attachments = parser.data.attachment_order.len(),
            "loaded map"
        );
        Ok(parser.data)
    }
}

/// State of one load
struct Parser<'a> {
    map_name: &'a str,
    config: &'a LoaderConfig,
    data: GameData,
}

impl Parser<'_> {
    fn parse(&mut self, document: GameDocument) -> Result<()> {
        self.data.game_name = document.info.name;
        self.data.game_version = document.info.version;
        // before anything else, so maps for newer engines fail on the version
        self.check_engine_version(document.engine.as_ref())?;
        self.parse_dice_sides(document.dice_sides)?;
        let explicit_relationships = document
            .initialize
            .as_ref()
            .is_some_and(|init| init.relationships.is_some());
        self.parse_players(&document.players)?;
        self.parse_alliances(&document.players.alliances, explicit_relationships)?;
        self.parse_properties(&document.properties)?;

        let variables =
            Variables::parse(&document.variables).map_err(|e| self.error(e.to_string()))?;
        self.parse_map(&document.map)?;
        self.parse_resources(&document.resources)?;
        self.parse_units(&document.units)?;
        self.parse_relationship_types(&document.relationship_types)?;
        self.parse_territory_effects(&document.territory_effects)?;
        self.parse_game_play(&document.game_play)?;
        if let Some(production) = &document.production {
            self.parse_production(production)?;
        }
        match &document.technology {
            Some(technology) => self.parse_technology(technology)?,
            None => self.add_default_technologies(),
        }
        self.parse_attachments(&document.attachments, &variables)?;
        if let Some(initialize) = &document.initialize {
            self.parse_initialization(initialize)?;
        }

        let players: Vec<String> = self.data.players.keys().cloned().collect();
        self.data
            .relationships
            .set_null_player_relations(NULL_PLAYER, players.iter().map(String::as_str));
        self.data
            .relationships
            .set_self_relations(players.iter().map(String::as_str));
        // after every attachment, so a map's own ability wins
        self.add_default_tech_abilities()?;

        self.data
            .validate()
            .map_err(|e| self.model_error_with("validation failed", e))
    }

    // Errors

    fn game_name(&self) -> String {
        if self.data.game_name.is_empty() {
            "<unknown>".to_string()
        } else {
            self.data.game_name.clone()
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            map: self.map_name.to_string(),
            game: self.game_name(),
            message: message.into(),
            source: None,
        }
    }

    fn model_error(&self, source: conquest_core::Error) -> Error {
        Error::Parse {
            map: self.map_name.to_string(),
            game: self.game_name(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    fn model_error_with(&self, context: &str, source: conquest_core::Error) -> Error {
        Error::Parse {
            map: self.map_name.to_string(),
            game: self.game_name(),
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    fn check<T>(&self, result: conquest_core::Result<T>) -> Result<T> {
        result.map_err(|e| self.model_error(e))
    }

    fn ensure_new<T>(
        &self,
        existing: &IndexMap<String, T>,
        kind: EntityKind,
        name: &str,
    ) -> Result<()> {
        if existing.contains_key(name) {
            return Err(self.error(format!("duplicate {}: {}", kind, name)));
        }
        Ok(())
    }

    /// A player name, with the null player mapped to no owner.
    fn owner(&self, name: &str) -> Result<Option<String>> {
        if name.trim().is_empty() || name == NULL_PLAYER {
            return Ok(None);
        }
        self.check(self.data.player(name))?;
        Ok(Some(name.to_string()))
    }

    // Header

    fn check_engine_version(&self, engine: Option<&EngineRequirement>) -> Result<()> {
        let Some(engine) = engine else {
            return Ok(());
        };
        let required: EngineVersion = engine
            .minimum_version
            .parse()
            .map_err(|e: String| self.error(format!("invalid minimum engine version: {}", e)))?;
        let current = self.config.engine_version;
        if !current.is_compatible_with(&required) {
            return Err(Error::EngineVersion {
                map: self.map_name.to_string(),
                game: self.game_name(),
                current,
                required,
            });
        }
        Ok(())
    }

    fn parse_dice_sides(&mut self, dice_sides: Option<i32>) -> Result<()> {
        let sides = dice_sides.unwrap_or(6);
        if sides < 1 {
            return Err(self.error(format!("Invalid value for dice sides: {}", sides)));
        }
        self.data.dice_sides = sides as u32;
        Ok(())
    }

    fn parse_players(&mut self, list: &PlayerList) -> Result<()> {
        for def in &list.players {
            self.ensure_new(&self.data.players, EntityKind::Player, &def.name)?;
            let mut player = Player::new(&def.name);
            player.optional = def.optional;
            player.can_be_disabled = def.can_be_disabled;
            player.default_type = def.default_type.clone();
            player.is_hidden = def.is_hidden;
            self.data.players.insert(def.name.clone(), player);
        }
        debug!(count = list.players.len(), "parsed players");
        Ok(())
    }

    /// Record alliances and, unless the map initializes relationships
    /// itself, derive them: allied within an alliance, at war otherwise.
    fn parse_alliances(&mut self, alliances: &[AllianceDef], explicit: bool) -> Result<()> {
        for def in alliances {
            self.check(self.data.player(&def.player))?;
            self.data.alliances.add_to_alliance(&def.player, &def.alliance);
        }
        if explicit {
            return Ok(());
        }
        let players: Vec<String> = self.data.players.keys().cloned().collect();
        for current in &players {
            let allies = self.data.alliances.allies_of(current);
            for other in players.iter().filter(|p| *p != current) {
                let relationship = if allies.contains(other) {
                    DEFAULT_ALLIED_RELATION
                } else {
                    DEFAULT_WAR_RELATION
                };
                self.data.relationships.set(current, other, relationship, 0);
            }
        }
        Ok(())
    }

    fn parse_properties(&mut self, properties: &[PropertyDef]) -> Result<()> {
        for def in properties {
            let property = if def.editable {
                match &def.kind {
                    Some(PropertyKind::Bool) => {
                        GameProperty::new(def.value.eq_ignore_ascii_case("true")).editable()
                    }
                    Some(PropertyKind::Number { min, max }) => {
                        let value: i64 = def.value.trim().parse().map_err(|_| {
                            self.error(format!(
                                "property {} is not a number: {}",
                                def.name, def.value
                            ))
                        })?;
                        GameProperty::new(value).editable().with_bounds(*min, *max)
                    }
                    Some(PropertyKind::String) | None => {
                        GameProperty::new(def.value.as_str()).editable()
                    }
                }
            } else {
                match &def.kind {
                    None => match def.value.trim().parse::<i64>() {
                        Ok(number) => GameProperty::new(number),
                        Err(_) => GameProperty::new(def.value.as_str()),
                    },
                    Some(PropertyKind::Bool) => {
                        GameProperty::new(def.value.eq_ignore_ascii_case("true"))
                    }
                    Some(PropertyKind::Number { .. }) => {
                        GameProperty::new(def.value.trim().parse::<i64>().unwrap_or(0))
                    }
                    Some(PropertyKind::String) => GameProperty::new(def.value.as_str()),
                }
            };
            self.data.properties.set(def.name.clone(), property);
        }
        debug!(count = properties.len(), "parsed properties");
        Ok(())
    }

    // Objects

    fn parse_map(&mut self, map: &MapDef) -> Result<()> {
        for def in &map.territories {
            self.ensure_new(&self.data.territories, EntityKind::Territory, &def.name)?;
            self.data
                .territories
                .insert(def.name.clone(), Territory::new(&def.name, def.water));
        }
        for connection in &map.connections {
            let result = self.data.add_connection(&connection.from, &connection.to);
            self.check(result)?;
        }
        debug!(
            territories = map.territories.len(),
            connections = map.connections.len(),
            "parsed map"
        );
        Ok(())
    }

    fn parse_resources(&mut self, resources: &[ResourceDef]) -> Result<()> {
        for def in resources {
            self.ensure_new(&self.data.resources, EntityKind::Resource, &def.name)?;
            let mut resource = Resource::new(&def.name);
            if def.is_displayed_for.eq_ignore_ascii_case(DISPLAYED_FOR_NONE) {
                resource.hidden = true;
            } else if !def.is_displayed_for.is_empty() {
                for player in def.is_displayed_for.split(SEPARATOR) {
                    if !self.data.players.contains_key(player) {
                        return Err(self.error(format!(
                            "Parse resources could not find player: {}",
                            player
                        )));
                    }
                    resource.displayed_for.push(player.to_string());
                }
            }
            self.data.resources.insert(def.name.clone(), resource);
        }
        Ok(())
    }

    fn parse_units(&mut self, units: &[String]) -> Result<()> {
        for name in units {
            self.ensure_new(&self.data.unit_types, EntityKind::UnitType, name)?;
            self.data
                .unit_types
                .insert(name.clone(), UnitType::new(name));
        }
        debug!(count = units.len(), "parsed unit types");
        Ok(())
    }

    fn parse_relationship_types(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            self.ensure_new(&self.data.relationship_types, EntityKind::RelationshipType, name)?;
            self.data
                .relationship_types
                .insert(name.clone(), RelationshipType::new(name));
        }
        Ok(())
    }

    fn parse_territory_effects(&mut self, names: &[String]) -> Result<()> {
        for name in names {
            self.ensure_new(&self.data.territory_effects, EntityKind::TerritoryEffect, name)?;
            self.data
                .territory_effects
                .insert(name.clone(), TerritoryEffect::new(name));
        }
        Ok(())
    }

    fn parse_game_play(&mut self, game_play: &GamePlayDef) -> Result<()> {
        for def in &game_play.delegates {
            self.parse_delegate(def)?;
        }
        for def in &game_play.sequence {
            self.parse_step(def)?;
        }
        if let Some(offset) = game_play.round_offset {
            self.data.round_offset = offset;
        }
        debug!(
            delegates = game_play.delegates.len(),
            steps = game_play.sequence.len(),
            "parsed game play"
        );
        Ok(())
    }

    fn parse_delegate(&mut self, def: &DelegateDef) -> Result<()> {
        self.ensure_new(&self.data.delegates, EntityKind::Delegate, &def.name)?;
        if def.implementation.trim().is_empty() {
            return Err(self.error(format!("delegate {} has no implementation", def.name)));
        }
        self.data.delegates.insert(
            def.name.clone(),
            Delegate {
                name: def.name.clone(),
                implementation: def.implementation.clone(),
                display: def.display.clone().unwrap_or_else(|| def.name.clone()),
            },
        );
        Ok(())
    }

    fn parse_step(&mut self, def: &StepDef) -> Result<()> {
        if !self.data.delegates.contains_key(&def.delegate) {
            return Err(self.model_error(conquest_core::Error::not_found(
                EntityKind::Delegate,
                &def.delegate,
            )));
        }
        if let Some(player) = &def.player {
            self.check(self.data.player(player))?;
        }
        self.data.sequence.push(GameStep {
            name: def.name.clone(),
            delegate: def.delegate.clone(),
            player: def.player.clone(),
            display: def.display.clone().filter(|d| !d.is_empty()),
            max_run_count: (def.max_run_count > 0).then_some(def.max_run_count),
            properties: def.properties.clone(),
        });
        Ok(())
    }

    // Production and technology

    fn parse_production(&mut self, production: &ProductionDef) -> Result<()> {
        for def in &production.production_rules {
            self.ensure_new(&self.data.production_rules, EntityKind::ProductionRule, &def.name)?;
            let rule = self.parse_rule(def)?;
            self.data.production_rules.insert(def.name.clone(), rule);
        }
        for def in &production.production_frontiers {
            self.ensure_new(
                &self.data.production_frontiers,
                EntityKind::ProductionFrontier,
                &def.name,
            )?;
            let mut frontier = Frontier::new(&def.name);
            for rule in &def.rules {
                self.check(self.data.production_rule(rule))?;
                frontier.rules.push(rule.clone());
            }
            self.data
                .production_frontiers
                .insert(def.name.clone(), frontier);
        }
        for def in &production.player_production {
            self.check(self.data.production_frontier(&def.frontier))?;
            self.check(self.data.player(&def.player))?;
            if let Some(player) = self.data.players.get_mut(&def.player) {
                player.production_frontier = Some(def.frontier.clone());
            }
        }

        for def in &production.repair_rules {
            self.ensure_new(&self.data.repair_rules, EntityKind::RepairRule, &def.name)?;
            let rule = self.parse_rule(def)?;
            self.data.repair_rules.insert(def.name.clone(), rule);
        }
        for def in &production.repair_frontiers {
            self.ensure_new(&self.data.repair_frontiers, EntityKind::RepairFrontier, &def.name)?;
            let mut frontier = Frontier::new(&def.name);
            for rule in &def.rules {
                self.check(self.data.repair_rule(rule))?;
                frontier.rules.push(rule.clone());
            }
            self.data.repair_frontiers.insert(def.name.clone(), frontier);
        }
        for def in &production.player_repair {
            self.check(self.data.repair_frontier(&def.frontier))?;
            self.check(self.data.player(&def.player))?;
            if let Some(player) = self.data.players.get_mut(&def.player) {
                player.repair_frontier = Some(def.frontier.clone());
            }
        }
        debug!(
            rules = production.production_rules.len(),
            frontiers = production.production_frontiers.len(),
            "parsed production"
        );
        Ok(())
    }

    fn parse_rule(&self, def: &RuleDef) -> Result<Rule> {
        if def.costs.is_empty() {
            return Err(self.error(format!("no costs for rule: {}", def.name)));
        }
        if def.results.is_empty() {
            return Err(self.error(format!("no results for rule: {}", def.name)));
        }
        let mut rule = Rule::new(&def.name);
        for cost in &def.costs {
            self.check(self.data.resource(&cost.name))?;
            rule.costs.insert(cost.name.clone(), cost.quantity);
        }
        for result in &def.results {
            if !self.data.resources.contains_key(&result.name)
                && !self.data.unit_types.contains_key(&result.name)
            {
                return Err(self.error(format!(
                    "Could not find resource or unit {}",
                    result.name
                )));
            }
            rule.results.insert(result.name.clone(), result.quantity);
        }
        Ok(rule)
    }

    fn parse_technology(&mut self, technology: &TechnologyDef) -> Result<()> {
        for def in &technology.technologies {
            self.ensure_new(&self.data.technologies, EntityKind::Technology, &def.name)?;
            let property = match def.tech.as_deref().filter(|t| !t.trim().is_empty()) {
                Some(tech) if DEFAULT_TECHNOLOGIES.contains(&tech) => Some(tech.to_string()),
                Some(tech) => {
                    return Err(self.error(format!(
                        "technology {} grants unknown ability {}",
                        def.name, tech
                    )))
                }
                None => DEFAULT_TECHNOLOGIES
                    .contains(&def.name.as_str())
                    .then(|| def.name.clone()),
            };
            self.data
                .technologies
                .insert(def.name.clone(), TechAdvance::new(&def.name, property));
        }
        for def in &technology.player_techs {
            self.check(self.data.player(&def.player))?;
            for category in &def.categories {
                let mut techs = IndexSet::new();
                for tech in &category.techs {
                    let advance = self.data.technology(tech).map_err(|_| {
                        self.error(format!("Technology not found: {}", tech))
                    })?;
                    techs.insert(advance.name.clone());
                }
                if let Some(player) = self.data.players.get_mut(&def.player) {
                    player.tech_categories.insert(category.name.clone(), techs);
                }
            }
        }
        debug!(count = technology.technologies.len(), "parsed technologies");
        Ok(())
    }

    fn add_default_technologies(&mut self) {
        for tech in DEFAULT_TECHNOLOGIES {
            self.data
                .technologies
                .insert(tech.to_string(), TechAdvance::new(*tech, Some(tech.to_string())));
        }
    }

    /// Give each built-in technology without an ability its stock one.
    fn add_default_tech_abilities(&mut self) -> Result<()> {
        let key = AttachmentKind::TechAbility.default_key();
        let missing: Vec<(String, String)> = self
            .data
            .technologies
            .values()
            .filter(|tech| !tech.attachments.contains_key(key))
            .filter_map(|tech| Some((tech.name.clone(), tech.property.clone()?)))
            .collect();
        for (name, property) in &missing {
            let ability = TechAbilityAttachment::stock(key, property, &self.data);
            let result = self.data.attach(
                EntityKind::Technology,
                name,
                Attachment::TechAbility(ability),
            );
            self.check(result)?;
        }
        debug!(count = missing.len(), "added default tech abilities");
        Ok(())
    }

    // Attachments

    fn parse_attachments(&mut self, defs: &[AttachmentDef], variables: &Variables) -> Result<()> {
        for def in defs {
            let bindings = variables
                .foreach(&def.foreach)
                .map_err(|e| self.error(e.to_string()))?;
            for binding in &bindings {
                self.parse_attachment(def, variables, binding)?;
            }
        }
        debug!(count = self.data.attachment_order.len(), "parsed attachments");
        Ok(())
    }

    fn parse_attachment(
        &mut self,
        def: &AttachmentDef,
        variables: &Variables,
        binding: &ForeachBinding,
    ) -> Result<()> {
        let kind = EntityKind::from_target_tag(&def.target_type).ok_or_else(|| {
            self.error(format!("Type not found to attach to: {}", def.target_type))
        })?;
        let mut target = apply_foreach(&def.attach_to, binding);
        if kind == EntityKind::Technology {
            target = self.check(self.data.technology(&target))?.name.clone();
        }
        self.check(self.data.attachable(kind, &target))?;

        let name = apply_foreach(&def.name, binding);
        let mut attachment = self.config.registry.create(&def.kind, &name).ok_or_else(|| {
            self.error(format!(
                "Attachment of type {} could not be instantiated",
                def.kind
            ))
        })?;
        let options = self.set_options(&mut attachment, &def.options, binding, variables)?;
        let result = self.data.attach(kind, &target, attachment);
        self.check(result)?;
        self.data.attachment_order.push(AttachmentRecord {
            attachment: AttachmentRef::new(kind, target, name),
            options,
        });
        Ok(())
    }

    /// Apply each option in order, returning `(property, final value)` pairs.
    fn set_options(
        &self,
        attachment: &mut Attachment,
        options: &[OptionDef],
        binding: &ForeachBinding,
        variables: &Variables,
    ) -> Result<Vec<(String, String)>> {
        let mut applied = Vec::with_capacity(options.len());
        for option in options {
            let property = decapitalize(&option.name);
            if property.is_empty() {
                return Err(self.error(format!(
                    "Option name with zero length for attachment: {}",
                    attachment.name()
                )));
            }
            let value = if option.count.is_empty() {
                option.value.clone()
            } else {
                format!("{}{}{}", option.count, SEPARATOR, option.value)
            };
            if uses_empty_placeholder(&value, binding) {
                debug!(attachment = attachment.name(), %property, "skipped option with empty foreach element");
                continue;
            }
            let value = variables.substitute(&apply_foreach(&value, binding));
            attachment
                .set_property(&property, &value)
                .map_err(|e| self.model_error(e))?;
            applied.push((property, value));
        }
        Ok(applied)
    }

    // Initialization

    fn parse_initialization(&mut self, initialize: &InitializeDef) -> Result<()> {
        for def in &initialize.owners {
            let owner = self.owner(&def.owner)?;
            self.check(self.data.territory(&def.territory))?;
            let Some(territory) = self.data.territories.get_mut(&def.territory) else {
                continue;
            };
            territory.owner = owner.clone();
            // keep an original owner the map already set through the attachment
            let attachment = territory.attachments.values_mut().find_map(|a| match a {
                Attachment::Territory(territory) => Some(territory),
                _ => None,
            });
            if let (Some(attachment), Some(owner)) = (attachment, owner) {
                if attachment.original_owner.is_none() {
                    attachment.original_owner = Some(owner);
                }
            }
        }

        for def in &initialize.unit_placements {
            self.check(self.data.territory(&def.territory))?;
            let owner = self.owner(&def.owner)?;
            let hit_points = self.hit_points(&def.unit_type)?;
            if def.hits_taken < 0 || def.hits_taken > hit_points - 1 {
                return Err(self.error(format!(
                    "hitsTaken cannot be less than zero or greater than one less than total \
                     hitPoints, invalid placement: {} {} in {}",
                    def.quantity, def.unit_type, def.territory
                )));
            }
            if def.unit_damage < 0 {
                return Err(self.error(format!(
                    "unitDamage cannot be less than zero, invalid placement: {} {} in {}",
                    def.quantity, def.unit_type, def.territory
                )));
            }
            let result = self
                .data
                .create_units(&def.unit_type, def.quantity, owner.as_deref());
            let units: Vec<Unit> = self
                .check(result)?
                .into_iter()
                .map(|mut unit| {
                    unit.hits = def.hits_taken as u32;
                    unit.bombing_damage = def.unit_damage as u32;
                    unit
                })
                .collect();
            if let Some(territory) = self.data.territories.get_mut(&def.territory) {
                territory.units.extend(units);
            }
        }

        for def in &initialize.held_units {
            self.check(self.data.player(&def.player))?;
            let result = self
                .data
                .create_units(&def.unit_type, def.quantity, Some(&def.player));
            let units = self.check(result)?;
            if let Some(player) = self.data.players.get_mut(&def.player) {
                player.held_units.extend(units);
            }
        }

        for def in &initialize.resources_given {
            self.check(self.data.resource(&def.resource))?;
            self.check(self.data.player(&def.player))?;
            if let Some(player) = self.data.players.get_mut(&def.player) {
                let balance = player.resource(&def.resource);
                player
                    .resources
                    .insert(def.resource.clone(), balance + def.quantity);
            }
        }

        if let Some(relationships) = &initialize.relationships {
            for def in relationships {
                for player in [&def.player1, &def.player2] {
                    if !self.data.is_player_or_null(player) {
                        return Err(self.model_error(conquest_core::Error::not_found(
                            EntityKind::Player,
                            player,
                        )));
                    }
                }
                self.check(self.data.relationship_type(&def.relationship_type))?;
                self.data.relationships.set(
                    &def.player1,
                    &def.player2,
                    &def.relationship_type,
                    def.round_value,
                );
            }
        }
        debug!("parsed initialization");
        Ok(())
    }

    fn hit_points(&self, unit_type: &str) -> Result<i32> {
        self.check(self.data.unit_type(unit_type))?
            .attachments
            .values()
            .find_map(Attachment::as_unit)
            .map(|unit| unit.hit_points)
            .ok_or_else(|| {
                self.error(format!(
                    "{} does not have unit attachments for: {}",
                    self.game_name(),
                    unit_type
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{UnitPlacementDef, VariableDef};
    use conquest_core::relationship::{NULL_RELATION, SELF_RELATION};
    use conquest_core::{Attachable, Error as ModelError};

    const SKIRMISH: &str = include_str!("../testdata/skirmish.ron");

    fn skirmish() -> GameDocument {
        ron::from_str(SKIRMISH).unwrap()
    }

    fn load(document: GameDocument) -> Result<GameData> {
        Loader::new("skirmish").parse_document(document)
    }

    fn message(err: &Error) -> String {
        err.to_string()
    }

    #[test]
    fn test_load_skirmish() {
        let data = Loader::new("skirmish").parse_str(SKIRMISH).unwrap();

        assert_eq!(data.game_name, "Skirmish of the Passes");
        assert_eq!(data.game_version, "1.2");
        assert_eq!(data.dice_sides, 6);
        assert_eq!(data.round_offset, 575);
        assert_eq!(
            data.players.keys().collect::<Vec<_>>(),
            vec!["Keoland", "Furyondy", "Iuz"]
        );
        assert_eq!(data.player("Furyondy").unwrap().default_type, "AI");
        assert!(data.player("Iuz").unwrap().optional);

        assert!(!data.properties.get_bool("Low Luck", true));
        assert_eq!(data.properties.get_int("neutralCharge", 0), 3);
        assert_eq!(data.properties.get("neutralCharge").unwrap().max, Some(10));
        assert_eq!(data.properties.get_int("maxRounds", 0), 12);
        assert_eq!(data.properties.get_str("notes", ""), "Hold the passes.");
        assert_eq!(
            data.properties.editable().collect::<Vec<_>>(),
            vec!["Low Luck", "neutralCharge"]
        );

        assert!(data.territory("Nyr Dyv").unwrap().is_water);
        assert_eq!(
            data.neighbors("Hraak Pass").collect::<Vec<_>>(),
            vec!["Corusk Pass", "Soull Pass"]
        );
        assert!(data.resource("techTokens").unwrap().hidden);
        assert!(!data.resource("gold").unwrap().is_displayed_for("Iuz"));

        assert_eq!(data.delegates["initDelegate"].display, "Initializing Delegates");
        assert_eq!(data.delegates["place"].display, "place");
        assert_eq!(data.sequence.len(), 7);
        assert_eq!(data.sequence[0].max_run_count, Some(1));
        assert_eq!(data.sequence[1].max_run_count, None);
        assert_eq!(
            data.sequence[5].properties.get("skipPosting").map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_foreach_attachments_expand() {
        let data = load(skirmish()).unwrap();

        let stats = |unit_type: &str| {
            data.unit_type(unit_type)
                .unwrap()
                .attachments
                .values()
                .find_map(Attachment::as_unit)
                .cloned()
                .unwrap()
        };
        assert_eq!(stats("conscript").attack, 1);
        assert_eq!(stats("sellsword").attack, 2);
        let knight = stats("knight");
        assert_eq!(
            (knight.movement, knight.attack, knight.defense, knight.hit_points),
            (2, 3, 2, 2)
        );

        let territory = |name: &str| {
            data.territory(name)
                .unwrap()
                .attachments
                .values()
                .find_map(Attachment::as_territory)
                .cloned()
                .unwrap()
        };
        assert_eq!(territory("Corusk Pass").production, 2);
        assert_eq!(territory("Soull Pass").production, 3);
        assert!(territory("Corusk Pass").territory_effects.is_empty());
        assert_eq!(territory("Hraak Pass").territory_effects, vec!["mountain"]);
        assert!(territory("Nyr Dyv").convoy_route);

        let player_attachment = data
            .player("Keoland")
            .unwrap()
            .attachment("playerAttachment")
            .unwrap();
        assert_eq!(
            player_attachment
                .get_property("productionPerXTerritories")
                .unwrap(),
            "3:conscript"
        );
    }

    #[test]
    fn test_original_owner_kept_when_set_by_map() {
        let data = load(skirmish()).unwrap();
        let original_owner = |name: &str| {
            data.territory(name)
                .unwrap()
                .attachments
                .values()
                .find_map(Attachment::as_territory)
                .and_then(|a| a.original_owner.clone())
        };
        assert_eq!(
            data.territory("Corusk Pass").unwrap().owner.as_deref(),
            Some("Keoland")
        );
        assert_eq!(original_owner("Corusk Pass").as_deref(), Some("Furyondy"));
        assert_eq!(original_owner("Hraak Pass").as_deref(), Some("Keoland"));
        assert_eq!(original_owner("Soull Pass").as_deref(), Some("Furyondy"));
        assert!(data.territory("Nyr Dyv").unwrap().owner.is_none());
    }

    #[test]
    fn test_initial_units_and_resources() {
        let data = load(skirmish()).unwrap();

        let corusk = data.territory("Corusk Pass").unwrap();
        assert_eq!(corusk.units_owned_by("Keoland").count(), 2);
        let hraak = data.territory("Hraak Pass").unwrap();
        assert_eq!(hraak.units[0].unit_type, "knight");
        assert_eq!(hraak.units[0].hits, 1);
        let soull = data.territory("Soull Pass").unwrap();
        assert_eq!(soull.units.len(), 3);
        assert!(soull.units[2].owner.is_none());

        let mut ids: Vec<_> = data
            .territories
            .values()
            .flat_map(|t| t.units.iter().map(|u| u.id))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);

        let furyondy = data.player("Furyondy").unwrap();
        assert_eq!(furyondy.held_units.len(), 1);
        assert_eq!(furyondy.resource("PUs"), 15);
        assert_eq!(data.player("Iuz").unwrap().resource("techTokens"), 2);
        assert_eq!(data.player("Keoland").unwrap().resource("gold"), 0);
    }

    #[test]
    fn test_production_and_technology() {
        let data = load(skirmish()).unwrap();

        let keoland = data.player("Keoland").unwrap();
        assert_eq!(keoland.production_frontier.as_deref(), Some("production"));
        assert_eq!(keoland.repair_frontier.as_deref(), Some("repair"));
        assert_eq!(data.production_frontier("productionIuz").unwrap().rules.len(), 4);
        let knight = data.production_rule("buyKnight").unwrap();
        assert_eq!(knight.costs.get("gold"), Some(&1));
        assert_eq!(knight.results.get("knight"), Some(&1));

        assert_eq!(data.technology("jetPower").unwrap().name, "Jet Power");
        assert_eq!(
            data.technology("longRangeAir").unwrap().property.as_deref(),
            Some("longRangeAir")
        );
        assert!(data.technology("Siegecraft").unwrap().property.is_none());
        let air = &keoland.tech_categories["airCategory"];
        assert!(air.contains("Jet Power"));
        assert!(air.contains("longRangeAir"));
        assert!(data.technologies["Jet Power"]
            .attachments
            .contains_key("techAbilityAttachment"));
    }

    #[test]
    fn test_default_technologies_get_stock_abilities() {
        let mut document = skirmish();
        document.technology = None;
        let data = load(document).unwrap();

        let ability = |tech: &str| {
            data.technology(tech)
                .unwrap()
                .attachment("techAbilityAttachment")
                .unwrap()
                .as_tech_ability()
                .unwrap()
                .clone()
        };
        // the map's own ability for jet power stays
        assert_eq!(ability("jetPower").attack_bonus, 1);
        assert_eq!(ability("jetPower").defense_bonus, 0);
        let range = ability("longRangeAir");
        assert_eq!(range.movement_bonus, 2);
        // no air units on this map
        assert!(range.unit_types.is_empty());
        assert_eq!(ability("increasedFactoryProduction").production_bonus, 2);
        assert_eq!(ability("rocket").get_property("attackBonus").unwrap(), "0");
        for tech in DEFAULT_TECHNOLOGIES {
            assert!(data
                .technology(tech)
                .unwrap()
                .attachment_of("techAbilityAttachment", AttachmentKind::TechAbility)
                .is_ok());
        }
    }

    #[test]
    fn test_map_abilities_are_kept() {
        let data = load(skirmish()).unwrap();
        let jets = data.technologies["Jet Power"]
            .attachment("techAbilityAttachment")
            .unwrap()
            .as_tech_ability()
            .unwrap();
        assert_eq!(jets.attack_bonus, 1);
        assert_eq!(jets.defense_bonus, 0);

        let range = data.technology("longRangeAir").unwrap();
        assert!(range.attachments.contains_key("techAbilityAttachment"));
        // not a built-in technology
        assert!(data.technology("Siegecraft").unwrap().attachments.is_empty());
    }

    #[test]
    fn test_relationships() {
        let data = load(skirmish()).unwrap();
        assert_eq!(data.relationship_between("Keoland", "Furyondy").unwrap(), "neutral");
        assert_eq!(data.relationship_between("Keoland", "Keoland").unwrap(), SELF_RELATION);
        assert_eq!(data.relationship_between("Iuz", NULL_PLAYER).unwrap(), NULL_RELATION);
        assert_eq!(
            data.relationships.get("Iuz", "Furyondy").unwrap().round_created,
            1
        );
        assert_eq!(data.archetype("allied").unwrap(), conquest_core::Archetype::Allied);
    }

    #[test]
    fn test_relationships_default_to_alliances() {
        let mut document = skirmish();
        if let Some(initialize) = document.initialize.as_mut() {
            initialize.relationships = None;
        }
        let data = load(document).unwrap();
        assert_eq!(
            data.relationship_between("Keoland", "Furyondy").unwrap(),
            DEFAULT_ALLIED_RELATION
        );
        assert_eq!(
            data.relationship_between("Furyondy", "Iuz").unwrap(),
            DEFAULT_WAR_RELATION
        );
    }

    #[test]
    fn test_triggers_attached_to_player() {
        let data = load(skirmish()).unwrap();
        assert_eq!(data.triggers().count(), 3);
        let reinforce = data.find_trigger("triggerAttachment_reinforce").unwrap();
        assert_eq!(reinforce.attached_to.as_deref(), Some("Keoland"));
        assert_eq!(reinforce.uses, 1);
        assert_eq!(reinforce.placement[0].count, 2);
        assert_eq!(reinforce.placement[0].territory, "Corusk Pass");
        assert_eq!(reinforce.notification.as_deref(), Some("Reinforcements"));
        let chain = data.find_trigger("triggerAttachment_chain").unwrap();
        assert_eq!(chain.activate_trigger[0].trigger, "triggerAttachment_reinforce");
    }

    #[test]
    fn test_reapplying_recorded_options_reproduces_attachments() {
        let data = load(skirmish()).unwrap();
        assert_eq!(data.attachment_order.len(), 15);

        let mut rebuilt = data.clone();
        for record in &data.attachment_order {
            let attachment = rebuilt.attachment_mut(&record.attachment).unwrap();
            let mut seen = IndexSet::new();
            for (property, _) in &record.options {
                if seen.insert(property.as_str()) {
                    attachment.reset_property(property).unwrap();
                }
            }
            for (property, value) in &record.options {
                attachment.set_property(property, value).unwrap();
            }
        }
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_engine_version_checked_first() {
        let mut document = skirmish();
        document.dice_sides = Some(0);
        let config = LoaderConfig::default().with_engine_version(EngineVersion::new(0, 0, 9));
        let err = Loader::with_config("skirmish", config)
            .parse_document(document)
            .unwrap_err();
        assert!(matches!(err, Error::EngineVersion { .. }));
        assert!(message(&err).contains("0.0.9"));
    }

    #[test]
    fn test_invalid_dice_sides() {
        let mut document = skirmish();
        document.dice_sides = Some(0);
        let err = load(document).unwrap_err();
        assert_eq!(
            message(&err),
            "map name: 'skirmish', game name: 'Skirmish of the Passes', \
             Invalid value for dice sides: 0"
        );
    }

    #[test]
    fn test_unknown_game_name_in_errors() {
        let mut document = skirmish();
        document.info.name = String::new();
        document.dice_sides = Some(-2);
        let err = load(document).unwrap_err();
        assert!(message(&err).contains("game name: '<unknown>'"));
    }

    #[test]
    fn test_cyclic_variables_fail() {
        let mut document = skirmish();
        document.variables.push(VariableDef {
            name: "a".into(),
            elements: vec!["$b$".into()],
        });
        document.variables.push(VariableDef {
            name: "b".into(),
            elements: vec!["$a$".into()],
        });
        let err = load(document).unwrap_err();
        assert!(message(&err).contains("refers to itself"));
    }

    #[test]
    fn test_foreach_lengths_must_match() {
        let mut document = skirmish();
        document.attachments[0].foreach = "$landUnits$:$passes$:$moves$:$foot$".into();
        let err = load(document).unwrap_err();
        assert!(message(&err).contains("same number of elements"));
    }

    #[test]
    fn test_unknown_target_type() {
        let mut document = skirmish();
        document.attachments[2].target_type = "sea".into();
        let err = load(document).unwrap_err();
        assert!(message(&err).ends_with("Type not found to attach to: sea"));
    }

    #[test]
    fn test_unknown_attachment_kind() {
        let mut document = skirmish();
        document.attachments[7].kind = "RulesAttachment".into();
        let err = load(document).unwrap_err();
        assert!(message(&err).contains("Attachment of type RulesAttachment could not be instantiated"));
    }

    #[test]
    fn test_bad_option_value_names_the_option() {
        let mut document = skirmish();
        document.attachments[2].options[0].value = "maybe".into();
        let err = load(document).unwrap_err();
        assert!(matches!(
            err.model_error(),
            Some(ModelError::Decode { option, .. }) if option == "convoyRoute"
        ));
    }

    #[test]
    fn test_hits_taken_must_leave_a_hit_point() {
        let mut document = skirmish();
        if let Some(initialize) = document.initialize.as_mut() {
            initialize.unit_placements.push(UnitPlacementDef {
                unit_type: "knight".into(),
                territory: "Soull Pass".into(),
                quantity: 1,
                owner: "Furyondy".into(),
                hits_taken: 2,
                unit_damage: 0,
            });
        }
        let err = load(document).unwrap_err();
        assert!(message(&err).contains("hitsTaken cannot be less than zero"));
    }

    #[test]
    fn test_duplicate_territory() {
        let mut document = skirmish();
        let corusk = document.map.territories[0].clone();
        document.map.territories.push(corusk);
        let err = load(document).unwrap_err();
        assert!(message(&err).ends_with("duplicate territory: Corusk Pass"));
    }

    #[test]
    fn test_unit_type_without_attachment_fails_validation() {
        let mut document = skirmish();
        document.units.push("dragon".into());
        let err = load(document).unwrap_err();
        assert!(message(&err).contains("validation failed"));
        assert!(matches!(
            err.model_error(),
            Some(ModelError::AttachmentNotFound { key, .. })
                if key == AttachmentKind::Unit.default_key()
        ));
    }

    #[test]
    fn test_unknown_player_in_resources() {
        let mut document = skirmish();
        document.resources[2].is_displayed_for = "Keoland:Geoff".into();
        let err = load(document).unwrap_err();
        assert!(message(&err).ends_with("Parse resources could not find player: Geoff"));
    }

    #[test]
    fn test_malformed_document() {
        let err = Loader::new("broken").parse_str("(info: (name: ").unwrap_err();
        assert!(matches!(err, Error::Document { ref map, .. } if map == "broken"));
    }
}
