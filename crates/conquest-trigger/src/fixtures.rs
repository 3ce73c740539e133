//! A small game shared by the engine tests

use conquest_core::relationship::DEFAULT_WAR_RELATION;
use conquest_core::{
    Archetype, Attachment, AttachmentKind, EntityKind, Frontier, GameData, Player, PropertyBag,
    Resource, Rule, TechAdvance, Territory, TerritoryEffect, TriggerAttachment, UnitType,
    NULL_PLAYER,
};
use indexmap::IndexSet;

pub(crate) const PLAYERS: [&str; 3] = ["Keoland", "Furyondy", "Iuz"];

/// Three players around three passes and a lake.
///
/// Keoland holds Corusk and Hraak Pass and buys from `production`;
/// Furyondy holds Soull Pass. Keoland and Furyondy are neutral, everyone
/// else is at war. The frontier `frontier` offers only `rule2`.
pub(crate) fn game() -> GameData {
    let mut data = GameData::new();
    data.game_name = "Skirmish of the Passes".to_string();
    for name in PLAYERS {
        data.players.insert(name.to_string(), Player::new(name));
    }
    data.resources
        .insert("PUs".to_string(), Resource::new("PUs"));

    data.add_relationship_type("neutral", Archetype::Neutral);
    data.add_relationship_type("allied", Archetype::Allied);
    data.relationships.set_self_relations(PLAYERS);
    data.relationships
        .set_null_player_relations(NULL_PLAYER, PLAYERS);
    data.relationships.set("Keoland", "Furyondy", "neutral", 0);
    data.relationships
        .set("Keoland", "Iuz", DEFAULT_WAR_RELATION, 0);
    data.relationships
        .set("Furyondy", "Iuz", DEFAULT_WAR_RELATION, 0);

    for (name, owner, is_water) in [
        ("Corusk Pass", Some("Keoland"), false),
        ("Hraak Pass", Some("Keoland"), false),
        ("Soull Pass", Some("Furyondy"), false),
        ("Nyr Dyv", None, true),
    ] {
        let mut territory = Territory::new(name, is_water);
        territory.owner = owner.map(str::to_string);
        data.territories.insert(name.to_string(), territory);
        if !is_water {
            attach_default(&mut data, EntityKind::Territory, name, AttachmentKind::Territory);
        }
    }

    for unit_type in ["conscript", "sellsword", "brigantine", "skirmisher"] {
        data.unit_types
            .insert(unit_type.to_string(), UnitType::new(unit_type));
        attach_default(&mut data, EntityKind::UnitType, unit_type, AttachmentKind::Unit);
    }

    data.territory_effects
        .insert("mountain".to_string(), TerritoryEffect::new("mountain"));
    attach_default(
        &mut data,
        EntityKind::TerritoryEffect,
        "mountain",
        AttachmentKind::TerritoryEffect,
    );
    attach_default(&mut data, EntityKind::Player, "Keoland", AttachmentKind::Player);

    for rule in ["rule1", "rule2", "rule3"] {
        data.production_rules
            .insert(rule.to_string(), Rule::new(rule));
    }
    let mut frontier = Frontier::new("frontier");
    frontier.rules.push("rule2".to_string());
    data.production_frontiers
        .insert("frontier".to_string(), frontier);
    for name in ["production", "superProduction"] {
        data.production_frontiers
            .insert(name.to_string(), Frontier::new(name));
    }

    for tech in ["longRangeAir", "jetPower", "heavyBomber"] {
        data.technologies
            .insert(tech.to_string(), TechAdvance::new(tech, Some(tech.to_string())));
    }

    if let Some(keoland) = data.players.get_mut("Keoland") {
        keoland.production_frontier = Some("production".to_string());
        keoland
            .tech_categories
            .insert("airCategory".to_string(), IndexSet::new());
    }
    data
}

fn attach_default(data: &mut GameData, target: EntityKind, name: &str, kind: AttachmentKind) {
    data.attach(target, name, Attachment::new(kind, kind.default_key()))
        .unwrap();
}

/// An unattached trigger acting for `owner`.
pub(crate) fn trigger(name: &str, owner: &str) -> TriggerAttachment {
    TriggerAttachment::new(name).with_owner(owner)
}

pub(crate) fn set(trigger: &mut TriggerAttachment, option: &str, value: &str) {
    trigger.set_property(option, value).unwrap();
}

/// Hang `trigger` off its owner so uses and activation can find it.
pub(crate) fn attach_trigger(data: &mut GameData, trigger: TriggerAttachment) {
    let owner = trigger.attached_to.clone().unwrap();
    data.attach(EntityKind::Player, &owner, Attachment::Trigger(trigger))
        .unwrap();
}

/// Put `count` new units of `unit_type` into `territory`.
pub(crate) fn place(
    data: &mut GameData,
    territory: &str,
    unit_type: &str,
    count: u32,
    owner: Option<&str>,
) {
    let units = data.create_units(unit_type, count, owner).unwrap();
    data.territory_mut(territory).unwrap().units.extend(units);
}

pub(crate) fn count_units(data: &GameData, territory: &str, unit_type: &str) -> usize {
    data.territory(territory)
        .unwrap()
        .units
        .iter()
        .filter(|u| u.unit_type == unit_type)
        .count()
}
