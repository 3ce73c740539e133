//! Unit purchase, placement and removal

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::codec::TerritoryScope;
use conquest_core::{
    describe_units, Change, ChangeSet, PropertyBag, Result, TriggerAttachment, Unit, UnitLocation,
};
use tracing::debug;

/// Buy units into each player's pool of units waiting to be placed.
///
/// One change set per trigger and player.
pub fn trigger_purchase(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.purchase.is_empty());
    for trigger in triggers {
        for player in trigger.players() {
            bridge.data().player(&player)?;
            let mut units = Vec::new();
            for purchase in &trigger.purchase {
                for unit_type in &purchase.unit_types {
                    units.extend(bridge.create_units(unit_type, purchase.count, Some(&player))?);
                }
            }
            if units.is_empty() {
                continue;
            }
            bridge.history_writer().start_event(&format!(
                "{}: {} buys {}",
                trigger.name(),
                player,
                describe_units(&units)
            ));
            debug!(player = %player, count = units.len(), "purchasing units");
            bridge.add_change(
                Change::AddUnits {
                    location: UnitLocation::Held(player),
                    units,
                }
                .into(),
            )?;
        }
    }
    Ok(())
}

/// Place new units for each player; one change set per placement.
pub fn trigger_unit_placement(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.placement.is_empty());
    for trigger in triggers {
        for player in trigger.players() {
            bridge.data().player(&player)?;
            for placement in &trigger.placement {
                bridge.data().territory(&placement.territory)?;
                let mut units = Vec::new();
                for unit_type in &placement.unit_types {
                    units.extend(bridge.create_units(unit_type, placement.count, Some(&player))?);
                }
                if units.is_empty() {
                    continue;
                }
                bridge.history_writer().start_event(&format!(
                    "{}: {} has {} placed in {}",
                    trigger.name(),
                    player,
                    describe_units(&units),
                    placement.territory
                ));
                debug!(player = %player, territory = %placement.territory, "placing units");
                bridge.add_change(
                    Change::AddUnits {
                        location: UnitLocation::Territory(placement.territory.clone()),
                        units,
                    }
                    .into(),
                )?;
            }
        }
    }
    Ok(())
}

/// Remove up to `count` of each named unit type owned by the players.
///
/// One change set per removal; a removal that finds no units does nothing.
pub fn trigger_unit_removal(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.remove_units.is_empty());
    for trigger in triggers {
        for player in trigger.players() {
            for removal in &trigger.remove_units {
                let data = bridge.data();
                let territories: Vec<String> = match &removal.territory {
                    TerritoryScope::All => data.territories.keys().cloned().collect(),
                    TerritoryScope::Named(name) => vec![data.territory(name)?.name.clone()],
                };
                let unit_types: Vec<&String> = data
                    .unit_types
                    .keys()
                    .filter(|unit_type| removal.unit_types.matches(unit_type))
                    .collect();

                let mut changes = ChangeSet::new();
                let mut events = Vec::new();
                for territory in &territories {
                    let present = &data.territory(territory)?.units;
                    let mut removed: Vec<Unit> = Vec::new();
                    for unit_type in &unit_types {
                        removed.extend(
                            present
                                .iter()
                                .filter(|u| u.unit_type == **unit_type && u.is_owned_by(&player))
                                .take(removal.count as usize)
                                .cloned(),
                        );
                    }
                    if removed.is_empty() {
                        continue;
                    }
                    events.push(format!(
                        "{}: {} has {} removed from {}",
                        trigger.name(),
                        player,
                        describe_units(&removed),
                        territory
                    ));
                    changes.push(Change::RemoveUnits {
                        location: UnitLocation::Territory(territory.clone()),
                        units: removed,
                    });
                }

                if changes.is_empty() {
                    continue;
                }
                for event in &events {
                    bridge.history_writer().start_event(event);
                }
                debug!(player = %player, territories = changes.len(), "removing units");
                bridge.add_change(changes)?;
            }
        }
    }
    Ok(())
}
