//! Technology grants and availability

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::{Change, EntityKind, Error, PropertyBag, Result, TriggerAttachment};
use tracing::debug;

/// Grant each of the trigger's techs to its players.
///
/// Each grant is a change set of its own; techs already held are skipped.
pub fn trigger_tech_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.tech.is_empty());
    for trigger in triggers {
        for player in trigger.players() {
            for tech in &trigger.tech {
                let data = bridge.data();
                let tech = data.technology(tech)?.name.clone();
                if data.player(&player)?.techs.contains(&tech) {
                    continue;
                }
                bridge.history_writer().start_event(&format!(
                    "{}: {} activates {}",
                    trigger.name(),
                    player,
                    tech
                ));
                debug!(player = %player, tech = %tech, "granting technology");
                bridge.add_change(
                    Change::AddTech {
                        player: player.clone(),
                        tech,
                    }
                    .into(),
                )?;
            }
        }
    }
    Ok(())
}

/// Add techs to, or withdraw them from, the players' tech categories.
///
/// Each edit is a change set of its own; redundant edits are skipped. The
/// category must already exist for the player.
pub fn trigger_available_tech_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.available_tech.is_empty());
    for trigger in triggers {
        for player in trigger.players() {
            for availability in &trigger.available_tech {
                for (tech, add) in &availability.techs {
                    let data = bridge.data();
                    let tech = data.technology(tech)?.name.clone();
                    let offered = data
                        .player(&player)?
                        .tech_categories
                        .get(&availability.category)
                        .ok_or_else(|| {
                            Error::not_found(EntityKind::TechnologyCategory, &availability.category)
                        })?
                        .contains(&tech);
                    if offered == *add {
                        continue;
                    }

                    let (change, verb) = if *add {
                        let change = Change::AddAvailableTech {
                            player: player.clone(),
                            category: availability.category.clone(),
                            tech: tech.clone(),
                        };
                        (change, "added to")
                    } else {
                        let change = Change::RemoveAvailableTech {
                            player: player.clone(),
                            category: availability.category.clone(),
                            tech: tech.clone(),
                        };
                        (change, "removed from")
                    };
                    bridge.history_writer().start_event(&format!(
                        "{}: {} {} {} for {}",
                        trigger.name(),
                        tech,
                        verb,
                        availability.category,
                        player
                    ));
                    bridge.add_change(change.into())?;
                }
            }
        }
    }
    Ok(())
}
