//! Production frontier changes

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::{Change, ChangeSet, PropertyBag, Result, TriggerAttachment};
use indexmap::IndexMap;
use tracing::debug;

/// Give the trigger's players the production frontier named by `frontier`.
pub fn trigger_production_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| t.frontier.is_some());
    let mut changes = ChangeSet::new();
    let mut assigned: IndexMap<String, Option<String>> = IndexMap::new();

    for trigger in triggers {
        let Some(frontier) = trigger.frontier.as_deref() else {
            continue;
        };
        bridge.data().production_frontier(frontier)?;
        for player in trigger.players() {
            let previous = match assigned.get(&player) {
                Some(previous) => previous.clone(),
                None => bridge.data().player(&player)?.production_frontier.clone(),
            };
            if previous.as_deref() == Some(frontier) {
                continue;
            }
            bridge.history_writer().start_event(&format!(
                "{}: {} has their production frontier changed to: {}",
                trigger.name(),
                player,
                frontier
            ));
            assigned.insert(player.clone(), Some(frontier.to_string()));
            changes.push(Change::ProductionFrontier {
                player,
                previous,
                frontier: Some(frontier.to_string()),
            });
        }
    }

    if !changes.is_empty() {
        debug!(count = changes.len(), "changing production frontiers");
        bridge.add_change(changes)?;
    }
    Ok(())
}

/// Add rules to and remove rules from frontiers, one history event per edit.
///
/// Adding a rule already offered, or removing one that is not, is skipped.
pub fn trigger_production_frontier_edit_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.production_rule.is_empty());
    let mut changes = ChangeSet::new();
    // Rules each edited frontier will offer once `changes` applies.
    let mut offered: IndexMap<String, Vec<String>> = IndexMap::new();

    for trigger in triggers {
        for edit in &trigger.production_rule {
            bridge.data().production_rule(&edit.rule)?;
            if !offered.contains_key(&edit.frontier) {
                let rules = bridge.data().production_frontier(&edit.frontier)?.rules.clone();
                offered.insert(edit.frontier.clone(), rules);
            }
            let Some(rules) = offered.get_mut(&edit.frontier) else {
                continue;
            };
            let present = rules.contains(&edit.rule);
            if edit.remove == !present {
                continue;
            }

            let (change, verb) = if edit.remove {
                rules.retain(|r| r != &edit.rule);
                let change = Change::RemoveProductionRule {
                    frontier: edit.frontier.clone(),
                    rule: edit.rule.clone(),
                };
                (change, "removed from")
            } else {
                rules.push(edit.rule.clone());
                let change = Change::AddProductionRule {
                    frontier: edit.frontier.clone(),
                    rule: edit.rule.clone(),
                };
                (change, "added to")
            };
            bridge.history_writer().start_event(&format!(
                "{}: {} {} {}",
                trigger.name(),
                edit.rule,
                verb,
                edit.frontier
            ));
            changes.push(change);
        }
    }

    if !changes.is_empty() {
        debug!(count = changes.len(), "editing production frontiers");
        bridge.add_change(changes)?;
    }
    Ok(())
}
