//! Firing a set of satisfied triggers
//!
//! [`fire_triggers`] filters the set once (when, uses, chance), runs every
//! effect kind over the survivors in a fixed order and finally consumes
//! their uses. Each `trigger_*` function can also be called on its own; it
//! applies the same filters to the triggers carrying its option.

use crate::activate::activate_with_stack;
use crate::bridge::Bridge;
use crate::message::MessageLookup;
use crate::notify::{trigger_notifications, trigger_victory};
use crate::ownership::trigger_change_ownership;
use crate::params::FireTriggerParams;
use crate::production::{trigger_production_change, trigger_production_frontier_edit_change};
use crate::property::{
    trigger_player_property_change, trigger_relationship_type_property_change,
    trigger_territory_effect_property_change, trigger_territory_property_change,
    trigger_unit_property_change,
};
use crate::relationship::trigger_relationship_change;
use crate::resource::trigger_resource_change;
use crate::support::trigger_support_change;
use crate::tech::{trigger_available_tech_change, trigger_tech_change};
use crate::units::{trigger_purchase, trigger_unit_placement, trigger_unit_removal};
use conquest_core::{Change, ChangeSet, Error, PropertyBag, Result, TriggerAttachment};
use indexmap::IndexSet;
use tracing::debug;

/// Fire every effect of `satisfied`, in order.
///
/// The caller has already decided the triggers' conditions hold.
pub fn fire_triggers(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
) -> Result<()> {
    let mut stack = Vec::new();
    fire_with_stack(satisfied, bridge, params, messages, &mut stack)
}

pub(crate) fn fire_with_stack(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
    stack: &mut Vec<String>,
) -> Result<()> {
    let fired: Vec<TriggerAttachment> = eligible(satisfied, bridge, params, |_| true)
        .into_iter()
        .cloned()
        .collect();
    if fired.is_empty() {
        return Ok(());
    }
    debug!(
        count = fired.len(),
        step = ?params.step_name,
        "firing triggers"
    );

    let inner = params.untested();
    trigger_notifications(&fired, bridge, &inner, messages)?;
    trigger_player_property_change(&fired, bridge, &inner)?;
    trigger_relationship_type_property_change(&fired, bridge, &inner)?;
    trigger_territory_property_change(&fired, bridge, &inner)?;
    trigger_territory_effect_property_change(&fired, bridge, &inner)?;
    trigger_relationship_change(&fired, bridge, &inner)?;
    trigger_available_tech_change(&fired, bridge, &inner)?;
    trigger_tech_change(&fired, bridge, &inner)?;
    trigger_production_change(&fired, bridge, &inner)?;
    trigger_production_frontier_edit_change(&fired, bridge, &inner)?;
    trigger_support_change(&fired, bridge, &inner)?;
    trigger_unit_property_change(&fired, bridge, &inner)?;
    trigger_change_ownership(&fired, bridge, &inner)?;
    trigger_unit_removal(&fired, bridge, &inner)?;
    trigger_purchase(&fired, bridge, &inner)?;
    trigger_unit_placement(&fired, bridge, &inner)?;
    trigger_resource_change(&fired, bridge, &inner)?;
    activate_with_stack(&fired, bridge, &inner, messages, stack)?;
    trigger_victory(&fired, bridge, &inner, messages)?;

    if params.use_uses {
        consume_uses(&fired, bridge)?;
    }
    Ok(())
}

/// The triggers carrying an option that pass the filters `params` enables.
pub(crate) fn eligible<'a>(
    satisfied: &'a [TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    has_option: impl Fn(&TriggerAttachment) -> bool,
) -> Vec<&'a TriggerAttachment> {
    let mut selected = Vec::new();
    for trigger in satisfied.iter().filter(|t| has_option(t)) {
        if params.test_when && !params.when_matches(trigger) {
            continue;
        }
        if params.test_uses && !trigger.has_uses() {
            continue;
        }
        if params.test_chance && !test_chance(trigger, bridge) {
            continue;
        }
        selected.push(trigger);
    }
    selected
}

/// Roll the trigger's chance; certain chances never roll.
fn test_chance(trigger: &TriggerAttachment, bridge: &mut dyn Bridge) -> bool {
    let chance = trigger.chance;
    if chance.is_certain() {
        return true;
    }
    let roll = bridge.roll_die(
        chance.sides,
        &format!("Attempting the trigger: {}", trigger.name()),
    );
    let success = roll < chance.hits;
    let outcome = if success { "succeeds" } else { "fails" };
    bridge.history_writer().start_event(&format!(
        "{}: rolls {} of {} and {} (needs {} or less)",
        trigger.name(),
        roll + 1,
        chance.sides,
        outcome,
        chance.hits
    ));
    debug!(trigger = trigger.name(), roll, hits = chance.hits, success, "tested chance");
    success
}

/// Decrement the uses of every fired trigger that has limited uses.
fn consume_uses(fired: &[TriggerAttachment], bridge: &mut dyn Bridge) -> Result<()> {
    let mut seen = IndexSet::new();
    let mut changes = ChangeSet::new();
    for trigger in fired {
        let Some(reference) = trigger.attachment_ref() else {
            continue;
        };
        if !seen.insert(reference.clone()) {
            continue;
        }
        let uses = bridge
            .data()
            .attachment(&reference)?
            .as_trigger()
            .map(|t| t.uses)
            .ok_or_else(|| Error::TriggerNotFound(trigger.name().to_string()))?;
        if uses <= 0 {
            continue;
        }
        let remaining = (uses - 1).to_string();
        changes.push(Change::AttachmentProperty {
            attachment: reference,
            property: "uses".to_string(),
            previous: uses.to_string(),
            value: remaining.clone(),
            clear_first: false,
            resulting: remaining,
        });
    }
    if !changes.is_empty() {
        debug!(count = changes.len(), "consuming trigger uses");
        bridge.add_change(changes)?;
    }
    Ok(())
}
