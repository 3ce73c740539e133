//! Nested trigger activation

use crate::bridge::Bridge;
use crate::fire::{eligible, fire_with_stack};
use crate::message::MessageLookup;
use crate::params::FireTriggerParams;
use conquest_core::codec::Activation;
use conquest_core::{Error, PropertyBag, Result, TriggerAttachment};
use tracing::debug;

/// Fire the triggers named by each trigger's `activateTrigger` records.
///
/// Every activation runs a full firing pass over the named trigger, as many
/// times as the record repeats it, with the record's flags in place of the
/// caller's. A trigger that ends up activating itself is an error.
pub fn trigger_activate_trigger(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
) -> Result<()> {
    let mut stack = Vec::new();
    activate_with_stack(satisfied, bridge, params, messages, &mut stack)
}

/// `stack` holds the triggers whose activations are being fired.
pub(crate) fn activate_with_stack(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
    stack: &mut Vec<String>,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.activate_trigger.is_empty());
    for trigger in triggers {
        stack.push(trigger.name().to_string());
        for activation in &trigger.activate_trigger {
            if let Err(err) = activate(activation, bridge, params, messages, stack) {
                stack.pop();
                return Err(err);
            }
        }
        stack.pop();
    }
    Ok(())
}

fn activate(
    activation: &Activation,
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
    stack: &mut Vec<String>,
) -> Result<()> {
    if stack.contains(&activation.trigger) {
        let mut chain = stack.clone();
        chain.push(activation.trigger.clone());
        return Err(Error::ActivationCycle {
            trigger: activation.trigger.clone(),
            chain,
        });
    }

    let inner = FireTriggerParams {
        before_or_after: params.before_or_after,
        step_name: params.step_name.clone(),
        use_uses: activation.use_uses,
        test_uses: activation.test_uses,
        test_chance: activation.test_chance,
        test_when: activation.test_when,
    };
    debug!(
        trigger = %activation.trigger,
        repeat = activation.repeat,
        depth = stack.len(),
        "activating trigger"
    );
    for _ in 0..activation.repeat {
        // Uses may have changed since the last repeat.
        let target = bridge
            .data()
            .find_trigger(&activation.trigger)
            .cloned()
            .ok_or_else(|| Error::TriggerNotFound(activation.trigger.clone()))?;
        fire_with_stack(&[target], bridge, &inner, messages, stack)?;
    }
    Ok(())
}
