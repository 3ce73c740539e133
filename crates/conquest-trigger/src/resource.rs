//! Resource grants and charges

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::{Change, PropertyBag, Result, TriggerAttachment};
use tracing::debug;

/// Add `resourceCount` of `resource` to each of the trigger's players.
///
/// A negative count takes at most what the player has.
pub fn trigger_resource_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| {
        t.resource.is_some() && t.resource_count != 0
    });
    for trigger in triggers {
        let Some(resource) = trigger.resource.as_deref() else {
            continue;
        };
        bridge.data().resource(resource)?;
        for player in trigger.players() {
            let balance = bridge.data().player(&player)?.resource(resource);
            let quantity = i64::from(trigger.resource_count).max(-balance);
            if quantity == 0 {
                continue;
            }

            bridge.history_writer().start_event(&format!(
                "{}: {} met a national objective for an additional {} {}; end with {} {}",
                trigger.name(),
                player,
                quantity,
                resource,
                balance + quantity,
                resource
            ));
            debug!(player = %player, resource, quantity, "changing resources");
            bridge.add_change(
                Change::Resource {
                    player,
                    resource: resource.to_string(),
                    quantity,
                }
                .into(),
            )?;
        }
    }
    Ok(())
}
