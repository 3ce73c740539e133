//! Territory ownership changes

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::codec::{PlayerMatch, TerritoryScope};
use conquest_core::{
    AttachmentKind, Change, EntityKind, Error, PropertyBag, Result, TriggerAttachment,
    NULL_PLAYER,
};
use tracing::debug;

/// Hand territories from their current owner to a new one.
///
/// Territories without a territory attachment, owned by someone other than
/// the expected owner, or already held by the new owner are skipped. Each
/// transfer is a change set of its own.
pub fn trigger_change_ownership(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.change_ownership.is_empty());
    for trigger in triggers {
        for record in &trigger.change_ownership {
            let data = bridge.data();
            if !data.is_player_or_null(&record.to) {
                return Err(Error::not_found(EntityKind::Player, &record.to));
            }
            if let PlayerMatch::Named(from) = &record.from {
                if !data.is_player_or_null(from) {
                    return Err(Error::not_found(EntityKind::Player, from));
                }
            }
            let owner = (record.to != NULL_PLAYER).then(|| record.to.clone());
            let territories: Vec<String> = match &record.territory {
                TerritoryScope::All => data.territories.keys().cloned().collect(),
                TerritoryScope::Named(name) => vec![data.territory(name)?.name.clone()],
            };

            for name in territories {
                let territory = bridge.data().territory(&name)?;
                let has_attachment = territory
                    .attachments
                    .values()
                    .any(|a| a.kind() == AttachmentKind::Territory);
                if !has_attachment {
                    continue;
                }
                let previous = territory.owner.clone();
                if !record.from.matches(previous.as_deref().unwrap_or(NULL_PLAYER)) {
                    continue;
                }
                if previous == owner {
                    continue;
                }

                bridge.history_writer().start_event(&format!(
                    "{}: {} takes ownership of {}",
                    trigger.name(),
                    record.to,
                    name
                ));
                debug!(
                    territory = %name,
                    owner = %record.to,
                    captured = record.captured,
                    "changing ownership"
                );
                if record.captured {
                    bridge.mark_captured(&name, &record.to);
                }
                bridge.add_change(
                    Change::Ownership {
                        territory: name,
                        previous,
                        owner: owner.clone(),
                    }
                    .into(),
                )?;
            }
        }
    }
    Ok(())
}
