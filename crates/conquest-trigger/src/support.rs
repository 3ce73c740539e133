//! Unit support changes

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::{
    codec, Attachment, AttachmentRef, Change, ChangeSet, Error, PropertyBag, Result,
    TriggerAttachment,
};
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

const PLAYERS: &str = "players";

/// Add each player to, or remove them from, the `players` of the unit
/// supports named by the trigger's `support` records.
///
/// Adding a player already listed, or removing one who is not, does
/// nothing. Every edit goes into a single change set.
pub fn trigger_support_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.support.is_empty());
    // Working copies, so a later record sees an earlier one.
    let mut working: IndexMap<AttachmentRef, Attachment> = IndexMap::new();
    let mut changes = ChangeSet::new();

    for trigger in triggers {
        for player in trigger.players() {
            bridge.data().player(&player)?;
            for record in &trigger.support {
                let reference = bridge.data().unit_support(&record.support)?;
                let attachment = match working.entry(reference.clone()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let current = bridge.data().attachment(&reference)?;
                        entry.insert(current.clone())
                    }
                };
                let support = attachment.as_unit_support().ok_or_else(|| {
                    Error::InvalidOperation(format!("{} is not a unit support", reference))
                })?;
                if support.supports(&player) == record.add {
                    continue;
                }

                let players: Vec<&str> = if record.add {
                    support
                        .players
                        .iter()
                        .map(String::as_str)
                        .chain([player.as_str()])
                        .collect()
                } else {
                    support
                        .players
                        .iter()
                        .map(String::as_str)
                        .filter(|p| *p != player)
                        .collect()
                };
                let value = codec::join(players);
                let previous = attachment.get_property(PLAYERS)?;
                attachment.reset_property(PLAYERS)?;
                if !value.is_empty() {
                    attachment.set_property(PLAYERS, &value)?;
                }
                let resulting = attachment.get_property(PLAYERS)?;

                let verb = if record.add { "added to" } else { "removed from" };
                bridge.history_writer().start_event(&format!(
                    "{}: {} is {} {}",
                    trigger.name(),
                    player,
                    verb,
                    record.support
                ));
                changes.push(Change::AttachmentProperty {
                    attachment: reference,
                    property: PLAYERS.to_string(),
                    previous,
                    value,
                    clear_first: true,
                    resulting,
                });
            }
        }
    }

    if !changes.is_empty() {
        debug!(count = changes.len(), "changing unit supports");
        bridge.add_change(changes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::LocalBridge;
    use crate::fixtures::{game, set, trigger};
    use conquest_core::{AttachmentKind, EntityKind, GameData};

    const ARCHERS: &str = "supportAttachmentArchers";

    /// Keoland's archers support conscripts.
    fn with_support() -> GameData {
        let mut data = game();
        let mut support = Attachment::new(AttachmentKind::UnitSupport, ARCHERS);
        support.set_property("unitType", "conscript").unwrap();
        support.set_property("bonus", "1").unwrap();
        support.set_property("players", "Keoland").unwrap();
        data.attach(EntityKind::UnitType, "skirmisher", support).unwrap();
        data
    }

    fn supported(bridge: &LocalBridge) -> Vec<String> {
        let reference = bridge.data().unit_support(ARCHERS).unwrap();
        let attachment = bridge.data().attachment(&reference).unwrap();
        attachment.as_unit_support().unwrap().players.clone()
    }

    #[test]
    fn test_support_is_given() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "players", "Furyondy:Iuz:Keoland");
        set(&mut t, "support", ARCHERS);

        let mut bridge = LocalBridge::new(with_support());
        trigger_support_change(&[t], &mut bridge, &FireTriggerParams::new()).unwrap();

        // Keoland already had it
        assert_eq!(bridge.submitted().len(), 1);
        assert_eq!(bridge.submitted()[0].len(), 2);
        assert_eq!(supported(&bridge), ["Keoland", "Furyondy", "Iuz"]);
        assert_eq!(
            bridge.history().last_event().unwrap().description,
            "triggerAttachment: Iuz is added to supportAttachmentArchers"
        );
    }

    #[test]
    fn test_support_is_taken_away() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "players", "Keoland:Furyondy");
        set(&mut t, "support", &format!("-{}", ARCHERS));

        let mut bridge = LocalBridge::new(with_support());
        trigger_support_change(&[t], &mut bridge, &FireTriggerParams::new()).unwrap();

        assert_eq!(bridge.submitted().len(), 1);
        assert_eq!(bridge.submitted()[0].len(), 1);
        assert!(supported(&bridge).is_empty());
        assert_eq!(
            bridge.history().last_event().unwrap().description,
            "triggerAttachment: Keoland is removed from supportAttachmentArchers"
        );

        let mut data = bridge.data().clone();
        data.apply(&bridge.submitted()[0].invert()).unwrap();
        assert_eq!(data, with_support());
    }

    #[test]
    fn test_nothing_to_do_submits_nothing() {
        let mut t = trigger("triggerAttachment", "Furyondy");
        set(&mut t, "support", &format!("-{}", ARCHERS));
        let mut bridge = LocalBridge::new(with_support());
        trigger_support_change(&[t], &mut bridge, &FireTriggerParams::new()).unwrap();
        assert!(bridge.submitted().is_empty());
        assert!(bridge.history().is_empty());
    }

    #[test]
    fn test_unknown_support_fails() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "support", "supportAttachmentDragons");
        let mut bridge = LocalBridge::new(with_support());
        let err = trigger_support_change(&[t], &mut bridge, &FireTriggerParams::new()).unwrap_err();
        assert!(matches!(err, Error::AttachmentNotFound { .. }));
    }
}
