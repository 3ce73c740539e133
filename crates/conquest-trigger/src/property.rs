//! Attachment property changes
//!
//! Each of these options lists `<new value>:<property>` deltas, applied to
//! the trigger's named attachment on every target object. The new value may
//! start with a clear prefix to reset the property before setting it; an
//! empty value only resets it. A delta whose new value equals the current
//! encoded value does nothing.
//!
//! All deltas of one kind go into a single change set.

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::codec::{AttachmentName, PropertyDelta};
use conquest_core::{
    Attachment, AttachmentKind, AttachmentRef, Change, ChangeSet, EntityKind, Error, PropertyBag,
    Result, TriggerAttachment,
};
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Target {
    Player,
    RelationshipType,
    Territory,
    TerritoryEffect,
    UnitType,
}

impl Target {
    fn entity_kind(self) -> EntityKind {
        match self {
            Target::Player => EntityKind::Player,
            Target::RelationshipType => EntityKind::RelationshipType,
            Target::Territory => EntityKind::Territory,
            Target::TerritoryEffect => EntityKind::TerritoryEffect,
            Target::UnitType => EntityKind::UnitType,
        }
    }

    fn attachment_name(self, trigger: &TriggerAttachment) -> &AttachmentName {
        match self {
            Target::Player => &trigger.player_attachment_name,
            Target::RelationshipType => &trigger.relationship_type_attachment_name,
            Target::Territory => &trigger.territory_attachment_name,
            Target::TerritoryEffect => &trigger.territory_effect_attachment_name,
            Target::UnitType => &trigger.unit_attachment_name,
        }
    }

    fn deltas(self, trigger: &TriggerAttachment) -> &[PropertyDelta] {
        match self {
            Target::Player => &trigger.player_property,
            Target::RelationshipType => &trigger.relationship_type_property,
            Target::Territory => &trigger.territory_property,
            Target::TerritoryEffect => &trigger.territory_effect_property,
            Target::UnitType => &trigger.unit_property,
        }
    }

    fn targets(self, trigger: &TriggerAttachment) -> Vec<String> {
        match self {
            Target::Player => trigger.players(),
            Target::RelationshipType => trigger.relationship_types.clone(),
            Target::Territory => trigger.territories.clone(),
            Target::TerritoryEffect => trigger.territory_effects.clone(),
            Target::UnitType => trigger.unit_types.clone(),
        }
    }
}

pub fn trigger_player_property_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    change_properties(satisfied, bridge, params, Target::Player)
}

pub fn trigger_relationship_type_property_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    change_properties(satisfied, bridge, params, Target::RelationshipType)
}

pub fn trigger_territory_property_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    change_properties(satisfied, bridge, params, Target::Territory)
}

pub fn trigger_territory_effect_property_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    change_properties(satisfied, bridge, params, Target::TerritoryEffect)
}

pub fn trigger_unit_property_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    change_properties(satisfied, bridge, params, Target::UnitType)
}

fn change_properties(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    target: Target,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !target.deltas(t).is_empty());
    // Working copies, so later deltas see earlier ones.
    let mut working: IndexMap<AttachmentRef, Attachment> = IndexMap::new();
    let mut changes = ChangeSet::new();

    for trigger in triggers {
        let name = target.attachment_name(trigger);
        let kind = AttachmentKind::from_key(&name.kind).ok_or_else(|| Error::InvalidAttachment {
            attachment: trigger.name().to_string(),
            reason: format!("unknown attachment kind {}", name.kind),
        })?;
        for delta in target.deltas(trigger) {
            for entity in target.targets(trigger) {
                let reference = AttachmentRef::new(target.entity_kind(), &entity, &name.key);
                let attachment = match working.entry(reference.clone()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => {
                        let current = bridge
                            .data()
                            .attachable(target.entity_kind(), &entity)?
                            .attachment_of(&name.key, kind)?;
                        entry.insert(current.clone())
                    }
                };
                if let Some((change, description)) =
                    apply_delta(trigger.name(), attachment, reference, delta)?
                {
                    bridge.history_writer().start_event(&description);
                    changes.push(change);
                }
            }
        }
    }

    if !changes.is_empty() {
        debug!(kind = ?target, count = changes.len(), "changing attachment properties");
        bridge.add_change(changes)?;
    }
    Ok(())
}

/// Apply one delta to a working copy, returning the change it amounts to
/// and its history line.
fn apply_delta(
    trigger: &str,
    attachment: &mut Attachment,
    reference: AttachmentRef,
    delta: &PropertyDelta,
) -> Result<Option<(Change, String)>> {
    let previous = attachment.get_property(&delta.property)?;
    let (clear_first, value) = delta.clear_first();
    if value == previous {
        return Ok(None);
    }
    let clear_first = clear_first || value.is_empty();
    if clear_first {
        attachment.reset_property(&delta.property)?;
    }
    if !value.is_empty() {
        attachment.set_property(&delta.property, value)?;
    }
    let resulting = attachment.get_property(&delta.property)?;
    if resulting == previous {
        return Ok(None);
    }

    let target = format!("{} attached to {}", reference.key, reference.entity);
    let description = if value.is_empty() {
        format!(
            "{}: {} cleared (was {}) for {}",
            trigger, delta.property, previous, target
        )
    } else if previous.is_empty() {
        format!(
            "{}: Setting {} to {} for {}",
            trigger, delta.property, value, target
        )
    } else {
        format!(
            "{}: Changing {} from {} to {} for {}",
            trigger, delta.property, previous, value, target
        )
    };
    let change = Change::AttachmentProperty {
        attachment: reference,
        property: delta.property.clone(),
        previous,
        value: value.to_string(),
        clear_first,
        resulting,
    };
    Ok(Some((change, description)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::LocalBridge;
    use crate::fixtures::{game, set, trigger};
    use conquest_core::GameData;

    fn property(data: &GameData, kind: EntityKind, entity: &str, key: &str, name: &str) -> String {
        data.attachable(kind, entity)
            .unwrap()
            .attachment(key)
            .unwrap()
            .get_property(name)
            .unwrap()
    }

    fn fire(
        function: fn(&[TriggerAttachment], &mut dyn Bridge, &FireTriggerParams) -> Result<()>,
        trigger: TriggerAttachment,
    ) -> LocalBridge {
        let mut bridge = LocalBridge::new(game());
        function(&[trigger], &mut bridge, &FireTriggerParams::new()).unwrap();
        bridge
    }

    #[test]
    fn test_player_property_change() {
        let mut t = trigger("triggerAttachment", "Furyondy");
        set(&mut t, "playerAttachmentName", "playerAttachment:PlayerAttachment");
        set(&mut t, "playerProperty", "2:conscript:productionPerXTerritories");
        set(&mut t, "players", "Keoland");

        let bridge = fire(trigger_player_property_change, t);
        assert_eq!(bridge.submitted().len(), 1);
        assert_eq!(
            property(
                bridge.data(),
                EntityKind::Player,
                "Keoland",
                "playerAttachment",
                "productionPerXTerritories"
            ),
            "2:conscript"
        );
        let event = bridge.history().last_event().unwrap();
        assert_eq!(
            event.description,
            "triggerAttachment: Setting productionPerXTerritories to 2:conscript for playerAttachment attached to Keoland"
        );
    }

    #[test]
    fn test_relationship_type_property_change() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(
            &mut t,
            "relationshipTypeAttachmentName",
            "relationshipTypeAttachment:RelationshipTypeAttachment",
        );
        set(&mut t, "relationshipTypeProperty", "true:canMoveLandUnitsOverOwnedLand");
        set(&mut t, "relationshipTypes", "neutral");

        let bridge = fire(trigger_relationship_type_property_change, t);
        assert_eq!(bridge.submitted().len(), 1);
        assert_eq!(
            property(
                bridge.data(),
                EntityKind::RelationshipType,
                "neutral",
                "relationshipTypeAttachment",
                "canMoveLandUnitsOverOwnedLand"
            ),
            "true"
        );
    }

    #[test]
    fn test_territory_property_change() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "territoryAttachmentName", "territoryAttachment:TerritoryAttachment");
        set(&mut t, "territoryProperty", "true:kamikazeZone");
        set(&mut t, "territories", "Corusk Pass:Soull Pass");

        let bridge = fire(trigger_territory_property_change, t);
        assert_eq!(bridge.submitted().len(), 1);
        assert_eq!(bridge.submitted()[0].len(), 2);
        assert_eq!(bridge.history().len(), 2);
    }

    #[test]
    fn test_territory_effect_property_change() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(
            &mut t,
            "territoryEffectAttachmentName",
            "territoryEffectAttachment:TerritoryEffectAttachment",
        );
        set(
            &mut t,
            "territoryEffectProperty",
            "conscript:sellsword:unitsNotAllowed",
        );
        set(&mut t, "territoryEffects", "mountain");

        let bridge = fire(trigger_territory_effect_property_change, t);
        assert_eq!(bridge.submitted().len(), 1);
        assert_eq!(
            property(
                bridge.data(),
                EntityKind::TerritoryEffect,
                "mountain",
                "territoryEffectAttachment",
                "unitsNotAllowed"
            ),
            "conscript:sellsword"
        );
    }

    #[test]
    fn test_unit_property_change() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "unitAttachmentName", "unitAttachment:UnitAttachment");
        set(&mut t, "unitProperty", "4:movement");
        set(&mut t, "unitType", "conscript");

        let bridge = fire(trigger_unit_property_change, t);
        assert_eq!(bridge.submitted().len(), 1);
        let event = bridge.history().last_event().unwrap();
        assert_eq!(
            event.description,
            "triggerAttachment: Changing movement from 0 to 4 for unitAttachment attached to conscript"
        );
    }

    #[test]
    fn test_unchanged_value_is_a_no_op() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "unitProperty", "0:movement");
        set(&mut t, "unitType", "conscript");

        let bridge = fire(trigger_unit_property_change, t);
        assert!(bridge.submitted().is_empty());
        assert!(bridge.history().is_empty());
    }

    #[test]
    fn test_clearing_an_empty_list_is_a_no_op() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "playerProperty", "-clear-:giveUnitControl");

        let bridge = fire(trigger_player_property_change, t);
        assert!(bridge.submitted().is_empty());
    }

    #[test]
    fn test_deltas_chain_within_one_call() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "playerProperty", "Furyondy:giveUnitControl");
        set(&mut t, "playerProperty", "-clear-Iuz:giveUnitControl");
        set(&mut t, "playerProperty", "-clear-:giveUnitControl");

        let bridge = fire(trigger_player_property_change, t);
        let changes = bridge.submitted()[0].changes();
        assert_eq!(changes.len(), 3);
        let Change::AttachmentProperty {
            previous, resulting, ..
        } = &changes[1]
        else {
            panic!("expected a property change");
        };
        assert_eq!(previous, "Furyondy");
        assert_eq!(resulting, "Iuz");
        assert!(bridge
            .history()
            .last_event()
            .unwrap()
            .description
            .contains("giveUnitControl cleared (was Iuz)"));
        assert_eq!(
            property(
                bridge.data(),
                EntityKind::Player,
                "Keoland",
                "playerAttachment",
                "giveUnitControl"
            ),
            ""
        );
    }

    #[test]
    fn test_change_inverts_to_previous_state() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "unitProperty", "3:movement");
        set(&mut t, "unitType", "conscript:sellsword");

        let mut bridge = fire(trigger_unit_property_change, t);
        let undo = bridge.submitted()[0].invert();
        bridge.add_change(undo).unwrap();
        assert_eq!(bridge.into_data(), game());
    }

    #[test]
    fn test_missing_attachment_fails() {
        let mut t = trigger("triggerAttachment", "Furyondy");
        set(&mut t, "playerProperty", "3:vps");

        let mut bridge = LocalBridge::new(game());
        let err = trigger_player_property_change(&[t], &mut bridge, &FireTriggerParams::new())
            .unwrap_err();
        assert!(matches!(err, Error::AttachmentNotFound { .. }));
    }

    #[test]
    fn test_wrong_attachment_kind_fails() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "territoryAttachmentName", "territoryAttachment:UnitAttachment");
        set(&mut t, "territoryProperty", "3:movement");
        set(&mut t, "territories", "Corusk Pass");

        let mut bridge = LocalBridge::new(game());
        let err = trigger_territory_property_change(&[t], &mut bridge, &FireTriggerParams::new())
            .unwrap_err();
        assert!(matches!(err, Error::WrongAttachmentKind { .. }));
    }

    #[test]
    fn test_unknown_property_fails() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "unitProperty", "3:flightCeiling");
        set(&mut t, "unitType", "conscript");

        let mut bridge = LocalBridge::new(game());
        let err = trigger_unit_property_change(&[t], &mut bridge, &FireTriggerParams::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownProperty { .. }));
    }

    #[test]
    fn test_malformed_value_fails() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "unitProperty", "fast:movement");
        set(&mut t, "unitType", "conscript");

        let mut bridge = LocalBridge::new(game());
        let err = trigger_unit_property_change(&[t], &mut bridge, &FireTriggerParams::new())
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(bridge.submitted().is_empty());
    }
}
