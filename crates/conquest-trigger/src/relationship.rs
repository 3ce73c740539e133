//! Relationship changes between players

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::params::FireTriggerParams;
use conquest_core::codec::RelationshipMatch;
use conquest_core::relationship::PlayerPair;
use conquest_core::{
    Archetype, Change, ChangeSet, Error, GameData, PropertyBag, Result, TriggerAttachment,
};
use indexmap::IndexMap;
use tracing::debug;

/// Move player pairs from a matching relationship to a new one.
///
/// A pair whose current relationship does not match, or already is the new
/// one, is left alone.
pub fn trigger_relationship_change(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| !t.relationship_change.is_empty());
    let round = i32::try_from(bridge.round()).unwrap_or(i32::MAX);
    let mut changes = ChangeSet::new();
    // Pending (type, round) per pair once `changes` applies.
    let mut pending: IndexMap<PlayerPair, (String, i32)> = IndexMap::new();

    for trigger in triggers {
        for record in &trigger.relationship_change {
            let data = bridge.data();
            data.relationship_type(&record.to)?;
            let pair = PlayerPair::new(&record.player1, &record.player2);
            let (previous_type, previous_round) = match pending.get(&pair) {
                Some(current) => current.clone(),
                None => {
                    let current = data
                        .relationships
                        .get(&record.player1, &record.player2)
                        .ok_or_else(|| {
                            Error::InvalidOperation(format!(
                                "no relationship between {} and {}",
                                record.player1, record.player2
                            ))
                        })?;
                    (current.relationship_type.clone(), current.round_created)
                }
            };
            if !matches_current(data, &record.from, &previous_type)? {
                continue;
            }
            if previous_type == record.to {
                continue;
            }

            bridge.history_writer().start_event(&format!(
                "{}: Changing relationship for {} and {} from {} to {}",
                trigger.name(),
                record.player1,
                record.player2,
                previous_type,
                record.to
            ));
            bridge.record_relationship_change(
                &record.player1,
                &record.player2,
                &previous_type,
                &record.to,
            );
            pending.insert(pair, (record.to.clone(), round));
            changes.push(Change::Relationship {
                player1: record.player1.clone(),
                player2: record.player2.clone(),
                previous_type,
                previous_round,
                relationship_type: record.to.clone(),
                round,
            });
        }
    }

    if !changes.is_empty() {
        debug!(count = changes.len(), "changing relationships");
        bridge.add_change(changes)?;
    }
    Ok(())
}

fn matches_current(data: &GameData, from: &RelationshipMatch, current: &str) -> Result<bool> {
    Ok(match from {
        RelationshipMatch::Any => true,
        RelationshipMatch::AnyNeutral => data.archetype(current)? == Archetype::Neutral,
        RelationshipMatch::AnyAllied => data.archetype(current)? == Archetype::Allied,
        RelationshipMatch::AnyWar => data.archetype(current)? == Archetype::War,
        RelationshipMatch::Named(name) => name == current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::LocalBridge;
    use crate::fixtures::{game, set, trigger};

    fn fire(changes: &[&str]) -> LocalBridge {
        let mut t = trigger("triggerAttachment", "Keoland");
        for change in changes {
            set(&mut t, "relationshipChange", change);
        }
        let mut bridge = LocalBridge::new(game());
        bridge.set_round(3);
        trigger_relationship_change(&[t], &mut bridge, &FireTriggerParams::new()).unwrap();
        bridge
    }

    #[test]
    fn test_relationship_change() {
        let bridge = fire(&["Keoland:Furyondy:any:allied"]);

        assert_eq!(bridge.submitted().len(), 1);
        let relationship = bridge
            .data()
            .relationships
            .get("Furyondy", "Keoland")
            .unwrap();
        assert_eq!(relationship.relationship_type, "allied");
        assert_eq!(relationship.round_created, 3);
        let update = &bridge.relationship_updates()[0];
        assert_eq!(update.previous, "neutral");
        assert_eq!(update.relationship_type, "allied");
    }

    #[test]
    fn test_current_type_must_match() {
        let bridge = fire(&[
            "Keoland:Furyondy:allied:default_war_relation",
            "Keoland:Iuz:anyNeutral:allied",
        ]);
        assert!(bridge.submitted().is_empty());
        assert!(bridge.history().is_empty());
    }

    #[test]
    fn test_archetype_wildcards() {
        let bridge = fire(&["Keoland:Iuz:anyWar:neutral", "Furyondy:Keoland:anyNeutral:allied"]);
        assert_eq!(bridge.submitted()[0].len(), 2);
        assert_eq!(
            bridge.data().relationship_between("Iuz", "Keoland").unwrap(),
            "neutral"
        );
        assert_eq!(
            bridge.data().relationship_between("Keoland", "Furyondy").unwrap(),
            "allied"
        );
    }

    #[test]
    fn test_unchanged_relationship_is_skipped() {
        let bridge = fire(&["Keoland:Furyondy:any:neutral"]);
        assert!(bridge.submitted().is_empty());
        assert!(bridge.relationship_updates().is_empty());
    }

    #[test]
    fn test_later_records_see_earlier_ones() {
        let bridge = fire(&[
            "Keoland:Furyondy:neutral:allied",
            "Keoland:Furyondy:allied:default_war_relation",
        ]);
        let changes = bridge.submitted()[0].changes();
        assert_eq!(changes.len(), 2);
        assert_eq!(
            bridge.data().relationship_between("Keoland", "Furyondy").unwrap(),
            "default_war_relation"
        );
        let mut data = bridge.data().clone();
        data.apply(&bridge.submitted()[0].invert()).unwrap();
        assert_eq!(data, game());
    }

    #[test]
    fn test_unknown_relationship_type_fails() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "relationshipChange", "Keoland:Furyondy:any:vassal");
        let mut bridge = LocalBridge::new(game());
        let err = trigger_relationship_change(&[t], &mut bridge, &FireTriggerParams::new())
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
