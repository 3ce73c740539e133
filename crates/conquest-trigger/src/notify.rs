//! Notifications and victory

use crate::bridge::Bridge;
use crate::fire::eligible;
use crate::message::MessageLookup;
use crate::params::FireTriggerParams;
use conquest_core::{PropertyBag, Result, TriggerAttachment};
use tracing::{info, warn};

pub const NOTIFICATION_TITLE: &str = "Notification";

fn resolve(messages: &dyn MessageLookup, trigger: &TriggerAttachment, key: &str) -> String {
    messages.message(key).unwrap_or_else(|| {
        warn!(trigger = trigger.name(), key, "no message for key");
        key.to_string()
    })
}

/// Show each trigger's notification to its players.
pub fn trigger_notifications(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| t.notification.is_some());
    for trigger in triggers {
        let Some(key) = trigger.notification.as_deref() else {
            continue;
        };
        let text = resolve(messages, trigger, key);
        bridge.report_message(&trigger.players(), &text, NOTIFICATION_TITLE);
    }
    Ok(())
}

/// End the game in favour of each victory trigger's players.
pub fn trigger_victory(
    satisfied: &[TriggerAttachment],
    bridge: &mut dyn Bridge,
    params: &FireTriggerParams,
    messages: &dyn MessageLookup,
) -> Result<()> {
    let triggers = eligible(satisfied, bridge, params, |t| t.victory.is_some());
    for trigger in triggers {
        let Some(key) = trigger.victory.as_deref() else {
            continue;
        };
        let text = resolve(messages, trigger, key.trim());
        let winners = trigger.players();
        bridge.history_writer().start_event(&format!(
            "{}: {} have just won the game, with this victory: {}",
            trigger.name(),
            winners.join(", "),
            text
        ));
        info!(trigger = trigger.name(), ?winners, "victory");
        bridge.signal_game_over(text.trim(), &winners);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::LocalBridge;
    use crate::fixtures::{game, set, trigger};
    use crate::message::Messages;

    fn messages() -> Messages {
        Messages::new()
            .with("PassesHeld", "The passes are held.")
            .with("KeolandWins", " Keoland rules the passes. ")
    }

    #[test]
    fn test_notification() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "players", "Keoland:Furyondy");
        set(&mut t, "notification", "PassesHeld");

        let mut bridge = LocalBridge::new(game());
        trigger_notifications(&[t], &mut bridge, &FireTriggerParams::new(), &messages()).unwrap();

        let reported = &bridge.messages()[0];
        assert_eq!(reported.players, ["Keoland", "Furyondy"]);
        assert_eq!(reported.message, "The passes are held.");
        assert_eq!(reported.title, NOTIFICATION_TITLE);
        assert!(bridge.submitted().is_empty());
    }

    #[test]
    fn test_missing_message_falls_back_to_key() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "notification", "Unwritten");

        let mut bridge = LocalBridge::new(game());
        trigger_notifications(&[t], &mut bridge, &FireTriggerParams::new(), &Messages::new())
            .unwrap();
        assert_eq!(bridge.messages()[0].message, "Unwritten");
        assert_eq!(bridge.messages()[0].players, ["Keoland"]);
    }

    #[test]
    fn test_victory() {
        let mut t = trigger("triggerAttachment", "Keoland");
        set(&mut t, "victory", "KeolandWins");

        let mut bridge = LocalBridge::new(game());
        trigger_victory(&[t], &mut bridge, &FireTriggerParams::new(), &messages()).unwrap();

        let over = bridge.game_over().unwrap();
        assert_eq!(over.status, "Keoland rules the passes.");
        assert_eq!(over.winners, ["Keoland"]);
        assert!(bridge
            .history()
            .last_event()
            .unwrap()
            .description
            .contains("Keoland have just won the game"));
    }
}
