//! Conquest Trigger - fires satisfied triggers against the game data
//!
//! A trigger's conditions are decided elsewhere. Given the triggers that
//! are satisfied, this crate applies their effects:
//! - Attachment property changes on players, territories, unit types,
//!   relationship types and territory effects
//! - Relationship, technology and production frontier changes
//! - Unit support changes
//! - Unit purchase, placement and removal, territory ownership, resources
//! - Notifications, victory and nested trigger activation
//!
//! Every effect is built as a [`ChangeSet`](conquest_core::ChangeSet) and
//! handed to a [`Bridge`], which applies it and records it in history.
//!
//! ## Example
//!
//! ```no_run
//! use conquest_script::Loader;
//! use conquest_trigger::{fire_triggers, FireTriggerParams, LocalBridge, Messages};
//! use conquest_core::codec::Phase;
//!
//! let data = Loader::new("skirmish").load_file("maps/skirmish.ron")?;
//! let satisfied: Vec<_> = data.triggers().cloned().collect();
//! let mut bridge = LocalBridge::new(data);
//! let params = FireTriggerParams::at_step(Phase::After, "keolandPurchase");
//! fire_triggers(&satisfied, &mut bridge, &params, &Messages::new())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod activate;
mod bridge;
mod fire;
mod message;
mod notify;
mod ownership;
mod params;
mod production;
mod property;
mod relationship;
mod resource;
mod support;
mod tech;
mod units;

#[cfg(test)]
mod fixtures;

pub use activate::trigger_activate_trigger;
pub use bridge::{Bridge, Capture, GameOver, LocalBridge, RelationshipUpdate, ReportedMessage};
pub use fire::fire_triggers;
pub use message::{MessageLookup, Messages};
pub use notify::{trigger_notifications, trigger_victory, NOTIFICATION_TITLE};
pub use ownership::trigger_change_ownership;
pub use params::FireTriggerParams;
pub use production::{trigger_production_change, trigger_production_frontier_edit_change};
pub use property::{
    trigger_player_property_change, trigger_relationship_type_property_change,
    trigger_territory_effect_property_change, trigger_territory_property_change,
    trigger_unit_property_change,
};
pub use relationship::trigger_relationship_change;
pub use resource::trigger_resource_change;
pub use support::trigger_support_change;
pub use tech::{trigger_available_tech_change, trigger_tech_change};
pub use units::{trigger_purchase, trigger_unit_placement, trigger_unit_removal};
