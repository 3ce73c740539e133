//! Conquest Core - game-state graph for turn-based strategy maps
//!
//! This crate provides the data model shared by the map loader and the
//! trigger engine:
//! - Named game objects (`Player`, `Territory`, `UnitType`, ...) in `GameData`
//! - Attachments: typed property bags addressed by name (`PropertyBag`)
//! - The `codec` for `:`-separated option values
//! - Reversible `Change`s applied atomically as a `ChangeSet`
//! - Player relationships and alliances
//! - Game `History` and deterministic dice (`GameRng`)
//!
//! ## Mutation
//!
//! Outside of loading, state changes only through [`GameData::apply`], so
//! every change can be recorded in history and undone.

pub mod attachment;
mod change;
pub mod codec;
mod entity;
mod error;
mod history;
mod identity;
mod model;
pub mod relationship;
mod rng;
mod value;

pub use attachment::{
    Attachment, AttachmentConstructor, AttachmentKind, AttachmentRegistry, PropertyBag,
    TechAbilityAttachment, TriggerAttachment, UnitSupportAttachment,
};
pub use change::{Change, ChangeSet, UnitLocation};
pub use entity::{
    describe_units, Attachable, Attachments, Delegate, Frontier, GameStep, Player,
    RelationshipType, Resource, Rule, TechAdvance, Territory, TerritoryEffect, Unit, UnitType,
    DEFAULT_TECHNOLOGIES,
};
pub use error::{Error, Result};
pub use history::{History, HistoryConfig, HistoryEvent, HistoryWriter};
pub use identity::{AttachmentRef, EntityKind, UnitId, NULL_PLAYER};
pub use model::{AttachmentRecord, GameData};
pub use relationship::{AllianceTracker, Archetype, RelationshipTracker};
pub use rng::GameRng;
pub use value::{GameProperties, GameProperty, Value};
