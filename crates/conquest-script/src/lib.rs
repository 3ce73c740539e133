//! Conquest Script - RON map definition loader
//!
//! Loads a map definition into a validated [`GameData`](conquest_core::GameData):
//! - Players, alliances and the relationships derived from them
//! - Territories, resources, unit types and the turn sequence
//! - Production and repair rules, technologies
//! - Attachments, expanded through variables and foreach loops
//! - Starting ownership, units and resources
//!
//! ```no_run
//! use conquest_script::Loader;
//!
//! let data = Loader::new("skirmish").load_file("maps/skirmish.ron")?;
//! println!("{} territories", data.territories.len());
//! # Ok::<(), conquest_script::LoadError>(())
//! ```

mod config;
mod error;
mod loader;
pub mod schema;
pub mod template;

pub use config::{EngineVersion, LoaderConfig};
pub use error::{Error, LoadError, Result};
pub use loader::Loader;
pub use schema::GameDocument;
pub use template::{TemplateError, Variables};
