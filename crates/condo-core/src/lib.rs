//! Core model for Tower Unite condo saves.
//!
//! A save arrives from the external converter as a JSON document holding two
//! parallel arrays, `items` and `properties`. [`Suitebro`] merges them into
//! one [`Entity`] per object, [`Selection`] and [`Selector`] address subsets
//! of those objects, and [`Suitebro::to_json`] splits everything back into
//! the layout the game expects.

/// Process boundary to the suitebro save converter.
pub mod converter;
/// Logic connections between items.
pub mod connection;
/// Objects of a save and their mirrored accessors.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Typed access to tagged property envelopes.
pub mod property;
/// Serde records for the item and properties sections.
pub mod record;
/// Selections and selectors over objects.
pub mod selection;
/// The save document: reconciliation on load, splitting on save.
pub mod suitebro;
/// Built-in transforms: center and rotate.
pub mod tools;
/// Vector and quaternion records.
pub mod vector;

/// Re-export converter entry points.
pub use converter::{Converter, ConverterConfig, Direction, LoadOptions, SuitebroExe};
/// Re-export connection records.
pub use connection::ItemConnection;
/// Re-export core entity types.
pub use entity::{Entity, EntityId};
/// Re-export error types.
pub use error::{CondoError, CondoResult};
/// Re-export section records.
pub use record::{ItemData, PropertiesData, PropertyMap};
/// Re-export selection types.
pub use selection::{Selection, Selector};
/// Re-export the save document.
pub use suitebro::{GroupInfo, SplitArrays, Suitebro};
/// Re-export transform records.
pub use vector::{Quaternion, Vector3};
