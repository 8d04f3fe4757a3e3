pub mod config;
pub mod error;
pub mod loader;
pub mod module;
pub mod progress;
pub mod registry;
pub mod signature;
pub mod unit;
pub mod validation;

/// The alias for serde_json::Value, used for every default and bound value.
pub type UnitValue = serde_json::Value;
