//! # Alchemy
//!
//! The declarative core of a configuration-driven task/flow tool: named,
//! composable units, their argument contracts, and the loader that builds
//! them from a configuration document.
//!
//! ## Features
//!
//! - **Function Units**: leaf units bound to registered callables, with the
//!   required/optional contract derived from a declared signature
//! - **Derived Units**: ordered wiring of other named units, each with its own
//!   parameter bindings, behind an independent contract
//! - **Contract Projection**: one uniform spec view for listing and validation
//! - **Declarative Loading**: YAML documents in, a name-indexed registry out
//!
//! ## Quick Start
//!
//! ```rust
//! use alchemy::prelude::*;
//! use serde_json::json;
//!
//! let math = Module::new("math").function(Callable::new(
//!     "add",
//!     signature!("x, y=1"),
//!     |args| json!(args["x"].as_i64().unwrap_or(0) + args["y"].as_i64().unwrap_or(0)),
//! ));
//! let table = ModuleTable::new().with_module(math);
//!
//! let registry = load_str(
//!     r#"
//! alchemy: {module: math}
//! units:
//!   add: {func: add, input: {x: left operand}}
//! flows:
//!   main:
//!     input: [x]
//!     units:
//!       - add: {x: x}
//! "#,
//!     &table,
//! )
//! .unwrap();
//!
//! let add = registry.get_unit("add").unwrap();
//! assert_eq!(add.get_args(), vec!["x"]);
//! assert_eq!(add.get_spec().input["y"].default, Some(json!(1)));
//! ```
//!
//! ## Module Organization
//!
//! - [`unit`]: the unit model and contract projection
//! - [`loader`]: declarative constructors and document loading
//! - [`registry`]: units and flows indexed by name
//! - [`prelude`]: commonly used types (import with `use alchemy::prelude::*`)

// ============================================================================
// Core Module
// ============================================================================

mod core;

// ============================================================================
// Public Re-exports - Granular Imports
// ============================================================================

pub use crate::core::{config, loader, progress, registry, unit, validation};

// Model
pub use crate::core::UnitValue;
pub use crate::core::error::{LoadError, UnitError};
pub use crate::core::module::{Callable, Module, ModuleTable, UnitArgs, UnitFn};
pub use crate::core::signature::FunctionSignature;
pub use crate::core::unit::derived::DerivedUnit;
pub use crate::core::unit::function::FunctionUnit;
pub use crate::core::unit::instance::{DESC_KEY, UnitInstance};
pub use crate::core::unit::spec::{ArgSpec, UnitSpec};
pub use crate::core::unit::{Unit, UnitKind};

// Collaborators
pub use crate::core::config::LoaderConfig;
pub use crate::core::progress::{
    ChannelProgress, MemoryProgress, ProgressMessage, ProgressObserver, UnitEvent,
};
pub use crate::core::registry::UnitRegistry;
pub use crate::core::validation::{ValidationIssue, ValidationResult};

// ============================================================================
// Prelude Module - Convenient Bulk Imports
// ============================================================================

/// The main prelude: imports everything needed to register callables, load
/// a configuration and inspect the resulting units.
///
/// # Example
/// ```rust
/// use alchemy::prelude::*;
/// ```
pub mod prelude {
    pub use super::{
        ArgSpec,
        // Model
        Callable,
        DerivedUnit,
        FunctionSignature,
        FunctionUnit,
        // Errors
        LoadError,
        // Collaborators
        LoaderConfig,
        Module,
        ModuleTable,
        ProgressObserver,
        Unit,
        UnitArgs,
        UnitError,
        UnitInstance,
        UnitKind,
        UnitRegistry,
        UnitSpec,
        UnitValue,
        ValidationIssue,
        ValidationResult,
    };
    pub use crate::core::loader::{load_document, load_str};
    pub use crate::core::validation::validate;
    pub use crate::signature;
}

// ============================================================================
// Library Metadata
// ============================================================================

/// The version of this crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate.
pub const NAME: &str = env!("CARGO_PKG_NAME");
