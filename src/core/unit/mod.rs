//! The unit model.
//!
//! - [`FunctionUnit`] binds a registered callable
//! - [`DerivedUnit`] wires other named units together
//! - [`UnitInstance`](instance::UnitInstance) is one reference inside that wiring
//! - [`UnitSpec`] is the projected contract of either kind

pub mod derived;
pub mod function;
pub mod instance;
pub mod spec;

use derived::DerivedUnit;
use function::FunctionUnit;
use serde::Serialize;
use spec::{ArgSpec, UnitSpec};
use std::fmt;

/// How the execution engine treats a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Simple,
    /// Explicitly flagged for distinguished handling by the engine.
    Meta,
    Derived,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitKind::Simple => "simple",
            UnitKind::Meta => "meta",
            UnitKind::Derived => "derived",
        };
        f.write_str(s)
    }
}

/// A named, reusable computation.
#[derive(Debug, Clone)]
pub enum Unit {
    Function { unit: FunctionUnit, kind: UnitKind },
    Derived { unit: DerivedUnit, kind: UnitKind },
}

impl From<FunctionUnit> for Unit {
    fn from(unit: FunctionUnit) -> Self {
        Unit::Function {
            unit,
            kind: UnitKind::Simple,
        }
    }
}

impl From<DerivedUnit> for Unit {
    fn from(unit: DerivedUnit) -> Self {
        Unit::Derived {
            unit,
            kind: UnitKind::Derived,
        }
    }
}

impl Unit {
    pub fn name(&self) -> &str {
        match self {
            Unit::Function { unit, .. } => unit.name(),
            Unit::Derived { unit, .. } => unit.name(),
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Unit::Function { kind, .. } | Unit::Derived { kind, .. } => *kind,
        }
    }

    /// Flags the unit as meta. Needs exclusive access, so it can only happen
    /// before the unit is shared with a registry.
    pub fn mark_meta(&mut self) {
        match self {
            Unit::Function { kind, .. } | Unit::Derived { kind, .. } => *kind = UnitKind::Meta,
        }
    }

    pub fn is_meta(&self) -> bool {
        self.kind() == UnitKind::Meta
    }

    pub fn as_function(&self) -> Option<&FunctionUnit> {
        match self {
            Unit::Function { unit, .. } => Some(unit),
            Unit::Derived { .. } => None,
        }
    }

    pub fn as_derived(&self) -> Option<&DerivedUnit> {
        match self {
            Unit::Derived { unit, .. } => Some(unit),
            Unit::Function { .. } => None,
        }
    }

    /// Names a caller must supply.
    pub fn get_args(&self) -> Vec<&str> {
        match self {
            Unit::Function { unit, .. } => unit.get_args().iter().map(String::as_str).collect(),
            Unit::Derived { unit, .. } => unit.get_args(),
        }
    }

    /// Names that carry a default. A function unit whose callable declares
    /// no default list reports an empty list here; use
    /// [`FunctionUnit::get_default_vars`] to tell the two apart.
    pub fn get_default_vars(&self) -> Vec<&str> {
        match self {
            Unit::Function { unit, .. } => unit.get_default_vars().unwrap_or_default(),
            Unit::Derived { unit, .. } => unit.get_default_vars(),
        }
    }

    /// Projects the unit's contract. A missing default projects to `None`
    /// and a missing description to an empty string.
    pub fn get_spec(&self) -> UnitSpec {
        match self {
            Unit::Function { unit, kind } => {
                let names = unit
                    .required_args()
                    .iter()
                    .chain(unit.optional_args().into_iter().flat_map(|kargs| kargs.keys()));

                let input = names
                    .map(|name| {
                        let arg = ArgSpec {
                            default: unit
                                .optional_args()
                                .and_then(|kargs| kargs.get(name))
                                .cloned(),
                            description: unit.input_desc().get(name).cloned().unwrap_or_default(),
                        };
                        (name.clone(), arg)
                    })
                    .collect();

                UnitSpec {
                    input,
                    output: unit.output().clone(),
                    kind: *kind,
                }
            }
            Unit::Derived { unit, kind } => {
                let input = unit
                    .input()
                    .iter()
                    .map(|(name, description)| {
                        let arg = ArgSpec {
                            default: unit.defaults().get(name).cloned(),
                            description: description.clone(),
                        };
                        (name.clone(), arg)
                    })
                    .collect();

                UnitSpec {
                    input,
                    output: unit.output().clone(),
                    kind: *kind,
                }
            }
        }
    }
}
