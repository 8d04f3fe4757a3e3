use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while building a unit or checking its contract.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("unit '{unit}': module '{module}' is not registered")]
    ModuleNotFound { unit: String, module: String },

    #[error("unit '{unit}': function '{function}' not found in module '{module}'")]
    FunctionNotFound {
        unit: String,
        module: String,
        function: String,
    },

    #[error("unit '{unit}': missing required key '{key}'")]
    MissingKey { unit: String, key: String },

    #[error("unit '{unit}': field '{field}' {reason}")]
    InvalidField {
        unit: String,
        field: String,
        reason: String,
    },

    #[error("unit '{unit}': a unit instance must have exactly one key, found {found:?}")]
    AmbiguousInstance { unit: String, found: Vec<String> },

    #[error("unit '{unit}': default '{name}' is not a declared input")]
    UnknownDefault { unit: String, name: String },

    #[error("unit '{unit}': input '{name}' is not an argument of the function")]
    UnknownInput { unit: String, name: String },

    #[error("unit '{unit}': missing required argument '{argument}'")]
    MissingArgument { unit: String, argument: String },

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("duplicate unit '{0}'")]
    DuplicateUnit(String),

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),
}

/// Failures raised while reading or loading a configuration document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config file '{0}' not found in search path")]
    NotFound(PathBuf),

    #[error("document has no 'alchemy' section")]
    MissingMarker,

    #[error("section '{section}' {reason}")]
    InvalidSection { section: String, reason: String },

    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl UnitError {
    /// Fills in the owning unit name on errors raised without one.
    pub(crate) fn in_unit(self, owner: &str) -> Self {
        match self {
            UnitError::InvalidField {
                unit,
                field,
                reason,
            } if unit.is_empty() => UnitError::InvalidField {
                unit: owner.to_string(),
                field,
                reason,
            },
            UnitError::AmbiguousInstance { unit, found } if unit.is_empty() => {
                UnitError::AmbiguousInstance {
                    unit: owner.to_string(),
                    found,
                }
            }
            other => other,
        }
    }
}
