use crate::core::UnitValue;
use crate::core::unit::UnitKind;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Projected default and description of one argument.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ArgSpec {
    /// `None` when the argument has no default. An explicit `null` default
    /// is `Some(Value::Null)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<UnitValue>,
    /// Empty when the argument is undocumented.
    pub description: String,
}

/// The uniform, read-only contract of a unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSpec {
    pub input: IndexMap<String, ArgSpec>,
    pub output: IndexMap<String, String>,
    pub kind: UnitKind,
}

impl ArgSpec {
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

impl UnitSpec {
    /// Argument names in projection order.
    pub fn arg_names(&self) -> impl Iterator<Item = &str> {
        self.input.keys().map(String::as_str)
    }
}

impl fmt::Display for UnitSpec {
    /// Renders the argument table used by listings.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "kind: {}", self.kind)?;
        writeln!(f, "{:<20} {:<15} {}", "argument", "default", "description")?;
        for (name, arg) in &self.input {
            let default = match &arg.default {
                None => String::new(),
                Some(UnitValue::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            };
            writeln!(f, "{:<20} {:<15} {}", name, default, arg.description)?;
        }
        for (name, desc) in &self.output {
            writeln!(f, "-> {:<17} {}", name, desc)?;
        }
        Ok(())
    }
}
