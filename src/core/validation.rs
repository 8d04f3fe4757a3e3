use crate::core::registry::UnitRegistry;
use crate::core::unit::Unit;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// Represents an issue found while validating a registry's wiring.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// A hard error: the wiring cannot run as declared.
    Error(String),
    /// A warning: the wiring may be missing an argument at run time.
    Warning(String),
}

/// The result of a registry validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Error(msg.into()));
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Warning(msg.into()));
    }

    pub fn is_safe(&self) -> bool {
        !self.issues.iter().any(|i| matches!(i, ValidationIssue::Error(_)))
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| matches!(i, ValidationIssue::Warning(_)))
    }

    pub fn summary(&self) -> String {
        if self.is_safe() && !self.has_warnings() {
            return "Validation passed: all unit references and contracts are satisfied.\n"
                .to_string();
        }

        let mut out = String::new();
        for issue in &self.issues {
            let _ = match issue {
                ValidationIssue::Error(msg) => writeln!(out, "Error: {}", msg),
                ValidationIssue::Warning(msg) => writeln!(out, "Warning: {}", msg),
            };
        }
        out
    }

    pub fn print_summary(&self) {
        print!("{}", self.summary());
    }
}

/// Checks every derived unit and flow in `registry`:
/// unresolved references and reference cycles are errors, required
/// arguments that nothing binds are warnings.
pub fn validate(registry: &UnitRegistry) -> ValidationResult {
    let mut result = ValidationResult::new();

    for (name, unit) in registry.units().chain(registry.flows()) {
        check_wiring(registry, name, unit, &mut result);
    }

    let mut state = HashMap::new();
    for (name, _) in registry.units() {
        let mut path = Vec::new();
        find_cycle(registry, name, &mut state, &mut path, &mut result);
    }

    let errors = result
        .issues
        .iter()
        .filter(|i| matches!(i, ValidationIssue::Error(_)))
        .count();
    log::info!(
        "Validated {} units and {} flows: {} errors, {} warnings",
        registry.unit_count(),
        registry.flow_count(),
        errors,
        result.issues.len() - errors
    );
    result
}

fn check_wiring(registry: &UnitRegistry, name: &str, unit: &Unit, result: &mut ValidationResult) {
    let Some(derived) = unit.as_derived() else {
        return;
    };
    let inputs: HashSet<&str> = derived.input().keys().map(String::as_str).collect();

    for (pos, instance) in derived.sub_units().iter().enumerate() {
        let Some(target) = registry.get_unit(&instance.name) else {
            result.add_error(format!(
                "Unit '{}' step {} references unknown unit '{}'.",
                name,
                pos + 1,
                instance.name
            ));
            continue;
        };

        for arg in target.get_args() {
            if !instance.params.contains_key(arg) && !inputs.contains(arg) {
                result.add_warning(format!(
                    "Unit '{}' step {} ('{}') requires argument '{}' which is neither bound nor an input of '{}'.",
                    name,
                    pos + 1,
                    instance.get_desc(),
                    arg,
                    name
                ));
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    InProgress,
    Done,
}

fn find_cycle<'a>(
    registry: &'a UnitRegistry,
    name: &'a str,
    state: &mut HashMap<&'a str, Visit>,
    path: &mut Vec<&'a str>,
    result: &mut ValidationResult,
) {
    match state.get(name) {
        Some(Visit::Done) => return,
        Some(Visit::InProgress) => {
            let start = path.iter().position(|n| *n == name).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(name);
            result.add_error(format!("Reference cycle detected: {}.", cycle.join(" -> ")));
            return;
        }
        None => {}
    }

    let Some(derived) = registry.get_unit(name).and_then(|u| u.as_derived()) else {
        state.insert(name, Visit::Done);
        return;
    };

    state.insert(name, Visit::InProgress);
    path.push(name);
    for instance in derived.sub_units() {
        if registry.get_unit(&instance.name).is_some() {
            find_cycle(registry, &instance.name, state, path, result);
        }
    }
    path.pop();
    state.insert(name, Visit::Done);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::load_str;
    use crate::core::module::{Callable, Module, ModuleTable};
    use serde_json::json;

    fn table() -> ModuleTable {
        ModuleTable::new().with_module(
            Module::new("math").function(Callable::new("add", crate::signature!("x, y=1"), |_| {
                json!(null)
            })),
        )
    }

    #[test]
    fn test_valid_wiring() {
        let registry = load_str(
            r#"
alchemy: {module: math}
units:
  add: {func: add}
  pipeline:
    input: [x]
    units:
      - add: {}
flows:
  main:
    units:
      - pipeline: {x: 3}
"#,
            &table(),
        )
        .unwrap();

        let result = validate(&registry);
        assert!(result.is_safe());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_unknown_reference_and_unbound_argument() {
        let registry = load_str(
            r#"
alchemy: {module: math}
units:
  add: {func: add}
flows:
  main:
    units:
      - add: {y: 2}
      - missing: {}
"#,
            &table(),
        )
        .unwrap();

        let result = validate(&registry);
        assert!(!result.is_safe());
        assert!(result.has_warnings());
        assert!(result.summary().contains("unknown unit 'missing'"));
        assert!(result.summary().contains("requires argument 'x'"));
    }

    #[test]
    fn test_reference_cycle() {
        let registry = load_str(
            r#"
alchemy: {}
units:
  a: {units: [{b: {}}]}
  b: {units: [{a: {}}]}
"#,
            &table(),
        )
        .unwrap();

        let result = validate(&registry);
        assert!(!result.is_safe());
        assert!(result.summary().contains("a -> b -> a"));
    }
}
