//! Declarative constructors: parsed configuration mappings in, units out.
//!
//! Every constructor either returns a fully built unit or an error; nothing
//! half-built is ever handed to a registry.

use crate::core::UnitValue;
use crate::core::error::{LoadError, UnitError};
use crate::core::module::{Module, ModuleTable};
use crate::core::registry::UnitRegistry;
use crate::core::unit::Unit;
use crate::core::unit::derived::DerivedUnit;
use crate::core::unit::function::FunctionUnit;
use crate::core::unit::instance::UnitInstance;
use indexmap::IndexMap;
use serde_json::Map;

/// Top-level key every configuration document must carry.
pub const MARKER_KEY: &str = "alchemy";

/// Builds a function unit from `func_name` inside an already resolved module.
pub fn create_unit(name: &str, module: &Module, func_name: &str) -> Result<FunctionUnit, UnitError> {
    let func = module
        .get(func_name)
        .ok_or_else(|| UnitError::FunctionNotFound {
            unit: name.to_string(),
            module: module.name().to_string(),
            function: func_name.to_string(),
        })?;

    Ok(FunctionUnit::new(name, module.name(), func.clone()))
}

/// Builds a function unit by module name and attribute name.
pub fn create_unit_by_str(
    name: &str,
    table: &ModuleTable,
    module_name: &str,
    func_name: &str,
) -> Result<FunctionUnit, UnitError> {
    let module = table
        .get(module_name)
        .ok_or_else(|| UnitError::ModuleNotFound {
            unit: name.to_string(),
            module: module_name.to_string(),
        })?;

    create_unit(name, module, func_name)
}

/// Builds a function unit from `{func, input?, output?}`.
///
/// Every `input` key must name a parameter of the callable.
pub fn create_unit_from_dict(
    name: &str,
    module: &Module,
    d: &UnitValue,
) -> Result<FunctionUnit, UnitError> {
    let d = as_mapping(name, "unit", d)?;
    let func_name = d
        .get("func")
        .ok_or_else(|| UnitError::MissingKey {
            unit: name.to_string(),
            key: "func".to_string(),
        })?
        .as_str()
        .ok_or_else(|| UnitError::InvalidField {
            unit: name.to_string(),
            field: "func".to_string(),
            reason: "must be a string".to_string(),
        })?;

    let unit = create_unit(name, module, func_name)?;
    let input_desc = text_map(name, "input", d.get("input"))?;
    if let Some(unknown) = input_desc.keys().find(|key| !unit.has_arg(key)) {
        return Err(UnitError::UnknownInput {
            unit: name.to_string(),
            name: unknown.clone(),
        });
    }

    Ok(unit
        .with_input_desc(input_desc)
        .with_output(text_map(name, "output", d.get("output"))?))
}

pub fn create_derived_unit(
    name: &str,
    input: IndexMap<String, String>,
    output: IndexMap<String, String>,
    defaults: IndexMap<String, UnitValue>,
    sub_units: Vec<UnitInstance>,
) -> Result<DerivedUnit, UnitError> {
    DerivedUnit::new(name, input, output, defaults, sub_units)
}

/// Builds a derived unit from `{input?, output?, defaults?, units}`.
///
/// `units` must be present; an empty sequence is legal.
pub fn create_derived_unit_from_dict(name: &str, d: &UnitValue) -> Result<DerivedUnit, UnitError> {
    let d = as_mapping(name, "unit", d)?;

    let units = d.get("units").ok_or_else(|| UnitError::MissingKey {
        unit: name.to_string(),
        key: "units".to_string(),
    })?;
    let sub_units = match units {
        UnitValue::Null => Vec::new(),
        UnitValue::Array(entries) => entries
            .iter()
            .map(|entry| create_unit_inst_from_dict(entry).map_err(|e| e.in_unit(name)))
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(UnitError::InvalidField {
                unit: name.to_string(),
                field: "units".to_string(),
                reason: "must be a sequence".to_string(),
            });
        }
    };

    let input = input_map(name, d.get("input"))?;
    let output = text_map(name, "output", d.get("output"))?;
    let defaults = match d.get("defaults") {
        None | Some(UnitValue::Null) => IndexMap::new(),
        Some(UnitValue::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Some(_) => {
            return Err(UnitError::InvalidField {
                unit: name.to_string(),
                field: "defaults".to_string(),
                reason: "must be a mapping".to_string(),
            });
        }
    };

    create_derived_unit(name, input, output, defaults, sub_units)
}

pub fn create_unit_inst_from_dict(d: &UnitValue) -> Result<UnitInstance, UnitError> {
    UnitInstance::from_value(d)
}

pub fn mark_as_meta_unit(unit: &mut Unit) {
    unit.mark_meta();
}

pub fn is_meta_unit(unit: &Unit) -> bool {
    unit.is_meta()
}

/// Builds one unit entry of a document: derived when it has `units`,
/// otherwise a function unit resolved through `table`.
pub fn create_any_unit(
    name: &str,
    d: &UnitValue,
    table: &ModuleTable,
    default_module: Option<&str>,
) -> Result<Unit, UnitError> {
    let map = as_mapping(name, "unit", d)?;

    let mut unit = if map.contains_key("units") {
        Unit::from(create_derived_unit_from_dict(name, d)?)
    } else {
        let module_name = match map.get("module") {
            Some(UnitValue::String(m)) => m.as_str(),
            Some(_) => {
                return Err(UnitError::InvalidField {
                    unit: name.to_string(),
                    field: "module".to_string(),
                    reason: "must be a string".to_string(),
                });
            }
            None => default_module.ok_or_else(|| UnitError::MissingKey {
                unit: name.to_string(),
                key: "module".to_string(),
            })?,
        };
        let module = table.get(module_name).ok_or_else(|| UnitError::ModuleNotFound {
            unit: name.to_string(),
            module: module_name.to_string(),
        })?;
        Unit::from(create_unit_from_dict(name, module, d)?)
    };

    apply_meta(map, &mut unit);
    Ok(unit)
}

/// Builds one flow entry of a document. A flow is derived unless it names a
/// `func`, so an entry with neither key is reported as missing `units`.
pub fn create_flow(
    name: &str,
    d: &UnitValue,
    table: &ModuleTable,
    default_module: Option<&str>,
) -> Result<Unit, UnitError> {
    let map = as_mapping(name, "flow", d)?;
    if map.contains_key("func") {
        return create_any_unit(name, d, table, default_module);
    }

    let mut unit = Unit::from(create_derived_unit_from_dict(name, d)?);
    apply_meta(map, &mut unit);
    Ok(unit)
}

fn apply_meta(map: &Map<String, UnitValue>, unit: &mut Unit) {
    if map.get("meta").and_then(UnitValue::as_bool).unwrap_or(false) {
        mark_as_meta_unit(unit);
    }
}

/// Builds a registry from a parsed configuration document.
///
/// The first failing unit aborts the whole load.
pub fn load_document(doc: &UnitValue, table: &ModuleTable) -> Result<UnitRegistry, LoadError> {
    let doc = doc.as_object().ok_or_else(|| LoadError::InvalidSection {
        section: "document".to_string(),
        reason: "must be a mapping".to_string(),
    })?;

    let header = doc.get(MARKER_KEY).ok_or(LoadError::MissingMarker)?;
    let default_module = header.get("module").and_then(UnitValue::as_str);

    let mut registry = UnitRegistry::new();
    for (name, entry) in section(doc, "units")? {
        let unit = create_any_unit(name, entry, table, default_module)?;
        log::debug!("Loaded unit {} ({})", name, unit.kind());
        registry.register_unit(unit)?;
    }
    for (name, entry) in section(doc, "flows")? {
        let unit = create_flow(name, entry, table, default_module)?;
        log::debug!("Loaded flow {} ({})", name, unit.kind());
        registry.register_flow(unit)?;
    }

    log::info!(
        "Loaded {} units and {} flows",
        registry.unit_count(),
        registry.flow_count()
    );
    Ok(registry)
}

/// Parses YAML text and builds a registry from it.
pub fn load_str(text: &str, table: &ModuleTable) -> Result<UnitRegistry, LoadError> {
    let doc: UnitValue = serde_yaml::from_str(text)?;
    load_document(&doc, table)
}

fn section<'a>(
    doc: &'a Map<String, UnitValue>,
    key: &str,
) -> Result<Vec<(&'a String, &'a UnitValue)>, LoadError> {
    match doc.get(key) {
        None | Some(UnitValue::Null) => Ok(Vec::new()),
        Some(UnitValue::Object(map)) => Ok(map.iter().collect()),
        Some(_) => Err(LoadError::InvalidSection {
            section: key.to_string(),
            reason: "must be a mapping of names to definitions".to_string(),
        }),
    }
}

fn as_mapping<'a>(
    unit: &str,
    field: &str,
    value: &'a UnitValue,
) -> Result<&'a Map<String, UnitValue>, UnitError> {
    value.as_object().ok_or_else(|| UnitError::InvalidField {
        unit: unit.to_string(),
        field: field.to_string(),
        reason: "must be a mapping".to_string(),
    })
}

fn text(value: &UnitValue) -> String {
    match value {
        UnitValue::Null => String::new(),
        UnitValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Reads an optional name -> text mapping. Absent or null is empty.
fn text_map(
    unit: &str,
    field: &str,
    value: Option<&UnitValue>,
) -> Result<IndexMap<String, String>, UnitError> {
    match value {
        None | Some(UnitValue::Null) => Ok(IndexMap::new()),
        Some(UnitValue::Object(map)) => Ok(map.iter().map(|(k, v)| (k.clone(), text(v))).collect()),
        Some(_) => Err(UnitError::InvalidField {
            unit: unit.to_string(),
            field: field.to_string(),
            reason: "must be a mapping".to_string(),
        }),
    }
}

/// Reads a derived unit's inputs: a list of distinct names, or a
/// name -> description mapping.
fn input_map(unit: &str, value: Option<&UnitValue>) -> Result<IndexMap<String, String>, UnitError> {
    let Some(UnitValue::Array(names)) = value else {
        return text_map(unit, "input", value);
    };

    let invalid = |reason: String| UnitError::InvalidField {
        unit: unit.to_string(),
        field: "input".to_string(),
        reason,
    };
    let mut input = IndexMap::with_capacity(names.len());
    for n in names {
        let UnitValue::String(s) = n else {
            return Err(invalid(format!("entries must be names, got {}", n)));
        };
        if input.insert(s.clone(), String::new()).is_some() {
            return Err(invalid(format!("declares '{}' more than once", s)));
        }
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::Callable;
    use crate::core::unit::UnitKind;
    use serde_json::json;

    fn math() -> Module {
        Module::new("math").function(Callable::new(
            "add",
            crate::signature!("x, y=1"),
            |_| json!(null),
        ))
    }

    #[test]
    fn test_create_unit_from_dict() {
        let unit = create_unit_from_dict(
            "adder",
            &math(),
            &json!({"func": "add", "input": {"x": "left"}, "output": {"sum": "x + y"}}),
        )
        .unwrap();

        assert_eq!(unit.name(), "adder");
        assert_eq!(unit.module(), "math");
        assert_eq!(unit.get_args(), &["x"]);
        assert_eq!(unit.input_desc()["x"], "left");
        assert_eq!(unit.output()["sum"], "x + y");
    }

    #[test]
    fn test_create_unit_from_dict_defaults_to_empty() {
        let unit = create_unit_from_dict("adder", &math(), &json!({"func": "add"})).unwrap();
        assert!(unit.input_desc().is_empty());
        assert!(unit.output().is_empty());
    }

    #[test]
    fn test_missing_function_names_unit_and_symbol() {
        let err = create_unit_from_dict("adder", &math(), &json!({"func": "sub"})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("adder"));
        assert!(msg.contains("sub"));

        let err = create_unit_from_dict("adder", &math(), &json!({"input": {}})).unwrap_err();
        assert!(matches!(err, UnitError::MissingKey { ref key, .. } if key == "func"));
    }

    #[test]
    fn test_missing_module_names_unit_and_symbol() {
        let table = ModuleTable::new().with_module(math());
        let err = create_unit_by_str("adder", &table, "strings", "add").unwrap_err();
        assert!(matches!(
            err,
            UnitError::ModuleNotFound { ref unit, ref module } if unit == "adder" && module == "strings"
        ));
    }

    #[test]
    fn test_create_derived_unit_from_dict() {
        let d = json!({
            "input": ["a", "b", "c"],
            "output": {"total": "sum of all"},
            "defaults": {"b": 1},
            "units": [{"A": {"p": 1}}, {"B": {"q": 2, "@desc": "step b"}}],
        });
        let unit = create_derived_unit_from_dict("pipeline", &d).unwrap();

        assert_eq!(unit.get_args(), vec!["a", "c"]);
        assert_eq!(unit.sub_units().len(), 2);
        assert_eq!(unit.sub_units()[0].get_desc(), "A");
        assert_eq!(unit.sub_units()[1].get_desc(), "step b");
        assert_eq!(unit.sub_units()[1].params, IndexMap::from([("q".to_string(), json!(2))]));
    }

    #[test]
    fn test_derived_input_mapping_keeps_descriptions() {
        let d = json!({"input": {"a": "alpha", "b": "beta"}, "units": []});
        let unit = create_derived_unit_from_dict("p", &d).unwrap();
        assert_eq!(unit.input()["b"], "beta");
        assert!(unit.sub_units().is_empty());
        assert!(unit.defaults().is_empty());
    }

    #[test]
    fn test_derived_requires_units() {
        let err = create_derived_unit_from_dict("p", &json!({"input": ["a"]})).unwrap_err();
        assert!(matches!(err, UnitError::MissingKey { ref key, .. } if key == "units"));
    }

    #[test]
    fn test_ambiguous_instance_names_owner() {
        let err = create_derived_unit_from_dict("p", &json!({"units": [{"A": {}, "B": {}}]}))
            .unwrap_err();
        assert!(matches!(err, UnitError::AmbiguousInstance { ref unit, .. } if unit == "p"));
    }

    #[test]
    fn test_input_desc_must_name_an_argument() {
        let err = create_unit_from_dict(
            "adder",
            &math(),
            &json!({"func": "add", "input": {"x": "left", "bogus": "not an arg"}}),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            UnitError::UnknownInput { ref unit, ref name } if unit == "adder" && name == "bogus"
        ));

        // optional parameters can be documented too
        let unit =
            create_unit_from_dict("adder", &math(), &json!({"func": "add", "input": {"y": "step"}}))
                .unwrap();
        assert_eq!(unit.input_desc()["y"], "step");
    }

    #[test]
    fn test_invalid_instance_params_name_owner() {
        let err = create_derived_unit_from_dict("pipeline", &json!({"units": [{"A": [1]}]}))
            .unwrap_err();
        assert!(matches!(
            err,
            UnitError::InvalidField { ref unit, ref field, .. } if unit == "pipeline" && field == "A.params"
        ));
        assert!(err.to_string().starts_with("unit 'pipeline'"));
    }

    #[test]
    fn test_duplicate_list_input_is_rejected() {
        let err = create_derived_unit_from_dict("p", &json!({"input": ["a", "a"], "units": []}))
            .unwrap_err();
        assert!(matches!(
            err,
            UnitError::InvalidField { ref field, ref reason, .. }
                if field == "input" && reason.contains("'a'")
        ));
    }

    #[test]
    fn test_flow_without_units_reports_units() {
        let table = ModuleTable::new().with_module(math());
        let err = create_flow("main", &json!({"input": ["a"]}), &table, Some("math")).unwrap_err();
        assert!(matches!(err, UnitError::MissingKey { ref key, .. } if key == "units"));

        let flow = create_flow("main", &json!({"units": [], "meta": true}), &table, None).unwrap();
        assert!(flow.is_meta());

        let flow = create_flow("main", &json!({"func": "add"}), &table, Some("math")).unwrap();
        assert_eq!(flow.kind(), UnitKind::Simple);
    }

    #[test]
    fn test_meta_flag() {
        let table = ModuleTable::new().with_module(math());
        let unit = create_any_unit("m", &json!({"func": "add", "meta": true}), &table, Some("math"))
            .unwrap();
        assert!(is_meta_unit(&unit));

        let unit = create_any_unit("d", &json!({"units": []}), &table, None).unwrap();
        assert_eq!(unit.kind(), UnitKind::Derived);
    }
}
