use crate::core::UnitValue;
use crate::core::error::UnitError;
use indexmap::IndexMap;
use serde::Serialize;

/// Reserved parameter key holding an instance's description.
pub const DESC_KEY: &str = "@desc";

/// A reference to a named unit plus its call-site parameter bindings.
///
/// The referenced unit is resolved lazily through the registry; an instance
/// never owns the unit it points to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitInstance {
    pub name: String,
    pub desc: Option<String>,
    pub params: IndexMap<String, UnitValue>,
}

impl UnitInstance {
    /// Creates an instance, moving a `@desc` entry out of `params`.
    pub fn new(name: impl Into<String>, mut params: IndexMap<String, UnitValue>) -> Self {
        let desc = params.shift_remove(DESC_KEY).map(|v| match v {
            UnitValue::String(s) => s,
            other => other.to_string(),
        });

        Self {
            name: name.into(),
            desc,
            params,
        }
    }

    /// Parses a single-key mapping `{name: params}`.
    ///
    /// Null, empty or falsy params become an empty binding. A mapping with
    /// zero or several keys is rejected rather than guessed at. Errors leave
    /// the owning unit blank for the caller to fill in.
    pub fn from_value(value: &UnitValue) -> Result<Self, UnitError> {
        let map = value.as_object().ok_or_else(|| UnitError::InvalidField {
            unit: String::new(),
            field: "units".to_string(),
            reason: format!("entry must be a mapping, got {}", value),
        })?;

        let (name, raw) = match map.iter().next() {
            Some(entry) if map.len() == 1 => entry,
            _ => {
                return Err(UnitError::AmbiguousInstance {
                    unit: String::new(),
                    found: map.keys().cloned().collect(),
                });
            }
        };

        let params = match raw {
            UnitValue::Object(obj) => obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            other if is_falsy(other) => IndexMap::new(),
            other => {
                return Err(UnitError::InvalidField {
                    unit: String::new(),
                    field: format!("{}.params", name),
                    reason: format!("must be a mapping, got {}", other),
                });
            }
        };

        Ok(Self::new(name.clone(), params))
    }

    /// The description if one was given, otherwise the referenced name.
    pub fn get_desc(&self) -> &str {
        match self.desc.as_deref() {
            Some(desc) if !desc.is_empty() => desc,
            _ => &self.name,
        }
    }
}

fn is_falsy(value: &UnitValue) -> bool {
    match value {
        UnitValue::Null => true,
        UnitValue::Bool(b) => !b,
        UnitValue::Number(n) => n.as_f64() == Some(0.0),
        UnitValue::String(s) => s.is_empty(),
        UnitValue::Array(items) => items.is_empty(),
        UnitValue::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_desc_is_extracted() {
        let inst = UnitInstance::from_value(&json!({"B": {"q": 2, "@desc": "step b"}})).unwrap();
        assert_eq!(inst.name, "B");
        assert_eq!(inst.get_desc(), "step b");
        assert_eq!(inst.params.len(), 1);
        assert_eq!(inst.params.get("q"), Some(&json!(2)));
        assert!(!inst.params.contains_key(DESC_KEY));
    }

    #[test]
    fn test_desc_falls_back_to_name() {
        let inst = UnitInstance::from_value(&json!({"A": {"p": 1}})).unwrap();
        assert_eq!(inst.get_desc(), "A");

        let blank = UnitInstance::new("C", IndexMap::from([(DESC_KEY.to_string(), json!(""))]));
        assert_eq!(blank.get_desc(), "C");
    }

    #[test]
    fn test_null_params_become_empty() {
        let inst = UnitInstance::from_value(&json!({"A": null})).unwrap();
        assert!(inst.params.is_empty());
        assert!(inst.desc.is_none());

        let inst = UnitInstance::from_value(&json!({"A": {}})).unwrap();
        assert!(inst.params.is_empty());
    }

    #[test]
    fn test_falsy_params_become_empty() {
        for raw in [json!(""), json!([]), json!(false), json!(0), json!(0.0)] {
            let inst = UnitInstance::from_value(&json!({ "A": raw.clone() })).unwrap();
            assert_eq!(inst.name, "A");
            assert!(inst.params.is_empty(), "params {} should bind nothing", raw);
        }
    }

    #[test]
    fn test_non_empty_scalar_params_are_rejected() {
        for raw in [json!("x"), json!([1]), json!(true), json!(3)] {
            let err = UnitInstance::from_value(&json!({ "A": raw })).unwrap_err();
            assert!(
                matches!(err, UnitError::InvalidField { ref unit, ref field, .. }
                    if unit.is_empty() && field == "A.params")
            );
        }
    }

    #[test]
    fn test_rejects_ambiguous_mappings() {
        let err = UnitInstance::from_value(&json!({"A": {}, "B": {}})).unwrap_err();
        assert!(matches!(err, UnitError::AmbiguousInstance { found, .. } if found.len() == 2));

        let err = UnitInstance::from_value(&json!({})).unwrap_err();
        assert!(matches!(err, UnitError::AmbiguousInstance { found, .. } if found.is_empty()));

        assert!(UnitInstance::from_value(&json!("A")).is_err());
        assert!(UnitInstance::from_value(&json!({"A": [1, 2]})).is_err());
    }

    #[test]
    fn test_serializes_like_a_record() {
        let inst = UnitInstance::from_value(&json!({"A": {"p": 1, "@desc": "first"}})).unwrap();
        assert_eq!(
            serde_json::to_value(&inst).unwrap(),
            json!({"name": "A", "desc": "first", "params": {"p": 1}})
        );
    }
}
