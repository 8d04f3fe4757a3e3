use crate::core::error::UnitError;
use crate::core::unit::Unit;
use crate::core::unit::instance::UnitInstance;
use indexmap::IndexMap;
use std::sync::Arc;

/// Fully built units and flows, indexed by name in declaration order.
///
/// Units are stored behind `Arc` and never mutated again, so a registry can
/// be shared with any number of readers.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    units: IndexMap<String, Arc<Unit>>,
    flows: IndexMap<String, Arc<Unit>>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_unit(&mut self, unit: Unit) -> Result<(), UnitError> {
        Self::insert(&mut self.units, unit)
    }

    /// Registers an entry-point unit.
    pub fn register_flow(&mut self, unit: Unit) -> Result<(), UnitError> {
        Self::insert(&mut self.flows, unit)
    }

    fn insert(map: &mut IndexMap<String, Arc<Unit>>, unit: Unit) -> Result<(), UnitError> {
        if map.contains_key(unit.name()) {
            return Err(UnitError::DuplicateUnit(unit.name().to_string()));
        }
        map.insert(unit.name().to_string(), Arc::new(unit));
        Ok(())
    }

    pub fn get_unit(&self, name: &str) -> Option<&Arc<Unit>> {
        self.units.get(name)
    }

    pub fn get_flow(&self, name: &str) -> Option<&Arc<Unit>> {
        self.flows.get(name)
    }

    /// Resolves the unit an instance points at. Flows are not valid targets.
    pub fn resolve(&self, instance: &UnitInstance) -> Result<&Arc<Unit>, UnitError> {
        self.get_unit(&instance.name)
            .ok_or_else(|| UnitError::UnknownUnit(instance.name.clone()))
    }

    pub fn units(&self) -> impl Iterator<Item = (&str, &Arc<Unit>)> {
        self.units.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn flows(&self) -> impl Iterator<Item = (&str, &Arc<Unit>)> {
        self.flows.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Adds every unit and flow of `other`. Fails on the first name clash and
    /// leaves `self` untouched in that case.
    pub fn merge(&mut self, other: UnitRegistry) -> Result<(), UnitError> {
        let clash = other
            .units
            .keys()
            .find(|k| self.units.contains_key(*k))
            .or_else(|| other.flows.keys().find(|k| self.flows.contains_key(*k)));
        if let Some(name) = clash {
            return Err(UnitError::DuplicateUnit(name.clone()));
        }

        self.units.extend(other.units);
        self.flows.extend(other.flows);
        Ok(())
    }

    /// `(position, name, doc)` rows for a unit listing.
    pub fn list_units(&self) -> Vec<(usize, &str, &str)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, (name, unit))| {
                let doc = unit.as_function().and_then(|f| f.doc()).unwrap_or("");
                (i + 1, name.as_str(), doc)
            })
            .collect()
    }

    /// `(position, name)` rows for a flow listing.
    pub fn list_flows(&self) -> Vec<(usize, &str)> {
        self.flows
            .keys()
            .enumerate()
            .map(|(i, name)| (i + 1, name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::module::Callable;
    use crate::core::unit::derived::DerivedUnit;
    use crate::core::unit::function::FunctionUnit;
    use indexmap::IndexMap;
    use serde_json::json;

    fn function(name: &str) -> Unit {
        let callable = Callable::new("f", crate::signature!("x"), |_| json!(null)).with_doc("does f");
        Unit::from(FunctionUnit::new(name, "m", callable))
    }

    fn derived(name: &str) -> Unit {
        Unit::from(
            DerivedUnit::new(name, IndexMap::new(), IndexMap::new(), IndexMap::new(), vec![]).unwrap(),
        )
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = UnitRegistry::new();
        registry.register_unit(function("a")).unwrap();
        registry.register_flow(derived("main")).unwrap();

        assert!(registry.get_unit("a").is_some());
        assert!(registry.get_flow("main").is_some());
        assert!(registry.get_unit("main").is_none());

        let inst = UnitInstance::new("a", IndexMap::new());
        assert_eq!(registry.resolve(&inst).unwrap().name(), "a");
        let missing = UnitInstance::new("zzz", IndexMap::new());
        assert!(matches!(registry.resolve(&missing), Err(UnitError::UnknownUnit(_))));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = UnitRegistry::new();
        registry.register_unit(function("a")).unwrap();
        assert!(matches!(
            registry.register_unit(derived("a")),
            Err(UnitError::DuplicateUnit(name)) if name == "a"
        ));
        assert_eq!(registry.unit_count(), 1);
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut first = UnitRegistry::new();
        first.register_unit(function("a")).unwrap();

        let mut second = UnitRegistry::new();
        second.register_unit(function("b")).unwrap();
        second.register_unit(function("a")).unwrap();

        assert!(first.merge(second).is_err());
        assert_eq!(first.unit_count(), 1);

        let mut third = UnitRegistry::new();
        third.register_unit(function("c")).unwrap();
        first.merge(third).unwrap();
        assert_eq!(first.unit_count(), 2);
    }

    #[test]
    fn test_listings() {
        let mut registry = UnitRegistry::new();
        registry.register_unit(function("a")).unwrap();
        registry.register_unit(derived("b")).unwrap();
        registry.register_flow(derived("main")).unwrap();

        assert_eq!(registry.list_units(), vec![(1, "a", "does f"), (2, "b", "")]);
        assert_eq!(registry.list_flows(), vec![(1, "main")]);
    }
}
