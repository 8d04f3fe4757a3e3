use crate::core::UnitValue;
use crate::core::error::UnitError;
use crate::core::unit::instance::UnitInstance;
use indexmap::IndexMap;

/// A composite unit: an ordered wiring of other named units.
///
/// Its contract (`input`, `defaults`, `output`) describes what the composite
/// requires from its caller, independent of what its sub-units require.
/// `input` keeps declaration order and maps each name to its description,
/// which is empty when the configuration lists names only.
#[derive(Debug, Clone)]
pub struct DerivedUnit {
    pub(crate) name: String,
    pub(crate) input: IndexMap<String, String>,
    pub(crate) output: IndexMap<String, String>,
    pub(crate) defaults: IndexMap<String, UnitValue>,
    pub(crate) sub_units: Vec<UnitInstance>,
}

impl DerivedUnit {
    /// Builds a derived unit, rejecting defaults for undeclared inputs.
    pub fn new(
        name: impl Into<String>,
        input: IndexMap<String, String>,
        output: IndexMap<String, String>,
        defaults: IndexMap<String, UnitValue>,
        sub_units: Vec<UnitInstance>,
    ) -> Result<Self, UnitError> {
        let name = name.into();
        if let Some(stray) = defaults.keys().find(|k| !input.contains_key(*k)) {
            return Err(UnitError::UnknownDefault {
                unit: name,
                name: stray.clone(),
            });
        }

        Ok(Self {
            name,
            input,
            output,
            defaults,
            sub_units,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input(&self) -> &IndexMap<String, String> {
        &self.input
    }

    pub fn output(&self) -> &IndexMap<String, String> {
        &self.output
    }

    pub fn defaults(&self) -> &IndexMap<String, UnitValue> {
        &self.defaults
    }

    /// Sub-unit wiring in declared order.
    pub fn sub_units(&self) -> &[UnitInstance] {
        &self.sub_units
    }

    /// Declared inputs without a default, in declared order.
    pub fn get_args(&self) -> Vec<&str> {
        self.input
            .keys()
            .filter(|name| !self.defaults.contains_key(*name))
            .map(String::as_str)
            .collect()
    }

    pub fn get_default_vars(&self) -> Vec<&str> {
        self.defaults.keys().map(String::as_str).collect()
    }
}
