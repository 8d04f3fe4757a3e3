use crate::core::UnitValue;
use crate::core::error::UnitError;
use crate::core::module::{Callable, UnitArgs};
use indexmap::IndexMap;

/// A leaf unit bound directly to a registered callable.
///
/// The required/optional contract is derived once, at construction, from the
/// callable's declared signature.
#[derive(Debug, Clone)]
pub struct FunctionUnit {
    pub(crate) name: String,
    /// Module the callable was resolved from. Provenance only.
    pub(crate) module: String,
    pub(crate) func: Callable,
    pub(crate) required_args: Vec<String>,
    pub(crate) optional_args: Option<IndexMap<String, UnitValue>>,
    pub(crate) input_desc: IndexMap<String, String>,
    pub(crate) output: IndexMap<String, String>,
}

impl FunctionUnit {
    pub fn new(name: impl Into<String>, module: impl Into<String>, func: Callable) -> Self {
        let (required_args, optional_args) = func.signature().split();
        Self {
            name: name.into(),
            module: module.into(),
            func,
            required_args,
            optional_args,
            input_desc: IndexMap::new(),
            output: IndexMap::new(),
        }
    }

    pub fn with_input_desc(mut self, input_desc: IndexMap<String, String>) -> Self {
        self.input_desc = input_desc;
        self
    }

    pub fn with_output(mut self, output: IndexMap<String, String>) -> Self {
        self.output = output;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn callable(&self) -> &Callable {
        &self.func
    }

    pub fn doc(&self) -> Option<&str> {
        self.func.doc()
    }

    pub fn required_args(&self) -> &[String] {
        &self.required_args
    }

    pub fn optional_args(&self) -> Option<&IndexMap<String, UnitValue>> {
        self.optional_args.as_ref()
    }

    pub fn input_desc(&self) -> &IndexMap<String, String> {
        &self.input_desc
    }

    pub fn output(&self) -> &IndexMap<String, String> {
        &self.output
    }

    /// Whether `name` is a parameter of the callable, required or optional.
    pub fn has_arg(&self, name: &str) -> bool {
        self.required_args.iter().any(|arg| arg == name)
            || self
                .optional_args
                .as_ref()
                .is_some_and(|kargs| kargs.contains_key(name))
    }

    /// Names a caller must supply.
    pub fn get_args(&self) -> &[String] {
        &self.required_args
    }

    /// Names of the defaulted parameters, or `None` when the callable
    /// declares no default list at all.
    pub fn get_default_vars(&self) -> Option<Vec<&str>> {
        self.optional_args
            .as_ref()
            .map(|kargs| kargs.keys().map(String::as_str).collect())
    }

    /// Binds `supplied` against the contract and invokes the callable.
    ///
    /// Optional parameters fall back to their defaults. Names outside the
    /// declared parameter list are ignored.
    pub fn call(&self, supplied: &UnitArgs) -> Result<UnitValue, UnitError> {
        let mut args = UnitArgs::new();

        for arg in &self.required_args {
            let value = supplied
                .get(arg)
                .ok_or_else(|| UnitError::MissingArgument {
                    unit: self.name.clone(),
                    argument: arg.clone(),
                })?;
            args.insert(arg.clone(), value.clone());
        }

        if let Some(kargs) = &self.optional_args {
            for (arg, default) in kargs {
                let value = supplied.get(arg).unwrap_or(default);
                args.insert(arg.clone(), value.clone());
            }
        }

        log::debug!("Invoking {}.{} for unit {}", self.module, self.func.name(), self.name);
        Ok(self.func.invoke(&args))
    }
}
