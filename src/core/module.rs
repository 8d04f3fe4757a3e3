//! Explicit callable registration.
//!
//! Function units never introspect code at runtime. Instead, callables are
//! registered up front under a module name and an attribute name, each with a
//! declared [`FunctionSignature`], and the loader resolves them by name.

use crate::core::UnitValue;
use crate::core::signature::FunctionSignature;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The arguments passed to a callable, keyed by parameter name.
pub type UnitArgs = IndexMap<String, UnitValue>;

/// The shared function handle behind a callable.
pub type UnitFn = Arc<dyn Fn(&UnitArgs) -> UnitValue + Send + Sync>;

/// A typed function handle with its declared parameter list.
#[derive(Clone)]
pub struct Callable {
    name: String,
    signature: FunctionSignature,
    doc: Option<String>,
    func: UnitFn,
}

impl Callable {
    pub fn new<F>(name: impl Into<String>, signature: FunctionSignature, func: F) -> Self
    where
        F: Fn(&UnitArgs) -> UnitValue + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            doc: None,
            func: Arc::new(func),
        }
    }

    /// Attaches documentation shown by unit listings.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Invokes the function with fully bound arguments.
    pub fn invoke(&self, args: &UnitArgs) -> UnitValue {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// A named group of callables, looked up by attribute name.
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    functions: IndexMap<String, Callable>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a callable under its own name.
    pub fn function(mut self, callable: Callable) -> Self {
        self.insert(callable);
        self
    }

    pub fn insert(&mut self, callable: Callable) {
        if self.functions.contains_key(callable.name()) {
            log::warn!(
                "Function {} was already registered in module {}, overwriting it.",
                callable.name(),
                self.name
            );
        }
        self.functions.insert(callable.name().to_string(), callable);
    }

    pub fn get(&self, attr: &str) -> Option<&Callable> {
        self.functions.get(attr)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Callable> {
        self.functions.values()
    }
}

/// The registration table of every module a configuration may reference.
#[derive(Debug, Clone, Default)]
pub struct ModuleTable {
    modules: HashMap<String, Arc<Module>>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: Module) {
        log::debug!("Registering module {}", module.name());
        self.modules
            .insert(module.name().to_string(), Arc::new(module));
    }

    /// Builder-style variant of [`ModuleTable::register`].
    pub fn with_module(mut self, module: Module) -> Self {
        self.register(module);
        self
    }

    pub fn get(&self, module_name: &str) -> Option<&Arc<Module>> {
        self.modules.get(module_name)
    }

    /// Looks up `attr` inside `module_name`.
    pub fn resolve(&self, module_name: &str, attr: &str) -> Option<&Callable> {
        self.get(module_name).and_then(|m| m.get(attr))
    }
}
