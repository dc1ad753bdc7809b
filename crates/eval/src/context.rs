//! Mutable evaluation state: variables, class lookup and imports.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::registry::{ClassHandle, ClassRegistry};
use crate::value::Value;

/// Variable bindings plus the class registry expressions resolve against.
///
/// Class names resolve in three steps: exact registry name, imported
/// alias, then each imported package prefix in import order.
#[derive(Clone, Debug)]
pub struct Context {
    vars: BTreeMap<String, Value>,
    registry: Arc<ClassRegistry>,
    aliases: BTreeMap<String, String>,
    packages: Vec<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ClassRegistry::with_standard_library()))
    }

    pub fn with_registry(registry: Arc<ClassRegistry>) -> Self {
        Self {
            vars: BTreeMap::new(),
            registry,
            aliases: BTreeMap::new(),
            packages: Vec::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.vars.remove(name)
    }

    /// Import a single class under its simple name.
    pub fn import_class(&mut self, qualified: &str) {
        let simple = qualified.rsplit('.').next().unwrap_or(qualified);
        self.aliases
            .insert(simple.to_owned(), qualified.to_owned());
    }

    /// Import every class of a package prefix.
    pub fn import_package(&mut self, package: &str) {
        self.packages.push(package.to_owned());
    }

    /// Resolve a class name through the registry and the imports.
    pub fn for_name(&self, name: &str) -> Option<ClassHandle> {
        if let Some(class) = self.registry.get(name) {
            return Some(class);
        }
        if let Some(full) = self.aliases.get(name) {
            if let Some(class) = self.registry.get(full) {
                return Some(class);
            }
        }
        self.packages
            .iter()
            .find_map(|pkg| self.registry.get(&format!("{}.{}", pkg, name)))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_are_mutable() {
        let mut ctx = Context::new();
        assert!(!ctx.contains("x"));
        ctx.set("x", Value::Int(3));
        assert_eq!(ctx.get("x"), Some(&Value::Int(3)));
        ctx.set("x", Value::Int(5));
        assert_eq!(ctx.get("x"), Some(&Value::Int(5)));
        assert_eq!(ctx.remove("x"), Some(Value::Int(5)));
        assert!(!ctx.contains("x"));
    }

    #[test]
    fn standard_classes_resolve() {
        let ctx = Context::new();
        assert!(ctx.for_name("math").is_some());
        assert!(ctx.for_name("missing").is_none());
    }

    #[test]
    fn imports_alias_and_search() {
        use crate::error::EvalError;
        use crate::registry::ObjectClass;

        struct Probe;
        impl ObjectClass for Probe {
            fn name(&self) -> &str {
                "com.example.Probe"
            }
            fn construct(&self, _: &[Value]) -> Result<Value, EvalError> {
                Ok(Value::Null)
            }
            fn invoke_static(&self, m: &str, _: &[Value]) -> Result<Value, EvalError> {
                Err(EvalError::UnknownMember {
                    class: self.name().to_owned(),
                    member: m.to_owned(),
                })
            }
            fn static_field(&self, f: &str) -> Result<Value, EvalError> {
                Err(EvalError::UnknownMember {
                    class: self.name().to_owned(),
                    member: f.to_owned(),
                })
            }
        }

        let mut registry = ClassRegistry::new();
        registry.register(Arc::new(Probe));
        let mut ctx = Context::with_registry(Arc::new(registry));
        assert!(ctx.for_name("Probe").is_none());
        ctx.import_class("com.example.Probe");
        assert!(ctx.for_name("Probe").is_some());

        let mut ctx2 = Context::with_registry(ctx_registry());
        ctx2.import_package("com.example");
        assert!(ctx2.for_name("Probe").is_some());

        fn ctx_registry() -> Arc<ClassRegistry> {
            let mut registry = ClassRegistry::new();
            registry.register(Arc::new(Probe));
            Arc::new(registry)
        }
    }
}
