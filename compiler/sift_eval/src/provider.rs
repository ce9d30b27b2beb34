//! Identifier and object-type resolution.
//!
//! The evaluator asks a [`TypeProvider`] for package-level identifiers no
//! activation binds (enum constants, named values) and for the object types
//! built by `CreateObject`.

use rustc_hash::FxHashMap;

use sift_value::{no_such_field, unknown_type, ObjectValue, Value};

/// Resolves qualified names to identifiers and object types.
pub trait TypeProvider: Send + Sync {
    /// Value of the package-level identifier `name`.
    fn find_ident(&self, name: &str) -> Option<Value>;

    /// Descriptor of the object type `name`.
    fn find_type(&self, name: &str) -> Option<&TypeDescriptor>;

    /// Build an instance of `type_name`. Failures are returned as error values.
    fn new_value(&self, type_name: &str, fields: FxHashMap<String, Value>) -> Value;
}

/// Shape of an object type: its qualified name and declared fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    fields: Vec<String>,
}

impl TypeDescriptor {
    pub fn new<F: Into<String>>(name: impl Into<String>, fields: impl IntoIterator<Item = F>) -> Self {
        TypeDescriptor {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared field names, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|declared| declared == field)
    }
}

/// Error registering a type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("type '{name}' is already registered with a different definition")]
    ConflictingType { name: String },
}

/// In-memory [`TypeProvider`].
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: FxHashMap<String, TypeDescriptor>,
    idents: FxHashMap<String, Value>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry::default()
    }

    /// Register an object type. Registering the same definition twice is a no-op.
    pub fn register_type(&mut self, descriptor: TypeDescriptor) -> Result<(), RegistryError> {
        match self.types.get(descriptor.name()) {
            Some(existing) if *existing != descriptor => Err(RegistryError::ConflictingType {
                name: descriptor.name,
            }),
            Some(_) => Ok(()),
            None => {
                self.types.insert(descriptor.name.clone(), descriptor);
                Ok(())
            }
        }
    }

    /// Register a package-level identifier, replacing any previous value.
    pub fn register_ident(&mut self, name: impl Into<String>, value: Value) {
        self.idents.insert(name.into(), value);
    }

    /// Builder-style [`register_ident`](Self::register_ident).
    #[must_use]
    pub fn with_ident(mut self, name: impl Into<String>, value: Value) -> Self {
        self.register_ident(name, value);
        self
    }
}

impl TypeProvider for TypeRegistry {
    fn find_ident(&self, name: &str) -> Option<Value> {
        self.idents.get(name).cloned()
    }

    fn find_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    fn new_value(&self, type_name: &str, fields: FxHashMap<String, Value>) -> Value {
        let Some(descriptor) = self.types.get(type_name) else {
            return Value::error(unknown_type(type_name));
        };
        // Report the first undeclared field in name order so the error is stable.
        let mut undeclared: Vec<&str> = fields
            .keys()
            .map(String::as_str)
            .filter(|field| !descriptor.has_field(field))
            .collect();
        undeclared.sort_unstable();
        if let Some(field) = undeclared.first() {
            return Value::error(no_such_field(type_name, field));
        }
        Value::object(ObjectValue::new(type_name, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_value::EvalErrorKind;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new().with_ident("acme.Status.ACTIVE", Value::Int(1));
        registry
            .register_type(TypeDescriptor::new("acme.Account", ["id", "owner"]))
            .unwrap_or_else(|e| panic!("{e}"));
        registry
    }

    #[test]
    fn test_find_ident_and_type() {
        let registry = registry();
        assert_eq!(registry.find_ident("acme.Status.ACTIVE"), Some(Value::Int(1)));
        assert_eq!(registry.find_ident("Status.ACTIVE"), None);
        let descriptor = registry
            .find_type("acme.Account")
            .unwrap_or_else(|| panic!("registered"));
        assert_eq!(descriptor.fields(), ["id".to_string(), "owner".to_string()]);
        assert!(registry.find_type("Account").is_none());
    }

    #[test]
    fn test_new_value_builds_object() {
        let registry = registry();
        let mut fields = FxHashMap::default();
        fields.insert("id".to_string(), Value::Int(7));
        let value = registry.new_value("acme.Account", fields);

        let object = value.as_object().unwrap_or_else(|| panic!("object, got {value}"));
        assert_eq!(object.type_name(), "acme.Account");
        assert_eq!(object.field("id"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_new_value_rejects_unknown_type_and_field() {
        let registry = registry();
        let value = registry.new_value("acme.Missing", FxHashMap::default());
        assert_eq!(
            value.as_error().map(|e| e.kind().clone()),
            Some(EvalErrorKind::UnknownType {
                name: "acme.Missing".to_string()
            })
        );

        let mut fields = FxHashMap::default();
        fields.insert("zeta".to_string(), Value::Null);
        fields.insert("beta".to_string(), Value::Null);
        let value = registry.new_value("acme.Account", fields);
        assert_eq!(
            value.as_error().map(|e| e.kind().clone()),
            Some(EvalErrorKind::NoSuchField {
                type_name: "acme.Account".to_string(),
                field: "beta".to_string(),
            })
        );
    }

    #[test]
    fn test_register_type_conflict() {
        let mut registry = registry();
        assert_eq!(
            registry.register_type(TypeDescriptor::new("acme.Account", ["id", "owner"])),
            Ok(())
        );
        assert_eq!(
            registry.register_type(TypeDescriptor::new("acme.Account", ["id"])),
            Err(RegistryError::ConflictingType {
                name: "acme.Account".to_string()
            })
        );
    }
}
