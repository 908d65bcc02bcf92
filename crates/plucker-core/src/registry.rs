use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::descriptor::Descriptor,
    traits::Model,
};
use plucker_utils::case::serializer_name_for;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// RegistryError
///

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("serializer '{0}' not found")]
    SerializerNotFound(String),

    #[error("serializer '{0}' already registered")]
    SerializerAlreadyRegistered(String),

    #[error("model '{0}' already registered")]
    ModelAlreadyRegistered(String),
}

impl RegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::SerializerNotFound(_) => ErrorClass::NotFound,
            Self::SerializerAlreadyRegistered(_) | Self::ModelAlreadyRegistered(_) => {
                ErrorClass::Conflict
            }
        }
    }
}

impl From<RegistryError> for InternalError {
    fn from(err: RegistryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Registry, err.to_string())
    }
}

///
/// ModelRegistry
///
/// Backing models by name, consulted when a serializer infers its model.
///

#[derive(Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<dyn Model>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: Arc<dyn Model>) -> Result<(), InternalError> {
        let name = model.name().to_string();
        if self.models.contains_key(&name) {
            return Err(RegistryError::ModelAlreadyRegistered(name).into());
        }
        self.models.insert(name, model);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Model>> {
        self.models.get(name).cloned()
    }
}

///
/// SerializerRegistry
///
/// Host-owned map from serializer name to its immutable descriptor.
/// Built once during setup and shared read-only by every session.
///

#[derive(Default)]
pub struct SerializerRegistry {
    descriptors: HashMap<String, Arc<Descriptor>>,
}

impl SerializerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a finished descriptor under its own name.
    pub fn register(&mut self, descriptor: Descriptor) -> Result<Arc<Descriptor>, InternalError> {
        let name = descriptor.name().to_string();
        if self.descriptors.contains_key(&name) {
            return Err(RegistryError::SerializerAlreadyRegistered(name).into());
        }

        let descriptor = Arc::new(descriptor);
        self.descriptors.insert(name, Arc::clone(&descriptor));

        Ok(descriptor)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Descriptor>> {
        self.descriptors.get(name)
    }

    pub fn try_get(&self, name: &str) -> Result<Arc<Descriptor>, InternalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RegistryError::SerializerNotFound(name.to_string()).into())
    }

    /// Convention lookup: `app::foo_holder` → `FooHolderSerializer`.
    #[must_use]
    pub fn for_type(&self, type_path: &str) -> Option<&Arc<Descriptor>> {
        self.get(&serializer_name_for(type_path))
    }

    /// Iterate registered serializer names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.keys().map(String::as_str)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{memory::MemoryModel, test_support::foo_model};

    #[test]
    fn duplicate_serializer_registration_conflicts() {
        let mut registry = SerializerRegistry::new();
        let build = || Descriptor::builder("FooSerializer").attribute("name").build();

        registry.register(build().unwrap()).unwrap();
        let err = registry.register(build().unwrap()).unwrap_err();

        assert_eq!(err.class, ErrorClass::Conflict);
        assert_eq!(err.origin, ErrorOrigin::Registry);
    }

    #[test]
    fn missing_serializer_is_not_found() {
        let registry = SerializerRegistry::new();
        let err = registry.try_get("NopeSerializer").unwrap_err();

        assert_eq!(err.class, ErrorClass::NotFound);
        assert!(err.message.contains("NopeSerializer"));
    }

    #[test]
    fn for_type_applies_naming_convention() {
        let mut registry = SerializerRegistry::new();
        registry
            .register(
                Descriptor::builder("FooHolderSerializer")
                    .attribute("name")
                    .build()
                    .unwrap(),
            )
            .unwrap();

        assert!(registry.for_type("app::models::foo_holder").is_some());
        assert!(registry.for_type("FooHolder").is_some());
        assert!(registry.for_type("Foo").is_none());
    }

    #[test]
    fn duplicate_model_registration_conflicts() {
        let mut models = ModelRegistry::new();
        models.register(foo_model()).unwrap();
        let err = models
            .register(Arc::new(MemoryModel::new("Foo", "foos", ["id"])))
            .unwrap_err();

        assert_eq!(err.class, ErrorClass::Conflict);
        assert!(models.get("Foo").is_some_and(|m| m.has_column("address")));
    }
}
