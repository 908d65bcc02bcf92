use crate::{
    error::InternalError,
    model::{condition::Condition, descriptor::Descriptor},
    registry::SerializerRegistry,
    render::{ResolveError, Serializer},
    traits::{Association, Entity},
};
use plucker_utils::case::serializer_name_for;
use std::{fmt, sync::Arc};

///
/// AssociationFn
///
/// Override block for an association. `None` falls through to the
/// entity's own association accessor.
///

pub type AssociationFn = Arc<dyn Fn(&dyn Entity) -> Option<Association> + Send + Sync>;

///
/// RelationKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
    HasMany,
}

impl RelationKind {
    #[must_use]
    pub const fn is_to_many(self) -> bool {
        matches!(self, Self::HasMany)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        if self.is_to_many() { "to-many" } else { "to-one" }
    }
}

///
/// RelationshipDescriptor
///
/// One nested output key pointing at a related entity or collection.
///

#[derive(Clone)]
pub struct RelationshipDescriptor {
    name: String,
    key: String,
    kind: RelationKind,
    resolve: Option<AssociationFn>,
    condition: Condition,
    serializer: Option<String>,
}

impl RelationshipDescriptor {
    #[must_use]
    pub fn new(kind: RelationKind, name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            key: name.clone(),
            name,
            kind,
            resolve: None,
            condition: Condition::Always,
            serializer: None,
        }
    }

    #[must_use]
    pub fn belongs_to(name: impl Into<String>) -> Self {
        Self::new(RelationKind::BelongsTo, name)
    }

    #[must_use]
    pub fn has_one(name: impl Into<String>) -> Self {
        Self::new(RelationKind::HasOne, name)
    }

    #[must_use]
    pub fn has_many(name: impl Into<String>) -> Self {
        Self::new(RelationKind::HasMany, name)
    }

    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Replace the association lookup with a block.
    #[must_use]
    pub fn resolve_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Entity) -> Option<Association> + Send + Sync + 'static,
    {
        self.resolve = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
        self
    }

    /// Render related entities with the named serializer instead of the
    /// convention-derived one.
    #[must_use]
    pub fn serializer(mut self, name: impl Into<String>) -> Self {
        self.serializer = Some(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn output_key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn kind(&self) -> RelationKind {
        self.kind
    }

    #[must_use]
    pub const fn condition_ref(&self) -> &Condition {
        &self.condition
    }

    #[must_use]
    pub fn serializer_name(&self) -> Option<&str> {
        self.serializer.as_deref()
    }

    pub(crate) fn should_include(
        &self,
        serializer: &Serializer<'_>,
    ) -> Result<bool, InternalError> {
        self.condition.evaluate(serializer)
    }

    /// Resolve the associated entity or collection: override block first,
    /// then the entity's association accessor.
    pub(crate) fn associated(
        &self,
        serializer: &Serializer<'_>,
    ) -> Result<Association, InternalError> {
        let object = serializer.object();

        if let Some(resolve) = &self.resolve
            && let Some(association) = resolve(object)
        {
            return Ok(association);
        }

        object.association(&self.name).ok_or_else(|| {
            ResolveError::Association {
                serializer: serializer.descriptor().name().to_string(),
                association: self.name.clone(),
                entity: object.type_path().to_string(),
            }
            .into()
        })
    }

    /// Pick the descriptor used for related entities.
    ///
    /// An explicit serializer wins. Otherwise the name is derived from the
    /// concrete related entity when one is at hand, else from the declared
    /// association target on the owner, else from `fallback_type`.
    pub(crate) fn nested_descriptor(
        &self,
        registry: &SerializerRegistry,
        serializer: &Serializer<'_>,
        related: Option<&dyn Entity>,
        fallback_type: Option<String>,
    ) -> Result<Arc<Descriptor>, InternalError> {
        let candidate = match (&self.serializer, related) {
            (Some(explicit), _) => Some(explicit.clone()),
            (None, Some(entity)) => Some(serializer_name_for(entity.type_path())),
            (None, None) => serializer
                .object()
                .association_target(&self.name)
                .or(fallback_type)
                .map(|target| serializer_name_for(&target)),
        };

        let found = candidate
            .as_deref()
            .and_then(|name| registry.get(name))
            .cloned();

        found.ok_or_else(|| {
            ResolveError::Serializer {
                serializer: serializer.descriptor().name().to_string(),
                relationship: self.name.clone(),
                candidate,
            }
            .into()
        })
    }
}

impl fmt::Debug for RelationshipDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipDescriptor")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("overridden", &self.resolve.is_some())
            .field("condition", &self.condition)
            .field("serializer", &self.serializer)
            .finish()
    }
}
