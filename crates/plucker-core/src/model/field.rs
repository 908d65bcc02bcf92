use crate::{
    error::InternalError,
    model::condition::Condition,
    render::{ResolveError, Serializer},
    traits::Entity,
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// ComputeFn
///
/// Computed attribute block. Returning `None` means "no value here" and
/// resolution falls through to the plain attribute lookup.
///

pub type ComputeFn = Arc<dyn Fn(&dyn Entity) -> Option<Value> + Send + Sync>;

///
/// FieldDescriptor
///
/// One scalar output key: a passthrough attribute or a computed value,
/// with an optional inclusion condition.
///

#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    key: String,
    compute: Option<ComputeFn>,
    condition: Condition,
}

impl FieldDescriptor {
    /// Passthrough field whose output key equals `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();

        Self {
            key: name.clone(),
            name,
            compute: None,
            condition: Condition::Always,
        }
    }

    /// Rename the output key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Attach a compute block.
    #[must_use]
    pub fn compute<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn Entity) -> Option<Value> + Send + Sync + 'static,
    {
        self.compute = Some(Arc::new(f));
        self
    }

    /// Include the field only when `condition` holds.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = condition;
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
    pub const fn is_computed(&self) -> bool {
        self.compute.is_some()
    }

    #[must_use]
    pub const fn condition_ref(&self) -> &Condition {
        &self.condition
    }

    /// A bulk-extractable field is a bare, unconditioned column reference.
    /// Whether the column exists is the descriptor's call.
    pub(crate) const fn is_plain(&self) -> bool {
        self.compute.is_none() && self.condition.is_always()
    }

    pub(crate) fn should_include(
        &self,
        serializer: &Serializer<'_>,
    ) -> Result<bool, InternalError> {
        self.condition.evaluate(serializer)
    }

    /// Resolve the field value: compute block, then serializer method, then
    /// entity attribute.
    pub(crate) fn resolve(&self, serializer: &Serializer<'_>) -> Result<Value, InternalError> {
        let object = serializer.object();

        if let Some(compute) = &self.compute
            && let Some(value) = compute(object)
        {
            return Ok(value);
        }

        if let Some(result) = serializer.call(&self.name) {
            return result;
        }

        object.attribute(&self.name).ok_or_else(|| {
            ResolveError::Attribute {
                serializer: serializer.descriptor().name().to_string(),
                attribute: self.name.clone(),
                entity: object.type_path().to_string(),
            }
            .into()
        })
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("computed", &self.compute.is_some())
            .field("condition", &self.condition)
            .finish()
    }
}
