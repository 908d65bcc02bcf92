//! Entity and collection rendering.
//!
//! A [`Serializer`] is the per-entity render context handed to methods,
//! predicates and compute blocks. Collections go through [`Collection`],
//! which picks between bulk extraction and per-entity rendering.

mod collection;


use crate::{
    error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError},
    model::{descriptor::Descriptor, relationship::RelationshipDescriptor},
    obs::sink::RenderEvent,
    session::Session,
    traits::{Association, Entity, Records},
    value::{Document, Value},
};
use thiserror::Error as ThisError;

// re-exports
pub use collection::Collection;

///
/// ResolveError
///
/// Failure to resolve a declared field, relationship, nested serializer or
/// condition against a concrete entity.
///

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error("{serializer}: neither the serializer nor {entity} exposes attribute '{attribute}'")]
    Attribute {
        serializer: String,
        attribute: String,
        entity: String,
    },

    #[error("{serializer}: {entity} has no association '{association}'")]
    Association {
        serializer: String,
        association: String,
        entity: String,
    },

    #[error(
        "{serializer}: relationship '{relationship}' expected a {expected} association, found {found}"
    )]
    AssociationKind {
        serializer: String,
        relationship: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error(
        "{serializer}: no serializer for relationship '{relationship}' (tried {})",
        .candidate.as_deref().unwrap_or("nothing")
    )]
    Serializer {
        serializer: String,
        relationship: String,
        candidate: Option<String>,
    },

    #[error("{serializer}: condition '{condition}' must be a boolean predicate, found {found}")]
    ConditionType {
        serializer: String,
        condition: String,
        found: String,
    },
}

impl ResolveError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Attribute { .. } | Self::Association { .. } | Self::Serializer { .. } => {
                ErrorClass::NotFound
            }
            Self::AssociationKind { .. } | Self::ConditionType { .. } => {
                ErrorClass::InvariantViolation
            }
        }
    }
}

impl From<ResolveError> for InternalError {
    fn from(err: ResolveError) -> Self {
        Self {
            class: err.class(),
            origin: ErrorOrigin::Render,
            message: err.to_string(),
            detail: Some(ErrorDetail::Resolve(err)),
        }
    }
}

///
/// Serializer
///
/// Render context for one entity under one descriptor.
///

pub struct Serializer<'a> {
    session: &'a Session,
    descriptor: &'a Descriptor,
    object: &'a dyn Entity,
}

impl<'a> Serializer<'a> {
    pub(crate) const fn new(
        session: &'a Session,
        descriptor: &'a Descriptor,
        object: &'a dyn Entity,
    ) -> Self {
        Self {
            session,
            descriptor,
            object,
        }
    }

    /// The entity being rendered.
    #[must_use]
    pub const fn object(&self) -> &'a dyn Entity {
        self.object
    }

    #[must_use]
    pub const fn descriptor(&self) -> &'a Descriptor {
        self.descriptor
    }

    /// Invoke a serializer method; `None` when no such method is declared.
    #[must_use]
    pub fn call(&self, name: &str) -> Option<Result<Value, InternalError>> {
        self.descriptor.method(name).map(|method| method(self))
    }

    #[must_use]
    pub fn responds_to(&self, name: &str) -> bool {
        self.descriptor.method(name).is_some()
    }

    /// Read an entity attribute, failing like an undeclared field would.
    pub fn attribute(&self, name: &str) -> Result<Value, InternalError> {
        self.object.attribute(name).ok_or_else(|| {
            ResolveError::Attribute {
                serializer: self.descriptor.name().to_string(),
                attribute: name.to_string(),
                entity: self.object.type_path().to_string(),
            }
            .into()
        })
    }

    /// Build the output document: included fields in declaration order,
    /// then included relationships. A relationship sharing a field's output
    /// key replaces that field's value in place.
    pub(crate) fn compute(&self) -> Result<Document, InternalError> {
        let descriptor = self.descriptor;
        self.session.metrics().record(RenderEvent::Entity {
            serializer: descriptor.name(),
        });

        let mut doc =
            Document::with_capacity(descriptor.fields().len() + descriptor.relationships().len());

        for field in descriptor.fields() {
            if field.should_include(self)? {
                doc.insert(field.output_key(), field.resolve(self)?);
            }
        }

        for relationship in descriptor.relationships() {
            if relationship.should_include(self)? {
                let value = self.relationship_value(relationship)?;
                doc.insert(relationship.output_key(), value);
            }
        }

        Ok(doc)
    }

    fn relationship_value(
        &self,
        relationship: &RelationshipDescriptor,
    ) -> Result<Value, InternalError> {
        let registry = self.session.registry();
        let kind = relationship.kind();

        match (kind.is_to_many(), relationship.associated(self)?) {
            (false, Association::One(related)) => {
                let Some(related) = related.filter(|entity| !entity.is_blank()) else {
                    return Ok(Value::Null);
                };

                let descriptor =
                    relationship.nested_descriptor(registry, self, Some(&*related), None)?;
                let doc = self.session.render_entity(&descriptor, &*related, true)?;

                Ok(Value::Document(doc))
            }

            (true, Association::Many(records)) => {
                if matches!(&records, Records::Loaded(entities) if entities.is_empty()) {
                    return Ok(Value::List(Vec::new()));
                }

                let descriptor =
                    relationship.nested_descriptor(registry, self, None, records.type_name())?;
                let docs = Collection::with_descriptor(self.session, records, descriptor)
                    .to_documents()?;

                Ok(Value::documents(docs))
            }

            (_, association) => Err(ResolveError::AssociationKind {
                serializer: self.descriptor.name().to_string(),
                relationship: relationship.name().to_string(),
                expected: kind.label(),
                found: association.label(),
            }
            .into()),
        }
    }
}
