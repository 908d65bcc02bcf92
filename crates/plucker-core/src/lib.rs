//! Core runtime for plucker: serializer descriptors, the entity and
//! collection renderers, the read-through cache coordinator, and the
//! collaborator traits a host implements to plug in its storage layer.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
pub mod memory;
pub mod model;
pub mod obs;
pub mod registry;
pub mod render;
pub mod serialize;
pub mod session;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains the declaration and rendering vocabulary.
/// Stores, sinks and in-memory collaborators stay in their modules.
///

pub mod prelude {
    pub use crate::{
        cache::{CacheMode, CacheOptions, Format},
        error::InternalError,
        model::{
            condition::Condition,
            descriptor::{Descriptor, DescriptorBuilder},
            field::FieldDescriptor,
            relationship::{RelationKind, RelationshipDescriptor},
        },
        registry::{ModelRegistry, SerializerRegistry},
        render::Serializer,
        session::Session,
        traits::{Association, Entity, EntityRef, Model, Records, Relation},
        value::{Document, Value},
    };
}
