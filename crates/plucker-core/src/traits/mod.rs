//! Collaborator contracts.
//!
//! The engine never talks to a database directly. A host plugs its storage
//! layer in by implementing [`Entity`] for loaded objects, [`Model`] for
//! backing types, and [`Relation`] for queryable collections that support
//! column-restricted row retrieval.

use crate::{error::InternalError, value::Value};
use std::{fmt, sync::Arc};

///
/// EntityRef
///

pub type EntityRef = Arc<dyn Entity>;

///
/// Entity
///
/// One loaded object exposing named attributes and associations.
///

pub trait Entity {
    /// Concrete type path, used to name a nested serializer by convention.
    fn type_path(&self) -> &str;

    /// Read a named attribute; `None` means the entity does not expose it.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Read a named association; `None` means no such association exists.
    fn association(&self, name: &str) -> Option<Association>;

    /// Declared target type of an association, when known without loading it.
    fn association_target(&self, _name: &str) -> Option<String> {
        None
    }

    /// Stable identity used as the entity's cache key prefix.
    fn cache_key(&self) -> String;

    /// Token that changes whenever the persisted state changes.
    fn cache_version(&self) -> Option<String> {
        None
    }

    /// Present-but-empty object: renders as `null` through a to-one
    /// relationship and is compacted out of collections.
    fn is_blank(&self) -> bool {
        false
    }
}

///
/// Model
///
/// Backing type of a serializer: a table with named columns.
///

pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    fn table_name(&self) -> &str;

    fn column_names(&self) -> &[String];

    fn has_column(&self, column: &str) -> bool {
        self.column_names().iter().any(|c| c == column)
    }
}

///
/// Relation
///
/// Ordered, queryable collection of same-typed rows.
///

pub trait Relation {
    /// Backing model of every row in the relation.
    fn model(&self) -> &dyn Model;

    /// Fetch only the given `table.column` names, one value per column per
    /// row, in relation order.
    fn pluck(&self, columns: &[String]) -> Result<Vec<Vec<Value>>, InternalError>;

    /// Load full entities in relation order.
    fn records(&self) -> Result<Box<dyn Iterator<Item = EntityRef> + '_>, InternalError>;

    /// Stable identity of the collection (query shape).
    fn cache_key(&self) -> String;

    /// Token that changes whenever any row in the collection changes.
    fn cache_version(&self) -> Option<String>;
}

///
/// Association
///

#[derive(Clone)]
pub enum Association {
    One(Option<EntityRef>),
    Many(Records),
}

impl Association {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::One(_) => "to-one",
            Self::Many(_) => "to-many",
        }
    }
}

impl fmt::Debug for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One(Some(entity)) => write!(f, "One({})", entity.cache_key()),
            Self::One(None) => write!(f, "One(None)"),
            Self::Many(records) => write!(f, "Many({records:?})"),
        }
    }
}

///
/// Records
///
/// Input of a collection render: either already-loaded entities or a
/// relation that still supports bulk extraction.
///

#[derive(Clone)]
pub enum Records {
    Loaded(Vec<EntityRef>),
    Relation(Arc<dyn Relation>),
}

impl Records {
    /// Type name used to infer the collection serializer.
    #[must_use]
    pub fn type_name(&self) -> Option<String> {
        match self {
            Self::Loaded(entities) => entities.first().map(|e| e.type_path().to_string()),
            Self::Relation(relation) => Some(relation.model().name().to_string()),
        }
    }
}

impl fmt::Debug for Records {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded(entities) => write!(f, "Loaded(len={})", entities.len()),
            Self::Relation(relation) => write!(f, "Relation({})", relation.cache_key()),
        }
    }
}

impl From<Vec<EntityRef>> for Records {
    fn from(entities: Vec<EntityRef>) -> Self {
        Self::Loaded(entities)
    }
}

impl From<Arc<dyn Relation>> for Records {
    fn from(relation: Arc<dyn Relation>) -> Self {
        Self::Relation(relation)
    }
}
