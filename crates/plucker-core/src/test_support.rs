//! Shared fixtures: a `Foo` table plus holder types owning one or many
//! `Foo`s, built on the in-memory collaborators.

use crate::{
    memory::{MemoryModel, MemoryRelation, Record},
    registry::{ModelRegistry, SerializerRegistry},
    session::Session,
};
use std::sync::Arc;

pub(crate) fn foo_model() -> Arc<MemoryModel> {
    Arc::new(MemoryModel::new("Foo", "foos", ["id", "name", "address"]))
}

pub(crate) fn foo_holder_model() -> Arc<MemoryModel> {
    Arc::new(
        MemoryModel::new("FooHolder", "foo_holders", ["id", "name", "foo_id"])
            .with_association("foo", "Foo"),
    )
}

pub(crate) fn foos_holder_model() -> Arc<MemoryModel> {
    Arc::new(
        MemoryModel::new("FoosHolder", "foos_holders", ["id", "name"])
            .with_association("foos", "Foo"),
    )
}

pub(crate) fn models() -> ModelRegistry {
    let mut models = ModelRegistry::new();
    for model in [foo_model(), foo_holder_model(), foos_holder_model()] {
        models.register(model).unwrap();
    }

    models
}

pub(crate) fn foo(model: &Arc<MemoryModel>, id: i64, name: &str) -> Record {
    Record::new(model, id)
        .with("name", name)
        .with("address", format!("{id} Main St"))
        .with_version(format!("v{id}"))
}

pub(crate) fn foo_relation(names: &[&str]) -> MemoryRelation {
    let model = foo_model();
    let rows: Vec<_> = (1_i64..)
        .zip(names)
        .map(|(id, name)| foo(&model, id, name))
        .collect();

    MemoryRelation::new(&model, rows)
}

pub(crate) fn session(registry: SerializerRegistry) -> Session {
    Session::new(Arc::new(registry))
}
