//! Fixtures shared by the integration suites: a `Foo` table and a
//! `FoosHolder` owning many `Foo`s.
#![allow(dead_code)]

use plucker::{
    core::memory::{MemoryModel, MemoryRelation, Record},
    prelude::*,
};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub fn foo_model() -> Arc<MemoryModel> {
    Arc::new(MemoryModel::new("Foo", "foos", ["id", "name", "address"]))
}

pub fn foos_holder_model() -> Arc<MemoryModel> {
    Arc::new(
        MemoryModel::new("FoosHolder", "foos_holders", ["id", "name"])
            .with_association("foos", "Foo"),
    )
}

pub fn models() -> ModelRegistry {
    let mut models = ModelRegistry::new();
    models.register(foo_model()).unwrap();
    models.register(foos_holder_model()).unwrap();

    models
}

pub fn foo(model: &Arc<MemoryModel>, id: i64, name: &str) -> Record {
    Record::new(model, id)
        .with("name", name)
        .with("address", format!("{id} Main St"))
        .with_version(format!("v{id}"))
}

pub fn foos(model: &Arc<MemoryModel>, names: &[&str]) -> Vec<Record> {
    (1_i64..)
        .zip(names)
        .map(|(id, name)| foo(model, id, name))
        .collect()
}

pub fn foo_relation(names: &[&str]) -> Arc<MemoryRelation> {
    let model = foo_model();

    Arc::new(MemoryRelation::new(&model, foos(&model, names)))
}

pub fn loaded(records: Vec<Record>) -> Vec<EntityRef> {
    records.into_iter().map(Record::into_ref).collect()
}

/// Pluckable: plain columns only.
pub fn foo_serializer(models: &ModelRegistry) -> DescriptorBuilder {
    Descriptor::define("FooSerializer", models).attributes(["id", "name"])
}

/// Same output as `FooSerializer`, but a method-backed field forces the
/// per-entity path. `calls` counts entity renders.
pub fn slow_foo_serializer(models: &ModelRegistry, calls: Arc<AtomicU64>) -> DescriptorBuilder {
    Descriptor::define("FooSerializer", models)
        .attributes(["id", "name"])
        .method("name", move |s| {
            calls.fetch_add(1, Ordering::SeqCst);
            s.attribute("name")
        })
}

pub fn registry(
    descriptors: impl IntoIterator<Item = DescriptorBuilder>,
) -> Arc<SerializerRegistry> {
    let mut registry = SerializerRegistry::new();
    for descriptor in descriptors {
        registry.register(descriptor.build().unwrap()).unwrap();
    }

    Arc::new(registry)
}

pub fn doc(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Document {
    pairs.into_iter().collect()
}

pub fn id_name(id: i64, name: &str) -> Document {
    doc([("id", Value::Int(id)), ("name", Value::from(name))])
}
