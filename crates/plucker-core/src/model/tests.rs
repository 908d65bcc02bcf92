use crate::{
    error::{ErrorClass, ErrorOrigin},
    model::{
        condition::Condition,
        descriptor::{Descriptor, DescriptorBuilder},
        field::FieldDescriptor,
        relationship::RelationshipDescriptor,
    },
    render::ResolveError,
    test_support::{foo_model, models},
    value::Value,
};
use proptest::prelude::*;

fn foo_builder() -> DescriptorBuilder {
    Descriptor::define("FooSerializer", &models())
}

///
/// Pluckability
///

#[test]
fn plain_columns_are_pluckable_in_declaration_order() {
    let descriptor = foo_builder()
        .attributes(["name", "id"])
        .field(FieldDescriptor::new("address").key("addr"))
        .build()
        .unwrap();

    assert!(descriptor.is_pluckable());
    assert_eq!(descriptor.pluck_columns(), ["name", "id", "address"]);
    assert_eq!(
        descriptor.pluck_plan(),
        [
            ("name".to_string(), 0),
            ("id".to_string(), 1),
            ("addr".to_string(), 2)
        ]
    );
}

#[test]
fn define_infers_the_backing_model_from_the_name() {
    let descriptor = foo_builder().build().unwrap();
    assert_eq!(descriptor.model().map(|m| m.table_name()), Some("foos"));

    let orphan = Descriptor::define("WidgetSerializer", &models()).build().unwrap();
    assert!(orphan.model().is_none());
}

#[test]
fn missing_model_disqualifies_plain_fields() {
    let descriptor = Descriptor::builder("WidgetSerializer")
        .attribute("id")
        .build()
        .unwrap();

    assert!(!descriptor.is_pluckable());
    assert!(descriptor.pluck_plan().is_empty());
}

#[test]
fn model_set_explicitly_enables_plucking() {
    let descriptor = Descriptor::builder("WidgetSerializer")
        .model(foo_model())
        .attribute("id")
        .build()
        .unwrap();

    assert!(descriptor.is_pluckable());
}

#[test]
fn unknown_column_disqualifies() {
    let descriptor = foo_builder().attributes(["id", "nickname"]).build().unwrap();

    assert!(!descriptor.is_pluckable());
    // columns gathered before the flip are kept, not pruned
    assert_eq!(descriptor.pluck_columns(), ["id"]);
}

#[test]
fn redeclared_key_drops_the_column_it_no_longer_reads() {
    let descriptor = foo_builder()
        .attribute("id")
        .field(FieldDescriptor::new("name").key("label"))
        .field(FieldDescriptor::new("address").key("label"))
        .build()
        .unwrap();

    assert!(descriptor.is_pluckable());
    assert_eq!(descriptor.pluck_columns(), ["id", "address"]);
    assert_eq!(
        descriptor.pluck_plan(),
        [("id".to_string(), 0), ("label".to_string(), 1)]
    );
}

#[test]
fn computed_field_disqualifies() {
    let descriptor = foo_builder()
        .attribute("id")
        .field(FieldDescriptor::new("name").compute(|_| Some(Value::from("x"))))
        .build()
        .unwrap();

    assert!(!descriptor.is_pluckable());
}

#[test]
fn conditional_field_disqualifies() {
    let descriptor = foo_builder()
        .field(FieldDescriptor::new("name").condition(Condition::closure(|_| true)))
        .build()
        .unwrap();

    assert!(!descriptor.is_pluckable());
}

#[test]
fn method_shadowing_a_field_disqualifies_in_either_order() {
    let before = foo_builder()
        .method("name", |_| Ok(Value::from("x")))
        .attribute("name")
        .build()
        .unwrap();
    let after = foo_builder()
        .attribute("name")
        .method("name", |_| Ok(Value::from("x")))
        .build()
        .unwrap();

    assert!(!before.is_pluckable());
    assert!(!after.is_pluckable());
}

#[test]
fn unrelated_method_keeps_type_pluckable() {
    let descriptor = foo_builder()
        .attribute("id")
        .method("display_name", |_| Ok(Value::from("x")))
        .build()
        .unwrap();

    assert!(descriptor.is_pluckable());
}

///
/// Declaration
///

#[test]
fn redeclaring_an_output_key_replaces_in_place() {
    let descriptor = foo_builder()
        .attributes(["id", "name"])
        .field(FieldDescriptor::new("address").key("id"))
        .build()
        .unwrap();

    let fields: Vec<_> = descriptor
        .fields()
        .iter()
        .map(|f| (f.output_key(), f.name()))
        .collect();
    assert_eq!(fields, [("id", "address"), ("name", "name")]);
}

#[test]
fn relationship_options_are_recorded() {
    let descriptor = foo_builder()
        .relationship(
            RelationshipDescriptor::has_many("foos")
                .key("children")
                .serializer("BarSerializer"),
        )
        .build()
        .unwrap();

    let relationship = &descriptor.relationships()[0];
    assert_eq!(relationship.output_key(), "children");
    assert_eq!(relationship.serializer_name(), Some("BarSerializer"));
    assert!(relationship.kind().is_to_many());
}

#[test]
fn undefined_condition_method_fails_the_build() {
    let err = foo_builder()
        .field(FieldDescriptor::new("name").condition(Condition::method("admin?").unless()))
        .build()
        .unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Render);
    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert!(matches!(
        err.resolve_error(),
        Some(ResolveError::ConditionType { condition, .. }) if condition == "admin?"
    ));
}

#[test]
fn declared_predicate_satisfies_the_build() {
    let descriptor = foo_builder()
        .predicate("admin?", |_| false)
        .field(FieldDescriptor::new("name").condition(Condition::method("admin?")))
        .build();

    assert!(descriptor.is_ok());
}

#[test]
fn fingerprint_depends_only_on_the_name() {
    let a = foo_builder().attribute("id").build().unwrap();
    let b = foo_builder().attribute("name").build().unwrap();
    let c = Descriptor::builder("BarSerializer").build().unwrap();

    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_ne!(a.fingerprint(), c.fingerprint());
    assert_eq!(a.fingerprint().len(), 64);
}

///
/// Properties
///

#[derive(Clone, Debug)]
enum Decl {
    Column(&'static str),
    BelongsTo,
    HasOne,
    HasMany,
}

fn arb_decl() -> impl Strategy<Value = Decl> {
    prop_oneof![
        Just(Decl::Column("id")),
        Just(Decl::Column("name")),
        Just(Decl::Column("address")),
        Just(Decl::BelongsTo),
        Just(Decl::HasOne),
        Just(Decl::HasMany),
    ]
}

fn declare(decls: &[Decl]) -> Descriptor {
    decls
        .iter()
        .enumerate()
        .fold(foo_builder(), |builder, (i, decl)| match decl {
            Decl::Column(column) => builder.attribute(*column),
            Decl::BelongsTo => builder.belongs_to(format!("owner_{i}")),
            Decl::HasOne => builder.has_one(format!("child_{i}")),
            Decl::HasMany => builder.has_many(format!("children_{i}")),
        })
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn any_relationship_disqualifies(decls in prop::collection::vec(arb_decl(), 0..12)) {
        let has_relationship = decls.iter().any(|d| !matches!(d, Decl::Column(_)));

        prop_assert_eq!(declare(&decls).is_pluckable(), !has_relationship);
    }

    #[test]
    fn pluck_plan_covers_every_field_when_pluckable(
        columns in prop::collection::vec(
            prop_oneof![Just("id"), Just("name"), Just("address")],
            1..8,
        ),
    ) {
        let decls: Vec<_> = columns.iter().copied().map(Decl::Column).collect();
        let descriptor = declare(&decls);

        prop_assert!(descriptor.is_pluckable());
        prop_assert_eq!(descriptor.pluck_plan().len(), descriptor.fields().len());
        for (key, index) in descriptor.pluck_plan() {
            prop_assert_eq!(&descriptor.pluck_columns()[*index], key);
        }
    }
}
