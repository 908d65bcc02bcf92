use crate::{
    cache::CacheOptions,
    error::InternalError,
    hash::fingerprint,
    model::{
        condition::Condition,
        field::FieldDescriptor,
        relationship::RelationshipDescriptor,
    },
    registry::ModelRegistry,
    render::{ResolveError, Serializer},
    traits::Model,
    value::Value,
};
use plucker_utils::case::model_name_for;
use std::{collections::HashMap, fmt, sync::Arc};

///
/// MethodFn
///
/// Serializer-level method. Fields resolve through a method of the same
/// name before falling back to the entity attribute.
///

pub type MethodFn = Arc<dyn Fn(&Serializer<'_>) -> Result<Value, InternalError> + Send + Sync>;

///
/// Descriptor
///
/// Immutable definition of one serializer type: ordered fields and
/// relationships, serializer methods, the bulk-extraction verdict, and the
/// memoized cache fingerprint.
///

pub struct Descriptor {
    name: String,
    fingerprint: String,
    model: Option<Arc<dyn Model>>,
    fields: Vec<FieldDescriptor>,
    relationships: Vec<RelationshipDescriptor>,
    methods: HashMap<String, MethodFn>,
    pluckable: bool,
    pluck_columns: Vec<String>,
    pluck_plan: Vec<(String, usize)>,
    cache: Option<CacheOptions>,
}

impl Descriptor {
    /// Start a serializer declaration with no backing model.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(name.into(), None)
    }

    /// Start a serializer declaration whose backing model is inferred from
    /// the serializer name (`FooSerializer` → `Foo`).
    ///
    /// An unresolvable model is tolerated; the type just never plucks.
    #[must_use]
    pub fn define(name: impl Into<String>, models: &ModelRegistry) -> DescriptorBuilder {
        let name = name.into();
        let model = model_name_for(&name).and_then(|model| models.get(model));
        if model.is_none() {
            log::debug!("serializer {name}: no backing model inferred");
        }

        DescriptorBuilder::new(name, model)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hex digest of the serializer name, part of every cache key.
    #[must_use]
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    #[must_use]
    pub fn model(&self) -> Option<&Arc<dyn Model>> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    #[must_use]
    pub const fn is_pluckable(&self) -> bool {
        self.pluckable
    }

    /// Columns accumulated while the type was still pluckable.
    ///
    /// Only meaningful when [`Self::is_pluckable`] is true. A pluckable
    /// descriptor keeps exactly the columns its final fields read; the list
    /// is not pruned if a later registration disqualified the type.
    #[must_use]
    pub fn pluck_columns(&self) -> &[String] {
        &self.pluck_columns
    }

    /// Output key → index into [`Self::pluck_columns`], in field order.
    #[must_use]
    pub fn pluck_plan(&self) -> &[(String, usize)] {
        &self.pluck_plan
    }

    #[must_use]
    pub const fn cache_options(&self) -> Option<&CacheOptions> {
        self.cache.as_ref()
    }

    #[must_use]
    pub const fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) fn method(&self, name: &str) -> Option<&MethodFn> {
        self.methods.get(name)
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<_> = self.methods.keys().collect();
        methods.sort();

        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("model", &self.model.as_ref().map(|m| m.name().to_string()))
            .field("fields", &self.fields)
            .field("relationships", &self.relationships)
            .field("methods", &methods)
            .field("pluckable", &self.pluckable)
            .field("pluck_columns", &self.pluck_columns)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

///
/// DescriptorBuilder
///
/// Declaration phase of a serializer type.
///
/// Pluckability is decided eagerly as each field or relationship is
/// registered and only ever moves from true to false, so set the backing
/// model before declaring fields.
///

pub struct DescriptorBuilder {
    name: String,
    model: Option<Arc<dyn Model>>,
    fields: Vec<FieldDescriptor>,
    relationships: Vec<RelationshipDescriptor>,
    methods: HashMap<String, MethodFn>,
    pluckable: bool,
    pluck_columns: Vec<String>,
    cache: Option<CacheOptions>,
}

impl DescriptorBuilder {
    fn new(name: String, model: Option<Arc<dyn Model>>) -> Self {
        Self {
            name,
            model,
            fields: Vec::new(),
            relationships: Vec::new(),
            methods: HashMap::new(),
            pluckable: true,
            pluck_columns: Vec::new(),
            cache: None,
        }
    }

    /// Override the backing model for subsequent registrations.
    #[must_use]
    pub fn model(mut self, model: Arc<dyn Model>) -> Self {
        self.model = Some(model);
        self
    }

    #[must_use]
    pub fn attribute(self, name: impl Into<String>) -> Self {
        self.field(FieldDescriptor::new(name))
    }

    #[must_use]
    pub fn attributes<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(self, |builder, name| builder.attribute(name))
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.register_field(field);
        self
    }

    #[must_use]
    pub fn belongs_to(self, name: impl Into<String>) -> Self {
        self.relationship(RelationshipDescriptor::belongs_to(name))
    }

    #[must_use]
    pub fn has_one(self, name: impl Into<String>) -> Self {
        self.relationship(RelationshipDescriptor::has_one(name))
    }

    #[must_use]
    pub fn has_many(self, name: impl Into<String>) -> Self {
        self.relationship(RelationshipDescriptor::has_many(name))
    }

    #[must_use]
    pub fn relationship(mut self, relationship: RelationshipDescriptor) -> Self {
        self.disqualify("relationship declared");
        upsert(&mut self.relationships, relationship, |r| r.output_key());
        self
    }

    /// Declare a serializer method.
    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Serializer<'_>) -> Result<Value, InternalError> + Send + Sync + 'static,
    {
        let name = name.into();

        // a method shadows the column of any plain field with the same name
        if self.fields.iter().any(|field| field.name() == name) {
            self.disqualify("method shadows a field");
        }
        self.methods.insert(name, Arc::new(f));
        self
    }

    /// Declare a named boolean method for use in [`Condition::Method`].
    #[must_use]
    pub fn predicate<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Serializer<'_>) -> bool + Send + Sync + 'static,
    {
        self.method(name, move |s| Ok(Value::Bool(f(s))))
    }

    /// Opt this serializer into read-through caching.
    #[must_use]
    pub fn cache(mut self, options: CacheOptions) -> Self {
        self.cache = Some(options);
        self
    }

    /// Finish the declaration.
    pub fn build(mut self) -> Result<Descriptor, InternalError> {
        self.validate_conditions()?;

        let pluck_plan = if self.pluckable {
            self.prune_pluck_columns();
            self.pluck_plan()?
        } else {
            Vec::new()
        };

        Ok(Descriptor {
            fingerprint: fingerprint(&self.name),
            name: self.name,
            model: self.model,
            fields: self.fields,
            relationships: self.relationships,
            methods: self.methods,
            pluckable: self.pluckable,
            pluck_columns: self.pluck_columns,
            pluck_plan,
            cache: self.cache,
        })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn register_field(&mut self, field: FieldDescriptor) {
        let column = field.name();
        let pluckable = field.is_plain()
            && !self.methods.contains_key(column)
            && self.model.as_ref().is_some_and(|m| m.has_column(column));

        if pluckable {
            if !self.pluck_columns.iter().any(|c| c == column) {
                self.pluck_columns.push(column.to_string());
            }
        } else {
            self.disqualify("field is not a plain column");
        }

        upsert(&mut self.fields, field, |f| f.output_key());
    }

    fn disqualify(&mut self, reason: &str) {
        if self.pluckable {
            log::debug!("serializer {}: not pluckable ({reason})", self.name);
        }
        self.pluckable = false;
    }

    // A redeclared output key can leave a column no remaining field reads.
    fn prune_pluck_columns(&mut self) {
        let fields = &self.fields;
        self.pluck_columns
            .retain(|column| fields.iter().any(|field| field.name() == column));
    }

    fn pluck_plan(&self) -> Result<Vec<(String, usize)>, InternalError> {
        self.fields
            .iter()
            .map(|field| {
                let index = self
                    .pluck_columns
                    .iter()
                    .position(|c| c == field.name())
                    .ok_or_else(|| {
                        InternalError::descriptor_invariant(format!(
                            "serializer {}: pluckable field '{}' has no column",
                            self.name,
                            field.name()
                        ))
                    })?;

                Ok((field.output_key().to_string(), index))
            })
            .collect()
    }

    fn validate_conditions(&self) -> Result<(), InternalError> {
        let conditions = self
            .fields
            .iter()
            .map(FieldDescriptor::condition_ref)
            .chain(
                self.relationships
                    .iter()
                    .map(RelationshipDescriptor::condition_ref),
            );

        for condition in conditions {
            for method in Condition::method_names(condition) {
                if !self.methods.contains_key(method) {
                    return Err(ResolveError::ConditionType {
                        serializer: self.name.clone(),
                        condition: method.to_string(),
                        found: "undefined method".to_string(),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

// Replace an entry with the same key in place, or append.
fn upsert<T>(entries: &mut Vec<T>, entry: T, key: impl Fn(&T) -> &str) {
    match entries.iter().position(|e| key(e) == key(&entry)) {
        Some(index) => entries[index] = entry,
        None => entries.push(entry),
    }
}
