use crate::{
    cache::{CacheMode, CachedValue, Format, cache_key},
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::descriptor::Descriptor,
    obs::sink::RenderEvent,
    registry::RegistryError,
    session::Session,
    traits::{Records, Relation},
    value::{Document, Value},
};
use plucker_utils::case::serializer_name_for;
use std::sync::Arc;

///
/// Collection
///
/// Fluent render of an ordered, same-typed collection.
///
/// Relations with a pluckable serializer are bulk-extracted in one column
/// request; everything else renders entity by entity. Output order always
/// matches input order.
///

pub struct Collection<'a> {
    session: &'a Session,
    records: Records,
    serializer: Option<String>,
    descriptor: Option<Arc<Descriptor>>,
    mode: CacheMode,
}

impl<'a> Collection<'a> {
    pub(crate) const fn new(session: &'a Session, records: Records) -> Self {
        Self {
            session,
            records,
            serializer: None,
            descriptor: None,
            mode: CacheMode::Collection,
        }
    }

    pub(crate) const fn with_descriptor(
        session: &'a Session,
        records: Records,
        descriptor: Arc<Descriptor>,
    ) -> Self {
        Self {
            session,
            records,
            serializer: None,
            descriptor: Some(descriptor),
            mode: CacheMode::Collection,
        }
    }

    /// Render with the named serializer instead of the convention-derived one.
    #[must_use]
    pub fn serializer(mut self, name: impl Into<String>) -> Self {
        self.serializer = Some(name.into());
        self.descriptor = None;
        self
    }

    /// Select the cache mode used when the serializer has caching enabled.
    #[must_use]
    pub const fn cache(mut self, mode: CacheMode) -> Self {
        self.mode = mode;
        self
    }

    /// Render to documents.
    pub fn to_documents(&self) -> Result<Vec<Document>, InternalError> {
        let Some(descriptor) = self.resolve_descriptor()? else {
            return Ok(Vec::new());
        };

        let relation = match &self.records {
            Records::Loaded(entities) => {
                return entities
                    .iter()
                    .filter(|entity| !entity.is_blank())
                    .map(|entity| self.session.render_entity(&descriptor, &**entity, true))
                    .collect();
            }
            Records::Relation(relation) => relation,
        };

        if !descriptor.cache_enabled() {
            return self.relation_documents(&descriptor, &**relation, false);
        }

        match self.mode {
            CacheMode::Collection => {
                let key = cache_key(&relation.cache_key(), &descriptor, Format::Hash);
                let version = relation.cache_version();

                self.session
                    .coordinator()
                    .fetch(&descriptor, Format::Hash, &key, version.as_deref(), || {
                        self.relation_documents(&descriptor, &**relation, false)
                            .map(CachedValue::Documents)
                    })?
                    .into_documents()
            }
            CacheMode::Multi => self.relation_documents(&descriptor, &**relation, true),
        }
    }

    /// Render to encoded text.
    pub fn to_json(&self) -> Result<String, InternalError> {
        let Some(descriptor) = self.resolve_descriptor()? else {
            return self.session.encode(&Value::List(Vec::new()));
        };

        let relation = match &self.records {
            Records::Loaded(_) => {
                let docs = self.to_documents()?;
                return self.session.encode(&Value::documents(docs));
            }
            Records::Relation(relation) => relation,
        };

        if !descriptor.cache_enabled() {
            let docs = self.relation_documents(&descriptor, &**relation, false)?;
            return self.session.encode(&Value::documents(docs));
        }

        match self.mode {
            CacheMode::Collection => {
                let key = cache_key(&relation.cache_key(), &descriptor, Format::Json);
                let version = relation.cache_version();

                self.session
                    .coordinator()
                    .fetch(&descriptor, Format::Json, &key, version.as_deref(), || {
                        let docs = self.relation_documents(&descriptor, &**relation, false)?;
                        self.session
                            .encode(&Value::documents(docs))
                            .map(CachedValue::Encoded)
                    })?
                    .into_encoded()
            }
            CacheMode::Multi if descriptor.is_pluckable() => {
                let docs = pluck_documents(self.session, &descriptor, &**relation)?;
                self.session.encode(&Value::documents(docs))
            }
            CacheMode::Multi => {
                let mut items = Vec::new();
                for entity in relation.records()? {
                    if entity.is_blank() {
                        continue;
                    }
                    let text = self.session.entity_json(&descriptor, &*entity, true)?;
                    items.push(self.session.decode(&text)?);
                }

                self.session.encode(&Value::List(items))
            }
        }
    }

    /// Cache key of the whole collection for `format`.
    pub fn cache_key(&self, format: Format) -> Result<String, InternalError> {
        let Records::Relation(relation) = &self.records else {
            return Err(InternalError::new(
                ErrorClass::Unsupported,
                ErrorOrigin::Render,
                "loaded entity lists have no collection cache key",
            ));
        };
        let descriptor = self.resolve_descriptor()?.ok_or_else(|| {
            InternalError::render_invariant("relation collection without a serializer")
        })?;

        Ok(cache_key(&relation.cache_key(), &descriptor, format))
    }

    /// Content version of the underlying relation.
    #[must_use]
    pub fn cache_version(&self) -> Option<String> {
        match &self.records {
            Records::Relation(relation) => relation.cache_version(),
            Records::Loaded(_) => None,
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    // Explicit descriptor, else explicit name, else naming convention over
    // the record type. `None` only for an empty loaded list.
    fn resolve_descriptor(&self) -> Result<Option<Arc<Descriptor>>, InternalError> {
        if let Some(descriptor) = &self.descriptor {
            return Ok(Some(Arc::clone(descriptor)));
        }

        let registry = self.session.registry();
        if let Some(name) = &self.serializer {
            return registry.try_get(name).map(Some);
        }

        match self.records.type_name() {
            Some(type_name) => registry
                .for_type(&type_name)
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    RegistryError::SerializerNotFound(serializer_name_for(&type_name)).into()
                }),
            None => Ok(None),
        }
    }

    fn relation_documents(
        &self,
        descriptor: &Descriptor,
        relation: &dyn Relation,
        use_cache: bool,
    ) -> Result<Vec<Document>, InternalError> {
        if descriptor.is_pluckable() {
            return pluck_documents(self.session, descriptor, relation);
        }

        log::debug!(
            "{}: per-entity render over {}",
            descriptor.name(),
            relation.cache_key()
        );

        let mut docs = Vec::new();
        for entity in relation.records()? {
            if !entity.is_blank() {
                docs.push(self.session.render_entity(descriptor, &*entity, use_cache)?);
            }
        }

        Ok(docs)
    }
}

/// Bulk path: one column-restricted request, rows mapped straight into
/// documents through the descriptor's pluck plan.
fn pluck_documents(
    session: &Session,
    descriptor: &Descriptor,
    relation: &dyn Relation,
) -> Result<Vec<Document>, InternalError> {
    let table = relation.model().table_name();
    let columns: Vec<String> = descriptor
        .pluck_columns()
        .iter()
        .map(|column| format!("{table}.{column}"))
        .collect();

    log::debug!("{}: plucking {columns:?}", descriptor.name());
    let rows = relation.pluck(&columns)?;

    let plan = descriptor.pluck_plan();
    let docs = rows
        .into_iter()
        .map(|row| {
            if row.len() != columns.len() {
                return Err(InternalError::render_invariant(format!(
                    "{}: plucked row has {} values for {} columns",
                    descriptor.name(),
                    row.len(),
                    columns.len()
                )));
            }

            Ok(plan
                .iter()
                .map(|(key, index)| (key.as_str(), row[*index].clone()))
                .collect())
        })
        .collect::<Result<Vec<Document>, _>>()?;

    session.metrics().record(RenderEvent::Pluck {
        serializer: descriptor.name(),
        rows: u64::try_from(docs.len()).unwrap_or(u64::MAX),
    });

    Ok(docs)
}
