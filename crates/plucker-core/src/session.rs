use crate::{
    cache::{CacheCoordinator, CacheStore, CachedValue, Format, NullStore, cache_key},
    config::PluckerConfig,
    error::InternalError,
    model::descriptor::Descriptor,
    obs::sink::{MetricsSink, NoopMetricsSink},
    registry::SerializerRegistry,
    render::{Collection, Serializer},
    serialize::{Encoder, JsonEncoder},
    traits::{Entity, Records},
    value::{Document, Value},
};
use std::sync::Arc;

///
/// Session
///
/// Public rendering entry point.
///
/// Bundles the host's serializer registry with the collaborators every
/// render needs: cache store, encoder and metrics sink. Defaults are the
/// null store, JSON and a no-op sink.
///

#[derive(Clone)]
pub struct Session {
    registry: Arc<SerializerRegistry>,
    cache_store: Arc<dyn CacheStore>,
    encoder: Arc<dyn Encoder>,
    metrics: Arc<dyn MetricsSink>,
}

impl Session {
    #[must_use]
    pub fn new(registry: Arc<SerializerRegistry>) -> Self {
        Self {
            registry,
            cache_store: Arc::new(NullStore),
            encoder: Arc::new(JsonEncoder),
            metrics: Arc::new(NoopMetricsSink),
        }
    }

    /// Build a session whose cache store comes from host configuration.
    #[must_use]
    pub fn from_config(registry: Arc<SerializerRegistry>, config: &PluckerConfig) -> Self {
        Self::new(registry).cache_store(config.cache.build_store())
    }

    #[must_use]
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.cache_store = store;
        self
    }

    #[must_use]
    pub fn encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Route render events to `sink`.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = sink;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Single entity
    // ------------------------------------------------------------------

    /// Render one entity, through the cache when the serializer opted in.
    pub fn serialize(
        &self,
        serializer: &str,
        entity: &dyn Entity,
    ) -> Result<Document, InternalError> {
        let descriptor = self.registry.try_get(serializer)?;

        self.render_entity(&descriptor, entity, true)
    }

    pub fn serialize_uncached(
        &self,
        serializer: &str,
        entity: &dyn Entity,
    ) -> Result<Document, InternalError> {
        let descriptor = self.registry.try_get(serializer)?;

        self.render_entity(&descriptor, entity, false)
    }

    pub fn to_json(&self, serializer: &str, entity: &dyn Entity) -> Result<String, InternalError> {
        let descriptor = self.registry.try_get(serializer)?;

        self.entity_json(&descriptor, entity, true)
    }

    pub fn to_json_uncached(
        &self,
        serializer: &str,
        entity: &dyn Entity,
    ) -> Result<String, InternalError> {
        let descriptor = self.registry.try_get(serializer)?;

        self.entity_json(&descriptor, entity, false)
    }

    /// Cache key a single-entity render would use.
    pub fn cache_key(
        &self,
        serializer: &str,
        entity: &dyn Entity,
        format: Format,
    ) -> Result<String, InternalError> {
        let descriptor = self.registry.try_get(serializer)?;

        Ok(cache_key(&entity.cache_key(), &descriptor, format))
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// Start a collection render; the serializer is inferred from the
    /// records unless set with [`Collection::serializer`].
    #[must_use]
    pub fn collection(&self, records: impl Into<Records>) -> Collection<'_> {
        Collection::new(self, records.into())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    pub(crate) fn render_entity(
        &self,
        descriptor: &Descriptor,
        entity: &dyn Entity,
        use_cache: bool,
    ) -> Result<Document, InternalError> {
        let compute = || Serializer::new(self, descriptor, entity).compute();

        if !(use_cache && descriptor.cache_enabled()) {
            return compute();
        }

        let key = cache_key(&entity.cache_key(), descriptor, Format::Hash);
        let version = entity.cache_version();

        self.coordinator()
            .fetch(descriptor, Format::Hash, &key, version.as_deref(), || {
                compute().map(CachedValue::Document)
            })?
            .into_document()
    }

    pub(crate) fn entity_json(
        &self,
        descriptor: &Descriptor,
        entity: &dyn Entity,
        use_cache: bool,
    ) -> Result<String, InternalError> {
        let compute = || {
            let doc = Serializer::new(self, descriptor, entity).compute()?;
            self.encode(&Value::Document(doc))
        };

        if !(use_cache && descriptor.cache_enabled()) {
            return compute();
        }

        let key = cache_key(&entity.cache_key(), descriptor, Format::Json);
        let version = entity.cache_version();

        self.coordinator()
            .fetch(descriptor, Format::Json, &key, version.as_deref(), || {
                compute().map(CachedValue::Encoded)
            })?
            .into_encoded()
    }

    pub(crate) fn coordinator(&self) -> CacheCoordinator<'_> {
        CacheCoordinator::new(self.cache_store.as_ref(), self.metrics.as_ref())
    }

    pub(crate) fn metrics(&self) -> &dyn MetricsSink {
        self.metrics.as_ref()
    }

    pub(crate) fn encode(&self, value: &Value) -> Result<String, InternalError> {
        Ok(self.encoder.encode(value)?)
    }

    pub(crate) fn decode(&self, text: &str) -> Result<Value, InternalError> {
        Ok(self.encoder.decode(text)?)
    }
}
