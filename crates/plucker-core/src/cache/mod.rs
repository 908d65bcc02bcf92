//! Read-through caching of rendered output.
//!
//! Keys are `"{identity}/{fingerprint}/{format}"`: the entity or collection
//! identity from the storage layer, the serializer fingerprint, and the
//! output format tag. The storage-supplied content version travels
//! alongside the key so a changed row misses without a key change.

mod store;


use crate::{
    error::InternalError,
    model::descriptor::Descriptor,
    obs::sink::{MetricsSink, RenderEvent},
    value::Document,
};
use std::{fmt, time::Duration};

// re-exports
pub use store::{CacheStore, MemoryStore, NullStore};

///
/// CacheMode
///
/// How a collection render uses the cache when its serializer has caching
/// enabled.
///
/// Collection → the whole rendered collection is one cache entry.
/// Multi      → one entry per entity. Pluckable serializers never
///              materialize per-entity documents, so multi mode over a
///              pluckable relation renders uncached.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CacheMode {
    #[default]
    Collection,
    Multi,
}

///
/// Format
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Format {
    Hash,
    Json,
}

impl Format {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hash => "hash",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// CacheOptions
///
/// Per-serializer options handed to the store on every fetch.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CacheOptions {
    pub expires_in: Option<Duration>,
    pub namespace: Option<String>,
}

impl CacheOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn expires_in(mut self, ttl: Duration) -> Self {
        self.expires_in = Some(ttl);
        self
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

///
/// CachedValue
///
/// What a store holds for one key: a document, a rendered collection, or
/// encoded text.
///

#[derive(Clone, Debug, PartialEq)]
pub enum CachedValue {
    Document(Document),
    Documents(Vec<Document>),
    Encoded(String),
}

impl CachedValue {
    const fn label(&self) -> &'static str {
        match self {
            Self::Document(_) => "document",
            Self::Documents(_) => "documents",
            Self::Encoded(_) => "encoded",
        }
    }

    pub(crate) fn into_document(self) -> Result<Document, InternalError> {
        match self {
            Self::Document(doc) => Ok(doc),
            other => Err(shape_mismatch("document", &other)),
        }
    }

    pub(crate) fn into_documents(self) -> Result<Vec<Document>, InternalError> {
        match self {
            Self::Documents(docs) => Ok(docs),
            other => Err(shape_mismatch("documents", &other)),
        }
    }

    pub(crate) fn into_encoded(self) -> Result<String, InternalError> {
        match self {
            Self::Encoded(text) => Ok(text),
            other => Err(shape_mismatch("encoded", &other)),
        }
    }
}

fn shape_mismatch(expected: &str, found: &CachedValue) -> InternalError {
    InternalError::cache_invariant(format!(
        "cached value shape mismatch: expected {expected}, found {}",
        found.label()
    ))
}

/// Build a cache key from identity, serializer fingerprint and format.
#[must_use]
pub fn cache_key(identity: &str, descriptor: &Descriptor, format: Format) -> String {
    format!("{identity}/{}/{format}", descriptor.fingerprint())
}

///
/// CacheCoordinator
///
/// Wraps one store fetch: supplies the serializer's options, adapts the
/// one-shot compute closure to the store contract, and reports hit/miss.
///

pub(crate) struct CacheCoordinator<'a> {
    store: &'a dyn CacheStore,
    sink: &'a dyn MetricsSink,
}

impl<'a> CacheCoordinator<'a> {
    pub(crate) const fn new(store: &'a dyn CacheStore, sink: &'a dyn MetricsSink) -> Self {
        Self { store, sink }
    }

    pub(crate) fn fetch(
        &self,
        descriptor: &Descriptor,
        format: Format,
        key: &str,
        version: Option<&str>,
        compute: impl FnOnce() -> Result<CachedValue, InternalError>,
    ) -> Result<CachedValue, InternalError> {
        let default_options = CacheOptions::default();
        let options = descriptor.cache_options().unwrap_or(&default_options);

        let mut compute = Some(compute);
        let mut missed = false;
        let value = {
            let mut once = || {
                missed = true;
                let compute = compute.take().ok_or_else(|| {
                    InternalError::cache_invariant(format!(
                        "cache store computed key {key} more than once"
                    ))
                })?;

                compute()
            };

            self.store.fetch(key, version, options, &mut once)?
        };

        let serializer = descriptor.name();
        if missed {
            log::trace!("cache miss {key} (version {version:?})");
            self.sink.record(RenderEvent::CacheMiss { serializer, format });
        } else {
            self.sink.record(RenderEvent::CacheHit { serializer, format });
        }

        Ok(value)
    }
}
