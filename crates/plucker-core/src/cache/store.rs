use crate::{
    cache::{CacheOptions, CachedValue},
    error::InternalError,
};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

///
/// CacheStore
///
/// Pluggable read-through store.
///
/// `fetch` returns the live entry at `key` when its version matches,
/// otherwise calls `compute`, stores the result under `(key, version)` and
/// returns it. Exclusivity across threads is up to the implementation; the
/// engine only relies on renders being side-effect free.
///

pub trait CacheStore: Send + Sync {
    fn fetch(
        &self,
        key: &str,
        version: Option<&str>,
        options: &CacheOptions,
        compute: &mut dyn FnMut() -> Result<CachedValue, InternalError>,
    ) -> Result<CachedValue, InternalError>;
}

///
/// NullStore
/// Stores nothing; every fetch computes.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl CacheStore for NullStore {
    fn fetch(
        &self,
        _key: &str,
        _version: Option<&str>,
        _options: &CacheOptions,
        compute: &mut dyn FnMut() -> Result<CachedValue, InternalError>,
    ) -> Result<CachedValue, InternalError> {
        compute()
    }
}

///
/// MemoryStore
///
/// Process-local store keyed by (namespaced) cache key.
/// The lock is released while computing so nested renders can re-enter.
///

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    default_ttl: Option<Duration>,
    namespace: Option<String>,
}

#[derive(Debug)]
struct Entry {
    version: Option<String>,
    value: CachedValue,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, version: Option<&str>, now: Instant) -> bool {
        self.version.as_deref() == version && self.expires_at.is_none_or(|at| now < at)
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expiry applied when the serializer's options carry none.
    #[must_use]
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            default_ttl: Some(ttl),
            ..Self::default()
        }
    }

    /// Prefix applied to every key, ahead of any per-serializer namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Stored keys, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.lock().keys().cloned().collect();
        keys.sort();

        keys
    }

    /// Read an entry regardless of version or expiry.
    #[must_use]
    pub fn read(&self, key: &str) -> Option<CachedValue> {
        self.lock().get(key).map(|entry| entry.value.clone())
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn scoped_key(&self, key: &str, options: &CacheOptions) -> String {
        [self.namespace.as_deref(), options.namespace.as_deref()]
            .into_iter()
            .flatten()
            .chain(std::iter::once(key))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl CacheStore for MemoryStore {
    fn fetch(
        &self,
        key: &str,
        version: Option<&str>,
        options: &CacheOptions,
        compute: &mut dyn FnMut() -> Result<CachedValue, InternalError>,
    ) -> Result<CachedValue, InternalError> {
        let key = self.scoped_key(key, options);

        if let Some(entry) = self.lock().get(&key)
            && entry.is_live(version, Instant::now())
        {
            return Ok(entry.value.clone());
        }

        let value = compute()?;
        let expires_at = options
            .expires_in
            .or(self.default_ttl)
            .map(|ttl| Instant::now() + ttl);

        self.lock().insert(
            key,
            Entry {
                version: version.map(str::to_string),
                value: value.clone(),
                expires_at,
            },
        );

        Ok(value)
    }
}
