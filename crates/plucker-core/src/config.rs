use crate::{
    cache::{CacheStore, MemoryStore, NullStore},
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("invalid plucker config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ConfigError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::Parse(_) => ErrorClass::Unsupported,
        }
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(err.class(), ErrorOrigin::Config, err.to_string())
    }
}

///
/// PluckerConfig
///
/// Host-facing configuration, usually read from a `plucker.toml`:
///
/// ```toml
/// [cache]
/// store = "memory"
/// default_expires_in_secs = 300
/// namespace = "v1"
/// ```
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluckerConfig {
    #[serde(default)]
    pub cache: CacheConfig,
}

impl PluckerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

///
/// CacheConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default)]
    pub store: StoreKind,

    #[serde(default)]
    pub default_expires_in_secs: Option<u64>,

    /// Prefix for every key written by the configured store.
    #[serde(default)]
    pub namespace: Option<String>,
}

impl CacheConfig {
    /// Build the configured store.
    #[must_use]
    pub fn build_store(&self) -> Arc<dyn CacheStore> {
        match self.store {
            StoreKind::Null => Arc::new(NullStore),
            StoreKind::Memory => {
                let mut store = match self.default_expires_in_secs {
                    Some(secs) => MemoryStore::with_default_ttl(Duration::from_secs(secs)),
                    None => MemoryStore::new(),
                };
                if let Some(namespace) = &self.namespace {
                    store = store.namespace(namespace.clone());
                }

                Arc::new(store)
            }
        }
    }
}

///
/// StoreKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Null,
    Memory,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_null_store() {
        let config = PluckerConfig::from_toml_str("").unwrap();

        assert_eq!(config, PluckerConfig::default());
        assert_eq!(config.cache.store, StoreKind::Null);
    }

    #[test]
    fn memory_store_section_parses() {
        let config = PluckerConfig::from_toml_str(
            r#"
            [cache]
            store = "memory"
            default_expires_in_secs = 60
            namespace = "v2"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.store, StoreKind::Memory);
        assert_eq!(config.cache.default_expires_in_secs, Some(60));
        assert_eq!(config.cache.namespace.as_deref(), Some("v2"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PluckerConfig::from_toml_str("[cache]\nstroe = \"memory\"\n").unwrap_err();

        assert!(err.to_string().starts_with("invalid plucker config"));
    }

    #[test]
    fn unknown_store_kind_is_rejected() {
        let err: InternalError = PluckerConfig::from_toml_str("[cache]\nstore = \"redis\"\n")
            .unwrap_err()
            .into();

        assert_eq!(err.origin, ErrorOrigin::Config);
        assert_eq!(err.class, ErrorClass::Unsupported);
    }
}
