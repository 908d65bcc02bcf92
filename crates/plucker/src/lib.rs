//! ## Crate layout
//! - `core`: descriptors, renderers, cache coordination, collaborator
//!   traits and the in-memory collaborators.
//! - `utils`: naming-convention helpers shared with hosts that register
//!   serializers by type path.
//!
//! Hosts declare serializers with [`Descriptor`](prelude::Descriptor),
//! register them in a [`SerializerRegistry`](prelude::SerializerRegistry)
//! and render through a [`Session`](prelude::Session).

pub use plucker_core as core;
pub use plucker_utils as utils;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use plucker_core::error::InternalError as Error;

///
/// Prelude
/// Declaration and rendering vocabulary plus the stock collaborators.
///

pub mod prelude {
    pub use crate::core::{
        cache::{CacheStore, MemoryStore, NullStore},
        config::PluckerConfig,
        obs::{CounterSink, MetricsSink},
        prelude::*,
        render::Collection,
    };
}
