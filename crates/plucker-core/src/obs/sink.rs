//! Metrics sink boundary.

use crate::cache::Format;

///
/// RenderEvent
///

#[derive(Clone, Copy, Debug)]
pub enum RenderEvent<'a> {
    /// One entity rendered field by field.
    Entity { serializer: &'a str },

    /// One bulk extraction over a relation.
    Pluck { serializer: &'a str, rows: u64 },

    CacheHit {
        serializer: &'a str,
        format: Format,
    },
    CacheMiss {
        serializer: &'a str,
        format: Format,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: RenderEvent<'_>);
}

///
/// NoopMetricsSink
/// Default sink; drops every event.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn record(&self, _event: RenderEvent<'_>) {}
}
