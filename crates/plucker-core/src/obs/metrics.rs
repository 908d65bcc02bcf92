use crate::obs::sink::{MetricsSink, RenderEvent};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

///
/// RenderReport
/// Point-in-time copy of the counters held by a [`CounterSink`].
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RenderReport {
    pub entities_rendered: u64,
    pub plucks: u64,
    pub rows_plucked: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub serializers: BTreeMap<String, SerializerCounters>,
}

///
/// SerializerCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SerializerCounters {
    pub entities_rendered: u64,
    pub rows_plucked: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

///
/// CounterSink
///
/// In-process sink accumulating global and per-serializer counters.
/// Share it with a session through an `Arc` and read it back with
/// [`CounterSink::report`].
///

#[derive(Debug, Default)]
pub struct CounterSink {
    state: Mutex<RenderReport>,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn report(&self) -> RenderReport {
        self.lock().clone()
    }

    /// Reset all counters (useful in tests).
    pub fn reset(&self) {
        *self.lock() = RenderReport::default();
    }

    fn lock(&self) -> MutexGuard<'_, RenderReport> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl MetricsSink for CounterSink {
    fn record(&self, event: RenderEvent<'_>) {
        let mut m = self.lock();

        match event {
            RenderEvent::Entity { serializer } => {
                m.entities_rendered = m.entities_rendered.saturating_add(1);
                let entry = m.serializers.entry(serializer.to_string()).or_default();
                entry.entities_rendered = entry.entities_rendered.saturating_add(1);
            }

            RenderEvent::Pluck { serializer, rows } => {
                m.plucks = m.plucks.saturating_add(1);
                m.rows_plucked = m.rows_plucked.saturating_add(rows);
                let entry = m.serializers.entry(serializer.to_string()).or_default();
                entry.rows_plucked = entry.rows_plucked.saturating_add(rows);
            }

            RenderEvent::CacheHit { serializer, .. } => {
                m.cache_hits = m.cache_hits.saturating_add(1);
                let entry = m.serializers.entry(serializer.to_string()).or_default();
                entry.cache_hits = entry.cache_hits.saturating_add(1);
            }

            RenderEvent::CacheMiss { serializer, .. } => {
                m.cache_misses = m.cache_misses.saturating_add(1);
                let entry = m.serializers.entry(serializer.to_string()).or_default();
                entry.cache_misses = entry.cache_misses.saturating_add(1);
            }
        }
    }
}
