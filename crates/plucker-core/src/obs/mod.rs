//! Observability: render counters and the sink boundary.
//!
//! Rendering code never touches counter state directly. Every event flows
//! through the [`MetricsSink`] the session was built with.

pub(crate) mod metrics;
pub(crate) mod sink;

#[cfg(test)]
mod tests;

// re-exports
pub use metrics::{CounterSink, RenderReport, SerializerCounters};
pub use sink::{MetricsSink, NoopMetricsSink, RenderEvent};
