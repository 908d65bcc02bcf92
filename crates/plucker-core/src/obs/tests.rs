use super::*;
use crate::cache::Format;

#[test]
fn counter_sink_tracks_global_and_per_serializer_counts() {
    let sink = CounterSink::new();

    sink.record(RenderEvent::Entity {
        serializer: "FooSerializer",
    });
    sink.record(RenderEvent::Entity {
        serializer: "BarSerializer",
    });
    sink.record(RenderEvent::Pluck {
        serializer: "FooSerializer",
        rows: 3,
    });
    sink.record(RenderEvent::CacheMiss {
        serializer: "FooSerializer",
        format: Format::Hash,
    });
    sink.record(RenderEvent::CacheHit {
        serializer: "FooSerializer",
        format: Format::Json,
    });

    let report = sink.report();
    assert_eq!(report.entities_rendered, 2);
    assert_eq!(report.plucks, 1);
    assert_eq!(report.rows_plucked, 3);
    assert_eq!(report.cache_hits, 1);
    assert_eq!(report.cache_misses, 1);

    let foo = &report.serializers["FooSerializer"];
    assert_eq!(foo.entities_rendered, 1);
    assert_eq!(foo.rows_plucked, 3);
    assert_eq!(report.serializers["BarSerializer"].cache_hits, 0);
}

#[test]
fn reset_clears_counters() {
    let sink = CounterSink::new();
    sink.record(RenderEvent::Entity {
        serializer: "FooSerializer",
    });
    sink.reset();

    assert_eq!(sink.report(), RenderReport::default());
}

#[test]
fn report_serializes_with_serde() {
    let sink = CounterSink::new();
    sink.record(RenderEvent::Pluck {
        serializer: "FooSerializer",
        rows: 2,
    });

    let json = serde_json::to_value(sink.report()).unwrap();
    assert_eq!(json["rows_plucked"], 2);
    assert_eq!(json["serializers"]["FooSerializer"]["rows_plucked"], 2);
}
