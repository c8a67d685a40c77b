use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, TextEncoder};

fn register_counter(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .unwrap_or_else(|e| panic!("failed to create {}: {}", name, e));
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .unwrap_or_else(|e| panic!("failed to register {}: {}", name, e));
    counter
}

static EVENTS_RECEIVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter(
        "activity_service_events_received_total",
        "Inbound activity events decoded from Kafka",
        &["shape"],
    )
});

static POISON_MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter(
        "activity_service_poison_messages_total",
        "Inbound messages discarded because they could not be decoded",
        &["topic"],
    )
});

static ACTIVITIES_PERSISTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter(
        "activity_service_activities_persisted_total",
        "Activity records written to the store",
        &["type"],
    )
});

static PERSIST_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_counter(
        "activity_service_persist_failures_total",
        "Activity records dropped because persistence failed",
        &["reason"],
    )
});

pub fn record_event_received(shape: &str) {
    EVENTS_RECEIVED_TOTAL.with_label_values(&[shape]).inc();
}

pub fn record_poison_message(topic: &str) {
    POISON_MESSAGES_TOTAL.with_label_values(&[topic]).inc();
}

pub fn record_activity_persisted(activity_type: &str) {
    ACTIVITIES_PERSISTED_TOTAL
        .with_label_values(&[activity_type])
        .inc();
}

/// `reason` is an error code or `timeout`
pub fn record_persist_failure(reason: &str) {
    PERSIST_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}

pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
