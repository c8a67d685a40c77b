//! Activity Events Consumer
//!
//! Consumes like and comment events emitted by the comment/like service and
//! appends them to the activity log. Both shapes share the same topics and may
//! interleave in any order.
//!
//! Delivery is effectively at-most-once: offsets are auto-committed and a save
//! that fails (or times out) is logged and dropped. There is no retry and no
//! dead-letter topic.

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::Message;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};

use crate::domain::{ActivityRecord, InboundEvent};
use crate::error::{ActivityError, Result};
use crate::metrics;
use crate::services::{ActivityStore, EventNormalizer};

const DEFAULT_PERSIST_TIMEOUT_MS: u64 = 5_000;

/// Configuration for the activity events Kafka consumer
#[derive(Debug, Clone)]
pub struct ActivityEventsConsumerConfig {
    pub brokers: String,
    pub group_id: String,
    pub topics: Vec<String>,
    /// Upper bound on a single save issued by the consumer
    pub persist_timeout: Duration,
}

impl ActivityEventsConsumerConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` when `KAFKA_BROKERS` is unset or blank, which disables ingestion.
    pub fn from_env() -> Option<Self> {
        let brokers = std::env::var("KAFKA_BROKERS").ok()?;

        if brokers.trim().is_empty() {
            return None;
        }

        let topics = parse_topics(
            &std::env::var("KAFKA_ACTIVITY_TOPICS").unwrap_or_else(|_| "activity-events".into()),
        );

        Some(Self {
            brokers,
            group_id: std::env::var("KAFKA_ACTIVITY_GROUP_ID")
                .unwrap_or_else(|_| "activity-service-group".to_string()),
            topics,
            persist_timeout: Duration::from_millis(
                std::env::var("ACTIVITY_PERSIST_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_PERSIST_TIMEOUT_MS)
                    .max(100),
            ),
        })
    }
}

fn parse_topics(raw: &str) -> Vec<String> {
    let topics: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();

    if topics.is_empty() {
        vec!["activity-events".to_string()]
    } else {
        topics
    }
}

/// Transport-independent half of the consumer: decode, normalize, dispatch.
#[derive(Clone)]
pub struct ActivityEventHandler {
    store: ActivityStore,
    persist_timeout: Duration,
    span: Span,
}

impl ActivityEventHandler {
    pub fn new(store: ActivityStore, persist_timeout: Duration) -> Self {
        Self {
            store,
            persist_timeout,
            span: info_span!("activity_event_handler"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Handle one raw message from `topic`.
    ///
    /// Poison messages are logged and dropped (`None`). Otherwise the save is
    /// spawned and its handle returned; callers on the consume path must not
    /// await it. Must be called from within a tokio runtime.
    pub fn dispatch(
        &self,
        topic: &str,
        payload: Option<&[u8]>,
    ) -> Option<JoinHandle<Result<ActivityRecord>>> {
        let _entered = self.span.enter();

        let event = match InboundEvent::decode(payload.unwrap_or_default()) {
            Ok(event) => event,
            Err(err) => {
                warn!(topic = %topic, "Discarding poison message: {}", err);
                metrics::record_poison_message(topic);
                return None;
            }
        };

        info!(
            "Received {} event: user_id={}, image_id={}, type={}",
            event.shape(),
            event.user_id(),
            event.image_id(),
            event.event_type()
        );
        metrics::record_event_received(event.shape());

        let shape = event.shape();
        let record = EventNormalizer::normalize(event);
        let store = self.store.clone();
        let persist_timeout = self.persist_timeout;

        Some(tokio::spawn(
            persist(store, record, shape, persist_timeout).instrument(self.span.clone()),
        ))
    }
}

async fn persist(
    store: ActivityStore,
    record: ActivityRecord,
    shape: &'static str,
    persist_timeout: Duration,
) -> Result<ActivityRecord> {
    let user_id = record.user_id;
    let image_id = record.image_id;

    let result = match tokio::time::timeout(persist_timeout, store.save(record)).await {
        Ok(result) => result,
        Err(_) => {
            metrics::record_persist_failure("timeout");
            let err = ActivityError::Storage(format!(
                "save timed out after {}ms",
                persist_timeout.as_millis()
            ));
            error!(
                "Failed to save {} activity event (user_id={}, image_id={}): {}",
                shape, user_id, image_id, err
            );
            return Err(err);
        }
    };

    match &result {
        Ok(saved) => {
            metrics::record_activity_persisted(saved.activity_type.as_str());
            info!(
                "Successfully saved {} activity event: id={}",
                shape,
                saved.id.as_deref().unwrap_or_default()
            );
        }
        Err(err) => {
            metrics::record_persist_failure(err.kind().code());
            err.report();
            error!(
                "Failed to save {} activity event (user_id={}, image_id={})",
                shape, user_id, image_id
            );
        }
    }

    result
}

/// Kafka side of the consumer
pub struct ActivityEventsConsumer {
    consumer: StreamConsumer,
    handler: ActivityEventHandler,
    config: ActivityEventsConsumerConfig,
}

impl ActivityEventsConsumer {
    pub fn new(
        config: ActivityEventsConsumerConfig,
        store: ActivityStore,
    ) -> std::result::Result<Self, KafkaError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("auto.offset.reset", "earliest")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "30000")
            .set("max.poll.interval.ms", "300000")
            .create()?;

        let topics: Vec<&str> = config.topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topics)?;

        info!(
            "Activity events consumer subscribed (topics: {:?}, group: {})",
            config.topics, config.group_id
        );

        Ok(Self {
            handler: ActivityEventHandler::new(store, config.persist_timeout).with_span(info_span!(
                "activity_events_consumer",
                group = %config.group_id
            )),
            consumer,
            config,
        })
    }

    /// Run the consumer loop. Never returns under normal operation.
    pub async fn run(self) {
        info!(
            "Starting activity events consumer (topics: {:?})",
            self.config.topics
        );

        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    debug!(
                        "Received message: topic={}, partition={}, offset={}",
                        message.topic(),
                        message.partition(),
                        message.offset()
                    );

                    // The save runs detached; the next message is read immediately.
                    if self
                        .handler
                        .dispatch(message.topic(), message.payload())
                        .is_none()
                    {
                        debug!(
                            "Skipped poison message at partition={}, offset={}",
                            message.partition(),
                            message.offset()
                        );
                    }
                }
                Err(err) => {
                    error!("Kafka consumer error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_topics() {
        assert_eq!(parse_topics("a, b ,,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_topics(" , "), vec!["activity-events"]);
    }
}
