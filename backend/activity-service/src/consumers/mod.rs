pub mod activity_events;

pub use activity_events::{ActivityEventHandler, ActivityEventsConsumer, ActivityEventsConsumerConfig};
