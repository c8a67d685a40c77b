use chrono::{DateTime, Utc};

use crate::domain::{ActivityRecord, ActivityStatus, CommentEvent, InboundEvent, LikeEvent};

/// Maps inbound event variants onto the canonical activity record.
///
/// `created_at` is the normalization instant, not the upstream event time.
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn normalize(event: InboundEvent) -> ActivityRecord {
        Self::normalize_at(event, Utc::now())
    }

    pub fn normalize_at(event: InboundEvent, now: DateTime<Utc>) -> ActivityRecord {
        match event {
            InboundEvent::Like(like) => Self::from_like(like, now),
            InboundEvent::Comment(comment) => Self::from_comment(comment, now),
        }
    }

    fn from_like(event: LikeEvent, now: DateTime<Utc>) -> ActivityRecord {
        ActivityRecord {
            id: None,
            user_id: event.user_id,
            image_id: event.image_id,
            activity_type: event.event_type,
            status: ActivityStatus::Processed,
            created_at: now,
            content: None,
        }
    }

    fn from_comment(event: CommentEvent, now: DateTime<Utc>) -> ActivityRecord {
        ActivityRecord {
            id: None,
            user_id: event.user_id,
            image_id: event.image_id,
            activity_type: event.event_type,
            status: ActivityStatus::Processed,
            created_at: now,
            content: Some(event.content),
        }
    }
}
