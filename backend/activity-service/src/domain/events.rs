//! Inbound event shapes published by the comment/like service
//!
//! Both shapes arrive on the same topics with no type header we rely on, so
//! decoding is structural: a payload carrying `content` is a comment event,
//! anything else that still has the like fields is a like event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::ActivityType;
use crate::error::{ActivityError, Result};

/// Like added/removed on an image
///
/// ```json
/// { "id": 7, "userId": 1, "imageId": 42, "createdAt": "2024-05-01T10:00:00", "eventType": "ADD_LIKE" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEvent {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: i64,
    pub image_id: i64,
    /// Upstream timestamp; kept opaque because normalization discards it
    #[serde(default)]
    pub created_at: Option<Value>,
    pub event_type: ActivityType,
}

/// Comment created/removed on an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEvent {
    #[serde(default)]
    pub id: Option<i64>,
    pub user_id: i64,
    pub image_id: i64,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<Value>,
    pub event_type: ActivityType,
}

/// Any event shape the consumer understands
///
/// Tag and shape are not cross-checked: a comment-tagged payload whose
/// `content` is missing or not a string still satisfies the like shape and is
/// stored with no content.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InboundEvent {
    // Comment must come first: a comment payload is also a valid like payload.
    Comment(CommentEvent),
    Like(LikeEvent),
}

impl InboundEvent {
    /// Structurally decode a raw bus payload
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.is_empty() {
            return Err(ActivityError::Decode("empty payload".to_string()));
        }

        serde_json::from_slice(payload).map_err(|e| {
            ActivityError::Decode(format!(
                "payload matches neither like nor comment event: {}",
                e
            ))
        })
    }

    pub fn shape(&self) -> &'static str {
        match self {
            InboundEvent::Comment(_) => "comment",
            InboundEvent::Like(_) => "like",
        }
    }

    pub fn user_id(&self) -> i64 {
        match self {
            InboundEvent::Comment(e) => e.user_id,
            InboundEvent::Like(e) => e.user_id,
        }
    }

    pub fn image_id(&self) -> i64 {
        match self {
            InboundEvent::Comment(e) => e.image_id,
            InboundEvent::Like(e) => e.image_id,
        }
    }

    pub fn event_type(&self) -> ActivityType {
        match self {
            InboundEvent::Comment(e) => e.event_type,
            InboundEvent::Like(e) => e.event_type,
        }
    }
}

impl From<LikeEvent> for InboundEvent {
    fn from(event: LikeEvent) -> Self {
        InboundEvent::Like(event)
    }
}

impl From<CommentEvent> for InboundEvent {
    fn from(event: CommentEvent) -> Self {
        InboundEvent::Comment(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_decode_like_event() {
        let json = br#"{
            "id": 10,
            "userId": 1,
            "imageId": 42,
            "createdAt": "2024-05-01T10:00:00",
            "eventType": "ADD_LIKE"
        }"#;

        let event = InboundEvent::decode(json).unwrap();
        assert_eq!(event.shape(), "like");
        assert_eq!(event.user_id(), 1);
        assert_eq!(event.image_id(), 42);
        assert_eq!(event.event_type(), ActivityType::AddLike);
    }

    #[test]
    fn test_decode_comment_event() {
        let json = br#"{
            "userId": 3,
            "imageId": 9,
            "content": "nice shot",
            "eventType": "CREATE_COMMENT"
        }"#;

        match InboundEvent::decode(json).unwrap() {
            InboundEvent::Comment(c) => {
                assert_eq!(c.content, "nice shot");
                assert_eq!(c.event_type, ActivityType::CreateComment);
                assert!(c.created_at.is_none());
            }
            other => panic!("expected comment event, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_accepts_array_timestamps() {
        // Some producers write timestamps as date-part arrays
        let json = br#"{"userId":1,"imageId":2,"createdAt":[2024,5,1,10,0,0],"eventType":"REMOVE_LIKE"}"#;
        let event = InboundEvent::decode(json).unwrap();
        assert_eq!(event.event_type(), ActivityType::RemoveLike);
    }

    #[test]
    fn test_comment_tag_with_non_string_content_decodes_as_like_shape() {
        let json = br#"{"userId":1,"imageId":2,"content":42,"eventType":"CREATE_COMMENT"}"#;

        let event = InboundEvent::decode(json).unwrap();
        assert_eq!(event.shape(), "like");
        assert_eq!(event.event_type(), ActivityType::CreateComment);

        let record = crate::services::EventNormalizer::normalize(event);
        assert_eq!(record.activity_type, ActivityType::CreateComment);
        assert_eq!(record.content, None);
    }

    #[test]
    fn test_poison_messages() {
        let cases: [&[u8]; 5] = [
            b"",
            b"not json",
            br#"{"userId":1,"eventType":"ADD_LIKE"}"#,
            br#"{"userId":1,"imageId":2,"eventType":"SHARE"}"#,
            br#"[1,2,3]"#,
        ];

        for payload in cases {
            let err = InboundEvent::decode(payload).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decode);
        }
    }
}
