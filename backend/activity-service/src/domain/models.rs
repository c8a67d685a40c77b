use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ActivityError;

/// Kind of interaction recorded in the activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    AddLike,
    RemoveLike,
    CreateComment,
    RemoveComment,
}

impl ActivityType {
    pub const ALL: [ActivityType; 4] = [
        ActivityType::AddLike,
        ActivityType::RemoveLike,
        ActivityType::CreateComment,
        ActivityType::RemoveComment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::AddLike => "ADD_LIKE",
            ActivityType::RemoveLike => "REMOVE_LIKE",
            ActivityType::CreateComment => "CREATE_COMMENT",
            ActivityType::RemoveComment => "REMOVE_COMMENT",
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, ActivityType::CreateComment | ActivityType::RemoveComment)
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityType {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ActivityError::Validation(format!("Unknown activity type: {}", s)))
    }
}

/// Processing state of a stored activity
///
/// The ingestion pipeline only ever writes `Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityStatus {
    #[default]
    Processed,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Processed => "PROCESSED",
        }
    }
}

impl FromStr for ActivityStatus {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSED" => Ok(ActivityStatus::Processed),
            other => Err(ActivityError::Storage(format!(
                "Unknown activity status in storage: {}",
                other
            ))),
        }
    }
}

/// Canonical activity record - immutable once written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Assigned by the store on first save
    pub id: Option<String>,
    pub user_id: i64,
    pub image_id: i64,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub status: ActivityStatus,
    pub created_at: DateTime<Utc>,
    /// Only set for comment activities
    pub content: Option<String>,
}

impl ActivityRecord {
    pub fn new(user_id: i64, image_id: i64, activity_type: ActivityType) -> Self {
        Self {
            id: None,
            user_id,
            image_id,
            activity_type,
            status: ActivityStatus::Processed,
            created_at: Utc::now(),
            content: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
