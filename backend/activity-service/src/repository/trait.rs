use chrono::{DateTime, Utc};

use crate::domain::{ActivityRecord, ActivityType};
use crate::error::Result;

/// Storage capability behind the activity log.
///
/// Implementations return matching records in their native order; callers must
/// not assume recency or insertion order. Input validation is the caller's job.
#[async_trait::async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Persist a record, assigning an id when it has none
    async fn insert(&self, record: ActivityRecord) -> Result<ActivityRecord>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ActivityRecord>>;

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<ActivityRecord>>;

    async fn find_by_image_id(&self, image_id: i64) -> Result<Vec<ActivityRecord>>;

    async fn find_by_user_id_and_image_id(
        &self,
        user_id: i64,
        image_id: i64,
    ) -> Result<Vec<ActivityRecord>>;

    async fn find_by_type(&self, activity_type: ActivityType) -> Result<Vec<ActivityRecord>>;

    /// Records with `start <= created_at <= end`
    async fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>>;

    async fn find_all(&self) -> Result<Vec<ActivityRecord>>;

    async fn count(&self) -> Result<u64>;

    /// Delete exactly the given ids, returning how many rows went away
    async fn delete_all(&self, ids: &[String]) -> Result<u64>;
}
