#![allow(dead_code)]

use activity_service::domain::{ActivityRecord, ActivityType};
use activity_service::error::{ActivityError, Result};
use activity_service::repository::{ActivityRepository, InMemoryActivityRepository};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// In-memory repository that counts every call reaching it
#[derive(Default)]
pub struct CountingRepository {
    inner: InMemoryActivityRepository,
    calls: AtomicUsize,
}

impl CountingRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ActivityRepository for CountingRepository {
    async fn insert(&self, record: ActivityRecord) -> Result<ActivityRecord> {
        self.touch();
        self.inner.insert(record).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ActivityRecord>> {
        self.touch();
        self.inner.find_by_id(id).await
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<ActivityRecord>> {
        self.touch();
        self.inner.find_by_user_id(user_id).await
    }

    async fn find_by_image_id(&self, image_id: i64) -> Result<Vec<ActivityRecord>> {
        self.touch();
        self.inner.find_by_image_id(image_id).await
    }

    async fn find_by_user_id_and_image_id(
        &self,
        user_id: i64,
        image_id: i64,
    ) -> Result<Vec<ActivityRecord>> {
        self.touch();
        self.inner
            .find_by_user_id_and_image_id(user_id, image_id)
            .await
    }

    async fn find_by_type(&self, activity_type: ActivityType) -> Result<Vec<ActivityRecord>> {
        self.touch();
        self.inner.find_by_type(activity_type).await
    }

    async fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>> {
        self.touch();
        self.inner.find_by_created_at_between(start, end).await
    }

    async fn find_all(&self) -> Result<Vec<ActivityRecord>> {
        self.touch();
        self.inner.find_all().await
    }

    async fn count(&self) -> Result<u64> {
        self.touch();
        self.inner.count().await
    }

    async fn delete_all(&self, ids: &[String]) -> Result<u64> {
        self.touch();
        self.inner.delete_all(ids).await
    }
}

/// Repository whose writes fail (or hang) while reads go to an in-memory log
pub struct FaultyRepository {
    inner: InMemoryActivityRepository,
    insert_delay: Option<Duration>,
    failing_user: Option<i64>,
}

impl FaultyRepository {
    /// Inserts for `user_id` fail with a storage error
    pub fn failing_for_user(user_id: i64) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryActivityRepository::new(),
            insert_delay: None,
            failing_user: Some(user_id),
        })
    }

    /// Every insert sleeps for `delay` before completing
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryActivityRepository::new(),
            insert_delay: Some(delay),
            failing_user: None,
        })
    }
}

#[async_trait::async_trait]
impl ActivityRepository for FaultyRepository {
    async fn insert(&self, record: ActivityRecord) -> Result<ActivityRecord> {
        if let Some(delay) = self.insert_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_user == Some(record.user_id) {
            return Err(ActivityError::Storage("connection reset".to_string()));
        }
        self.inner.insert(record).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ActivityRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<ActivityRecord>> {
        self.inner.find_by_user_id(user_id).await
    }

    async fn find_by_image_id(&self, image_id: i64) -> Result<Vec<ActivityRecord>> {
        self.inner.find_by_image_id(image_id).await
    }

    async fn find_by_user_id_and_image_id(
        &self,
        user_id: i64,
        image_id: i64,
    ) -> Result<Vec<ActivityRecord>> {
        self.inner
            .find_by_user_id_and_image_id(user_id, image_id)
            .await
    }

    async fn find_by_type(&self, activity_type: ActivityType) -> Result<Vec<ActivityRecord>> {
        self.inner.find_by_type(activity_type).await
    }

    async fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>> {
        self.inner.find_by_created_at_between(start, end).await
    }

    async fn find_all(&self) -> Result<Vec<ActivityRecord>> {
        self.inner.find_all().await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    async fn delete_all(&self, ids: &[String]) -> Result<u64> {
        self.inner.delete_all(ids).await
    }
}
