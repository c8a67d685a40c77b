use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::ActivityRepository;
use crate::domain::{ActivityRecord, ActivityType};
use crate::error::{ActivityError, Result};

/// In-process activity log backed by a sharded concurrent map.
///
/// Used for local runs (`ACTIVITY_STORE=memory`) and tests. Iteration order is
/// the map's shard order, which matches the "no ordering guarantee" contract.
#[derive(Clone, Default)]
pub struct InMemoryActivityRepository {
    records: Arc<DashMap<String, ActivityRecord>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect<F>(&self, predicate: F) -> Vec<ActivityRecord>
    where
        F: Fn(&ActivityRecord) -> bool,
    {
        self.records
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn insert(&self, mut record: ActivityRecord) -> Result<ActivityRecord> {
        let id = record
            .id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        match self.records.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Err(ActivityError::Storage(format!(
                "Activity {} already exists",
                entry.key()
            ))),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ActivityRecord>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<ActivityRecord>> {
        Ok(self.collect(|r| r.user_id == user_id))
    }

    async fn find_by_image_id(&self, image_id: i64) -> Result<Vec<ActivityRecord>> {
        Ok(self.collect(|r| r.image_id == image_id))
    }

    async fn find_by_user_id_and_image_id(
        &self,
        user_id: i64,
        image_id: i64,
    ) -> Result<Vec<ActivityRecord>> {
        Ok(self.collect(|r| r.user_id == user_id && r.image_id == image_id))
    }

    async fn find_by_type(&self, activity_type: ActivityType) -> Result<Vec<ActivityRecord>> {
        Ok(self.collect(|r| r.activity_type == activity_type))
    }

    async fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>> {
        Ok(self.collect(|r| r.created_at >= start && r.created_at <= end))
    }

    async fn find_all(&self) -> Result<Vec<ActivityRecord>> {
        Ok(self.collect(|_| true))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.len() as u64)
    }

    async fn delete_all(&self, ids: &[String]) -> Result<u64> {
        let deleted = ids
            .iter()
            .filter(|id| self.records.remove(id.as_str()).is_some())
            .count();
        Ok(deleted as u64)
    }
}
