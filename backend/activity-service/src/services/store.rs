//! Validated access to the activity log
//!
//! `ActivityStore` is the programmatic surface adapters call. It validates
//! ids before touching the repository, logs through its own span and returns
//! classified [`ActivityError`]s.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info_span, trace, Instrument, Span};

use crate::domain::{ActivityRecord, ActivityType};
use crate::error::{ActivityError, Result};
use crate::repository::ActivityRepository;

pub(crate) fn require_valid_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(ActivityError::Validation("ID cannot be blank".to_string()));
    }
    Ok(())
}

pub(crate) fn require_valid_user_id(user_id: i64) -> Result<()> {
    if user_id <= 0 {
        return Err(ActivityError::Validation(
            "User ID must be positive".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn require_valid_image_id(image_id: i64) -> Result<()> {
    if image_id <= 0 {
        return Err(ActivityError::Validation(
            "Image ID must be positive".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone)]
pub struct ActivityStore {
    repository: Arc<dyn ActivityRepository>,
    span: Span,
}

impl ActivityStore {
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self {
            repository,
            span: info_span!("activity_store"),
        }
    }

    /// Replace the span this store logs under
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn activity_types(&self) -> &'static [ActivityType] {
        &ActivityType::ALL
    }

    /// Persist a normalized record. Internal to the ingestion pipeline.
    ///
    /// A caller-supplied id must not be blank; a missing id is assigned by the repository.
    pub async fn save(&self, record: ActivityRecord) -> Result<ActivityRecord> {
        if let Some(id) = &record.id {
            require_valid_id(id)?;
        }
        require_valid_user_id(record.user_id)?;
        require_valid_image_id(record.image_id)?;

        async {
            debug!(
                "Saving activity event: user_id={}, image_id={}, type={}",
                record.user_id, record.image_id, record.activity_type
            );
            let saved = self.repository.insert(record).await?;
            debug!(
                "Successfully saved activity event with id: {}",
                saved.id.as_deref().unwrap_or_default()
            );
            Ok(saved)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<ActivityRecord> {
        require_valid_id(id)?;

        async {
            debug!("Finding activity event by id: {}", id);
            self.repository.find_by_id(id).await?.ok_or_else(|| {
                ActivityError::NotFound(format!("Activity event not found with id: {}", id))
            })
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn find_all(&self) -> Result<Vec<ActivityRecord>> {
        async {
            debug!("Finding all activity events");
            self.repository.find_all().await
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn count(&self) -> Result<u64> {
        self.repository
            .count()
            .instrument(self.span.clone())
            .await
    }

    pub async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<ActivityRecord>> {
        require_valid_user_id(user_id)?;

        async {
            debug!("Finding activity events by user id: {}", user_id);
            let records = self.repository.find_by_user_id(user_id).await?;
            trace!("Found {} activity events for user {}", records.len(), user_id);
            Ok(records)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn find_by_image_id(&self, image_id: i64) -> Result<Vec<ActivityRecord>> {
        require_valid_image_id(image_id)?;

        async {
            debug!("Finding activity events by image id: {}", image_id);
            let records = self.repository.find_by_image_id(image_id).await?;
            trace!("Found {} activity events for image {}", records.len(), image_id);
            Ok(records)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn find_by_user_id_and_image_id(
        &self,
        user_id: i64,
        image_id: i64,
    ) -> Result<Vec<ActivityRecord>> {
        require_valid_user_id(user_id)?;
        require_valid_image_id(image_id)?;

        async {
            debug!(
                "Finding activity events by user id: {} and image id: {}",
                user_id, image_id
            );
            self.repository
                .find_by_user_id_and_image_id(user_id, image_id)
                .await
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn find_by_type(&self, activity_type: ActivityType) -> Result<Vec<ActivityRecord>> {
        async {
            debug!("Finding activity events by type: {}", activity_type);
            self.repository.find_by_type(activity_type).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Both bounds inclusive. An inverted range simply matches nothing.
    pub async fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>> {
        async {
            debug!("Finding activity events between {} and {}", start, end);
            self.repository.find_by_created_at_between(start, end).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// First `limit` records of the user's activity in store-native order.
    ///
    /// Not sorted by `created_at`, so this is not guaranteed to be the most
    /// recent `limit` records.
    pub async fn find_recent_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>> {
        require_valid_user_id(user_id)?;

        async {
            debug!("Finding recent {} activities for user id: {}", limit, user_id);
            let mut records = self.repository.find_by_user_id(user_id).await?;
            records.truncate(limit);
            Ok(records)
        }
        .instrument(self.span.clone())
        .await
    }

    /// Remove every activity of a user. Returns the number of deleted records.
    ///
    /// Reads the matching set, then deletes exactly that set. Records inserted
    /// for the user between the two steps survive this call.
    pub async fn delete_by_user_id(&self, user_id: i64) -> Result<u64> {
        require_valid_user_id(user_id)?;

        async {
            debug!("Deleting all activities for user id: {}", user_id);
            let records = self.repository.find_by_user_id(user_id).await?;
            self.delete_matching(records, "user", user_id).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Remove every activity on an image. Same race window as `delete_by_user_id`.
    pub async fn delete_by_image_id(&self, image_id: i64) -> Result<u64> {
        require_valid_image_id(image_id)?;

        async {
            debug!("Deleting all activities for image id: {}", image_id);
            let records = self.repository.find_by_image_id(image_id).await?;
            self.delete_matching(records, "image", image_id).await
        }
        .instrument(self.span.clone())
        .await
    }

    async fn delete_matching(
        &self,
        records: Vec<ActivityRecord>,
        owner: &str,
        owner_id: i64,
    ) -> Result<u64> {
        if records.is_empty() {
            debug!("No activities found to delete for {} id: {}", owner, owner_id);
            return Ok(0);
        }

        let ids: Vec<String> = records.into_iter().filter_map(|r| r.id).collect();
        let deleted = self.repository.delete_all(&ids).await?;
        debug!("Deleted {} activities for {} id: {}", deleted, owner, owner_id);
        Ok(deleted)
    }
}
