use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::ActivityRepository;
use crate::domain::{ActivityRecord, ActivityType};
use crate::error::{ActivityError, Result};

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, image_id, activity_type, status, created_at, content FROM activity_events";

#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: String,
    user_id: i64,
    image_id: i64,
    activity_type: String,
    status: String,
    created_at: DateTime<Utc>,
    content: Option<String>,
}

impl TryFrom<ActivityRow> for ActivityRecord {
    type Error = ActivityError;

    fn try_from(row: ActivityRow) -> Result<Self> {
        let activity_type = row.activity_type.parse().map_err(|_| {
            ActivityError::Storage(format!(
                "Unknown activity type '{}' stored for activity {}",
                row.activity_type, row.id
            ))
        })?;

        Ok(ActivityRecord {
            id: Some(row.id),
            user_id: row.user_id,
            image_id: row.image_id,
            activity_type,
            status: row.status.parse()?,
            created_at: row.created_at,
            content: row.content,
        })
    }
}

fn into_records(rows: Vec<ActivityRow>) -> Result<Vec<ActivityRecord>> {
    rows.into_iter().map(ActivityRecord::try_from).collect()
}

/// PostgreSQL-backed activity log (`activity_events` table)
#[derive(Clone)]
pub struct PgActivityRepository {
    pool: PgPool,
}

impl PgActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the table and its indexes
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn insert(&self, record: ActivityRecord) -> Result<ActivityRecord> {
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let row = sqlx::query_as::<_, ActivityRow>(
            r#"
            INSERT INTO activity_events (id, user_id, image_id, activity_type, status, created_at, content)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, image_id, activity_type, status, created_at, content
            "#,
        )
        .bind(&id)
        .bind(record.user_id)
        .bind(record.image_id)
        .bind(record.activity_type.as_str())
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(&record.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ActivityError::Storage(format!("Failed to insert activity {}: {}", id, e)))?;

        debug!(activity_id = %row.id, "Inserted activity row");
        row.try_into()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ActivityRecord>> {
        let row = sqlx::query_as::<_, ActivityRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ActivityRecord::try_from).transpose()
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<ActivityRecord>> {
        let rows =
            sqlx::query_as::<_, ActivityRow>(&format!("{} WHERE user_id = $1", SELECT_COLUMNS))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        into_records(rows)
    }

    async fn find_by_image_id(&self, image_id: i64) -> Result<Vec<ActivityRecord>> {
        let rows =
            sqlx::query_as::<_, ActivityRow>(&format!("{} WHERE image_id = $1", SELECT_COLUMNS))
                .bind(image_id)
                .fetch_all(&self.pool)
                .await?;

        into_records(rows)
    }

    async fn find_by_user_id_and_image_id(
        &self,
        user_id: i64,
        image_id: i64,
    ) -> Result<Vec<ActivityRecord>> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "{} WHERE user_id = $1 AND image_id = $2",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(image_id)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn find_by_type(&self, activity_type: ActivityType) -> Result<Vec<ActivityRecord>> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "{} WHERE activity_type = $1",
            SELECT_COLUMNS
        ))
        .bind(activity_type.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn find_by_created_at_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivityRecord>> {
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "{} WHERE created_at BETWEEN $1 AND $2",
            SELECT_COLUMNS
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn find_all(&self) -> Result<Vec<ActivityRecord>> {
        let rows = sqlx::query_as::<_, ActivityRow>(SELECT_COLUMNS)
            .fetch_all(&self.pool)
            .await?;

        into_records(rows)
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM activity_events")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn delete_all(&self, ids: &[String]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM activity_events WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
