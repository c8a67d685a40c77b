use std::collections::BTreeMap;
use tracing::{debug, info_span, Instrument, Span};

use super::ActivityStore;
use crate::domain::{ActivityRecord, ActivityType};
use crate::error::Result;

/// Occurrences per activity type. Types that never occurred have no entry.
pub type ActivityStats = BTreeMap<ActivityType, i64>;

/// Group a materialized set of records by type
pub fn count_by_type<'a, I>(records: I) -> ActivityStats
where
    I: IntoIterator<Item = &'a ActivityRecord>,
{
    let mut stats = ActivityStats::new();
    for record in records {
        *stats.entry(record.activity_type).or_insert(0) += 1;
    }
    stats
}

/// Per-user and per-image activity counts.
///
/// Loads the full matching set on every call; there are no precomputed counters.
#[derive(Clone)]
pub struct StatsAggregator {
    store: ActivityStore,
    span: Span,
}

impl StatsAggregator {
    pub fn new(store: ActivityStore) -> Self {
        Self {
            store,
            span: info_span!("stats_aggregator"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub async fn stats_by_user(&self, user_id: i64) -> Result<ActivityStats> {
        async {
            debug!("Getting activity stats for user id: {}", user_id);
            let records = self.store.find_by_user_id(user_id).await?;
            let stats = count_by_type(&records);
            debug!("Stats for user {}: {:?}", user_id, stats);
            Ok(stats)
        }
        .instrument(self.span.clone())
        .await
    }

    pub async fn stats_by_image(&self, image_id: i64) -> Result<ActivityStats> {
        async {
            debug!("Getting activity stats for image id: {}", image_id);
            let records = self.store.find_by_image_id(image_id).await?;
            let stats = count_by_type(&records);
            debug!("Stats for image {}: {:?}", image_id, stats);
            Ok(stats)
        }
        .instrument(self.span.clone())
        .await
    }
}
