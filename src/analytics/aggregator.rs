//! Per-card statistics aggregation
//!
//! Recomputed on every query from the raw event log; nothing here is
//! persisted. Unknown kind strings in storage are skipped rather than
//! failing the whole aggregation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::store::EventStore;
use super::{EngagementEvent, EventKind};
use crate::errors::{CardtraceError, Result};
use crate::services::device::DeviceType;

/// Default number of events returned by recent-event listings
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Aggregated statistics for one card over a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardStatsSummary {
    /// Count per event kind; kinds with no events are absent
    pub counts: BTreeMap<EventKind, u64>,
    /// Distinct visitors, counted by the hashed visitor key
    pub unique_visitors: u64,
    /// Device type -> event count; events without a device type are omitted
    pub device_breakdown: BTreeMap<DeviceType, u64>,
    /// Calendar date -> page-view count, ascending by date
    pub daily_views: BTreeMap<NaiveDate, u64>,
}

impl CardStatsSummary {
    /// Count for one kind (0 when absent)
    pub fn count(&self, kind: EventKind) -> u64 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Page views in the window
    pub fn total_views(&self) -> u64 {
        self.count(EventKind::PageView)
    }
}

/// Computes per-card statistics from the event log
pub struct AnalyticsAggregator {
    store: Arc<dyn EventStore>,
}

impl AnalyticsAggregator {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Aggregate statistics for a card within an optional inclusive
    /// [from, to] window
    pub async fn get_stats(
        &self,
        card_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<CardStatsSummary> {
        let events = self
            .store
            .events_for_card(card_id, from, to)
            .await
            .map_err(|e| CardtraceError::database_operation(e.to_string()))?;

        Ok(summarize(&events))
    }

    /// The most recent `limit` events for a card, newest first
    pub async fn get_recent_events(
        &self,
        card_id: Uuid,
        limit: usize,
    ) -> Result<Vec<EngagementEvent>> {
        self.store
            .recent_events(card_id, limit)
            .await
            .map_err(|e| CardtraceError::database_operation(e.to_string()))
    }
}

/// Pure aggregation over an event slice
pub fn summarize(events: &[EngagementEvent]) -> CardStatsSummary {
    let mut summary = CardStatsSummary::default();
    let mut visitors = std::collections::HashSet::new();

    for event in events {
        *summary.counts.entry(event.kind).or_insert(0) += 1;

        if let Some(ref hash) = event.visitor_hash {
            if !hash.is_empty() {
                visitors.insert(hash.as_str());
            }
        }

        if let Some(device) = event.device_type {
            *summary.device_breakdown.entry(device).or_insert(0) += 1;
        }

        if event.kind == EventKind::PageView {
            *summary
                .daily_views
                .entry(event.occurred_at.date_naive())
                .or_insert(0) += 1;
        }
    }

    summary.unique_visitors = visitors.len() as u64;
    summary
}
