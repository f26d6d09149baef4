//! Event storage seam
//!
//! [`EventStore`] is the append-only persistence boundary for
//! engagement events. Production uses the SeaORM-backed storage;
//! tests use [`MemoryEventStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use super::EngagementEvent;

/// Append-only engagement event store
///
/// Events are never mutated or deleted through this interface.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Durably append one event. Returning Ok means the write landed.
    async fn append(&self, event: EngagementEvent) -> anyhow::Result<()>;

    /// All events for a card within an optional inclusive time window,
    /// in insertion order
    async fn events_for_card(
        &self,
        card_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<EngagementEvent>>;

    /// The most recent `limit` events for a card, newest first; equal
    /// timestamps keep a stable order
    async fn recent_events(&self, card_id: Uuid, limit: usize)
        -> anyhow::Result<Vec<EngagementEvent>>;
}

/// In-memory event store for tests and ephemeral setups
#[derive(Default)]
pub struct MemoryEventStore {
    /// card id -> (insertion sequence, event)
    events: DashMap<Uuid, Vec<(u64, EngagementEvent)>>,
    next_seq: AtomicU64,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored events across all cards
    pub fn len(&self) -> usize {
        self.events.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn append(&self, event: EngagementEvent) -> anyhow::Result<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.events
            .entry(event.card_id)
            .or_default()
            .push((seq, event));
        Ok(())
    }

    async fn events_for_card(
        &self,
        card_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<EngagementEvent>> {
        let Some(entry) = self.events.get(&card_id) else {
            return Ok(Vec::new());
        };

        Ok(entry
            .iter()
            .filter(|(_, e)| from.is_none_or(|f| e.occurred_at >= f))
            .filter(|(_, e)| to.is_none_or(|t| e.occurred_at <= t))
            .map(|(_, e)| e.clone())
            .collect())
    }

    async fn recent_events(
        &self,
        card_id: Uuid,
        limit: usize,
    ) -> anyhow::Result<Vec<EngagementEvent>> {
        let Some(entry) = self.events.get(&card_id) else {
            return Ok(Vec::new());
        };

        let mut events: Vec<(u64, EngagementEvent)> = entry.value().clone();
        // newest first; insertion sequence keeps ties stable
        events.sort_by(|(seq_a, a), (seq_b, b)| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then_with(|| seq_b.cmp(seq_a))
        });

        Ok(events.into_iter().take(limit).map(|(_, e)| e).collect())
    }
}
