//! Engagement event persistence
//!
//! [`EventStore`] implementation over the engagement_events table plus
//! the row <-> domain converters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;
use uuid::Uuid;

use super::SeaOrmStorage;
use crate::analytics::store::EventStore;
use crate::analytics::{EngagementEvent, EventMetadata};
use migration::entities::engagement_event;

/// Convert a domain event to an insertable row
pub fn event_to_active_model(event: &EngagementEvent) -> engagement_event::ActiveModel {
    engagement_event::ActiveModel {
        id: NotSet,
        event_id: Set(event.id),
        card_id: Set(event.card_id),
        kind: Set(event.kind.to_string()),
        occurred_at: Set(event.occurred_at),
        user_agent: Set(event.user_agent.clone()),
        visitor_hash: Set(event.visitor_hash.clone()),
        referrer: Set(event.referrer.clone()),
        country: Set(event.country.clone()),
        country_code: Set(event.country_code.clone()),
        region: Set(event.region.clone()),
        city: Set(event.city.clone()),
        latitude: Set(event.latitude),
        longitude: Set(event.longitude),
        geo_source: Set(event.geo_source.map(|s| s.to_string())),
        device_type: Set(event.device_type.map(|d| d.to_string())),
        session_id: Set(event.session_id.clone()),
        channel: Set(event.channel.clone()),
        metadata: Set(event
            .metadata
            .as_ref()
            .and_then(|m| m.to_json().ok())),
    }
}

/// Convert a stored row back to a domain event.
///
/// Rows with a kind outside the known set are skipped (None) so that
/// newer writers never break older readers.
pub fn model_to_event(model: engagement_event::Model) -> Option<EngagementEvent> {
    let Ok(kind) = model.kind.parse() else {
        debug!("Skipping event row with unrecognized kind: {}", model.kind);
        return None;
    };

    Some(EngagementEvent {
        id: model.event_id,
        card_id: model.card_id,
        kind,
        occurred_at: model.occurred_at,
        user_agent: model.user_agent,
        visitor_hash: model.visitor_hash,
        referrer: model.referrer,
        country: model.country,
        country_code: model.country_code,
        region: model.region,
        city: model.city,
        latitude: model.latitude,
        longitude: model.longitude,
        geo_source: model.geo_source.and_then(|s| s.parse().ok()),
        device_type: model.device_type.and_then(|d| d.parse().ok()),
        session_id: model.session_id,
        channel: model.channel,
        metadata: model.metadata.as_deref().and_then(EventMetadata::from_json),
    })
}

#[async_trait]
impl EventStore for SeaOrmStorage {
    async fn append(&self, event: EngagementEvent) -> anyhow::Result<()> {
        engagement_event::Entity::insert(event_to_active_model(&event))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn events_for_card(
        &self,
        card_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<EngagementEvent>> {
        let mut query =
            engagement_event::Entity::find().filter(engagement_event::Column::CardId.eq(card_id));

        if let Some(from) = from {
            query = query.filter(engagement_event::Column::OccurredAt.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(engagement_event::Column::OccurredAt.lte(to));
        }

        let rows = query
            .order_by_asc(engagement_event::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().filter_map(model_to_event).collect())
    }

    async fn recent_events(
        &self,
        card_id: Uuid,
        limit: usize,
    ) -> anyhow::Result<Vec<EngagementEvent>> {
        let rows = engagement_event::Entity::find()
            .filter(engagement_event::Column::CardId.eq(card_id))
            .order_by_desc(engagement_event::Column::OccurredAt)
            .order_by_desc(engagement_event::Column::Id)
            .limit(limit as u64)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().filter_map(model_to_event).collect())
    }
}
