//! Engagement event entity, the append-only interaction log for cards

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "engagement_events")]
pub struct Model {
    /// Insertion-ordered row id, used as the stable tie-break when
    /// sorting events with equal timestamps
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Public opaque identity of the event
    #[sea_orm(unique)]
    pub event_id: Uuid,
    pub card_id: Uuid,
    /// Event kind string ("page_view", "qr_scan", ...)
    pub kind: String,
    pub occurred_at: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub user_agent: Option<String>,
    /// One-way hash of the visitor IP; the raw address is never stored
    pub visitor_hash: Option<String>,
    /// Referrer domain only, never the full URL
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Where the geo fields came from ("default", "cache", "ip")
    pub geo_source: Option<String>,
    pub device_type: Option<String>,
    pub session_id: Option<String>,
    pub channel: Option<String>,
    /// Kind-specific metadata payload, JSON-encoded
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::card::Entity",
        from = "Column::CardId",
        to = "super::card::Column::Id"
    )]
    Card,
}

impl Related<super::card::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Card.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
