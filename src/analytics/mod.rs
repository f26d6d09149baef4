//! Engagement analytics
//!
//! The event model, the recorder that appends enriched events, the
//! aggregator that derives per-card statistics, and the storage seam
//! between them.

pub mod aggregator;
pub mod recorder;
pub mod store;

pub use aggregator::{AnalyticsAggregator, CardStatsSummary};
pub use recorder::{EventRecorder, VisitorContext};
pub use store::{EventStore, MemoryEventStore};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::services::device::DeviceType;
use crate::services::geoip::GeoSource;

/// Closed set of tracked interaction kinds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PageView,
    QrScan,
    NfcTap,
    CtaClick,
    LinkClick,
    ContactSave,
    FormSubmit,
    MeetingClick,
    DirectionsClick,
    Share,
}

/// Kind-specific event payload
///
/// One variant per kind that carries data; payloads are validated at
/// construction and JSON-encoded only at the persistence boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventMetadata {
    LinkClick {
        /// Destination channel ("linkedin", "website", ...)
        channel: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    CtaClick {
        /// Which action button ("whatsapp", "call", "email", ...)
        button: String,
    },
    FormSubmit {
        #[serde(skip_serializing_if = "Option::is_none")]
        lead_id: Option<Uuid>,
    },
    Share {
        #[serde(skip_serializing_if = "Option::is_none")]
        method: Option<String>,
    },
}

impl EventMetadata {
    /// Channel tag recorded on the event for breakdowns
    pub fn channel(&self) -> Option<&str> {
        match self {
            EventMetadata::LinkClick { channel, .. } => Some(channel),
            EventMetadata::CtaClick { button } => Some(button),
            EventMetadata::Share { method } => method.as_deref(),
            EventMetadata::FormSubmit { .. } => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode a stored payload; unknown or malformed payloads yield None
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// One tracked visitor interaction with a card.
///
/// Created once when the interaction occurs and immutable afterwards.
/// The visitor is identified only by a one-way hash; the raw address
/// never reaches this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub id: Uuid,
    pub card_id: Uuid,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub visitor_hash: Option<String>,
    /// Referrer domain only, never the full URL
    pub referrer: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub geo_source: Option<GeoSource>,
    pub device_type: Option<DeviceType>,
    pub session_id: Option<String>,
    pub channel: Option<String>,
    pub metadata: Option<EventMetadata>,
}

impl EngagementEvent {
    /// Bare event with a fresh identity and the current UTC timestamp;
    /// enrichment fields start unset
    pub fn new(card_id: Uuid, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            card_id,
            kind,
            occurred_at: Utc::now(),
            user_agent: None,
            visitor_hash: None,
            referrer: None,
            country: None,
            country_code: None,
            region: None,
            city: None,
            latitude: None,
            longitude: None,
            geo_source: None,
            device_type: None,
            session_id: None,
            channel: None,
            metadata: None,
        }
    }
}
