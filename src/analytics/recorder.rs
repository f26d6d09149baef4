//! Event recorder
//!
//! Builds one enriched [`EngagementEvent`] per tracked interaction and
//! appends it durably before returning. Geo enrichment soft-fails;
//! persistence failures propagate to the caller.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::store::EventStore;
use super::{EngagementEvent, EventKind, EventMetadata};
use crate::errors::{CardtraceError, Result};
use crate::services::device::{classify_device, referrer_domain};
use crate::services::geoip::GeoResolver;
use crate::utils::ip::visitor_key;

/// Per-request visitor context captured at the HTTP boundary.
///
/// Holds the raw client address only for the lifetime of the request;
/// the recorder persists nothing but its one-way hash.
#[derive(Debug, Clone, Default)]
pub struct VisitorContext {
    pub user_agent: Option<String>,
    pub client_ip: Option<String>,
    pub referrer: Option<String>,
    pub session_id: Option<String>,
}

/// Records engagement events with enrichment
pub struct EventRecorder {
    store: Arc<dyn EventStore>,
    geo: Arc<GeoResolver>,
    visitor_salt: String,
}

impl EventRecorder {
    pub fn new(store: Arc<dyn EventStore>, geo: Arc<GeoResolver>, visitor_salt: &str) -> Self {
        Self {
            store,
            geo,
            visitor_salt: visitor_salt.to_string(),
        }
    }

    /// Record one interaction.
    ///
    /// Constructs the event (fresh identity, UTC now), enriches it from
    /// the visitor context and the geo resolver, then appends it. The
    /// event is durable once this returns Ok.
    pub async fn record(
        &self,
        card_id: Uuid,
        kind: EventKind,
        metadata: Option<EventMetadata>,
        ctx: &VisitorContext,
    ) -> Result<EngagementEvent> {
        let mut event = EngagementEvent::new(card_id, kind);

        event.user_agent = ctx.user_agent.clone();
        event.device_type = Some(classify_device(ctx.user_agent.as_deref()));
        event.referrer = referrer_domain(ctx.referrer.as_deref());
        event.session_id = ctx.session_id.clone();

        if let Some(ref ip) = ctx.client_ip {
            let key = visitor_key(ip, &self.visitor_salt);
            if !key.is_empty() {
                event.visitor_hash = Some(key);
            }
        }

        // Geo enrichment never fails the write; an unavailable lookup
        // just leaves the geo fields unset
        let geo = self.geo.resolve(ctx.client_ip.as_deref()).await;
        if geo.success {
            event.country = geo.country;
            event.country_code = geo.country_code;
            event.region = geo.region;
            event.city = geo.city;
            event.latitude = geo.latitude;
            event.longitude = geo.longitude;
            event.geo_source = geo.source;
        } else {
            debug!("Geo enrichment unavailable, recording event without location");
        }

        event.channel = metadata.as_ref().and_then(|m| m.channel().map(String::from));
        event.metadata = metadata;

        self.store
            .append(event.clone())
            .await
            .map_err(|e| CardtraceError::database_operation(e.to_string()))?;

        Ok(event)
    }

    /// Card page was viewed
    pub async fn record_page_view(&self, card_id: Uuid, ctx: &VisitorContext) -> Result<EngagementEvent> {
        self.record(card_id, EventKind::PageView, None, ctx).await
    }

    /// QR code was scanned
    pub async fn record_qr_scan(&self, card_id: Uuid, ctx: &VisitorContext) -> Result<EngagementEvent> {
        self.record(card_id, EventKind::QrScan, None, ctx).await
    }

    /// NFC tag was tapped
    pub async fn record_nfc_tap(&self, card_id: Uuid, ctx: &VisitorContext) -> Result<EngagementEvent> {
        self.record(card_id, EventKind::NfcTap, None, ctx).await
    }

    /// A link or social profile was clicked
    pub async fn record_link_click(
        &self,
        card_id: Uuid,
        channel: &str,
        url: Option<String>,
        ctx: &VisitorContext,
    ) -> Result<EngagementEvent> {
        let metadata = EventMetadata::LinkClick {
            channel: channel.to_string(),
            url,
        };
        self.record(card_id, EventKind::LinkClick, Some(metadata), ctx)
            .await
    }

    /// A call-to-action button was clicked (WhatsApp, call, email, ...)
    pub async fn record_cta_click(
        &self,
        card_id: Uuid,
        button: &str,
        ctx: &VisitorContext,
    ) -> Result<EngagementEvent> {
        let metadata = EventMetadata::CtaClick {
            button: button.to_string(),
        };
        self.record(card_id, EventKind::CtaClick, Some(metadata), ctx)
            .await
    }

    /// The visitor saved the contact (vCard download)
    pub async fn record_contact_save(&self, card_id: Uuid, ctx: &VisitorContext) -> Result<EngagementEvent> {
        self.record(card_id, EventKind::ContactSave, None, ctx).await
    }

    /// The contact form was submitted
    pub async fn record_form_submit(
        &self,
        card_id: Uuid,
        lead_id: Option<Uuid>,
        ctx: &VisitorContext,
    ) -> Result<EngagementEvent> {
        let metadata = lead_id.map(|lead_id| EventMetadata::FormSubmit {
            lead_id: Some(lead_id),
        });
        self.record(card_id, EventKind::FormSubmit, metadata, ctx)
            .await
    }

    /// A "book a meeting" link was clicked
    pub async fn record_meeting_click(&self, card_id: Uuid, ctx: &VisitorContext) -> Result<EngagementEvent> {
        self.record(card_id, EventKind::MeetingClick, None, ctx).await
    }

    /// The address/directions link was clicked
    pub async fn record_directions_click(
        &self,
        card_id: Uuid,
        ctx: &VisitorContext,
    ) -> Result<EngagementEvent> {
        self.record(card_id, EventKind::DirectionsClick, None, ctx)
            .await
    }

    /// The card was shared
    pub async fn record_share(
        &self,
        card_id: Uuid,
        method: Option<String>,
        ctx: &VisitorContext,
    ) -> Result<EngagementEvent> {
        let metadata = method
            .filter(|m| !m.is_empty())
            .map(|method| EventMetadata::Share {
                method: Some(method),
            });
        self.record(card_id, EventKind::Share, metadata, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MemoryEventStore;
    use crate::config::AnalyticsConfig;
    use crate::services::device::DeviceType;
    use crate::services::geoip::{GeoLookupResult, GeoProvider, GeoSource};
    use async_trait::async_trait;

    struct FixedProvider(GeoLookupResult);

    #[async_trait]
    impl GeoProvider for FixedProvider {
        async fn lookup(&self, _ip: &str) -> GeoLookupResult {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn recorder_with(
        provider: GeoLookupResult,
    ) -> (EventRecorder, Arc<MemoryEventStore>) {
        let config = AnalyticsConfig::default();
        let store = Arc::new(MemoryEventStore::new());
        let geo = Arc::new(GeoResolver::with_provider(
            Arc::new(FixedProvider(provider)),
            &config,
        ));
        (
            EventRecorder::new(store.clone(), geo, &config.visitor_salt),
            store,
        )
    }

    fn visitor() -> VisitorContext {
        VisitorContext {
            user_agent: Some("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)".to_string()),
            client_ip: Some("203.0.113.50".to_string()),
            referrer: Some("https://www.linkedin.com/in/someone".to_string()),
            session_id: Some("sess-1".to_string()),
        }
    }

    fn miami() -> GeoLookupResult {
        GeoLookupResult {
            success: true,
            country: Some("United States".to_string()),
            country_code: Some("US".to_string()),
            region: Some("Florida".to_string()),
            city: Some("Miami".to_string()),
            latitude: Some(25.7617),
            longitude: Some(-80.1918),
            source: None,
        }
    }

    #[tokio::test]
    async fn test_record_enriches_and_persists() {
        let (recorder, store) = recorder_with(miami());
        let card_id = Uuid::new_v4();

        let event = recorder.record_page_view(card_id, &visitor()).await.unwrap();

        assert_eq!(event.kind, EventKind::PageView);
        assert_eq!(event.device_type, Some(DeviceType::Mobile));
        assert_eq!(event.referrer, Some("www.linkedin.com".to_string()));
        assert_eq!(event.country_code, Some("US".to_string()));
        assert_eq!(event.geo_source, Some(GeoSource::Ip));
        assert_eq!(event.session_id, Some("sess-1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_raw_ip_never_persisted() {
        let (recorder, store) = recorder_with(miami());
        let card_id = Uuid::new_v4();

        recorder.record_page_view(card_id, &visitor()).await.unwrap();

        let events = store.events_for_card(card_id, None, None).await.unwrap();
        let hash = events[0].visitor_hash.as_deref().unwrap();
        assert!(!hash.contains("203.0.113.50"));
        assert!(!hash.contains("203.0"));

        let serialized = serde_json::to_string(&events[0]).unwrap();
        assert!(!serialized.contains("203.0.113.50"));
    }

    #[tokio::test]
    async fn test_geo_failure_does_not_fail_write() {
        let (recorder, store) = recorder_with(GeoLookupResult::unavailable());
        let card_id = Uuid::new_v4();

        let event = recorder.record_qr_scan(card_id, &visitor()).await.unwrap();

        assert_eq!(event.kind, EventKind::QrScan);
        assert_eq!(event.country, None);
        assert_eq!(event.geo_source, None);
        // visitor hash and device type survive without geo data
        assert!(event.visitor_hash.is_some());
        assert_eq!(event.device_type, Some(DeviceType::Mobile));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_link_click_carries_channel_and_metadata() {
        let (recorder, _store) = recorder_with(miami());
        let card_id = Uuid::new_v4();

        let event = recorder
            .record_link_click(
                card_id,
                "linkedin",
                Some("https://linkedin.com/in/x".to_string()),
                &visitor(),
            )
            .await
            .unwrap();

        assert_eq!(event.kind, EventKind::LinkClick);
        assert_eq!(event.channel, Some("linkedin".to_string()));
        match event.metadata {
            Some(EventMetadata::LinkClick { ref channel, ref url }) => {
                assert_eq!(channel, "linkedin");
                assert_eq!(url.as_deref(), Some("https://linkedin.com/in/x"));
            }
            ref other => panic!("unexpected metadata: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cta_click_button_becomes_channel() {
        let (recorder, _store) = recorder_with(miami());

        let event = recorder
            .record_cta_click(Uuid::new_v4(), "whatsapp", &visitor())
            .await
            .unwrap();

        assert_eq!(event.kind, EventKind::CtaClick);
        assert_eq!(event.channel, Some("whatsapp".to_string()));
    }

    #[tokio::test]
    async fn test_form_submit_without_lead_has_no_metadata() {
        let (recorder, _store) = recorder_with(miami());

        let event = recorder
            .record_form_submit(Uuid::new_v4(), None, &visitor())
            .await
            .unwrap();
        assert_eq!(event.metadata, None);

        let lead_id = Uuid::new_v4();
        let event = recorder
            .record_form_submit(Uuid::new_v4(), Some(lead_id), &visitor())
            .await
            .unwrap();
        assert_eq!(
            event.metadata,
            Some(EventMetadata::FormSubmit {
                lead_id: Some(lead_id)
            })
        );
    }

    #[tokio::test]
    async fn test_empty_context_still_records() {
        let (recorder, store) = recorder_with(miami());
        let card_id = Uuid::new_v4();

        let event = recorder
            .record_share(card_id, None, &VisitorContext::default())
            .await
            .unwrap();

        // no IP resolves to the demo default location
        assert_eq!(event.geo_source, Some(GeoSource::Default));
        assert_eq!(event.visitor_hash, None);
        assert_eq!(event.device_type, Some(DeviceType::Unknown));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates() {
        struct FailingStore;

        #[async_trait]
        impl EventStore for FailingStore {
            async fn append(&self, _event: EngagementEvent) -> anyhow::Result<()> {
                anyhow::bail!("disk full")
            }

            async fn events_for_card(
                &self,
                _card_id: Uuid,
                _from: Option<chrono::DateTime<chrono::Utc>>,
                _to: Option<chrono::DateTime<chrono::Utc>>,
            ) -> anyhow::Result<Vec<EngagementEvent>> {
                Ok(Vec::new())
            }

            async fn recent_events(
                &self,
                _card_id: Uuid,
                _limit: usize,
            ) -> anyhow::Result<Vec<EngagementEvent>> {
                Ok(Vec::new())
            }
        }

        let config = AnalyticsConfig::default();
        let geo = Arc::new(GeoResolver::with_provider(
            Arc::new(FixedProvider(miami())),
            &config,
        ));
        let recorder = EventRecorder::new(Arc::new(FailingStore), geo, &config.visitor_salt);

        let result = recorder.record_page_view(Uuid::new_v4(), &visitor()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("disk full"));
    }
}
