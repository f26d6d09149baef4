//! Public tracking endpoint
//!
//! Anonymous, visitor-facing: every interaction with a published card
//! posts here. The handler captures the request context (user-agent,
//! client IP, referrer), verifies the card, and hands off to the
//! recorder. Responses carry no analytics data back to the visitor.

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use tracing::{debug, error};
use uuid::Uuid;

use super::{ApiResponse, ErrorCode};
use crate::analytics::{EventKind, EventRecorder, VisitorContext};
use crate::storage::SeaOrmStorage;
use crate::utils::ip::extract_client_ip;

#[derive(Debug, Deserialize)]
pub struct TrackRequest {
    pub kind: EventKind,
    /// link_click: destination channel (required for that kind)
    pub channel: Option<String>,
    /// link_click: destination URL
    pub url: Option<String>,
    /// cta_click: which button (required for that kind)
    pub button: Option<String>,
    /// form_submit: created lead reference
    pub lead_id: Option<Uuid>,
    /// share: share method
    pub method: Option<String>,
    pub session_id: Option<String>,
}

pub struct TrackService;

impl TrackService {
    pub async fn track_event(
        req: HttpRequest,
        path: web::Path<Uuid>,
        body: web::Json<TrackRequest>,
        recorder: web::Data<Arc<EventRecorder>>,
        storage: web::Data<Arc<SeaOrmStorage>>,
    ) -> impl Responder {
        let card_id = path.into_inner();

        // Unknown or unpublished cards do not record anything
        match storage.find_card(card_id).await {
            Ok(Some(card)) if card.is_active => {}
            Ok(_) => {
                debug!("Track request for unknown or inactive card {}", card_id);
                return HttpResponse::NotFound()
                    .json(ApiResponse::<()>::error(ErrorCode::NotFound, "Card not found"));
            }
            Err(e) => {
                error!("Card lookup failed during tracking: {}", e);
                return HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    ErrorCode::InternalServerError,
                    "Internal Server Error",
                ));
            }
        }

        let ctx = VisitorContext {
            user_agent: header_value(&req, header::USER_AGENT),
            client_ip: extract_client_ip(&req),
            referrer: header_value(&req, header::REFERER),
            session_id: body.session_id.clone(),
        };

        let body = body.into_inner();
        let result = match body.kind {
            EventKind::PageView => recorder.record_page_view(card_id, &ctx).await,
            EventKind::QrScan => recorder.record_qr_scan(card_id, &ctx).await,
            EventKind::NfcTap => recorder.record_nfc_tap(card_id, &ctx).await,
            EventKind::LinkClick => {
                let Some(channel) = body.channel.filter(|c| !c.is_empty()) else {
                    return HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                        ErrorCode::BadRequest,
                        "link_click requires a channel",
                    ));
                };
                recorder
                    .record_link_click(card_id, &channel, body.url, &ctx)
                    .await
            }
            EventKind::CtaClick => {
                let Some(button) = body.button.filter(|b| !b.is_empty()) else {
                    return HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                        ErrorCode::BadRequest,
                        "cta_click requires a button",
                    ));
                };
                recorder.record_cta_click(card_id, &button, &ctx).await
            }
            EventKind::ContactSave => recorder.record_contact_save(card_id, &ctx).await,
            EventKind::FormSubmit => {
                recorder
                    .record_form_submit(card_id, body.lead_id, &ctx)
                    .await
            }
            EventKind::MeetingClick => recorder.record_meeting_click(card_id, &ctx).await,
            EventKind::DirectionsClick => recorder.record_directions_click(card_id, &ctx).await,
            EventKind::Share => recorder.record_share(card_id, body.method, &ctx).await,
        };

        match result {
            Ok(_) => HttpResponse::NoContent().finish(),
            Err(e) => {
                // Persistence failures are not masked: the event did not land
                error!("Failed to record {} event: {}", body.kind, e);
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    ErrorCode::InternalServerError,
                    "Failed to record event",
                ))
            }
        }
    }
}

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
}
