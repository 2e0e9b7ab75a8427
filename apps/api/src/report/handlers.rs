//! Axum route handlers for the Report API.

use std::net::SocketAddr;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::rate_limit::{client_ip, report_key, RateDecision};
use crate::report::{generate_from_payload, CareerReport};
use crate::report::store::{get_report, insert_report, Owner, StoredReport};
use crate::state::AppState;

const USER_ID_HEADER: &str = "x-user-id";
const SESSION_ID_HEADER: &str = "x-session-id";
const MAX_SESSION_ID_CHARS: usize = 128;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReportResponse {
    pub id: Uuid,
    /// Set for anonymous callers so the client can read the report back later.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub report: CareerReport,
}

/// Resolves the caller's identity. `X-User-Id` is set by the auth proxy in
/// front of this service; anonymous browsers send `X-Session-Id`.
fn owner_from_headers(headers: &HeaderMap) -> Result<Option<Owner>, AppError> {
    if let Some(raw) = headers.get(USER_ID_HEADER) {
        let id = raw
            .to_str()
            .ok()
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| AppError::Validation(format!("{USER_ID_HEADER} must be a UUID")))?;
        return Ok(Some(Owner::User(id)));
    }

    match headers.get(SESSION_ID_HEADER).and_then(|v| v.to_str().ok()) {
        Some(sid) => {
            let sid = sid.trim();
            if sid.is_empty() || sid.chars().count() > MAX_SESSION_ID_CHARS {
                return Err(AppError::Validation(format!(
                    "{SESSION_ID_HEADER} must be 1-{MAX_SESSION_ID_CHARS} characters"
                )));
            }
            Ok(Some(Owner::Session(sid.to_string())))
        }
        None => Ok(None),
    }
}

/// POST /api/v1/reports
///
/// Identity → rate limit → validate profile → generate (with one repair) → persist.
///
/// Malformed identity headers are rejected before they can spend the caller's quota.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerateReportResponse>), AppError> {
    let (owner, minted_session) = match owner_from_headers(&headers)? {
        Some(owner) => (owner, None),
        None => {
            let sid = Uuid::new_v4().to_string();
            (Owner::Session(sid.clone()), Some(sid))
        }
    };

    let key = report_key(client_ip(&headers, peer.map(|ConnectInfo(addr)| addr)));
    match state.limiter.check(&key).await {
        Ok(RateDecision::Allowed { remaining }) => {
            info!("Report request from {key} allowed ({remaining} remaining)");
        }
        Ok(RateDecision::Limited { retry_after }) => {
            warn!("Report request from {key} rate limited");
            return Err(AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }
        // Fail open: a limiter outage should not take report generation down with it.
        Err(e) => warn!("Rate limiter unavailable, allowing request: {e}"),
    }

    let Json(payload) =
        body.map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e.body_text())))?;

    let (profile, report) = generate_from_payload(state.llm.as_ref(), &payload).await?;

    let id = insert_report(&state.db, &owner, &profile, &report, state.llm.model_id()).await?;
    info!("Generated career report {id}");

    Ok((
        StatusCode::CREATED,
        Json(GenerateReportResponse {
            id,
            session_id: minted_session,
            report,
        }),
    ))
}

/// GET /api/v1/reports/:id
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<StoredReport>, AppError> {
    let not_found = || AppError::NotFound(format!("Report {id} not found"));
    let owner = owner_from_headers(&headers)?.ok_or_else(not_found)?;
    let report = get_report(&state.db, id, &owner).await?.ok_or_else(not_found)?;
    Ok(Json(report))
}
