use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use healthbridge::assessment::{
    compute_on, message_for, waiting_period_days_for, AgreementMessage, AssessmentContext,
    BilateralAgreement, WaitingPeriodResult, STANDARD_WAITING_PERIOD_DAYS,
};
use healthbridge::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct AgreementLookupResponse {
    pub(crate) country: String,
    pub(crate) agreement: BilateralAgreement,
    pub(crate) message: AgreementMessage,
    pub(crate) waiting_period_days: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WaitingPeriodRequest {
    pub(crate) reference_date: String,
    #[serde(default)]
    pub(crate) waiting_period_days: Option<u32>,
    #[serde(default)]
    pub(crate) country: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum WaitingPeriodSource {
    Explicit,
    Agreement,
    Standard,
}

#[derive(Debug, Serialize)]
pub(crate) struct WaitingPeriodResponse {
    pub(crate) waiting_period_days: u32,
    pub(crate) source: WaitingPeriodSource,
    pub(crate) today: NaiveDate,
    #[serde(flatten)]
    pub(crate) timeline: WaitingPeriodResult,
}

/// Stateless lookups over the read-only eligibility tables.
pub(crate) fn eligibility_router(context: Arc<AssessmentContext>) -> Router {
    Router::new()
        .route("/api/v1/agreements/:country", get(agreement_endpoint))
        .route("/api/v1/waiting-period", post(waiting_period_endpoint))
        .with_state(context)
}

pub(crate) fn with_service_routes(context: Arc<AssessmentContext>) -> Router {
    eligibility_router(context)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn agreement_endpoint(
    State(context): State<Arc<AssessmentContext>>,
    Path(country): Path<String>,
) -> Json<AgreementLookupResponse> {
    let agreement = context.agreements.classify(&country);
    let message = message_for(Some(&agreement), &country);
    let waiting_period_days = waiting_period_days_for(&agreement);

    Json(AgreementLookupResponse {
        country,
        agreement,
        message,
        waiting_period_days,
    })
}

/// Explicit days win over a country lookup; with neither, the standard
/// period applies.
pub(crate) async fn waiting_period_endpoint(
    State(context): State<Arc<AssessmentContext>>,
    Json(payload): Json<WaitingPeriodRequest>,
) -> Result<Json<WaitingPeriodResponse>, AppError> {
    let WaitingPeriodRequest {
        reference_date,
        waiting_period_days,
        country,
        today,
    } = payload;

    let (waiting_period_days, source) = match (waiting_period_days, country) {
        (Some(days), _) => (days, WaitingPeriodSource::Explicit),
        (None, Some(country)) => (
            waiting_period_days_for(&context.agreements.classify(&country)),
            WaitingPeriodSource::Agreement,
        ),
        (None, None) => (STANDARD_WAITING_PERIOD_DAYS, WaitingPeriodSource::Standard),
    };

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let timeline = compute_on(&reference_date, waiting_period_days, today)?;

    Ok(Json(WaitingPeriodResponse {
        waiting_period_days,
        source,
        today,
        timeline,
    }))
}
