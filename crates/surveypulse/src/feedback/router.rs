use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    CampaignEvent, CampaignId, CustomerId, OrganizationId, ResponseId, ResponseSubmission,
    SurveyId, Timeframe,
};
use super::repository::FeedbackStore;
use super::service::{FeedbackService, FeedbackServiceError};

/// Router builder exposing the ingestion and reporting endpoints.
pub fn feedback_router<S>(service: Arc<FeedbackService<S>>) -> Router
where
    S: FeedbackStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/organizations/:organization_id/surveys/:survey_id/responses",
            post(ingest_handler::<S>),
        )
        .route(
            "/api/v1/public/surveys/:survey_id/responses",
            post(public_ingest_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/responses/:response_id",
            delete(delete_response_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/responses/:response_id/flag",
            post(flag_response_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/surveys/:survey_id/aggregate",
            get(survey_aggregate_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/customers/:customer_id/aggregate",
            get(customer_aggregate_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/analytics/trend",
            get(trend_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/campaigns/:campaign_id/events",
            post(campaign_event_handler::<S>),
        )
        .route(
            "/api/v1/organizations/:organization_id/campaigns/:campaign_id/stats",
            get(campaign_stats_handler::<S>),
        )
        .with_state(service)
}

fn error_response(error: FeedbackServiceError) -> Response {
    match error {
        FeedbackServiceError::SurveyNotFound
        | FeedbackServiceError::ResponseNotFound
        | FeedbackServiceError::CustomerNotFound
        | FeedbackServiceError::CampaignNotFound => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        FeedbackServiceError::SurveyNotAcceptingResponses { .. } => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
        FeedbackServiceError::Validation(errors) => {
            let payload = json!({
                "error": "one or more fields are invalid",
                "details": errors.0,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        FeedbackServiceError::Repository(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn ingest_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, survey_id)): Path<(String, String)>,
    Json(submission): Json<ResponseSubmission>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.ingest_response(
        &SurveyId(survey_id),
        &OrganizationId(organization_id),
        submission,
    ) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn public_ingest_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path(survey_id): Path<String>,
    Json(submission): Json<ResponseSubmission>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.ingest_public_response(&SurveyId(survey_id), submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_response_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, response_id)): Path<(String, String)>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.delete_response(&ResponseId(response_id), &OrganizationId(organization_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlagRequest {
    pub(crate) flagged: bool,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

pub(crate) async fn flag_response_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, response_id)): Path<(String, String)>,
    Json(request): Json<FlagRequest>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.flag_response(
        &ResponseId(response_id),
        &OrganizationId(organization_id),
        request.flagged,
        request.reason,
    ) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn survey_aggregate_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, survey_id)): Path<(String, String)>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.survey_aggregate(&SurveyId(survey_id), &OrganizationId(organization_id)) {
        Ok(aggregate) => (StatusCode::OK, Json(aggregate)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn customer_aggregate_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, customer_id)): Path<(String, String)>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.customer_aggregate(&CustomerId(customer_id), &OrganizationId(organization_id)) {
        Ok(aggregate) => (StatusCode::OK, Json(aggregate)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendQuery {
    pub(crate) timeframe: Timeframe,
}

pub(crate) async fn trend_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path(organization_id): Path<String>,
    Query(query): Query<TrendQuery>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.trend(
        &OrganizationId(organization_id),
        query.timeframe,
        Utc::now(),
    ) {
        Ok(series) => (StatusCode::OK, Json(series)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CampaignEventRequest {
    pub(crate) event: CampaignEvent,
    #[serde(default = "default_delta")]
    pub(crate) delta: u64,
}

fn default_delta() -> u64 {
    1
}

pub(crate) async fn campaign_event_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, campaign_id)): Path<(String, String)>,
    Json(request): Json<CampaignEventRequest>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.record_campaign_event(
        &CampaignId(campaign_id),
        &OrganizationId(organization_id),
        request.event,
        request.delta,
    ) {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(json!({ "event": request.event.label(), "delta": request.delta })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn campaign_stats_handler<S>(
    State(service): State<Arc<FeedbackService<S>>>,
    Path((organization_id, campaign_id)): Path<(String, String)>,
) -> Response
where
    S: FeedbackStore + 'static,
{
    match service.campaign_stats(&CampaignId(campaign_id), &OrganizationId(organization_id)) {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}
