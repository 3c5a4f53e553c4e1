//! Delivery and recollection endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::delivery::{
        AssignDelivery, AssignRecollect, Delivery, GeoPoint, ReportLocation,
        SubmitRecollectReport, UpdateDeliveryStatus, UpdateRecollectStatus,
    },
    services::recollection::ReportOutcome,
};

use super::Actor;

/// Tracking response; position is null when no recent ping exists
#[derive(Serialize, ToSchema)]
pub struct LocationResponse {
    pub delivery_id: Uuid,
    pub location: Option<GeoPoint>,
}

/// Assign a driver to a confirmed booking
#[utoipa::path(
    post,
    path = "/deliveries",
    tag = "deliveries",
    security(("bearer_auth" = [])),
    request_body = AssignDelivery,
    responses(
        (status = 201, description = "Delivery assigned", body = Delivery),
        (status = 403, description = "Not a dispatcher"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking not confirmed or already has a delivery")
    )
)]
pub async fn assign_delivery(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Json(request): Json<AssignDelivery>,
) -> AppResult<(StatusCode, Json<Delivery>)> {
    let delivery = state
        .services
        .deliveries
        .assign(&actor, request.booking_id, request.driver_id)
        .await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

/// Get a delivery
#[utoipa::path(
    get,
    path = "/deliveries/{id}",
    tag = "deliveries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Delivery details", body = Delivery),
        (status = 404, description = "Delivery not found")
    )
)]
pub async fn get_delivery(
    State(state): State<crate::AppState>,
    Actor(_actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Delivery>> {
    let delivery = state.services.deliveries.get(id).await?;
    Ok(Json(delivery))
}

/// Driver advances the outbound status
#[utoipa::path(
    post,
    path = "/deliveries/{id}/status",
    tag = "deliveries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = UpdateDeliveryStatus,
    responses(
        (status = 200, description = "Status updated", body = Delivery),
        (status = 403, description = "Not the assigned driver"),
        (status = 409, description = "Illegal transition")
    )
)]
pub async fn update_delivery_status(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeliveryStatus>,
) -> AppResult<Json<Delivery>> {
    let delivery = state
        .services
        .deliveries
        .update_status(id, &actor, request.status)
        .await?;
    Ok(Json(delivery))
}

/// Driver reports its current position
#[utoipa::path(
    post,
    path = "/deliveries/{id}/location",
    tag = "deliveries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = ReportLocation,
    responses(
        (status = 204, description = "Location stored"),
        (status = 403, description = "Not the assigned driver"),
        (status = 409, description = "Delivery already closed")
    )
)]
pub async fn report_location(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<ReportLocation>,
) -> AppResult<StatusCode> {
    state
        .services
        .deliveries
        .report_location(id, &actor, request)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Customer-facing tracking view
#[utoipa::path(
    get,
    path = "/deliveries/{id}/location",
    tag = "deliveries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Last known location", body = LocationResponse),
        (status = 404, description = "Delivery not found")
    )
)]
pub async fn get_location(
    State(state): State<crate::AppState>,
    Actor(_actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LocationResponse>> {
    let location = state.services.deliveries.location(id).await?;
    Ok(Json(LocationResponse { delivery_id: id, location }))
}

/// Assign the return leg to a driver
#[utoipa::path(
    post,
    path = "/deliveries/{id}/recollect",
    tag = "recollection",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = AssignRecollect,
    responses(
        (status = 200, description = "Recollection assigned", body = Delivery),
        (status = 403, description = "Not a dispatcher"),
        (status = 409, description = "Delivery not yet delivered")
    )
)]
pub async fn assign_recollect(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRecollect>,
) -> AppResult<Json<Delivery>> {
    let delivery = state
        .services
        .recollection
        .assign(&actor, id, request.driver_id)
        .await?;
    Ok(Json(delivery))
}

/// Driver advances the return leg
#[utoipa::path(
    post,
    path = "/deliveries/{id}/recollect/status",
    tag = "recollection",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = UpdateRecollectStatus,
    responses(
        (status = 200, description = "Recollection status updated", body = Delivery),
        (status = 403, description = "Not the assigned driver"),
        (status = 409, description = "Illegal transition")
    )
)]
pub async fn update_recollect_status(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecollectStatus>,
) -> AppResult<Json<Delivery>> {
    let delivery = state
        .services
        .recollection
        .update_status(id, &actor, request.status)
        .await?;
    Ok(Json(delivery))
}

/// Driver files the condition/lateness report
#[utoipa::path(
    post,
    path = "/deliveries/{id}/recollect/report",
    tag = "recollection",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    request_body = SubmitRecollectReport,
    responses(
        (status = 200, description = "Report stored and priced", body = ReportOutcome),
        (status = 403, description = "Not the assigned driver"),
        (status = 409, description = "Report not submittable in current state"),
        (status = 422, description = "Invalid report")
    )
)]
pub async fn submit_recollect_report(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitRecollectReport>,
) -> AppResult<Json<ReportOutcome>> {
    let outcome = state
        .services
        .recollection
        .submit_report(id, &actor, request)
        .await?;
    Ok(Json(outcome))
}
