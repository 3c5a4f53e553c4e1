//! Supplier direct-request endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::supplier_request::{
        CreateSupplierRequest, SetFulfillmentStatus, SetRequestStatus, SupplierRequest,
    },
};

use super::Actor;

/// Customer places a request against a supplier's inventory
#[utoipa::path(
    post,
    path = "/supplier-requests",
    tag = "supplier-requests",
    security(("bearer_auth" = [])),
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Request created", body = SupplierRequest),
        (status = 404, description = "Unknown inventory item"),
        (status = 422, description = "Invalid payload or item not listed by supplier")
    )
)]
pub async fn create_request(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Json(request): Json<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<SupplierRequest>)> {
    let created = state.services.supplier_requests.create(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Get a supplier request
#[utoipa::path(
    get,
    path = "/supplier-requests/{id}",
    tag = "supplier-requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = SupplierRequest),
        (status = 403, description = "Not a party to this request"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SupplierRequest>> {
    let request = state.services.supplier_requests.get(id, &actor).await?;
    Ok(Json(request))
}

/// Supplier accepts or rejects a pending request
#[utoipa::path(
    post,
    path = "/supplier-requests/{id}/status",
    tag = "supplier-requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = SetRequestStatus,
    responses(
        (status = 200, description = "Decision recorded", body = SupplierRequest),
        (status = 403, description = "Not the owning supplier"),
        (status = 409, description = "Decision already made")
    )
)]
pub async fn set_request_status(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<SetRequestStatus>,
) -> AppResult<Json<SupplierRequest>> {
    let updated = state
        .services
        .supplier_requests
        .set_status(id, &actor, request.status)
        .await?;
    Ok(Json(updated))
}

/// Supplier advances fulfillment one step
#[utoipa::path(
    post,
    path = "/supplier-requests/{id}/fulfillment",
    tag = "supplier-requests",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = SetFulfillmentStatus,
    responses(
        (status = 200, description = "Fulfillment advanced", body = SupplierRequest),
        (status = 403, description = "Not the owning supplier, or request not accepted"),
        (status = 409, description = "Step skipped or reverted")
    )
)]
pub async fn set_fulfillment_status(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<SetFulfillmentStatus>,
) -> AppResult<Json<SupplierRequest>> {
    let updated = state
        .services
        .supplier_requests
        .set_fulfillment(id, &actor, request.status)
        .await?;
    Ok(Json(updated))
}
