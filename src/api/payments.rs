//! Payment-settlement seam
//!
//! Card processing happens in an external gateway. This server exposes
//! the amounts to charge, accepts the payment-confirmed callback, and
//! exposes the post-recollection settlement figures.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::booking::Booking,
    services::{bookings::ChargeAmounts, recollection::SettlementAmounts},
};

use super::Actor;

/// Amounts to charge for a booking before confirmation
#[utoipa::path(
    get,
    path = "/bookings/{id}/charge",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Charge amounts", body = ChargeAmounts),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_charge_amount(
    State(state): State<crate::AppState>,
    Actor(_actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ChargeAmounts>> {
    let amounts = state.services.bookings.charge_amount(id).await?;
    Ok(Json(amounts))
}

/// Payment-confirmed callback: confirms the booking. Idempotent.
#[utoipa::path(
    post,
    path = "/bookings/{id}/confirm",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking confirmed", body = Booking),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking is cancelled")
    )
)]
pub async fn payment_confirmed(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    // Only the trusted gateway integration (admin credential) confirms
    if !actor.is_admin() {
        return Err(AppError::Forbidden(
            "Only the payment integration may confirm bookings".to_string(),
        ));
    }
    let booking = state.services.bookings.confirm(id).await?;
    Ok(Json(booking))
}

/// Post-recollection settlement figures for refund/charge adjustment
#[utoipa::path(
    get,
    path = "/deliveries/{id}/settlement",
    tag = "payments",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Delivery ID")),
    responses(
        (status = 200, description = "Settlement amounts", body = SettlementAmounts),
        (status = 404, description = "Delivery or report not found")
    )
)]
pub async fn get_settlement_amount(
    State(state): State<crate::AppState>,
    Actor(_actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SettlementAmounts>> {
    let amounts = state.services.recollection.settlement_amount(id).await?;
    Ok(Json(amounts))
}
