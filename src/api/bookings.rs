//! Booking lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::booking::{Booking, CancelBooking, CreateBooking, UpdateBooking},
};

use super::Actor;

/// Create a new booking (customer checkout)
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created", body = Booking),
        (status = 404, description = "Unknown equipment"),
        (status = 422, description = "Invalid payload or insufficient stock")
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Json(request): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state.services.bookings.create(&actor, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Get a booking
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = Booking),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.get(id, &actor).await?;
    Ok(Json(booking))
}

/// Edit a booking within the edit window
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBooking,
    responses(
        (status = 200, description = "Booking updated", body = Booking),
        (status = 403, description = "Not the owner, or edit window expired"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Concurrent modification"),
        (status = 422, description = "Invalid payload or insufficient stock")
    )
)]
pub async fn update_booking(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBooking>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.update(id, &actor, request).await?;
    Ok(Json(booking))
}

/// Cancel a booking within the cancel window
#[utoipa::path(
    post,
    path = "/bookings/{id}/cancel",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = CancelBooking,
    responses(
        (status = 200, description = "Booking cancelled", body = Booking),
        (status = 403, description = "Not the owner, cancel window expired, or already cancelled"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn cancel_booking(
    State(state): State<crate::AppState>,
    Actor(actor): Actor,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelBooking>,
) -> AppResult<Json<Booking>> {
    let booking = state.services.bookings.cancel(id, &actor, request).await?;
    Ok(Json(booking))
}
