//! API handlers for Rentiva REST endpoints

pub mod bookings;
pub mod deliveries;
pub mod health;
pub mod openapi;
pub mod payments;
pub mod supplier_requests;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    error::AppError,
    models::actor::{ActorClaims, ActorContext},
    AppState,
};

/// Extractor turning the bearer token into an actor context.
/// Token issuance happens in the identity service; this server only
/// verifies the signature and reads id + role.
pub struct Actor(pub ActorContext);

#[async_trait]
impl FromRequestParts<AppState> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        let claims = ActorClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(Actor(ActorContext::new(claims.sub, claims.role)))
    }
}
