//! API handlers for Tavola REST endpoints

pub mod availability;
pub mod closures;
pub mod health;
pub mod openapi;
pub mod reservations;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::{error::AppError, models::auth::AccessClaims, AppState};

/// Extractor for a signed-in user holding the admin role
pub struct AdminUser(pub AccessClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let auth = &state.config.auth;
        let claims = AccessClaims::from_token(token, &auth.jwt_secret, auth.jwt_audience.as_deref())
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        if !state.services.roles.is_admin(claims.sub).await? {
            tracing::warn!(user_id = %claims.sub, "Admin endpoint refused");
            return Err(AppError::Authorization("Admin role required".to_string()));
        }

        Ok(AdminUser(claims))
    }
}
