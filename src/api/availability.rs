//! Public availability endpoints used by the booking calendar

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    availability::{AvailabilityOutcome, AvailabilityWindow, DateKey},
    error::AppResult,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct WindowQuery {
    /// Number of days starting today (defaults to the configured horizon)
    pub horizon_days: Option<u32>,
}

/// Availability of a single date
#[derive(Serialize, ToSchema)]
pub struct DateAvailabilityResponse {
    pub date: DateKey,
    pub available: bool,
    pub outcome: AvailabilityOutcome,
}

#[derive(Serialize, ToSchema)]
pub struct BusinessDayResponse {
    pub date: DateKey,
    pub is_business_day: bool,
}

/// Bookable dates from today over the horizon
#[utoipa::path(
    get,
    path = "/availability",
    tag = "availability",
    params(WindowQuery),
    responses(
        (status = 200, description = "Availability window", body = AvailabilityWindow),
        (status = 400, description = "Horizon too long", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_window(
    State(state): State<crate::AppState>,
    Query(query): Query<WindowQuery>,
) -> AppResult<Json<AvailabilityWindow>> {
    let window = state.services.availability.window(query.horizon_days).await?;
    Ok(Json(window))
}

/// Whether one date can be booked online
#[utoipa::path(
    get,
    path = "/availability/{date}",
    tag = "availability",
    params(("date" = String, Path, description = "Date (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Date availability", body = DateAvailabilityResponse),
        (status = 400, description = "Malformed date", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_date_availability(
    State(state): State<crate::AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<DateAvailabilityResponse>> {
    let date = DateKey::parse_canonical(&date)?;
    let outcome = state.services.availability.check_date(date).await?;
    Ok(Json(DateAvailabilityResponse {
        date,
        available: outcome.is_available(),
        outcome,
    }))
}

/// Whether the restaurant is open on a date (closure rules only)
#[utoipa::path(
    get,
    path = "/business-days/{date}",
    tag = "availability",
    params(("date" = String, Path, description = "Date (YYYY-MM-DD)")),
    responses(
        (status = 200, description = "Business day check", body = BusinessDayResponse),
        (status = 400, description = "Malformed date", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_business_day(
    State(state): State<crate::AppState>,
    Path(date): Path<String>,
) -> AppResult<Json<BusinessDayResponse>> {
    let date = DateKey::parse_canonical(&date)?;
    let is_business_day = state.services.availability.is_business_day(date).await?;
    Ok(Json(BusinessDayResponse { date, is_business_day }))
}
