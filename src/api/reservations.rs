//! Reservation endpoints: public submission and counts, staff administration

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    availability::{DateKey, ReservationCounts},
    error::AppResult,
    models::reservation::{
        AdminCreateReservation, CreateReservation, Reservation, ReservationQuery,
        UpdateReservation, UpdateReservationStatus,
    },
};

use super::AdminUser;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CountsQuery {
    /// First day (YYYY-MM-DD)
    #[param(value_type = String)]
    pub start_date: DateKey,
    /// Last day, inclusive (YYYY-MM-DD)
    #[param(value_type = String)]
    pub end_date: DateKey,
}

/// Paginated reservations response
#[derive(Serialize, ToSchema)]
pub struct ReservationsListResponse {
    pub reservations: Vec<Reservation>,
    pub total: i64,
}

/// Submit an online booking
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation received", body = Reservation),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 422, description = "Date not available", body = crate::error::ErrorResponse)
    )
)]
pub async fn submit_reservation(
    State(state): State<crate::AppState>,
    Json(data): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.services.reservations.submit(&data).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Non-cancelled reservation counts per date
#[utoipa::path(
    get,
    path = "/reservations/counts",
    tag = "reservations",
    params(CountsQuery),
    responses(
        (status = 200, description = "Counts by date", body = ReservationCounts),
        (status = 400, description = "Inverted range or longer than 366 days", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_counts(
    State(state): State<crate::AppState>,
    Query(query): Query<CountsQuery>,
) -> AppResult<Json<ReservationCounts>> {
    let counts = state
        .services
        .availability
        .counts(query.start_date, query.end_date)
        .await?;
    Ok(Json(counts))
}

/// List reservations with filters and pagination
#[utoipa::path(
    get,
    path = "/admin/reservations",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ReservationQuery),
    responses(
        (status = 200, description = "Reservations list", body = ReservationsListResponse)
    )
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<ReservationsListResponse>> {
    let (reservations, total) = state.services.reservations.list(&query).await?;
    Ok(Json(ReservationsListResponse { reservations, total }))
}

/// Get reservation by ID
#[utoipa::path(
    get,
    path = "/admin/reservations/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = Reservation)
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.get_by_id(id).await?;
    Ok(Json(reservation))
}

/// Staff-entered booking (phone reservations)
#[utoipa::path(
    post,
    path = "/admin/reservations",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = AdminCreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = Reservation)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Json(data): Json<AdminCreateReservation>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.services.reservations.admin_create(&data).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Update a reservation
#[utoipa::path(
    put,
    path = "/admin/reservations/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = UpdateReservation,
    responses(
        (status = 200, description = "Reservation updated", body = Reservation)
    )
)]
pub async fn update_reservation(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateReservation>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.update(id, &data).await?;
    Ok(Json(reservation))
}

/// Approve, cancel or reset a reservation
#[utoipa::path(
    put,
    path = "/admin/reservations/{id}/status",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    request_body = UpdateReservationStatus,
    responses(
        (status = 200, description = "Status changed", body = Reservation)
    )
)]
pub async fn update_reservation_status(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateReservationStatus>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.update_status(id, data.status).await?;
    Ok(Json(reservation))
}

/// Delete a reservation
#[utoipa::path(
    delete,
    path = "/admin/reservations/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation ID")),
    responses(
        (status = 204, description = "Reservation deleted")
    )
)]
pub async fn delete_reservation(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.reservations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
