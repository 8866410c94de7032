//! Closure calendar administration endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::closure::{
        BlockedDate, ClosureQuery, CreateBlockedDate, CreatePeriodClosure, CreateRecurringClosure,
        PeriodClosure, RecurringClosure, UpdatePeriodClosure, UpdateRecurringClosure,
    },
};

use super::AdminUser;

// ---- Recurring ----

/// List weekly closing days
#[utoipa::path(
    get,
    path = "/admin/closures/recurring",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Weekly closing days", body = Vec<RecurringClosure>)
    )
)]
pub async fn list_recurring(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
) -> AppResult<Json<Vec<RecurringClosure>>> {
    let rows = state.services.closures.list_recurring().await?;
    Ok(Json(rows))
}

/// Add a weekly closing day
#[utoipa::path(
    post,
    path = "/admin/closures/recurring",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateRecurringClosure,
    responses(
        (status = 201, description = "Weekly closing day created", body = RecurringClosure),
        (status = 400, description = "day_of_week outside 0..=6", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_recurring(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Json(data): Json<CreateRecurringClosure>,
) -> AppResult<(StatusCode, Json<RecurringClosure>)> {
    let row = state.services.closures.create_recurring(&data).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update or toggle a weekly closing day
#[utoipa::path(
    put,
    path = "/admin/closures/recurring/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Recurring closure ID")),
    request_body = UpdateRecurringClosure,
    responses(
        (status = 200, description = "Weekly closing day updated", body = RecurringClosure)
    )
)]
pub async fn update_recurring(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateRecurringClosure>,
) -> AppResult<Json<RecurringClosure>> {
    let row = state.services.closures.update_recurring(id, &data).await?;
    Ok(Json(row))
}

/// Remove a weekly closing day
#[utoipa::path(
    delete,
    path = "/admin/closures/recurring/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Recurring closure ID")),
    responses(
        (status = 204, description = "Weekly closing day deleted")
    )
)]
pub async fn delete_recurring(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.closures.delete_recurring(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Periods ----

/// List closed periods, optionally only those overlapping a range
#[utoipa::path(
    get,
    path = "/admin/closures/periods",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ClosureQuery),
    responses(
        (status = 200, description = "Closed periods", body = Vec<PeriodClosure>)
    )
)]
pub async fn list_periods(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Query(query): Query<ClosureQuery>,
) -> AppResult<Json<Vec<PeriodClosure>>> {
    let rows = state.services.closures.list_periods(&query).await?;
    Ok(Json(rows))
}

/// Add a closed period
#[utoipa::path(
    post,
    path = "/admin/closures/periods",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreatePeriodClosure,
    responses(
        (status = 201, description = "Closed period created", body = PeriodClosure),
        (status = 400, description = "Inverted range or blank reason", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_period(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Json(data): Json<CreatePeriodClosure>,
) -> AppResult<(StatusCode, Json<PeriodClosure>)> {
    let row = state.services.closures.create_period(&data).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Update or toggle a closed period
#[utoipa::path(
    put,
    path = "/admin/closures/periods/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Period closure ID")),
    request_body = UpdatePeriodClosure,
    responses(
        (status = 200, description = "Closed period updated", body = PeriodClosure)
    )
)]
pub async fn update_period(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdatePeriodClosure>,
) -> AppResult<Json<PeriodClosure>> {
    let row = state.services.closures.update_period(id, &data).await?;
    Ok(Json(row))
}

/// Remove a closed period
#[utoipa::path(
    delete,
    path = "/admin/closures/periods/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Period closure ID")),
    responses(
        (status = 204, description = "Closed period deleted")
    )
)]
pub async fn delete_period(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.closures.delete_period(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- Blocked dates ----

/// List blocked dates
#[utoipa::path(
    get,
    path = "/admin/closures/blocked",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(ClosureQuery),
    responses(
        (status = 200, description = "Blocked dates", body = Vec<BlockedDate>)
    )
)]
pub async fn list_blocked(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Query(query): Query<ClosureQuery>,
) -> AppResult<Json<Vec<BlockedDate>>> {
    let rows = state.services.closures.list_blocked(&query).await?;
    Ok(Json(rows))
}

/// Block a single date
#[utoipa::path(
    post,
    path = "/admin/closures/blocked",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateBlockedDate,
    responses(
        (status = 201, description = "Blocked date created", body = BlockedDate)
    )
)]
pub async fn create_blocked(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Json(data): Json<CreateBlockedDate>,
) -> AppResult<(StatusCode, Json<BlockedDate>)> {
    let row = state.services.closures.create_blocked(&data).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Unblock a date
#[utoipa::path(
    delete,
    path = "/admin/closures/blocked/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Blocked date ID")),
    responses(
        (status = 204, description = "Blocked date deleted")
    )
)]
pub async fn delete_blocked(
    State(state): State<crate::AppState>,
    AdminUser(_claims): AdminUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.closures.delete_blocked(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
