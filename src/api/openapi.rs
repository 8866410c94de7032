//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{availability, closures, health, reservations};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tavola API",
        version = "1.0.0",
        description = "Restaurant reservation and closure calendar REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Availability
        availability::get_window,
        availability::get_date_availability,
        availability::get_business_day,
        // Reservations
        reservations::submit_reservation,
        reservations::get_counts,
        reservations::list_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::update_reservation,
        reservations::update_reservation_status,
        reservations::delete_reservation,
        // Closures
        closures::list_recurring,
        closures::create_recurring,
        closures::update_recurring,
        closures::delete_recurring,
        closures::list_periods,
        closures::create_period,
        closures::update_period,
        closures::delete_period,
        closures::list_blocked,
        closures::create_blocked,
        closures::delete_blocked,
    ),
    components(
        schemas(
            // Availability
            crate::availability::DateKey,
            crate::availability::AvailabilityWindow,
            crate::availability::AvailabilityOutcome,
            crate::availability::ClosureReason,
            crate::availability::ClosureSource,
            crate::availability::ReservationCounts,
            availability::DateAvailabilityResponse,
            availability::BusinessDayResponse,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::AdminCreateReservation,
            crate::models::reservation::UpdateReservation,
            crate::models::reservation::UpdateReservationStatus,
            reservations::ReservationsListResponse,
            // Closures
            crate::models::closure::RecurringClosure,
            crate::models::closure::CreateRecurringClosure,
            crate::models::closure::UpdateRecurringClosure,
            crate::models::closure::PeriodClosure,
            crate::models::closure::CreatePeriodClosure,
            crate::models::closure::UpdatePeriodClosure,
            crate::models::closure::BlockedDate,
            crate::models::closure::CreateBlockedDate,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "availability", description = "Bookable dates for the calendar"),
        (name = "reservations", description = "Online booking"),
        (name = "admin", description = "Reservation and closure administration")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
