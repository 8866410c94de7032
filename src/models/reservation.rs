//! Reservation model and request types

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    availability::DateKey,
    error::{AppError, AppResult},
};

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Approved,
    Cancelled,
}

impl ReservationStatus {
    /// Cancelled reservations free their slot.
    pub fn counts_against_capacity(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled)
    }
}

/// Reservation record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub reservation_date: DateKey,
    #[schema(value_type = String, example = "18:30:00")]
    pub reservation_time: NaiveTime,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public booking request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReservation {
    #[validate(length(min = 1, max = 100, message = "customer_name is required"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[validate(length(max = 30))]
    pub customer_phone: Option<String>,
    /// Requested day (YYYY-MM-DD)
    pub reservation_date: DateKey,
    /// Requested time (HH:MM)
    #[validate(length(min = 4, max = 8))]
    pub reservation_time: String,
    #[validate(range(min = 1, max = 50, message = "party_size must be at least 1"))]
    pub party_size: i32,
    #[validate(length(max = 1000))]
    pub special_requests: Option<String>,
}

/// Staff-entered booking (phone reservations); may set the initial status
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdminCreateReservation {
    #[serde(flatten)]
    #[validate(nested)]
    pub reservation: CreateReservation,
    pub status: Option<ReservationStatus>,
}

/// Update reservation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateReservation {
    #[validate(length(min = 1, max = 100))]
    pub customer_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: Option<String>,
    #[validate(length(max = 30))]
    pub customer_phone: Option<String>,
    pub reservation_date: Option<DateKey>,
    /// HH:MM
    pub reservation_time: Option<String>,
    #[validate(range(min = 1, max = 50))]
    pub party_size: Option<i32>,
    pub status: Option<ReservationStatus>,
    #[validate(length(max = 1000))]
    pub special_requests: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReservationStatus {
    pub status: ReservationStatus,
}

/// Query parameters for the admin reservation listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ReservationQuery {
    /// From this day (YYYY-MM-DD)
    #[param(value_type = Option<String>)]
    pub start_date: Option<DateKey>,
    /// Until this day, inclusive (YYYY-MM-DD)
    #[param(value_type = Option<String>)]
    pub end_date: Option<DateKey>,
    pub status: Option<ReservationStatus>,
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Items per page
    pub per_page: Option<i64>,
}

/// Raw row of `get_reservation_counts_by_date`; the date comes back as text
#[derive(Debug, Clone, FromRow)]
pub struct ReservationCountRow {
    pub reservation_date: String,
    pub reservation_count: i64,
}

/// Parse a reservation time given as HH:MM (HH:MM:SS also accepted)
pub fn parse_reservation_time(raw: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid reservation_time '{}' (use HH:MM)", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reservation_time() {
        assert_eq!(parse_reservation_time("18:30").unwrap(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(parse_reservation_time("11:00:00").unwrap(), NaiveTime::from_hms_opt(11, 0, 0).unwrap());
        assert!(parse_reservation_time("25:00").is_err());
        assert!(parse_reservation_time("evening").is_err());
    }

    #[test]
    fn test_cancelled_does_not_count() {
        assert!(ReservationStatus::Pending.counts_against_capacity());
        assert!(ReservationStatus::Approved.counts_against_capacity());
        assert!(!ReservationStatus::Cancelled.counts_against_capacity());
    }

    #[test]
    fn test_create_reservation_validation() {
        let mut req = CreateReservation {
            customer_name: "Sato".to_string(),
            customer_email: "sato@example.com".to_string(),
            customer_phone: None,
            reservation_date: DateKey::from_local_parts(2025, 6, 13).unwrap(),
            reservation_time: "18:30".to_string(),
            party_size: 2,
            special_requests: None,
        };
        assert!(req.validate().is_ok());

        req.party_size = 0;
        assert!(req.validate().is_err());

        req.party_size = 2;
        req.customer_email = "not-an-email".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_status_serde() {
        let status: ReservationStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, ReservationStatus::Cancelled);
        assert_eq!(serde_json::to_string(&ReservationStatus::Approved).unwrap(), "\"approved\"");
    }

    #[test]
    fn test_request_date_must_be_canonical() {
        let body = |date: &str| {
            format!(
                r#"{{"customer_name":"Sato","customer_email":"sato@example.com","reservation_date":"{}","reservation_time":"18:30","party_size":2}}"#,
                date
            )
        };

        let ok: CreateReservation = serde_json::from_str(&body("2025-06-14")).unwrap();
        assert_eq!(ok.reservation_date, DateKey::from_local_parts(2025, 6, 14).unwrap());

        assert!(serde_json::from_str::<CreateReservation>(&body("2025-06-13T15:00:00.000Z")).is_err());
    }
}
