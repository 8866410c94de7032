//! Closure rule models (recurring weekdays, periods, blocked dates)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::availability::DateKey;

// ---------------------------------------------------------------------------
// RecurringClosure
// ---------------------------------------------------------------------------

/// A weekly closing day (e.g. "closed every Tuesday")
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RecurringClosure {
    pub id: Uuid,
    /// Day of week (0=Sunday, 6=Saturday)
    pub day_of_week: i16,
    pub reason: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create recurring closure request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRecurringClosure {
    /// Day of week (0=Sunday, 6=Saturday)
    #[validate(range(min = 0, max = 6, message = "day_of_week must be between 0 (Sunday) and 6 (Saturday)"))]
    pub day_of_week: i16,
    #[validate(length(max = 200))]
    pub reason: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

/// Update recurring closure request (also used to toggle `is_active`)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRecurringClosure {
    #[validate(range(min = 0, max = 6, message = "day_of_week must be between 0 (Sunday) and 6 (Saturday)"))]
    pub day_of_week: Option<i16>,
    #[validate(length(max = 200))]
    pub reason: Option<String>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// PeriodClosure
// ---------------------------------------------------------------------------

/// A contiguous closed range, both ends inclusive (holidays, renovation)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PeriodClosure {
    pub id: Uuid,
    pub start_date: DateKey,
    pub end_date: DateKey,
    pub reason: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create period closure request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePeriodClosure {
    /// First closed day (YYYY-MM-DD)
    pub start_date: DateKey,
    /// Last closed day, inclusive (YYYY-MM-DD)
    pub end_date: DateKey,
    #[validate(length(min = 1, max = 200, message = "reason is required"))]
    pub reason: String,
    /// Defaults to true
    pub is_active: Option<bool>,
}

/// Update period closure request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePeriodClosure {
    pub start_date: Option<DateKey>,
    pub end_date: Option<DateKey>,
    #[validate(length(min = 1, max = 200, message = "reason must not be empty"))]
    pub reason: Option<String>,
    pub is_active: Option<bool>,
}

// ---------------------------------------------------------------------------
// BlockedDate
// ---------------------------------------------------------------------------

/// A single ad-hoc closed day
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BlockedDate {
    pub id: Uuid,
    pub blocked_date: DateKey,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create blocked date request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBlockedDate {
    /// Blocked day (YYYY-MM-DD)
    pub blocked_date: DateKey,
    #[validate(length(max = 200))]
    pub reason: Option<String>,
}

/// Query parameters for closure listings
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ClosureQuery {
    /// Only rules touching dates from this day (YYYY-MM-DD)
    #[param(value_type = Option<String>)]
    pub start_date: Option<DateKey>,
    /// Only rules touching dates until this day (YYYY-MM-DD)
    #[param(value_type = Option<String>)]
    pub end_date: Option<DateKey>,
}
