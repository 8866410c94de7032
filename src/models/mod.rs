//! Data models for Tavola

pub mod auth;
pub mod closure;
pub mod reservation;

// Re-export commonly used types
pub use closure::{BlockedDate, PeriodClosure, RecurringClosure};
pub use reservation::{Reservation, ReservationStatus};
