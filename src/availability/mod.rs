//! Reservation availability engine.
//!
//! Everything in here is pure except [`window::AvailabilityWindowBuilder`],
//! which only awaits the injected [`window::AvailabilityDataSource`].

pub mod capacity;
pub mod closure_rules;
pub mod date_key;
pub mod resolver;
pub mod window;

pub use capacity::{is_at_capacity, CapacityPolicy, ReservationCounts};
pub use closure_rules::{
    is_blocked, is_closed_by_period, is_closed_by_weekday, ClosureReason, ClosureRules,
    ClosureSource,
};
pub use date_key::{DateKey, DateKeyError};
pub use resolver::{resolve, AvailabilityContext, AvailabilityOutcome, LeadTimeRule};
pub use window::{
    compute_window, AvailabilityDataSource, AvailabilitySettings, AvailabilityWindow,
    AvailabilityWindowBuilder, DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS,
};
