//! Single-date availability decision.
//!
//! [`resolve`] is a pure function of the date and an [`AvailabilityContext`]
//! holding everything already fetched. Checks run in a fixed order and the
//! first match decides the outcome:
//!
//! 1. past date
//! 2. inside the phone-only lead window
//! 3. closed by a blocked / period / weekday rule
//! 4. at capacity
//! 5. available

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    capacity::{is_at_capacity, CapacityPolicy, ReservationCounts},
    closure_rules::{closure_reason, ClosureReason, ClosureRules},
    DateKey,
};
use crate::models::closure::{BlockedDate, PeriodClosure, RecurringClosure};

/// Number of days, starting today, for which online booking is refused.
///
/// `0` allows same-day online booking. No `Default`: the value comes from
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeadTimeRule {
    pub lead_days: u32,
}

impl LeadTimeRule {
    pub fn new(lead_days: u32) -> Self {
        Self { lead_days }
    }

    /// `0 <= date - today < lead_days`
    pub fn contains(&self, date: DateKey, today: DateKey) -> bool {
        let ahead = date.days_since(today);
        ahead >= 0 && ahead < i64::from(self.lead_days)
    }
}

/// Terminal state of one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AvailabilityOutcome {
    Available,
    PastDate,
    InLeadWindow,
    ClosedByRule(ClosureReason),
    AtCapacity,
}

impl AvailabilityOutcome {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityOutcome::Available)
    }

    /// Short explanation suitable for a disabled calendar cell or an error body.
    pub fn describe(&self) -> String {
        match self {
            AvailabilityOutcome::Available => "available".to_string(),
            AvailabilityOutcome::PastDate => "date is in the past".to_string(),
            AvailabilityOutcome::InLeadWindow => {
                "date is too close for online booking, please reserve by phone".to_string()
            }
            AvailabilityOutcome::ClosedByRule(closure) => match &closure.reason {
                Some(reason) => format!("closed: {}", reason),
                None => "closed".to_string(),
            },
            AvailabilityOutcome::AtCapacity => "fully booked".to_string(),
        }
    }
}

/// Pre-fetched inputs for [`resolve`]
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityContext<'a> {
    pub today: DateKey,
    pub lead_time: LeadTimeRule,
    pub recurring: &'a [RecurringClosure],
    pub periods: &'a [PeriodClosure],
    pub blocked: &'a [BlockedDate],
    pub counts: &'a ReservationCounts,
    pub policy: CapacityPolicy,
}

impl<'a> AvailabilityContext<'a> {
    pub fn new(
        today: DateKey,
        lead_time: LeadTimeRule,
        rules: &'a ClosureRules,
        counts: &'a ReservationCounts,
        policy: CapacityPolicy,
    ) -> Self {
        Self {
            today,
            lead_time,
            recurring: &rules.recurring,
            periods: &rules.periods,
            blocked: &rules.blocked,
            counts,
            policy,
        }
    }
}

/// Decide availability for `date`. No I/O.
pub fn resolve(date: DateKey, ctx: &AvailabilityContext<'_>) -> AvailabilityOutcome {
    if date < ctx.today {
        return AvailabilityOutcome::PastDate;
    }

    if ctx.lead_time.contains(date, ctx.today) {
        return AvailabilityOutcome::InLeadWindow;
    }

    if let Some(reason) = closure_reason(date, ctx.recurring, ctx.periods, ctx.blocked) {
        return AvailabilityOutcome::ClosedByRule(reason);
    }

    if is_at_capacity(date, ctx.counts, &ctx.policy) {
        return AvailabilityOutcome::AtCapacity;
    }

    AvailabilityOutcome::Available
}
