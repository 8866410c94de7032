//! Explicit closure rules: weekly weekdays, date ranges and single blocked days.
//!
//! All lookups are pure scans over the collections handed in. The store
//! that loads them lives in the repository layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::DateKey;
use crate::models::closure::{BlockedDate, PeriodClosure, RecurringClosure};

/// Which rule set closed a date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClosureSource {
    Blocked,
    Period,
    Weekday,
}

/// First matching closure for user-facing messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClosureReason {
    pub source: ClosureSource,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodCheck {
    pub closed: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockedCheck {
    pub blocked: bool,
    pub reason: Option<String>,
}

/// True iff an active rule falls on the weekday of `date` (0 = Sunday).
pub fn is_closed_by_weekday(date: DateKey, rules: &[RecurringClosure]) -> bool {
    weekday_rule(date, rules).is_some()
}

/// True iff an active rule has `start_date <= date <= end_date`.
pub fn is_closed_by_period(date: DateKey, rules: &[PeriodClosure]) -> PeriodCheck {
    match rules
        .iter()
        .find(|r| r.is_active && r.start_date <= date && date <= r.end_date)
    {
        Some(rule) => PeriodCheck {
            closed: true,
            reason: Some(rule.reason.clone()),
        },
        None => PeriodCheck::default(),
    }
}

/// True iff some blocked date equals `date`. Blocked dates have no active flag.
pub fn is_blocked(date: DateKey, rules: &[BlockedDate]) -> BlockedCheck {
    match rules.iter().find(|r| r.blocked_date == date) {
        Some(rule) => BlockedCheck {
            blocked: true,
            reason: rule.reason.clone(),
        },
        None => BlockedCheck::default(),
    }
}

fn weekday_rule(date: DateKey, rules: &[RecurringClosure]) -> Option<&RecurringClosure> {
    let weekday = i16::from(date.weekday_from_sunday());
    rules.iter().find(|r| r.is_active && r.day_of_week == weekday)
}

/// The three rule sets, loaded together for one evaluation pass
#[derive(Debug, Clone, Default)]
pub struct ClosureRules {
    pub recurring: Vec<RecurringClosure>,
    pub periods: Vec<PeriodClosure>,
    pub blocked: Vec<BlockedDate>,
}

impl ClosureRules {
    pub fn new(
        recurring: Vec<RecurringClosure>,
        periods: Vec<PeriodClosure>,
        blocked: Vec<BlockedDate>,
    ) -> Self {
        Self { recurring, periods, blocked }
    }

    /// Reason reported in fixed priority order: blocked, period, weekday.
    pub fn closure_reason(&self, date: DateKey) -> Option<ClosureReason> {
        closure_reason(date, &self.recurring, &self.periods, &self.blocked)
    }

    /// Open according to every closure rule (capacity not considered).
    pub fn is_business_day(&self, date: DateKey) -> bool {
        self.closure_reason(date).is_none()
    }
}

/// Logical OR of the three checks; when several fire, blocked wins, then
/// period, then weekday.
pub fn closure_reason(
    date: DateKey,
    recurring: &[RecurringClosure],
    periods: &[PeriodClosure],
    blocked: &[BlockedDate],
) -> Option<ClosureReason> {
    let block = is_blocked(date, blocked);
    if block.blocked {
        return Some(ClosureReason {
            source: ClosureSource::Blocked,
            reason: block.reason,
        });
    }

    let period = is_closed_by_period(date, periods);
    if period.closed {
        return Some(ClosureReason {
            source: ClosureSource::Period,
            reason: period.reason,
        });
    }

    weekday_rule(date, recurring).map(|rule| ClosureReason {
        source: ClosureSource::Weekday,
        reason: rule.reason.clone(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    pub fn date(raw: &str) -> DateKey {
        DateKey::parse_canonical(raw).unwrap()
    }

    pub fn weekly(day_of_week: i16, is_active: bool) -> RecurringClosure {
        RecurringClosure {
            id: Uuid::new_v4(),
            day_of_week,
            reason: Some("定休日".to_string()),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn period(start: &str, end: &str, reason: &str, is_active: bool) -> PeriodClosure {
        PeriodClosure {
            id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            reason: reason.to_string(),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn blocked(day: &str, reason: Option<&str>) -> BlockedDate {
        BlockedDate {
            id: Uuid::new_v4(),
            blocked_date: date(day),
            reason: reason.map(str::to_string),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_weekday_rule_matches_sunday_based_index() {
        // 2025-03-04 is a Tuesday
        let rules = vec![weekly(2, true)];
        assert!(is_closed_by_weekday(date("2025-03-04"), &rules));
        assert!(is_closed_by_weekday(date("2025-03-11"), &rules));
        assert!(!is_closed_by_weekday(date("2025-03-05"), &rules));
    }

    #[test]
    fn test_inactive_weekday_rule_is_ignored() {
        let rules = vec![weekly(2, false)];
        assert!(!is_closed_by_weekday(date("2025-03-04"), &rules));
    }

    #[test]
    fn test_period_is_inclusive_on_both_ends() {
        let rules = vec![period("2025-12-29", "2026-01-03", "年末年始", true)];
        assert!(!is_closed_by_period(date("2025-12-28"), &rules).closed);
        assert!(is_closed_by_period(date("2025-12-29"), &rules).closed);
        assert!(is_closed_by_period(date("2026-01-01"), &rules).closed);
        let last = is_closed_by_period(date("2026-01-03"), &rules);
        assert!(last.closed);
        assert_eq!(last.reason.as_deref(), Some("年末年始"));
        assert!(!is_closed_by_period(date("2026-01-04"), &rules).closed);
    }

    #[test]
    fn test_inactive_period_is_ignored() {
        let rules = vec![period("2025-08-10", "2025-08-16", "改装", false)];
        assert_eq!(is_closed_by_period(date("2025-08-12"), &rules), PeriodCheck::default());
    }

    #[test]
    fn test_blocked_date() {
        let rules = vec![blocked("2025-03-05", Some("貸切")), blocked("2025-03-20", None)];
        let hit = is_blocked(date("2025-03-05"), &rules);
        assert!(hit.blocked);
        assert_eq!(hit.reason.as_deref(), Some("貸切"));
        assert!(is_blocked(date("2025-03-20"), &rules).blocked);
        assert!(!is_blocked(date("2025-03-06"), &rules).blocked);
    }

    #[test]
    fn test_reason_priority_blocked_then_period_then_weekday() {
        // Tuesday, inside a period, and blocked
        let day = date("2025-03-04");
        let recurring = vec![weekly(2, true)];
        let periods = vec![period("2025-03-01", "2025-03-10", "改装", true)];
        let blocks = vec![blocked("2025-03-04", Some("貸切"))];

        let reason = closure_reason(day, &recurring, &periods, &blocks).unwrap();
        assert_eq!(reason.source, ClosureSource::Blocked);

        let reason = closure_reason(day, &recurring, &periods, &[]).unwrap();
        assert_eq!(reason.source, ClosureSource::Period);
        assert_eq!(reason.reason.as_deref(), Some("改装"));

        let reason = closure_reason(day, &recurring, &[], &[]).unwrap();
        assert_eq!(reason.source, ClosureSource::Weekday);

        assert!(closure_reason(day, &[], &[], &[]).is_none());
    }

    #[test]
    fn test_business_day_is_or_of_all_rules() {
        let rules = ClosureRules::new(
            vec![weekly(2, false)],
            vec![],
            vec![blocked("2025-03-04", None)],
        );
        // Weekday rule is off but the day is still blocked.
        assert!(!rules.is_business_day(date("2025-03-04")));
        assert!(rules.is_business_day(date("2025-03-11")));
    }
}
