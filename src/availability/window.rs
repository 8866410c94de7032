//! Rolling availability window for calendar rendering.
//!
//! The builder issues one ranged fetch for the closure rules and one for the
//! reservation counts, concurrently, then resolves every day of the window
//! in memory. A failed fetch fails the whole window: no date is reported
//! available from partial data.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    capacity::{CapacityPolicy, ReservationCounts},
    closure_rules::ClosureRules,
    resolver::{resolve, AvailabilityContext, AvailabilityOutcome, LeadTimeRule},
    DateKey,
};
use crate::error::AppResult;

pub const DEFAULT_HORIZON_DAYS: u32 = 90;

/// Longest window a caller may request
pub const MAX_HORIZON_DAYS: u32 = 366;

/// Where the builder gets its inputs from.
///
/// Both calls cover an inclusive date range and must cost a single round
/// trip each, whatever the length of the range.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityDataSource: Send + Sync {
    /// Active and inactive closure rules that can touch `[start, end]`.
    async fn closure_rules(&self, start: DateKey, end: DateKey) -> AppResult<ClosureRules>;

    /// Non-cancelled reservation counts per date in `[start, end]`.
    async fn reservation_counts(&self, start: DateKey, end: DateKey) -> AppResult<ReservationCounts>;
}

#[async_trait]
impl<T: AvailabilityDataSource + ?Sized> AvailabilityDataSource for Arc<T> {
    async fn closure_rules(&self, start: DateKey, end: DateKey) -> AppResult<ClosureRules> {
        (**self).closure_rules(start, end).await
    }

    async fn reservation_counts(&self, start: DateKey, end: DateKey) -> AppResult<ReservationCounts> {
        (**self).reservation_counts(start, end).await
    }
}

/// Engine parameters taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilitySettings {
    pub lead_time: LeadTimeRule,
    pub policy: CapacityPolicy,
    pub horizon_days: u32,
}

/// Available dates plus the outcome of every date in the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityWindow {
    pub today: DateKey,
    pub horizon_days: u32,
    /// Sorted canonical date strings
    #[schema(value_type = Vec<String>)]
    pub available: BTreeSet<DateKey>,
    #[schema(value_type = BTreeMap<String, AvailabilityOutcome>)]
    pub outcomes: BTreeMap<DateKey, AvailabilityOutcome>,
}

impl AvailabilityWindow {
    pub fn empty(today: DateKey, horizon_days: u32) -> Self {
        Self {
            today,
            horizon_days,
            available: BTreeSet::new(),
            outcomes: BTreeMap::new(),
        }
    }

    pub fn is_available(&self, date: DateKey) -> bool {
        self.available.contains(&date)
    }

    pub fn outcome(&self, date: DateKey) -> Option<&AvailabilityOutcome> {
        self.outcomes.get(&date)
    }
}

/// Resolve `[today, today + horizon_days)` against already fetched inputs.
///
/// A day whose date cannot be computed is logged and left out, so it is
/// never available; the rest of the window is unaffected.
pub fn compute_window(
    today: DateKey,
    horizon_days: u32,
    lead_time: LeadTimeRule,
    rules: &ClosureRules,
    counts: &ReservationCounts,
    policy: CapacityPolicy,
) -> AvailabilityWindow {
    let ctx = AvailabilityContext::new(today, lead_time, rules, counts, policy);
    let mut window = AvailabilityWindow::empty(today, horizon_days);

    for offset in 0..horizon_days {
        let Some(date) = today.add_days(offset) else {
            tracing::warn!(%today, offset, "Cannot compute window date, treating as unavailable");
            continue;
        };
        let outcome = resolve(date, &ctx);
        if outcome.is_available() {
            window.available.insert(date);
        }
        window.outcomes.insert(date, outcome);
    }

    window
}

/// Batches data fetches and runs the resolver once per day
pub struct AvailabilityWindowBuilder<S> {
    source: S,
    settings: AvailabilitySettings,
}

impl<S: AvailabilityDataSource> AvailabilityWindowBuilder<S> {
    pub fn new(source: S, settings: AvailabilitySettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &AvailabilitySettings {
        &self.settings
    }

    /// Window over the configured horizon.
    pub async fn build(&self, today: DateKey) -> AppResult<AvailabilityWindow> {
        self.build_with_horizon(today, self.settings.horizon_days).await
    }

    /// Window over `horizon_days` starting today. Errors from either fetch are
    /// returned as is; nothing is retried.
    pub async fn build_with_horizon(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> AppResult<AvailabilityWindow> {
        if horizon_days == 0 {
            return Ok(AvailabilityWindow::empty(today, 0));
        }

        // Last computable day of the window; only near year 9999 does this
        // differ from today + horizon_days - 1.
        let end = (0..horizon_days)
            .rev()
            .find_map(|offset| today.add_days(offset))
            .unwrap_or(today);

        let (rules, counts) = tokio::try_join!(
            self.source.closure_rules(today, end),
            self.source.reservation_counts(today, end),
        )?;

        let window = compute_window(
            today,
            horizon_days,
            self.settings.lead_time,
            &rules,
            &counts,
            self.settings.policy,
        );

        tracing::debug!(
            %today,
            %end,
            horizon_days,
            available = window.available.len(),
            "Availability window built"
        );

        Ok(window)
    }

    /// Outcome of a single date, fetching only that day's data.
    pub async fn resolve_date(&self, today: DateKey, date: DateKey) -> AppResult<AvailabilityOutcome> {
        let (rules, counts) = tokio::try_join!(
            self.source.closure_rules(date, date),
            self.source.reservation_counts(date, date),
        )?;
        let ctx = AvailabilityContext::new(
            today,
            self.settings.lead_time,
            &rules,
            &counts,
            self.settings.policy,
        );
        Ok(resolve(date, &ctx))
    }

    /// Closure rules only: true when no blocked, period or weekday rule fires.
    pub async fn is_business_day(&self, date: DateKey) -> AppResult<bool> {
        let rules = self.source.closure_rules(date, date).await?;
        Ok(rules.is_business_day(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::closure_rules::fixtures::*;
    use crate::error::AppError;

    fn settings(lead_days: u32, horizon_days: u32) -> AvailabilitySettings {
        AvailabilitySettings {
            lead_time: LeadTimeRule::new(lead_days),
            policy: CapacityPolicy::default(),
            horizon_days,
        }
    }

    fn keys(raw: &[&str]) -> BTreeSet<DateKey> {
        raw.iter().map(|d| date(d)).collect()
    }

    #[tokio::test]
    async fn test_window_scenario_weekday_and_block() {
        let mut source = MockAvailabilityDataSource::new();
        let rules = ClosureRules::new(
            vec![weekly(2, true)],
            vec![],
            vec![blocked("2025-03-05", None)],
        );
        source
            .expect_closure_rules()
            .times(1)
            .returning(move |_, _| Ok(rules.clone()));
        source
            .expect_reservation_counts()
            .times(1)
            .returning(|_, _| Ok(ReservationCounts::new()));

        let builder = AvailabilityWindowBuilder::new(source, settings(0, 10));
        let window = builder.build(date("2025-03-01")).await.unwrap();

        assert_eq!(
            window.available,
            keys(&[
                "2025-03-01", "2025-03-02", "2025-03-03", "2025-03-06",
                "2025-03-07", "2025-03-08", "2025-03-09", "2025-03-10",
            ])
        );
        assert_eq!(window.outcomes.len(), 10);
        assert!(matches!(
            window.outcome(date("2025-03-04")),
            Some(AvailabilityOutcome::ClosedByRule(_))
        ));
    }

    #[tokio::test]
    async fn test_window_fetches_once_over_whole_range() {
        let mut source = MockAvailabilityDataSource::new();
        let start = date("2025-06-10");
        let end = date("2025-09-07");
        source
            .expect_closure_rules()
            .withf(move |s, e| *s == start && *e == end)
            .times(1)
            .returning(|_, _| Ok(ClosureRules::default()));
        source
            .expect_reservation_counts()
            .withf(move |s, e| *s == start && *e == end)
            .times(1)
            .returning(|_, _| Ok(ReservationCounts::new()));

        let builder = AvailabilityWindowBuilder::new(source, settings(3, DEFAULT_HORIZON_DAYS));
        let window = builder.build(start).await.unwrap();

        assert_eq!(window.outcomes.len(), 90);
        // Lead window removes the first three days only.
        assert_eq!(window.available.len(), 87);
        assert!(!window.is_available(date("2025-06-12")));
        assert!(window.is_available(date("2025-06-13")));
    }

    #[tokio::test]
    async fn test_window_fails_closed_when_counts_fetch_fails() {
        let mut source = MockAvailabilityDataSource::new();
        source
            .expect_closure_rules()
            .returning(|_, _| Ok(ClosureRules::default()));
        source
            .expect_reservation_counts()
            .returning(|_, _| Err(AppError::Internal("connection reset".to_string())));

        let builder = AvailabilityWindowBuilder::new(source, settings(0, 30));
        let result = builder.build(date("2025-06-10")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_window_fails_closed_when_rules_fetch_fails() {
        let mut source = MockAvailabilityDataSource::new();
        source
            .expect_closure_rules()
            .returning(|_, _| Err(AppError::Internal("timeout".to_string())));
        source
            .expect_reservation_counts()
            .returning(|_, _| Ok(ReservationCounts::new()));

        let builder = AvailabilityWindowBuilder::new(source, settings(0, 30));
        assert!(builder.build(date("2025-06-10")).await.is_err());
    }

    #[tokio::test]
    async fn test_zero_horizon_skips_fetches() {
        let source = MockAvailabilityDataSource::new();
        let builder = AvailabilityWindowBuilder::new(source, settings(0, 0));
        let window = builder.build(date("2025-06-10")).await.unwrap();
        assert!(window.available.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_single_date_uses_one_day_range() {
        let mut source = MockAvailabilityDataSource::new();
        let day = date("2025-06-20");
        source
            .expect_closure_rules()
            .withf(move |s, e| *s == day && *e == day)
            .returning(|_, _| Ok(ClosureRules::default()));
        source
            .expect_reservation_counts()
            .withf(move |s, e| *s == day && *e == day)
            .returning(move |_, _| Ok([(day, 8)].into_iter().collect()));

        let builder = AvailabilityWindowBuilder::new(source, settings(3, 90));
        let outcome = builder.resolve_date(date("2025-06-10"), day).await.unwrap();
        assert_eq!(outcome, AvailabilityOutcome::AtCapacity);
    }

    #[tokio::test]
    async fn test_business_day_ignores_capacity() {
        let mut source = MockAvailabilityDataSource::new();
        source
            .expect_closure_rules()
            .returning(|_, _| Ok(ClosureRules::new(vec![weekly(0, true)], vec![], vec![])));
        source.expect_reservation_counts().never();

        let builder = AvailabilityWindowBuilder::new(source, settings(3, 90));
        // 2025-06-15 is a Sunday
        assert!(!builder.is_business_day(date("2025-06-15")).await.unwrap());
        assert!(builder.is_business_day(date("2025-06-16")).await.unwrap());
    }

    #[test]
    fn test_window_survives_json_round_trip() {
        let rules = ClosureRules::new(
            vec![weekly(2, true)],
            vec![period("2025-03-06", "2025-03-07", "改装", true)],
            vec![blocked("2025-03-05", None)],
        );
        let counts: ReservationCounts = [(date("2025-03-08"), 8)].into_iter().collect();
        let window = compute_window(
            date("2025-03-01"),
            10,
            LeadTimeRule::new(1),
            &rules,
            &counts,
            CapacityPolicy::default(),
        );

        let json = serde_json::to_string(&window).unwrap();
        let back: AvailabilityWindow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, window);
        assert!(matches!(
            back.outcome(date("2025-03-06")),
            Some(AvailabilityOutcome::ClosedByRule(_))
        ));
        assert_eq!(back.outcome(date("2025-03-01")), Some(&AvailabilityOutcome::InLeadWindow));
    }

    #[test]
    fn test_window_outcomes_agree_with_available_set() {
        let rules = ClosureRules::new(
            vec![weekly(1, true)],
            vec![period("2025-07-20", "2025-07-22", "改装", true)],
            vec![],
        );
        let counts: ReservationCounts = [(date("2025-07-10"), 8)].into_iter().collect();
        let window = compute_window(
            date("2025-07-01"),
            31,
            LeadTimeRule::new(2),
            &rules,
            &counts,
            CapacityPolicy::default(),
        );

        for (day, outcome) in &window.outcomes {
            assert_eq!(outcome.is_available(), window.is_available(*day), "{}", day);
        }
        assert_eq!(window.outcome(date("2025-07-10")), Some(&AvailabilityOutcome::AtCapacity));
    }
}
