//! Per-date reservation counts against the daily capacity.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{DateKey, DateKeyError};
use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationCountRow},
};

/// Maximum number of non-cancelled reservations accepted on one date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CapacityPolicy {
    max_per_day: u32,
}

impl CapacityPolicy {
    pub const DEFAULT_MAX_PER_DAY: u32 = 8;

    /// Rejects negative capacities.
    pub fn new(max_per_day: i64) -> AppResult<Self> {
        u32::try_from(max_per_day)
            .map(|max_per_day| Self { max_per_day })
            .map_err(|_| {
                AppError::Validation(format!(
                    "max_per_day must be between 0 and {}, got {}",
                    u32::MAX,
                    max_per_day
                ))
            })
    }

    pub fn max_per_day(&self) -> u32 {
        self.max_per_day
    }
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self { max_per_day: Self::DEFAULT_MAX_PER_DAY }
    }
}

/// Non-cancelled reservation counts keyed by date. Missing dates count as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ReservationCounts {
    #[schema(value_type = BTreeMap<String, u32>)]
    counts: BTreeMap<DateKey, u32>,
}

impl ReservationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the rows of `get_reservation_counts_by_date`.
    ///
    /// Dates go through [`DateKey::normalize_stored_value`]; rows that land
    /// on the same day are summed.
    pub fn from_rows(rows: &[ReservationCountRow]) -> Result<Self, DateKeyError> {
        let mut counts = Self::new();
        for row in rows {
            let date = DateKey::normalize_stored_value(&row.reservation_date)?;
            let count = u32::try_from(row.reservation_count.max(0)).unwrap_or(u32::MAX);
            counts.add(date, count);
        }
        Ok(counts)
    }

    /// Count reservation rows directly, skipping cancelled ones.
    pub fn from_reservations(reservations: &[Reservation]) -> Self {
        reservations
            .iter()
            .filter(|r| r.status.counts_against_capacity())
            .map(|r| (r.reservation_date, 1))
            .collect()
    }

    pub fn add(&mut self, date: DateKey, count: u32) {
        let entry = self.counts.entry(date).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    pub fn get(&self, date: DateKey) -> u32 {
        self.counts.get(&date).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateKey, u32)> + '_ {
        self.counts.iter().map(|(d, c)| (*d, *c))
    }
}

impl FromIterator<(DateKey, u32)> for ReservationCounts {
    fn from_iter<I: IntoIterator<Item = (DateKey, u32)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (date, count) in iter {
            counts.add(date, count);
        }
        counts
    }
}

/// `counts[date] >= max_per_day`
pub fn is_at_capacity(date: DateKey, counts: &ReservationCounts, policy: &CapacityPolicy) -> bool {
    counts.get(date) >= policy.max_per_day()
}
