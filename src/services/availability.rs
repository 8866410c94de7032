//! Availability queries backed by the window builder and the Redis cache

use std::sync::Arc;

use chrono::{FixedOffset, Local, Utc};

use crate::{
    availability::{
        AvailabilityDataSource, AvailabilityOutcome, AvailabilitySettings, AvailabilityWindow,
        AvailabilityWindowBuilder, DateKey, ReservationCounts, MAX_HORIZON_DAYS,
    },
    error::{AppError, AppResult},
};

use super::cache::WindowCache;

#[derive(Clone)]
pub struct AvailabilityService {
    source: Arc<dyn AvailabilityDataSource>,
    builder: Arc<AvailabilityWindowBuilder<Arc<dyn AvailabilityDataSource>>>,
    cache: Option<Arc<dyn WindowCache>>,
    offset: Option<FixedOffset>,
}

impl AvailabilityService {
    pub fn new(
        source: Arc<dyn AvailabilityDataSource>,
        settings: AvailabilitySettings,
        cache: Option<Arc<dyn WindowCache>>,
        offset: Option<FixedOffset>,
    ) -> Self {
        Self {
            builder: Arc::new(AvailabilityWindowBuilder::new(Arc::clone(&source), settings)),
            source,
            cache,
            offset,
        }
    }

    pub fn settings(&self) -> &AvailabilitySettings {
        self.builder.settings()
    }

    /// Today's calendar day in the restaurant's zone
    pub fn today(&self) -> DateKey {
        match self.offset {
            Some(offset) => DateKey::from_native_local_date(&Utc::now().with_timezone(&offset)),
            None => DateKey::from_native_local_date(&Local::now()),
        }
    }

    /// Rolling window from today; the configured horizon when none is given.
    pub async fn window(&self, horizon_days: Option<u32>) -> AppResult<AvailabilityWindow> {
        let horizon_days = horizon_days.unwrap_or(self.settings().horizon_days);
        if horizon_days > MAX_HORIZON_DAYS {
            return Err(AppError::Validation(format!(
                "horizon_days must be at most {}",
                MAX_HORIZON_DAYS
            )));
        }

        let today = self.today();

        // Read before building; see services::cache.
        let cached = match &self.cache {
            Some(cache) => cache.generation().await.map(|generation| (cache, generation)),
            None => None,
        };

        if let Some((cache, generation)) = cached {
            if let Some(window) = cache.get_window(today, horizon_days, generation).await {
                tracing::debug!(%today, horizon_days, generation, "Availability window served from cache");
                return Ok(window);
            }
        }

        let window = self.builder.build_with_horizon(today, horizon_days).await?;

        if let Some((cache, generation)) = cached {
            cache.put_window(&window, generation).await;
        }

        Ok(window)
    }

    /// Outcome of one date relative to today
    pub async fn check_date(&self, date: DateKey) -> AppResult<AvailabilityOutcome> {
        self.builder.resolve_date(self.today(), date).await
    }

    pub async fn is_business_day(&self, date: DateKey) -> AppResult<bool> {
        self.builder.is_business_day(date).await
    }

    /// Non-cancelled reservation counts per date over `[start, end]`, at most
    /// [`MAX_HORIZON_DAYS`] days long.
    pub async fn counts(&self, start: DateKey, end: DateKey) -> AppResult<ReservationCounts> {
        if end < start {
            return Err(AppError::Validation(format!(
                "end_date {} is before start_date {}",
                end, start
            )));
        }
        if end.days_since(start) >= i64::from(MAX_HORIZON_DAYS) {
            return Err(AppError::Validation(format!(
                "date range must cover at most {} days",
                MAX_HORIZON_DAYS
            )));
        }
        self.source.reservation_counts(start, end).await
    }

    /// Drop cached windows after a closure or reservation change
    pub async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate().await;
        }
    }
}
