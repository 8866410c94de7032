//! Closure administration (weekly closing days, closed periods, blocked dates)

use uuid::Uuid;
use validator::Validate;

use crate::{
    availability::DateKey,
    error::{AppError, AppResult},
    models::closure::{
        BlockedDate, ClosureQuery, CreateBlockedDate, CreatePeriodClosure, CreateRecurringClosure,
        PeriodClosure, RecurringClosure, UpdatePeriodClosure, UpdateRecurringClosure,
    },
    repository::Repository,
};

use super::availability::AvailabilityService;

#[derive(Clone)]
pub struct ClosuresService {
    repository: Repository,
    availability: AvailabilityService,
}

impl ClosuresService {
    pub fn new(repository: Repository, availability: AvailabilityService) -> Self {
        Self { repository, availability }
    }

    // ---- Recurring ----

    pub async fn list_recurring(&self) -> AppResult<Vec<RecurringClosure>> {
        self.repository.closures.list_recurring().await
    }

    pub async fn create_recurring(&self, data: &CreateRecurringClosure) -> AppResult<RecurringClosure> {
        data.validate()?;
        let closure = self.repository.closures.create_recurring(data).await?;
        tracing::info!(id = %closure.id, day_of_week = closure.day_of_week, "Recurring closure created");
        self.availability.invalidate().await;
        Ok(closure)
    }

    /// Update or toggle a weekly closing day
    pub async fn update_recurring(
        &self,
        id: Uuid,
        data: &UpdateRecurringClosure,
    ) -> AppResult<RecurringClosure> {
        data.validate()?;
        let closure = self.repository.closures.update_recurring(id, data).await?;
        tracing::info!(id = %id, is_active = closure.is_active, "Recurring closure updated");
        self.availability.invalidate().await;
        Ok(closure)
    }

    pub async fn delete_recurring(&self, id: Uuid) -> AppResult<()> {
        self.repository.closures.delete_recurring(id).await?;
        tracing::info!(id = %id, "Recurring closure deleted");
        self.availability.invalidate().await;
        Ok(())
    }

    // ---- Periods ----

    pub async fn list_periods(&self, query: &ClosureQuery) -> AppResult<Vec<PeriodClosure>> {
        check_range(query.start_date, query.end_date)?;
        self.repository
            .closures
            .list_periods(query.start_date, query.end_date)
            .await
    }

    pub async fn create_period(&self, data: &CreatePeriodClosure) -> AppResult<PeriodClosure> {
        data.validate()?;
        validate_period(data.start_date, data.end_date, &data.reason)?;
        let period = self.repository.closures.create_period(data).await?;
        tracing::info!(
            id = %period.id,
            start = %period.start_date,
            end = %period.end_date,
            "Period closure created"
        );
        self.availability.invalidate().await;
        Ok(period)
    }

    /// Partial update; the range is checked against the stored values it keeps.
    pub async fn update_period(&self, id: Uuid, data: &UpdatePeriodClosure) -> AppResult<PeriodClosure> {
        data.validate()?;
        let existing = self.repository.closures.get_period(id).await?;
        validate_period(
            data.start_date.unwrap_or(existing.start_date),
            data.end_date.unwrap_or(existing.end_date),
            data.reason.as_deref().unwrap_or(&existing.reason),
        )?;

        let period = self.repository.closures.update_period(id, data).await?;
        tracing::info!(id = %id, is_active = period.is_active, "Period closure updated");
        self.availability.invalidate().await;
        Ok(period)
    }

    pub async fn delete_period(&self, id: Uuid) -> AppResult<()> {
        self.repository.closures.delete_period(id).await?;
        tracing::info!(id = %id, "Period closure deleted");
        self.availability.invalidate().await;
        Ok(())
    }

    // ---- Blocked dates ----

    pub async fn list_blocked(&self, query: &ClosureQuery) -> AppResult<Vec<BlockedDate>> {
        check_range(query.start_date, query.end_date)?;
        self.repository
            .closures
            .list_blocked(query.start_date, query.end_date)
            .await
    }

    pub async fn create_blocked(&self, data: &CreateBlockedDate) -> AppResult<BlockedDate> {
        data.validate()?;
        let blocked = self.repository.closures.create_blocked(data).await?;
        tracing::info!(id = %blocked.id, date = %blocked.blocked_date, "Blocked date created");
        self.availability.invalidate().await;
        Ok(blocked)
    }

    pub async fn delete_blocked(&self, id: Uuid) -> AppResult<()> {
        self.repository.closures.delete_blocked(id).await?;
        tracing::info!(id = %id, "Blocked date deleted");
        self.availability.invalidate().await;
        Ok(())
    }
}

/// A period must not end before it starts and needs a non-blank reason.
pub fn validate_period(start: DateKey, end: DateKey, reason: &str) -> AppResult<()> {
    if end < start {
        return Err(AppError::Validation(format!(
            "end_date {} is before start_date {}",
            end, start
        )));
    }
    if reason.trim().is_empty() {
        return Err(AppError::Validation("reason is required".to_string()));
    }
    Ok(())
}

fn check_range(start: Option<DateKey>, end: Option<DateKey>) -> AppResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(AppError::Validation(format!(
            "end_date {} is before start_date {}",
            e, s
        ))),
        _ => Ok(()),
    }
}
