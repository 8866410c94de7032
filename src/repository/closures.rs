//! Closure rules repository (recurring weekdays, periods, blocked dates)

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    availability::{ClosureRules, DateKey},
    error::{AppError, AppResult},
    models::closure::{
        BlockedDate, CreateBlockedDate, CreatePeriodClosure, CreateRecurringClosure,
        PeriodClosure, RecurringClosure, UpdatePeriodClosure, UpdateRecurringClosure,
    },
};

#[derive(Clone)]
pub struct ClosuresRepository {
    pool: Pool<Postgres>,
}

impl ClosuresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All three rule sets that can affect `[start, end]`, fetched concurrently.
    pub async fn rules_for_range(&self, start: DateKey, end: DateKey) -> AppResult<ClosureRules> {
        let (recurring, periods, blocked) = tokio::try_join!(
            self.list_recurring(),
            self.list_periods(Some(start), Some(end)),
            self.list_blocked(Some(start), Some(end)),
        )?;
        Ok(ClosureRules::new(recurring, periods, blocked))
    }

    // ---- Recurring ----

    /// List weekly closing days, ordered by weekday
    pub async fn list_recurring(&self) -> AppResult<Vec<RecurringClosure>> {
        let rows = sqlx::query_as::<_, RecurringClosure>(
            "SELECT * FROM recurring_closed_days ORDER BY day_of_week, created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_recurring(&self, id: Uuid) -> AppResult<RecurringClosure> {
        sqlx::query_as::<_, RecurringClosure>("SELECT * FROM recurring_closed_days WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recurring closure {} not found", id)))
    }

    pub async fn create_recurring(&self, data: &CreateRecurringClosure) -> AppResult<RecurringClosure> {
        let row = sqlx::query_as::<_, RecurringClosure>(
            r#"
            INSERT INTO recurring_closed_days (day_of_week, reason, is_active)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(data.day_of_week)
        .bind(&data.reason)
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_recurring(
        &self,
        id: Uuid,
        data: &UpdateRecurringClosure,
    ) -> AppResult<RecurringClosure> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        if data.day_of_week.is_some() { sets.push(format!("day_of_week = ${}", idx)); idx += 1; }
        if data.reason.is_some() { sets.push(format!("reason = ${}", idx)); idx += 1; }
        if data.is_active.is_some() { sets.push(format!("is_active = ${}", idx)); idx += 1; }

        let query = format!(
            "UPDATE recurring_closed_days SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, RecurringClosure>(&query).bind(Utc::now());
        if let Some(dow) = data.day_of_week { builder = builder.bind(dow); }
        if let Some(ref reason) = data.reason { builder = builder.bind(reason); }
        if let Some(active) = data.is_active { builder = builder.bind(active); }

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recurring closure {} not found", id)))
    }

    pub async fn delete_recurring(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM recurring_closed_days WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Recurring closure {} not found", id)));
        }
        Ok(())
    }

    // ---- Periods ----

    /// List period closures overlapping the optional range, ordered by start_date
    pub async fn list_periods(
        &self,
        start_date: Option<DateKey>,
        end_date: Option<DateKey>,
    ) -> AppResult<Vec<PeriodClosure>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        // A period overlaps [start, end] when it ends on/after start and
        // begins on/before end.
        if start_date.is_some() {
            conditions.push(format!("end_date >= ${}", idx));
            idx += 1;
        }
        if end_date.is_some() {
            conditions.push(format!("start_date <= ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM period_closures {} ORDER BY start_date",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, PeriodClosure>(&query);
        if let Some(sd) = start_date { builder = builder.bind(sd); }
        if let Some(ed) = end_date { builder = builder.bind(ed); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn get_period(&self, id: Uuid) -> AppResult<PeriodClosure> {
        sqlx::query_as::<_, PeriodClosure>("SELECT * FROM period_closures WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Period closure {} not found", id)))
    }

    pub async fn create_period(&self, data: &CreatePeriodClosure) -> AppResult<PeriodClosure> {
        let row = sqlx::query_as::<_, PeriodClosure>(
            r#"
            INSERT INTO period_closures (start_date, end_date, reason, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.reason.trim())
        .bind(data.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(period_write_error)?;
        Ok(row)
    }

    pub async fn update_period(&self, id: Uuid, data: &UpdatePeriodClosure) -> AppResult<PeriodClosure> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        if data.start_date.is_some() { sets.push(format!("start_date = ${}", idx)); idx += 1; }
        if data.end_date.is_some() { sets.push(format!("end_date = ${}", idx)); idx += 1; }
        if data.reason.is_some() { sets.push(format!("reason = ${}", idx)); idx += 1; }
        if data.is_active.is_some() { sets.push(format!("is_active = ${}", idx)); idx += 1; }

        let query = format!(
            "UPDATE period_closures SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, PeriodClosure>(&query).bind(Utc::now());
        if let Some(sd) = data.start_date { builder = builder.bind(sd); }
        if let Some(ed) = data.end_date { builder = builder.bind(ed); }
        if let Some(ref reason) = data.reason { builder = builder.bind(reason.trim().to_string()); }
        if let Some(active) = data.is_active { builder = builder.bind(active); }

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(period_write_error)?
            .ok_or_else(|| AppError::NotFound(format!("Period closure {} not found", id)))
    }

    pub async fn delete_period(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM period_closures WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Period closure {} not found", id)));
        }
        Ok(())
    }

    // ---- Blocked dates ----

    /// List blocked dates, optionally filtered by date range
    pub async fn list_blocked(
        &self,
        start_date: Option<DateKey>,
        end_date: Option<DateKey>,
    ) -> AppResult<Vec<BlockedDate>> {
        let mut conditions = Vec::new();
        let mut idx = 1;

        if start_date.is_some() {
            conditions.push(format!("blocked_date >= ${}", idx));
            idx += 1;
        }
        if end_date.is_some() {
            conditions.push(format!("blocked_date <= ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT * FROM blocked_dates {} ORDER BY blocked_date",
            where_clause
        );

        let mut builder = sqlx::query_as::<_, BlockedDate>(&query);
        if let Some(sd) = start_date { builder = builder.bind(sd); }
        if let Some(ed) = end_date { builder = builder.bind(ed); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn create_blocked(&self, data: &CreateBlockedDate) -> AppResult<BlockedDate> {
        let row = sqlx::query_as::<_, BlockedDate>(
            "INSERT INTO blocked_dates (blocked_date, reason) VALUES ($1, $2) RETURNING *",
        )
        .bind(data.blocked_date)
        .bind(&data.reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("{} is already blocked", data.blocked_date))
            }
            _ => AppError::Database(e),
        })?;
        Ok(row)
    }

    pub async fn delete_blocked(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM blocked_dates WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Blocked date {} not found", id)));
        }
        Ok(())
    }
}

/// A period that trips the table's CHECK constraints (for instance after a
/// concurrent edit of the other bound) is a bad request, not a server error.
fn period_write_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_check_violation() => {
            AppError::Validation(format!("Invalid period closure: {}", db.message()))
        }
        _ => AppError::Database(e),
    }
}
