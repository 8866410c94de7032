//! Booking policy row read by the SQL `is_reservation_available` function

use sqlx::{Pool, Postgres};

use crate::{
    availability::AvailabilitySettings,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Overwrite the single policy row with the running configuration
    pub async fn store_reservation_policy(
        &self,
        settings: &AvailabilitySettings,
        utc_offset_minutes: Option<i32>,
    ) -> AppResult<()> {
        let lead_days = i32::try_from(settings.lead_time.lead_days).map_err(|_| {
            AppError::Validation(format!("lead_days too large: {}", settings.lead_time.lead_days))
        })?;

        sqlx::query(
            r#"
            INSERT INTO reservation_settings (id, lead_days, max_per_day, utc_offset_minutes, updated_at)
            VALUES (true, $1, $2, $3, now())
            ON CONFLICT (id) DO UPDATE
            SET lead_days = EXCLUDED.lead_days,
                max_per_day = EXCLUDED.max_per_day,
                utc_offset_minutes = EXCLUDED.utc_offset_minutes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(lead_days)
        .bind(i64::from(settings.policy.max_per_day()))
        .bind(utc_offset_minutes)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
