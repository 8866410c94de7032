//! Reservations repository

use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    availability::{DateKey, ReservationCounts},
    error::{AppError, AppResult},
    models::reservation::{
        CreateReservation, Reservation, ReservationCountRow, ReservationQuery, ReservationStatus,
        UpdateReservation,
    },
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Non-cancelled counts per date over `[start, end]` in a single call.
    ///
    /// The date column is read back as text and normalized, so a driver or
    /// proxy handing out timestamps cannot shift a count onto another day.
    pub async fn counts_by_range(&self, start: DateKey, end: DateKey) -> AppResult<ReservationCounts> {
        let rows = sqlx::query_as::<_, ReservationCountRow>(
            r#"
            SELECT reservation_date::text AS reservation_date, reservation_count
            FROM get_reservation_counts_by_date($1, $2)
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(ReservationCounts::from_rows(&rows)?)
    }
}

/// Reservation persistence used by the reservations service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Filtered page of reservations plus the total matching count
    async fn list(&self, query: &ReservationQuery) -> AppResult<(Vec<Reservation>, i64)>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Reservation>;

    /// Insert a reservation with an already parsed time
    async fn create(
        &self,
        data: &CreateReservation,
        time: NaiveTime,
        status: ReservationStatus,
    ) -> AppResult<Reservation>;

    async fn update(
        &self,
        id: Uuid,
        data: &UpdateReservation,
        time: Option<NaiveTime>,
    ) -> AppResult<Reservation>;

    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> AppResult<Reservation>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
impl ReservationStore for ReservationsRepository {
    async fn list(&self, query: &ReservationQuery) -> AppResult<(Vec<Reservation>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 500);
        let offset = (page - 1) * per_page;

        let mut conditions = Vec::new();
        let mut idx = 1;

        if query.start_date.is_some() {
            conditions.push(format!("reservation_date >= ${}", idx));
            idx += 1;
        }
        if query.end_date.is_some() {
            conditions.push(format!("reservation_date <= ${}", idx));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_q = format!("SELECT COUNT(*) FROM reservations {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        if let Some(sd) = query.start_date { count_builder = count_builder.bind(sd); }
        if let Some(ed) = query.end_date { count_builder = count_builder.bind(ed); }
        if let Some(st) = query.status { count_builder = count_builder.bind(st); }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM reservations {} ORDER BY reservation_date, reservation_time LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Reservation>(&select_q);
        if let Some(sd) = query.start_date { builder = builder.bind(sd); }
        if let Some(ed) = query.end_date { builder = builder.bind(ed); }
        if let Some(st) = query.status { builder = builder.bind(st); }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    async fn create(
        &self,
        data: &CreateReservation,
        time: NaiveTime,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        let row = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                customer_name, customer_email, customer_phone,
                reservation_date, reservation_time, party_size,
                status, special_requests
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(data.customer_name.trim())
        .bind(data.customer_email.trim())
        .bind(&data.customer_phone)
        .bind(data.reservation_date)
        .bind(time)
        .bind(data.party_size)
        .bind(status)
        .bind(&data.special_requests)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        data: &UpdateReservation,
        time: Option<NaiveTime>,
    ) -> AppResult<Reservation> {
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_f {
            ($present:expr, $name:expr) => {
                if $present { sets.push(format!("{} = ${}", $name, idx)); idx += 1; }
            };
        }

        add_f!(data.customer_name.is_some(), "customer_name");
        add_f!(data.customer_email.is_some(), "customer_email");
        add_f!(data.customer_phone.is_some(), "customer_phone");
        add_f!(data.reservation_date.is_some(), "reservation_date");
        add_f!(time.is_some(), "reservation_time");
        add_f!(data.party_size.is_some(), "party_size");
        add_f!(data.status.is_some(), "status");
        add_f!(data.special_requests.is_some(), "special_requests");

        let query = format!(
            "UPDATE reservations SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Reservation>(&query).bind(Utc::now());

        macro_rules! bind_f {
            ($field:expr) => {
                if let Some(val) = $field { builder = builder.bind(val); }
            };
        }

        bind_f!(data.customer_name.clone());
        bind_f!(data.customer_email.clone());
        bind_f!(data.customer_phone.clone());
        bind_f!(data.reservation_date);
        bind_f!(time);
        bind_f!(data.party_size);
        bind_f!(data.status);
        bind_f!(data.special_requests.clone());

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    async fn update_status(&self, id: Uuid, status: ReservationStatus) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation {} not found", id)));
        }
        Ok(())
    }
}
