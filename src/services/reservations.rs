//! Reservation submission and administration

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::reservation::{
        parse_reservation_time, AdminCreateReservation, CreateReservation, Reservation,
        ReservationQuery, ReservationStatus, UpdateReservation,
    },
    repository::reservations::ReservationStore,
};

use super::availability::AvailabilityService;

#[derive(Clone)]
pub struct ReservationsService {
    store: Arc<dyn ReservationStore>,
    availability: AvailabilityService,
}

impl ReservationsService {
    pub fn new(store: Arc<dyn ReservationStore>, availability: AvailabilityService) -> Self {
        Self { store, availability }
    }

    /// Online booking. The date is resolved again against current data before
    /// the insert; check and insert are not atomic, so two requests racing
    /// for the last slot can both succeed.
    pub async fn submit(&self, data: &CreateReservation) -> AppResult<Reservation> {
        data.validate()?;
        let time = parse_reservation_time(&data.reservation_time)?;

        let outcome = self.availability.check_date(data.reservation_date).await?;
        if !outcome.is_available() {
            tracing::info!(
                date = %data.reservation_date,
                reason = %outcome.describe(),
                "Reservation rejected"
            );
            return Err(AppError::BusinessRule(format!(
                "{} cannot be booked: {}",
                data.reservation_date,
                outcome.describe()
            )));
        }

        let reservation = self
            .store
            .create(data, time, ReservationStatus::Pending)
            .await?;
        tracing::info!(id = %reservation.id, date = %reservation.reservation_date, "Reservation submitted");
        self.availability.invalidate().await;
        Ok(reservation)
    }

    pub async fn list(&self, query: &ReservationQuery) -> AppResult<(Vec<Reservation>, i64)> {
        if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
            if end < start {
                return Err(AppError::Validation(format!(
                    "end_date {} is before start_date {}",
                    end, start
                )));
            }
        }
        self.store.list(query).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Reservation> {
        self.store.get_by_id(id).await
    }

    /// Staff-entered booking (phone); lead window, closures and capacity are
    /// left to the staff member's judgement.
    pub async fn admin_create(&self, data: &AdminCreateReservation) -> AppResult<Reservation> {
        data.validate()?;
        let time = parse_reservation_time(&data.reservation.reservation_time)?;
        let status = data.status.unwrap_or(ReservationStatus::Approved);

        let reservation = self
            .store
            .create(&data.reservation, time, status)
            .await?;
        tracing::info!(id = %reservation.id, date = %reservation.reservation_date, "Reservation created by staff");
        self.availability.invalidate().await;
        Ok(reservation)
    }

    pub async fn update(&self, id: Uuid, data: &UpdateReservation) -> AppResult<Reservation> {
        data.validate()?;
        let time = data
            .reservation_time
            .as_deref()
            .map(parse_reservation_time)
            .transpose()?;

        let reservation = self.store.update(id, data, time).await?;
        tracing::info!(id = %id, "Reservation updated");
        self.availability.invalidate().await;
        Ok(reservation)
    }

    pub async fn update_status(&self, id: Uuid, status: ReservationStatus) -> AppResult<Reservation> {
        let reservation = self.store.update_status(id, status).await?;
        tracing::info!(id = %id, ?status, "Reservation status changed");
        self.availability.invalidate().await;
        Ok(reservation)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete(id).await?;
        tracing::info!(id = %id, "Reservation deleted");
        self.availability.invalidate().await;
        Ok(())
    }
}
