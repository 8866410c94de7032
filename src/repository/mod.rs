//! Repository layer for database operations

pub mod closures;
pub mod reservations;
pub mod roles;
pub mod settings;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    availability::{AvailabilityDataSource, ClosureRules, DateKey, ReservationCounts},
    error::AppResult,
};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub closures: closures::ClosuresRepository,
    pub reservations: reservations::ReservationsRepository,
    pub roles: roles::RolesRepository,
    pub settings: settings::SettingsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            closures: closures::ClosuresRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            roles: roles::RolesRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AvailabilityDataSource for Repository {
    async fn closure_rules(&self, start: DateKey, end: DateKey) -> AppResult<ClosureRules> {
        self.closures.rules_for_range(start, end).await
    }

    async fn reservation_counts(&self, start: DateKey, end: DateKey) -> AppResult<ReservationCounts> {
        self.reservations.counts_by_range(start, end).await
    }
}
