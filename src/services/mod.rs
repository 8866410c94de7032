//! Business logic services

pub mod availability;
pub mod cache;
pub mod closures;
pub mod reservations;
pub mod roles;

use std::sync::Arc;

use crate::{
    availability::AvailabilityDataSource, config::ReservationsConfig, error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub availability: availability::AvailabilityService,
    pub closures: closures::ClosuresService,
    pub reservations: reservations::ReservationsService,
    pub roles: roles::RolesService,
}

impl Services {
    /// Create all services with the given repository. `cache` is `None` when
    /// Redis is disabled or unreachable.
    pub fn new(
        repository: Repository,
        reservations_config: &ReservationsConfig,
        cache: Option<cache::AvailabilityCache>,
    ) -> AppResult<Self> {
        let source: Arc<dyn AvailabilityDataSource> = Arc::new(repository.clone());
        let availability = availability::AvailabilityService::new(
            source,
            reservations_config.availability_settings()?,
            cache.map(|c| Arc::new(c) as Arc<dyn cache::WindowCache>),
            reservations_config.business_offset()?,
        );

        Ok(Self {
            closures: closures::ClosuresService::new(repository.clone(), availability.clone()),
            reservations: reservations::ReservationsService::new(
                Arc::new(repository.reservations.clone()),
                availability.clone(),
            ),
            roles: roles::RolesService::new(repository.clone()),
            availability,
            repository,
        })
    }
}
