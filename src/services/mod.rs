//! Business logic services

pub mod bookings;
pub mod deliveries;
pub mod events;
pub mod locations;
pub mod recollection;
pub mod supplier_requests;

use crate::{
    config::{BookingConfig, PricingConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub bookings: bookings::BookingsService,
    pub deliveries: deliveries::DeliveriesService,
    pub recollection: recollection::RecollectionService,
    pub supplier_requests: supplier_requests::SupplierRequestsService,
    pub events: events::EventBus,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        pricing: PricingConfig,
        windows: BookingConfig,
        locations: locations::LocationStore,
    ) -> Self {
        let events = events::EventBus::default();
        Self {
            bookings: bookings::BookingsService::new(
                repository.clone(),
                events.clone(),
                pricing.clone(),
                windows,
            ),
            deliveries: deliveries::DeliveriesService::new(
                repository.clone(),
                events.clone(),
                locations,
            ),
            recollection: recollection::RecollectionService::new(
                repository.clone(),
                events.clone(),
                pricing,
            ),
            supplier_requests: supplier_requests::SupplierRequestsService::new(
                repository.clone(),
                events.clone(),
            ),
            events,
            repository,
        }
    }

    /// Whether the database is reachable, for the readiness probe
    pub async fn ping_database(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
