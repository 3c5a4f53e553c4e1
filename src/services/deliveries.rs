//! Delivery lifecycle service (outbound leg)

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        actor::ActorContext,
        delivery::{Delivery, GeoPoint, ReportLocation},
        enums::{BookingStatus, DeliveryStatus, RecollectStatus},
    },
    repository::Repository,
};

use super::{
    events::{EventBus, LifecycleEvent},
    locations::LocationStore,
};

#[derive(Clone)]
pub struct DeliveriesService {
    repository: Repository,
    events: EventBus,
    locations: LocationStore,
}

impl DeliveriesService {
    pub fn new(repository: Repository, events: EventBus, locations: LocationStore) -> Self {
        Self { repository, events, locations }
    }

    /// Get a delivery by ID
    pub async fn get(&self, id: Uuid) -> AppResult<Delivery> {
        self.repository.deliveries.get_by_id(id).await
    }

    /// Dispatcher assigns a driver to a confirmed booking
    pub async fn assign(
        &self,
        actor: &ActorContext,
        booking_id: Uuid,
        driver_id: Uuid,
    ) -> AppResult<Delivery> {
        actor.require_admin()?;

        let booking = self.repository.bookings.get_by_id(booking_id).await?;
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::InvalidTransition {
                from: booking.status.to_string(),
                to: "delivery_assigned".to_string(),
            });
        }

        if let Some(existing) = self.repository.deliveries.get_by_booking_id(booking_id).await? {
            return Err(AppError::Conflict(format!(
                "Booking {} already has delivery {}",
                booking_id, existing.id
            )));
        }

        let now = Utc::now();
        let delivery = Delivery {
            id: Uuid::new_v4(),
            booking_id,
            driver_id,
            status: DeliveryStatus::Assigned,
            recollect_status: RecollectStatus::Unassigned,
            recollect_driver_id: None,
            recollect_report: None,
            created_at: now,
            updated_at: now,
        };

        self.repository.deliveries.create(&delivery).await?;
        Ok(delivery)
    }

    /// Assigned driver advances the outbound status
    pub async fn update_status(
        &self,
        id: Uuid,
        actor: &ActorContext,
        new_status: DeliveryStatus,
    ) -> AppResult<Delivery> {
        let delivery = self.repository.deliveries.get_by_id(id).await?;
        actor.require_assigned_driver(delivery.driver_id)?;

        if !delivery.status.can_transition(new_status) {
            return Err(AppError::InvalidTransition {
                from: delivery.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self
            .repository
            .deliveries
            .update_status(id, new_status, delivery.updated_at)
            .await?;

        self.events.publish(LifecycleEvent::DeliveryStatusChanged {
            delivery_id: id,
            booking_id: delivery.booking_id,
            from: delivery.status.to_string(),
            to: new_status.to_string(),
        });

        Ok(updated)
    }

    /// Driver pings its position; accepted only while the run is live.
    /// Last write wins, no history.
    pub async fn report_location(
        &self,
        id: Uuid,
        actor: &ActorContext,
        report: ReportLocation,
    ) -> AppResult<()> {
        let delivery = self.repository.deliveries.get_by_id(id).await?;
        actor.require_assigned_driver(delivery.driver_id)?;

        if !delivery.status.accepts_location() {
            return Err(AppError::InvalidTransition {
                from: delivery.status.to_string(),
                to: "location_update".to_string(),
            });
        }

        report.validate()?;

        let point = GeoPoint {
            lat: report.lat,
            lng: report.lng,
            accuracy: report.accuracy,
            recorded_at: Utc::now(),
        };

        self.locations.store(id, &point).await
    }

    /// Customer-facing tracking view of the last-known position
    pub async fn location(&self, id: Uuid) -> AppResult<Option<GeoPoint>> {
        // 404 for unknown deliveries rather than an empty position
        self.repository.deliveries.get_by_id(id).await?;
        self.locations.get(id).await
    }
}
