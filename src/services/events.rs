//! In-process lifecycle event bus
//!
//! Notifiers (email, push, webhooks) live outside the core; they
//! subscribe to this broadcast channel. Publishing is fire-and-forget:
//! a missing subscriber is not an error and no delivery is guaranteed.

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

/// Events emitted by the lifecycle services
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LifecycleEvent {
    BookingCreated { booking_id: Uuid, customer_id: Uuid },
    BookingConfirmed { booking_id: Uuid },
    BookingCancelled { booking_id: Uuid, reason: String },
    DeliveryStatusChanged { delivery_id: Uuid, booking_id: Uuid, from: String, to: String },
    RecollectStatusChanged { delivery_id: Uuid, from: String, to: String },
    RecollectReportSubmitted { delivery_id: Uuid, settlement_total: Decimal },
    RequestDecided { request_id: Uuid, status: String },
    RequestFulfillmentChanged { request_id: Uuid, status: String },
}

impl LifecycleEvent {
    /// Dotted event name, stable across releases
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::BookingCreated { .. } => "booking.created",
            LifecycleEvent::BookingConfirmed { .. } => "booking.confirmed",
            LifecycleEvent::BookingCancelled { .. } => "booking.cancelled",
            LifecycleEvent::DeliveryStatusChanged { .. } => "delivery.status_changed",
            LifecycleEvent::RecollectStatusChanged { .. } => "recollect.status_changed",
            LifecycleEvent::RecollectReportSubmitted { .. } => "recollect.report_submitted",
            LifecycleEvent::RequestDecided { .. } => "request.decided",
            LifecycleEvent::RequestFulfillmentChanged { .. } => "request.fulfillment_changed",
        }
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event; subscribers may or may not exist
    pub fn publish(&self, event: LifecycleEvent) {
        tracing::info!(event = event.name(), payload = ?event, "lifecycle event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.sender.subscribe()
    }

    /// Stream view for notifier integrations; lagging subscribers skip
    /// missed events rather than blocking publishers
    pub fn stream(&self) -> BroadcastStream<LifecycleEvent> {
        BroadcastStream::new(self.sender.subscribe())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        let id = Uuid::new_v4();
        bus.publish(LifecycleEvent::BookingConfirmed { booking_id: id });

        match rx.recv().await.unwrap() {
            LifecycleEvent::BookingConfirmed { booking_id } => assert_eq!(booking_id, id),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new(8);
        bus.publish(LifecycleEvent::BookingCreated {
            booking_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
        });
    }
}
