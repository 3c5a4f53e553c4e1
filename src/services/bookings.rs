//! Booking lifecycle service
//!
//! Owns creation validation, the timed edit/cancel windows and the
//! pending/confirmed/cancelled transitions. All money figures are
//! produced by the pricing module; the stored columns are a cache that
//! is refreshed on every write and recomputed on every read.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{BookingConfig, PricingConfig},
    error::{AppError, AppResult},
    models::{
        actor::ActorContext,
        booking::{Booking, BookingItem, CancelBooking, CreateBooking, ItemRequest, UpdateBooking},
        enums::BookingStatus,
    },
    pricing,
    repository::Repository,
};

use super::events::{EventBus, LifecycleEvent};

/// Amounts the payment collaborator must charge before confirmation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChargeAmounts {
    pub subtotal: Decimal,
    pub security_deposit: Decimal,
    pub total: Decimal,
}

/// True while `now` is inside the window that opened at `created_at`
pub fn within_window(created_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now <= created_at + window
}

/// What the payment-confirmed callback does for a given status
#[derive(Debug, PartialEq, Eq)]
enum ConfirmAction {
    AlreadyConfirmed,
    Confirm,
}

fn confirm_action(status: BookingStatus) -> AppResult<ConfirmAction> {
    match status {
        BookingStatus::Confirmed => Ok(ConfirmAction::AlreadyConfirmed),
        BookingStatus::Pending => Ok(ConfirmAction::Confirm),
        BookingStatus::Cancelled => Err(AppError::InvalidTransition {
            from: status.to_string(),
            to: BookingStatus::Confirmed.to_string(),
        }),
    }
}

fn check_editable(status: BookingStatus) -> AppResult<()> {
    if status.is_terminal() {
        return Err(AppError::Forbidden(
            "A cancelled booking can no longer be edited".to_string(),
        ));
    }
    Ok(())
}

fn check_cancellable(status: BookingStatus) -> AppResult<()> {
    if status.is_terminal() {
        return Err(AppError::Forbidden("Booking is already cancelled".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
    events: EventBus,
    pricing: PricingConfig,
    windows: BookingConfig,
}

impl BookingsService {
    pub fn new(
        repository: Repository,
        events: EventBus,
        pricing: PricingConfig,
        windows: BookingConfig,
    ) -> Self {
        Self { repository, events, pricing, windows }
    }

    /// Get a booking, financial fields freshly recomputed
    pub async fn get(&self, id: Uuid, actor: &ActorContext) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        actor.require_owner(booking.customer_id, "booking")?;
        Ok(self.recompute(booking))
    }

    /// Create a booking: validate, snapshot prices, reserve stock, price it
    pub async fn create(&self, actor: &ActorContext, req: CreateBooking) -> AppResult<Booking> {
        actor.require_customer()?;
        req.validate()?;
        Self::check_dates(req.booking_date, req.return_date, Utc::now())?;

        let items = self.resolve_items(&req.items).await?;

        let now = Utc::now();
        let days = pricing::rental_days(req.booking_date, req.return_date);
        let subtotal = pricing::subtotal(&items, days);
        let deposit = pricing::security_deposit(subtotal, self.pricing.deposit_rate);

        let booking = Booking {
            id: Uuid::new_v4(),
            customer_id: actor.actor_id,
            items,
            booking_date: req.booking_date,
            return_date: req.return_date,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            customer_phone: req.customer_phone,
            delivery_address: req.delivery_address,
            notes: req.notes,
            subtotal,
            security_deposit: deposit,
            total: pricing::round2(subtotal + deposit),
            status: BookingStatus::Pending,
            cancel_reason: None,
            created_at: now,
            updated_at: now,
        };

        self.repository.bookings.create(&booking).await?;

        self.events.publish(LifecycleEvent::BookingCreated {
            booking_id: booking.id,
            customer_id: booking.customer_id,
        });

        Ok(booking)
    }

    /// Edit a booking within the edit window; re-validates and re-prices
    pub async fn update(
        &self,
        id: Uuid,
        actor: &ActorContext,
        patch: UpdateBooking,
    ) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        actor.require_owner(booking.customer_id, "booking")?;

        check_editable(booking.status)?;

        let now = Utc::now();
        let window = Duration::minutes(self.windows.edit_window_minutes);
        if !within_window(booking.created_at, now, window) {
            return Err(AppError::window_expired(
                "edit",
                &format!("{} minutes", self.windows.edit_window_minutes),
            ));
        }

        patch.validate()?;

        let expected_updated_at = booking.updated_at;
        let previous_items = booking.items.clone();
        let mut updated = booking;

        let items_changed = patch.items.is_some();
        if let Some(ref item_reqs) = patch.items {
            updated.items = self.resolve_items(item_reqs).await?;
        }
        if let Some(date) = patch.booking_date {
            updated.booking_date = date;
        }
        if let Some(date) = patch.return_date {
            updated.return_date = Some(date);
        }
        if patch.booking_date.is_some() {
            // A moved start date obeys the same rule as creation
            Self::check_dates(updated.booking_date, updated.return_date, now)?;
        } else if patch.return_date.is_some() {
            Self::check_return_after_start(updated.booking_date, updated.return_date)?;
        }
        if let Some(name) = patch.customer_name {
            updated.customer_name = name;
        }
        if let Some(email) = patch.customer_email {
            updated.customer_email = email;
        }
        if let Some(phone) = patch.customer_phone {
            updated.customer_phone = phone;
        }
        if let Some(address) = patch.delivery_address {
            updated.delivery_address = address;
        }
        if let Some(notes) = patch.notes {
            updated.notes = Some(notes);
        }

        let days = pricing::rental_days(updated.booking_date, updated.return_date);
        updated.subtotal = pricing::subtotal(&updated.items, days);
        updated.security_deposit =
            pricing::security_deposit(updated.subtotal, self.pricing.deposit_rate);
        updated.total = pricing::round2(updated.subtotal + updated.security_deposit);
        updated.updated_at = now;

        self.repository
            .bookings
            .update(
                &updated,
                expected_updated_at,
                items_changed.then_some(previous_items.as_slice()),
            )
            .await?;

        Ok(updated)
    }

    /// Cancel a booking within the cancel window; stock goes back
    pub async fn cancel(
        &self,
        id: Uuid,
        actor: &ActorContext,
        req: CancelBooking,
    ) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        actor.require_owner(booking.customer_id, "booking")?;

        check_cancellable(booking.status)?;

        let now = Utc::now();
        let window = Duration::hours(self.windows.cancel_window_hours);
        if !within_window(booking.created_at, now, window) {
            return Err(AppError::window_expired(
                "cancel",
                &format!("{} hours", self.windows.cancel_window_hours),
            ));
        }

        req.validate()?;

        let expected_updated_at = booking.updated_at;
        let cancelled = self
            .repository
            .bookings
            .cancel(&booking, &req.reason, expected_updated_at)
            .await?;

        self.events.publish(LifecycleEvent::BookingCancelled {
            booking_id: cancelled.id,
            reason: req.reason,
        });

        Ok(cancelled)
    }

    /// Payment-settlement hook: pending -> confirmed, idempotent
    pub async fn confirm(&self, id: Uuid) -> AppResult<Booking> {
        let booking = self.repository.bookings.get_by_id(id).await?;

        match confirm_action(booking.status)? {
            ConfirmAction::AlreadyConfirmed => Ok(booking),
            ConfirmAction::Confirm => {
                let affected = self.repository.bookings.confirm(id).await?;
                let booking = self.repository.bookings.get_by_id(id).await?;
                if affected == 0 && booking.status != BookingStatus::Confirmed {
                    // Lost the race against a cancellation
                    return Err(AppError::InvalidTransition {
                        from: booking.status.to_string(),
                        to: BookingStatus::Confirmed.to_string(),
                    });
                }
                self.events
                    .publish(LifecycleEvent::BookingConfirmed { booking_id: id });
                Ok(booking)
            }
        }
    }

    /// Amounts to charge before payment, recomputed from stored data
    pub async fn charge_amount(&self, id: Uuid) -> AppResult<ChargeAmounts> {
        let booking = self.repository.bookings.get_by_id(id).await?;
        let booking = self.recompute(booking);
        Ok(ChargeAmounts {
            subtotal: booking.subtotal,
            security_deposit: booking.security_deposit,
            total: booking.total,
        })
    }

    /// Stored financial columns are never trusted on read
    fn recompute(&self, mut booking: Booking) -> Booking {
        let days = pricing::rental_days(booking.booking_date, booking.return_date);
        booking.subtotal = pricing::subtotal(&booking.items, days);
        booking.security_deposit =
            pricing::security_deposit(booking.subtotal, self.pricing.deposit_rate);
        booking.total = pricing::round2(booking.subtotal + booking.security_deposit);
        booking
    }

    /// Turn requested lines into priced booking items. Duplicate
    /// equipment ids are rejected rather than silently merged.
    async fn resolve_items(&self, requests: &[ItemRequest]) -> AppResult<Vec<BookingItem>> {
        let mut ids: Vec<Uuid> = requests.iter().map(|r| r.equipment_id).collect();
        ids.sort();
        ids.dedup();
        if ids.len() != requests.len() {
            return Err(AppError::Validation(
                "items: duplicate equipment ids in cart".to_string(),
            ));
        }

        let listings = self.repository.inventory.get_many(&ids).await?;

        requests
            .iter()
            .map(|req| {
                let listing = listings
                    .iter()
                    .find(|l| l.id == req.equipment_id)
                    .ok_or_else(|| {
                        AppError::NotFound(format!("Inventory item {} not found", req.equipment_id))
                    })?;
                Ok(BookingItem {
                    equipment_id: listing.id,
                    name: listing.name.clone(),
                    price_per_day: listing.price_per_day,
                    qty: req.qty,
                })
            })
            .collect()
    }

    fn check_dates(
        booking_date: DateTime<Utc>,
        return_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if booking_date.date_naive() < now.date_naive() {
            return Err(AppError::Validation(
                "booking_date: must not be in the past".to_string(),
            ));
        }
        Self::check_return_after_start(booking_date, return_date)
    }

    fn check_return_after_start(
        booking_date: DateTime<Utc>,
        return_date: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        if let Some(ret) = return_date {
            if ret <= booking_date {
                return Err(AppError::Validation(
                    "return_date: must be after booking_date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn edit_window_closes_after_one_hour() {
        let created = at(10, 0);
        let window = Duration::minutes(60);
        assert!(within_window(created, at(10, 59), window));
        assert!(within_window(created, at(11, 0), window));
        assert!(!within_window(created, at(11, 1), window));
    }

    #[test]
    fn cancel_window_closes_after_a_day() {
        let created = at(10, 0);
        let window = Duration::hours(24);
        let next_day = created + Duration::hours(23) + Duration::minutes(59);
        assert!(within_window(created, next_day, window));
        let too_late = created + Duration::hours(24) + Duration::minutes(1);
        assert!(!within_window(created, too_late, window));
    }

    #[test]
    fn past_booking_dates_are_rejected() {
        let now = at(12, 0);
        let yesterday = now - Duration::days(1);
        assert!(BookingsService::check_dates(yesterday, None, now).is_err());
        // same calendar day is fine, even earlier in the day
        assert!(BookingsService::check_dates(at(8, 0), None, now).is_ok());
    }

    #[test]
    fn confirming_twice_lands_in_the_same_state() {
        // First call moves pending forward, the second sees confirmed
        // and does nothing
        assert_eq!(
            confirm_action(BookingStatus::Pending).unwrap(),
            ConfirmAction::Confirm
        );
        assert_eq!(
            confirm_action(BookingStatus::Confirmed).unwrap(),
            ConfirmAction::AlreadyConfirmed
        );
    }

    #[test]
    fn cancelled_booking_is_frozen() {
        assert!(matches!(
            check_editable(BookingStatus::Cancelled),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            check_cancellable(BookingStatus::Cancelled),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            confirm_action(BookingStatus::Cancelled),
            Err(AppError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn live_bookings_stay_editable_and_cancellable() {
        assert!(check_editable(BookingStatus::Pending).is_ok());
        assert!(check_editable(BookingStatus::Confirmed).is_ok());
        assert!(check_cancellable(BookingStatus::Pending).is_ok());
        assert!(check_cancellable(BookingStatus::Confirmed).is_ok());
    }

    #[test]
    fn return_date_must_follow_booking_date() {
        let start = at(12, 0);
        assert!(BookingsService::check_return_after_start(start, Some(start)).is_err());
        assert!(
            BookingsService::check_return_after_start(start, Some(start - Duration::days(1)))
                .is_err()
        );
        assert!(
            BookingsService::check_return_after_start(start, Some(start + Duration::days(3)))
                .is_ok()
        );
        assert!(BookingsService::check_return_after_start(start, None).is_ok());
    }
}
