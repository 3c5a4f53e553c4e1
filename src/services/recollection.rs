//! Recollection lifecycle service (return leg)
//!
//! The driver collects items back after the rental, assesses condition
//! and lateness, and the resulting report is priced into the settlement
//! charged against the security deposit.

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::PricingConfig,
    error::{AppError, AppResult},
    models::{
        actor::ActorContext,
        delivery::{Delivery, RecollectReport, SubmitRecollectReport},
        enums::{DeliveryStatus, RecollectStatus},
    },
    pricing,
    repository::Repository,
};

use super::events::{EventBus, LifecycleEvent};

/// Settlement figures for the payment collaborator
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SettlementAmounts {
    pub repair_cost: Decimal,
    pub late_fine: Decimal,
    pub total: Decimal,
}

/// Outcome of a report submission: the stored report plus its pricing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReportOutcome {
    pub report: RecollectReport,
    pub repair_cost: Decimal,
    pub late_fine: Decimal,
    pub settlement_total: Decimal,
}

#[derive(Clone)]
pub struct RecollectionService {
    repository: Repository,
    events: EventBus,
    pricing: PricingConfig,
}

impl RecollectionService {
    pub fn new(repository: Repository, events: EventBus, pricing: PricingConfig) -> Self {
        Self { repository, events, pricing }
    }

    /// Dispatcher assigns (or re-assigns after a rejection) the return leg
    pub async fn assign(
        &self,
        actor: &ActorContext,
        delivery_id: Uuid,
        driver_id: Uuid,
    ) -> AppResult<Delivery> {
        actor.require_admin()?;

        let delivery = self.repository.deliveries.get_by_id(delivery_id).await?;

        if delivery.status != DeliveryStatus::Delivered {
            return Err(AppError::InvalidTransition {
                from: delivery.status.to_string(),
                to: "recollect_assigned".to_string(),
            });
        }

        match delivery.recollect_status {
            RecollectStatus::Unassigned | RecollectStatus::Rejected => {}
            other => {
                return Err(AppError::InvalidTransition {
                    from: other.to_string(),
                    to: RecollectStatus::Assigned.to_string(),
                })
            }
        }

        self.repository
            .deliveries
            .update_recollect(
                delivery_id,
                RecollectStatus::Assigned,
                Some(driver_id),
                delivery.updated_at,
            )
            .await
    }

    /// Assigned driver advances the return leg
    pub async fn update_status(
        &self,
        delivery_id: Uuid,
        actor: &ActorContext,
        new_status: RecollectStatus,
    ) -> AppResult<Delivery> {
        let delivery = self.repository.deliveries.get_by_id(delivery_id).await?;
        let driver = delivery.recollect_driver_id.ok_or_else(|| {
            AppError::InvalidTransition {
                from: delivery.recollect_status.to_string(),
                to: new_status.to_string(),
            }
        })?;
        actor.require_assigned_driver(driver)?;

        if !delivery.recollect_status.can_transition(new_status) {
            return Err(AppError::InvalidTransition {
                from: delivery.recollect_status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self
            .repository
            .deliveries
            .update_recollect(delivery_id, new_status, None, delivery.updated_at)
            .await?;

        self.events.publish(LifecycleEvent::RecollectStatusChanged {
            delivery_id,
            from: delivery.recollect_status.to_string(),
            to: new_status.to_string(),
        });

        Ok(updated)
    }

    /// Driver files the condition/lateness report; the engine prices it.
    ///
    /// Only possible in `accepted`, so a report can never be overwritten
    /// once the leg has moved past `report_submitted`.
    pub async fn submit_report(
        &self,
        delivery_id: Uuid,
        actor: &ActorContext,
        req: SubmitRecollectReport,
    ) -> AppResult<ReportOutcome> {
        let delivery = self.repository.deliveries.get_by_id(delivery_id).await?;
        let driver = delivery.recollect_driver_id.ok_or_else(|| {
            AppError::Forbidden("Recollection has no assigned driver".to_string())
        })?;
        actor.require_assigned_driver(driver)?;

        if delivery.recollect_status.report_is_frozen() {
            return Err(AppError::InvalidTransition {
                from: delivery.recollect_status.to_string(),
                to: RecollectStatus::ReportSubmitted.to_string(),
            });
        }
        if delivery.recollect_status != RecollectStatus::Accepted {
            return Err(AppError::InvalidTransition {
                from: delivery.recollect_status.to_string(),
                to: RecollectStatus::ReportSubmitted.to_string(),
            });
        }

        req.validate()?;
        for item in &req.items {
            if item.collected_qty > item.expected_qty {
                return Err(AppError::Validation(format!(
                    "items: collected quantity exceeds expected for '{}'",
                    item.name
                )));
            }
        }

        let booking = self
            .repository
            .bookings
            .get_by_id(delivery.booking_id)
            .await?;

        let report = RecollectReport {
            actual_return_date: req.actual_return_date,
            comment: req.comment,
            items: req.items,
        };

        let repair = pricing::repair_cost(&booking.items, &report.items);
        let late = pricing::late_days(booking.return_date, report.actual_return_date);
        let fine = pricing::late_fine(&booking.items, late, self.pricing.late_fine_rate);
        let total = pricing::settlement_total(repair, fine);

        self.repository
            .deliveries
            .store_report(delivery_id, &report, delivery.updated_at)
            .await?;

        self.events.publish(LifecycleEvent::RecollectReportSubmitted {
            delivery_id,
            settlement_total: total,
        });

        Ok(ReportOutcome {
            report,
            repair_cost: repair,
            late_fine: fine,
            settlement_total: total,
        })
    }

    /// Settlement figures for refund/charge adjustment, recomputed from
    /// the stored report and the originating booking
    pub async fn settlement_amount(&self, delivery_id: Uuid) -> AppResult<SettlementAmounts> {
        let delivery = self.repository.deliveries.get_by_id(delivery_id).await?;
        let report = delivery.recollect_report.as_ref().ok_or_else(|| {
            AppError::NotFound(format!(
                "Delivery {} has no recollection report",
                delivery_id
            ))
        })?;

        let booking = self
            .repository
            .bookings
            .get_by_id(delivery.booking_id)
            .await?;

        let repair = pricing::repair_cost(&booking.items, &report.items);
        let late = pricing::late_days(booking.return_date, report.actual_return_date);
        let fine = pricing::late_fine(&booking.items, late, self.pricing.late_fine_rate);

        Ok(SettlementAmounts {
            repair_cost: repair,
            late_fine: fine,
            total: pricing::settlement_total(repair, fine),
        })
    }
}
