//! Supplier direct-request lifecycle service

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        actor::ActorContext,
        enums::{FulfillmentStatus, RequestStatus},
        supplier_request::{CreateSupplierRequest, RequestItem, SupplierRequest},
    },
    repository::Repository,
};

use super::events::{EventBus, LifecycleEvent};

#[derive(Clone)]
pub struct SupplierRequestsService {
    repository: Repository,
    events: EventBus,
}

impl SupplierRequestsService {
    pub fn new(repository: Repository, events: EventBus) -> Self {
        Self { repository, events }
    }

    /// Get a request by ID; visible to its customer and its supplier
    pub async fn get(&self, id: Uuid, actor: &ActorContext) -> AppResult<SupplierRequest> {
        let request = self.repository.supplier_requests.get_by_id(id).await?;
        if actor.actor_id != request.customer_id
            && actor.actor_id != request.supplier_id
            && !actor.is_admin()
        {
            return Err(AppError::Forbidden(
                "Actor is not a party to this request".to_string(),
            ));
        }
        Ok(request)
    }

    /// Customer places a request against a supplier's own listings.
    /// Quantities are not reserved here; the supplier decides.
    pub async fn create(
        &self,
        actor: &ActorContext,
        req: CreateSupplierRequest,
    ) -> AppResult<SupplierRequest> {
        actor.require_customer()?;
        req.validate()?;

        if let Some(ret) = req.return_date {
            if ret <= req.booking_date {
                return Err(AppError::Validation(
                    "return_date: must be after booking_date".to_string(),
                ));
            }
        }

        let ids: Vec<Uuid> = req.items.iter().map(|i| i.inventory_id).collect();
        let listings = self.repository.inventory.get_many(&ids).await?;

        // Every line must belong to the addressed supplier's catalog
        let mut items: Vec<RequestItem> = Vec::with_capacity(req.items.len());
        for line in &req.items {
            let listing = listings
                .iter()
                .find(|l| l.id == line.inventory_id)
                .ok_or_else(|| {
                    AppError::NotFound(format!("Inventory item {} not found", line.inventory_id))
                })?;
            if listing.supplier_id != Some(req.supplier_id) {
                return Err(AppError::Validation(format!(
                    "items: '{}' is not listed by this supplier",
                    listing.name
                )));
            }
            items.push(RequestItem {
                inventory_id: listing.id,
                name: listing.name.clone(),
                price_per_day: listing.price_per_day,
                qty: line.qty,
            });
        }

        let now = Utc::now();
        let request = SupplierRequest {
            id: Uuid::new_v4(),
            supplier_id: req.supplier_id,
            customer_id: actor.actor_id,
            customer_name: req.customer_name,
            customer_email: req.customer_email,
            customer_phone: req.customer_phone,
            items,
            booking_date: req.booking_date,
            return_date: req.return_date,
            status: RequestStatus::Pending,
            fulfillment_status: FulfillmentStatus::New,
            created_at: now,
            updated_at: now,
        };

        self.repository.supplier_requests.create(&request).await?;
        Ok(request)
    }

    /// Supplier accepts or rejects; the decision is final
    pub async fn set_status(
        &self,
        id: Uuid,
        actor: &ActorContext,
        new_status: RequestStatus,
    ) -> AppResult<SupplierRequest> {
        let request = self.repository.supplier_requests.get_by_id(id).await?;
        actor.require_supplier(request.supplier_id)?;

        if !request.status.can_transition(new_status) {
            return Err(AppError::InvalidTransition {
                from: request.status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self
            .repository
            .supplier_requests
            .set_status(id, new_status, request.updated_at)
            .await?;

        self.events.publish(LifecycleEvent::RequestDecided {
            request_id: id,
            status: new_status.to_string(),
        });

        Ok(updated)
    }

    /// Supplier moves an accepted request one step along the
    /// new -> ready -> shipped -> returned -> completed chain
    pub async fn set_fulfillment(
        &self,
        id: Uuid,
        actor: &ActorContext,
        new_status: FulfillmentStatus,
    ) -> AppResult<SupplierRequest> {
        let request = self.repository.supplier_requests.get_by_id(id).await?;
        actor.require_supplier(request.supplier_id)?;

        if request.status != RequestStatus::Accepted {
            return Err(AppError::Forbidden(
                "Fulfillment can only progress on an accepted request".to_string(),
            ));
        }

        if !request.fulfillment_status.can_transition(new_status) {
            return Err(AppError::InvalidTransition {
                from: request.fulfillment_status.to_string(),
                to: new_status.to_string(),
            });
        }

        let updated = self
            .repository
            .supplier_requests
            .set_fulfillment(id, new_status, request.updated_at)
            .await?;

        self.events.publish(LifecycleEvent::RequestFulfillmentChanged {
            request_id: id,
            status: new_status.to_string(),
        });

        Ok(updated)
    }
}
