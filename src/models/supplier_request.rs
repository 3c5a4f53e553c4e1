//! Supplier direct-request model and payloads

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::booking::PHONE_RE;
use super::enums::{FulfillmentStatus, RequestStatus};

/// One line of a supplier request, price snapshotted from the listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RequestItem {
    pub inventory_id: Uuid,
    pub name: String,
    pub price_per_day: Decimal,
    pub qty: i32,
}

/// A customer's request placed directly against a supplier's own inventory
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierRequest {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub items: Vec<RequestItem>,
    pub booking_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: RequestStatus,
    pub fulfillment_status: FulfillmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested line; price and supplier are resolved from the listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RequestItemRequest {
    pub inventory_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub qty: i32,
}

/// Create supplier request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierRequest {
    pub supplier_id: Uuid,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<RequestItemRequest>,
    pub booking_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[validate(length(min = 2, max = 120, message = "Name must be 2-120 characters"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub customer_phone: String,
}

/// Supplier accept/reject decision
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRequestStatus {
    pub status: RequestStatus,
}

/// Fulfillment progress update
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetFulfillmentStatus {
    pub status: FulfillmentStatus,
}
