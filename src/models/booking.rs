//! Booking model and request payloads

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::BookingStatus;

/// International or local phone numbers, digits with optional separators
pub static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-\.]{6,18}[0-9]$").unwrap());

/// One line of a booking, with the unit price snapshotted at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookingItem {
    pub equipment_id: Uuid,
    pub name: String,
    pub price_per_day: Decimal,
    pub qty: i32,
}

/// A customer's reservation of rental items for a date range
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub items: Vec<BookingItem>,
    pub booking_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub notes: Option<String>,
    pub subtotal: Decimal,
    pub security_deposit: Decimal,
    pub total: Decimal,
    pub status: BookingStatus,
    pub cancel_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested line at checkout; price is looked up server-side
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ItemRequest {
    pub equipment_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub qty: i32,
}

/// Create booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<ItemRequest>,
    pub booking_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    #[validate(length(min = 2, max = 120, message = "Name must be 2-120 characters"))]
    pub customer_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub customer_phone: String,
    #[validate(length(min = 5, max = 300, message = "Address must be 5-300 characters"))]
    pub delivery_address: String,
    #[validate(length(max = 300, message = "Notes must be at most 300 characters"))]
    pub notes: Option<String>,
}

/// Update booking request; only provided fields are patched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBooking {
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Option<Vec<ItemRequest>>,
    pub booking_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    #[validate(length(min = 2, max = 120, message = "Name must be 2-120 characters"))]
    pub customer_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub customer_email: Option<String>,
    #[validate(regex(path = *PHONE_RE, message = "Invalid phone number"))]
    pub customer_phone: Option<String>,
    #[validate(length(min = 5, max = 300, message = "Address must be 5-300 characters"))]
    pub delivery_address: Option<String>,
    #[validate(length(max = 300, message = "Notes must be at most 300 characters"))]
    pub notes: Option<String>,
}

/// Cancel booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CancelBooking {
    #[validate(length(min = 1, max = 300, message = "Reason must be 1-300 characters"))]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_pattern_accepts_common_formats() {
        for p in ["+33 6 12 34 56 78", "0612345678", "+1-202-555-0175"] {
            assert!(PHONE_RE.is_match(p), "{} should match", p);
        }
        for p in ["12", "not-a-phone", "+33 6 12 34 56 78 90 12 34 56"] {
            assert!(!PHONE_RE.is_match(p), "{} should not match", p);
        }
    }

    #[test]
    fn create_booking_rejects_long_notes() {
        let req = CreateBooking {
            items: vec![ItemRequest { equipment_id: Uuid::new_v4(), qty: 1 }],
            booking_date: Utc::now(),
            return_date: None,
            customer_name: "Ada Lovelace".to_string(),
            customer_email: "ada@example.org".to_string(),
            customer_phone: "0612345678".to_string(),
            delivery_address: "12 Engine Street, London".to_string(),
            notes: Some("x".repeat(301)),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_booking_rejects_empty_items_and_zero_qty() {
        let mut req = CreateBooking {
            items: vec![],
            booking_date: Utc::now(),
            return_date: None,
            customer_name: "Ada Lovelace".to_string(),
            customer_email: "ada@example.org".to_string(),
            customer_phone: "0612345678".to_string(),
            delivery_address: "12 Engine Street, London".to_string(),
            notes: None,
        };
        assert!(req.validate().is_err());

        req.items = vec![ItemRequest { equipment_id: Uuid::new_v4(), qty: 0 }];
        assert!(req.validate().is_err());

        req.items = vec![ItemRequest { equipment_id: Uuid::new_v4(), qty: 1 }];
        assert!(req.validate().is_ok());
    }
}
