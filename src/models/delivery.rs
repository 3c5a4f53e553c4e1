//! Delivery, recollection and condition-report models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::enums::{DeliveryStatus, RecollectStatus};

/// Condition of a collected item, as assessed by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ItemCondition {
    None,
    Minor,
    Major,
}

impl ItemCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemCondition::None => "none",
            ItemCondition::Minor => "minor",
            ItemCondition::Major => "major",
        }
    }
}

/// One line of a recollection report
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReportItem {
    pub equipment_id: Uuid,
    pub name: String,
    #[validate(range(min = 0, message = "Expected quantity must not be negative"))]
    pub expected_qty: i32,
    #[validate(range(min = 0, message = "Collected quantity must not be negative"))]
    pub collected_qty: i32,
    pub condition: ItemCondition,
    pub note: Option<String>,
}

/// Driver's report of what came back, and in what shape
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecollectReport {
    pub actual_return_date: DateTime<Utc>,
    pub comment: Option<String>,
    pub items: Vec<ReportItem>,
}

/// Outbound fulfillment leg of a confirmed booking, 1:1 with the booking
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Delivery {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub driver_id: Uuid,
    pub status: DeliveryStatus,
    pub recollect_status: RecollectStatus,
    pub recollect_driver_id: Option<Uuid>,
    pub recollect_report: Option<RecollectReport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Last known driver position; lives in Redis, last write wins
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Assign delivery request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDelivery {
    pub booking_id: Uuid,
    pub driver_id: Uuid,
}

/// Driver status update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeliveryStatus {
    pub status: DeliveryStatus,
}

/// Assign recollection request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRecollect {
    pub driver_id: Uuid,
}

/// Recollection status update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRecollectStatus {
    pub status: RecollectStatus,
}

/// Location report from the driver's device
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportLocation {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude out of range"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude out of range"))]
    pub lng: f64,
    #[validate(range(min = 0.0, message = "Accuracy must not be negative"))]
    pub accuracy: f64,
}

/// Recollection report submission
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitRecollectReport {
    pub actual_return_date: DateTime<Utc>,
    #[validate(length(max = 300, message = "Comment must be at most 300 characters"))]
    pub comment: Option<String>,
    #[validate(length(min = 1, message = "At least one report item is required"), nested)]
    pub items: Vec<ReportItem>,
}
