//! Shared lifecycle enums and their transition tables
//!
//! Every lifecycle is a closed enum and the legal moves live next to the
//! variants, so each service enforces exactly one table instead of
//! comparing raw status strings.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// BookingStatus
// ---------------------------------------------------------------------------

/// Booking lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Nothing ever leaves `cancelled`
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

impl TryFrom<&str> for BookingStatus {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(AppError::Internal(format!("unknown booking status '{}'", other))),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DeliveryStatus
// ---------------------------------------------------------------------------

/// Outbound delivery status, advanced only by the assigned driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Assigned,
    InProgress,
    Delivered,
    Failed,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Assigned => "assigned",
            DeliveryStatus::InProgress => "in_progress",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
        }
    }

    /// Forward-only moves; `delivered` and `failed` are terminal
    pub fn can_transition(&self, to: DeliveryStatus) -> bool {
        use DeliveryStatus::*;
        matches!(
            (self, to),
            (Assigned, InProgress) | (Assigned, Delivered) | (Assigned, Failed)
                | (InProgress, Delivered)
                | (InProgress, Failed)
        )
    }

    /// Location reports are accepted only while the run is still live
    pub fn accepts_location(&self) -> bool {
        matches!(self, DeliveryStatus::Assigned | DeliveryStatus::InProgress)
    }
}

impl TryFrom<&str> for DeliveryStatus {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "assigned" => Ok(DeliveryStatus::Assigned),
            "in_progress" => Ok(DeliveryStatus::InProgress),
            "delivered" => Ok(DeliveryStatus::Delivered),
            "failed" => Ok(DeliveryStatus::Failed),
            other => Err(AppError::Internal(format!("unknown delivery status '{}'", other))),
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecollectStatus
// ---------------------------------------------------------------------------

/// Return-leg status for a delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecollectStatus {
    Unassigned,
    Assigned,
    Accepted,
    Rejected,
    ReportSubmitted,
    Returned,
    Completed,
}

impl RecollectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecollectStatus::Unassigned => "unassigned",
            RecollectStatus::Assigned => "assigned",
            RecollectStatus::Accepted => "accepted",
            RecollectStatus::Rejected => "rejected",
            RecollectStatus::ReportSubmitted => "report_submitted",
            RecollectStatus::Returned => "returned",
            RecollectStatus::Completed => "completed",
        }
    }

    /// Driver-side moves. `accepted -> completed` is the short path when
    /// no condition report is needed; the reporting path goes through
    /// `report_submitted` (set by report submission, not by this table)
    /// and optionally `returned`.
    pub fn can_transition(&self, to: RecollectStatus) -> bool {
        use RecollectStatus::*;
        matches!(
            (self, to),
            (Assigned, Accepted)
                | (Assigned, Rejected)
                | (Accepted, Completed)
                | (ReportSubmitted, Returned)
                | (ReportSubmitted, Completed)
                | (Returned, Completed)
        )
    }

    /// Once the items are back in the depot the report is frozen
    pub fn report_is_frozen(&self) -> bool {
        matches!(self, RecollectStatus::Returned | RecollectStatus::Completed)
    }
}

impl TryFrom<&str> for RecollectStatus {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "unassigned" => Ok(RecollectStatus::Unassigned),
            "assigned" => Ok(RecollectStatus::Assigned),
            "accepted" => Ok(RecollectStatus::Accepted),
            "rejected" => Ok(RecollectStatus::Rejected),
            "report_submitted" => Ok(RecollectStatus::ReportSubmitted),
            "returned" => Ok(RecollectStatus::Returned),
            "completed" => Ok(RecollectStatus::Completed),
            other => Err(AppError::Internal(format!("unknown recollect status '{}'", other))),
        }
    }
}

impl std::fmt::Display for RecollectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Supplier decision on a direct request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// The decision is made once, from `pending` only
    pub fn can_transition(&self, to: RequestStatus) -> bool {
        matches!(
            (self, to),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(AppError::Internal(format!("unknown request status '{}'", other))),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FulfillmentStatus
// ---------------------------------------------------------------------------

/// Fulfillment progress of an accepted supplier request.
///
/// Strictly monotonic: each step may only follow the immediately
/// preceding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStatus {
    New,
    Ready,
    Shipped,
    Returned,
    Completed,
}

impl FulfillmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentStatus::New => "new",
            FulfillmentStatus::Ready => "ready",
            FulfillmentStatus::Shipped => "shipped",
            FulfillmentStatus::Returned => "returned",
            FulfillmentStatus::Completed => "completed",
        }
    }

    /// The single legal successor, if any
    pub fn next(&self) -> Option<FulfillmentStatus> {
        match self {
            FulfillmentStatus::New => Some(FulfillmentStatus::Ready),
            FulfillmentStatus::Ready => Some(FulfillmentStatus::Shipped),
            FulfillmentStatus::Shipped => Some(FulfillmentStatus::Returned),
            FulfillmentStatus::Returned => Some(FulfillmentStatus::Completed),
            FulfillmentStatus::Completed => None,
        }
    }

    pub fn can_transition(&self, to: FulfillmentStatus) -> bool {
        self.next() == Some(to)
    }
}

impl TryFrom<&str> for FulfillmentStatus {
    type Error = AppError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "new" => Ok(FulfillmentStatus::New),
            "ready" => Ok(FulfillmentStatus::Ready),
            "shipped" => Ok(FulfillmentStatus::Shipped),
            "returned" => Ok(FulfillmentStatus::Returned),
            "completed" => Ok(FulfillmentStatus::Completed),
            other => Err(AppError::Internal(format!("unknown fulfillment status '{}'", other))),
        }
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_transitions_are_forward_only() {
        use DeliveryStatus::*;
        assert!(Assigned.can_transition(InProgress));
        assert!(Assigned.can_transition(Delivered));
        assert!(InProgress.can_transition(Failed));
        assert!(!InProgress.can_transition(Assigned));
        assert!(!Delivered.can_transition(InProgress));
        assert!(!Failed.can_transition(Delivered));
    }

    #[test]
    fn recollect_rejected_is_terminal_for_driver() {
        use RecollectStatus::*;
        assert!(!Rejected.can_transition(Accepted));
        assert!(!Rejected.can_transition(Completed));
    }

    #[test]
    fn recollect_reporting_path() {
        use RecollectStatus::*;
        assert!(Assigned.can_transition(Accepted));
        assert!(Accepted.can_transition(Completed));
        assert!(ReportSubmitted.can_transition(Returned));
        assert!(ReportSubmitted.can_transition(Completed));
        assert!(Returned.can_transition(Completed));
        assert!(!Accepted.can_transition(Returned));
        assert!(!Completed.can_transition(Returned));
    }

    #[test]
    fn request_decision_is_single_shot() {
        use RequestStatus::*;
        assert!(Pending.can_transition(Accepted));
        assert!(Pending.can_transition(Rejected));
        assert!(!Accepted.can_transition(Rejected));
        assert!(!Rejected.can_transition(Accepted));
    }

    #[test]
    fn fulfillment_cannot_skip_steps() {
        use FulfillmentStatus::*;
        assert!(New.can_transition(Ready));
        assert!(Ready.can_transition(Shipped));
        assert!(Shipped.can_transition(Returned));
        assert!(Returned.can_transition(Completed));
        // no skipping, no reverting
        assert!(!New.can_transition(Shipped));
        assert!(!Ready.can_transition(Completed));
        assert!(!Shipped.can_transition(Ready));
        assert!(Completed.next().is_none());
    }

    #[test]
    fn status_strings_round_trip() {
        for s in ["pending", "confirmed", "cancelled"] {
            assert_eq!(BookingStatus::try_from(s).unwrap().as_str(), s);
        }
        for s in ["unassigned", "assigned", "accepted", "rejected", "report_submitted", "returned", "completed"] {
            assert_eq!(RecollectStatus::try_from(s).unwrap().as_str(), s);
        }
    }
}
